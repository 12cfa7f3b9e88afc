use crate::app::{CreateProduct, ImageInput};
use crate::domain::error::LedgerError;
use crate::storage::entities::ProductPatch;
use crate::storage::relations::Relation;
use crate::transport::http::handlers::common::{error_response, respond, respond_with};
use crate::transport::http::types::{json_422, ApiResponse, AppState, StockRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

fn parse_relation(segment: &str) -> Result<Relation, LedgerError> {
    match segment {
        "categories" => Ok(Relation::ProductCategory),
        "car-models" => Ok(Relation::ProductCarModel),
        "brands" => Ok(Relation::ProductBrand),
        "images" => Ok(Relation::ProductImage),
        other => Err(LedgerError::Validation(format!(
            "unknown product relation '{}' (expected categories | car-models | brands | images)",
            other
        ))),
    }
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created with its relations", body = ApiResponse),
        (status = 400, description = "Image descriptor without id or url", body = ApiResponse),
        (status = 404, description = "Enterprise or a referenced id not found", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn create_product_handler(
    State(state): State<AppState>,
    request: Result<Json<CreateProduct>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(
                e,
                "{\"name\", \"enterprise_id\", \"category_ids\", \"car_model_ids\", \"brand_ids\", \"images\"}",
            )
            .into_response()
        }
    };
    let result = state.service.create_product(request).await;
    respond_with(&state, StatusCode::CREATED, result)
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ProductPatch,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse),
        (status = 404, description = "Product or new enterprise not found", body = ApiResponse)
    )
)]
pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    request: Result<Json<ProductPatch>, JsonRejection>,
) -> impl IntoResponse {
    let Json(patch) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"name\"?, \"stock\"?, \"price\"?, \"enterprise_id\"?}").into_response(),
    };
    let result = state.service.update_product(id, patch).await;
    respond(&state, result)
}

#[utoipa::path(
    put,
    path = "/api/products/{id}/stock",
    params(("id" = i32, Path, description = "Product id")),
    request_body = StockRequest,
    responses(
        (status = 200, description = "Stock updated", body = ApiResponse),
        (status = 404, description = "Product not found", body = ApiResponse)
    )
)]
pub async fn update_stock_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    request: Result<Json<StockRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"stock\": int}").into_response(),
    };
    let result = state.service.update_product_stock(id, request.stock).await;
    respond(&state, result)
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted; data is the pre-deletion snapshot", body = ApiResponse),
        (status = 404, description = "Product not found", body = ApiResponse)
    )
)]
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let result = state.service.delete_product(id).await;
    respond(&state, result)
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/images",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ImageInput,
    responses(
        (status = 200, description = "Image linked", body = ApiResponse),
        (status = 400, description = "Neither id nor url given", body = ApiResponse),
        (status = 404, description = "Product or image not found", body = ApiResponse)
    )
)]
pub async fn add_image_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    request: Result<Json<ImageInput>, JsonRejection>,
) -> impl IntoResponse {
    let Json(image) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"id\"} or {\"url\"}").into_response(),
    };
    let result = state.service.add_product_image(id, image).await;
    respond(&state, result)
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/{relation}/{target_id}",
    params(
        ("id" = i32, Path, description = "Product id"),
        ("relation" = String, Path, description = "categories | car-models | brands | images"),
        ("target_id" = i32, Path, description = "Id of the related row")
    ),
    responses(
        (status = 200, description = "Relation added (idempotent)", body = ApiResponse),
        (status = 400, description = "Unknown relation", body = ApiResponse),
        (status = 404, description = "Product or related row not found", body = ApiResponse)
    )
)]
pub async fn add_relation_handler(
    State(state): State<AppState>,
    Path((id, relation, target_id)): Path<(i32, String, i32)>,
) -> impl IntoResponse {
    let rel = match parse_relation(&relation) {
        Ok(r) => r,
        Err(e) => return error_response(&state, e),
    };
    let result = match rel {
        Relation::ProductCategory => state.service.add_product_category(id, target_id).await,
        Relation::ProductCarModel => state.service.add_product_car_model(id, target_id).await,
        Relation::ProductBrand => state.service.add_product_brand(id, target_id).await,
        _ => state.service.add_product_image(id, ImageInput::existing(target_id)).await,
    };
    respond(&state, result)
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}/{relation}/{target_id}",
    params(
        ("id" = i32, Path, description = "Product id"),
        ("relation" = String, Path, description = "categories | car-models | brands | images"),
        ("target_id" = i32, Path, description = "Id of the related row")
    ),
    responses(
        (status = 200, description = "Relation removed", body = ApiResponse),
        (status = 400, description = "Unknown relation", body = ApiResponse),
        (status = 404, description = "Pair not linked", body = ApiResponse)
    )
)]
pub async fn remove_relation_handler(
    State(state): State<AppState>,
    Path((id, relation, target_id)): Path<(i32, String, i32)>,
) -> impl IntoResponse {
    let rel = match parse_relation(&relation) {
        Ok(r) => r,
        Err(e) => return error_response(&state, e),
    };
    let result = match rel {
        Relation::ProductCategory => state.service.remove_product_category(id, target_id).await,
        Relation::ProductCarModel => state.service.remove_product_car_model(id, target_id).await,
        Relation::ProductBrand => state.service.remove_product_brand(id, target_id).await,
        _ => state.service.remove_product_image(id, target_id).await,
    };
    respond(&state, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_segments_map_to_product_relations() {
        assert_eq!(parse_relation("car-models").unwrap(), Relation::ProductCarModel);
        assert_eq!(parse_relation("images").unwrap(), Relation::ProductImage);
        assert!(parse_relation("roles").is_err());
    }
}

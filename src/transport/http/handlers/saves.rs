use crate::transport::http::handlers::common::respond;
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::{Path, State};
use axum::response::IntoResponse;

#[utoipa::path(
    get,
    path = "/api/accounts/{id}/saves",
    params(("id" = i32, Path, description = "Account id")),
    responses(
        (status = 200, description = "Saved products", body = ApiResponse),
        (status = 404, description = "Account not found", body = ApiResponse)
    )
)]
pub async fn list_saves_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let result = state.service.get_saved_products(id).await;
    respond(&state, result)
}

#[utoipa::path(
    post,
    path = "/api/accounts/{id}/saves/{product_id}",
    params(
        ("id" = i32, Path, description = "Account id"),
        ("product_id" = i32, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product saved (idempotent)", body = ApiResponse),
        (status = 404, description = "Account or product not found", body = ApiResponse)
    )
)]
pub async fn save_product_handler(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(i32, i32)>,
) -> impl IntoResponse {
    let result = state.service.save_product(id, product_id).await;
    respond(&state, result)
}

#[utoipa::path(
    delete,
    path = "/api/accounts/{id}/saves/{product_id}",
    params(
        ("id" = i32, Path, description = "Account id"),
        ("product_id" = i32, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Save removed", body = ApiResponse),
        (status = 404, description = "Product was not saved", body = ApiResponse)
    )
)]
pub async fn unsave_product_handler(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(i32, i32)>,
) -> impl IntoResponse {
    let result = state.service.unsave_product(id, product_id).await;
    respond(&state, result)
}

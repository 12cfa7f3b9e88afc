use crate::domain::error::LedgerError;
use crate::transport::http::handlers::common::{error_response, respond, success};
use crate::transport::http::types::{ApiResponse, AppState, LimitQuery};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

#[utoipa::path(
    get,
    path = "/api/catalog",
    responses((status = 200, description = "All publishable products", body = ApiResponse))
)]
pub async fn catalog_all_handler(State(state): State<AppState>) -> impl IntoResponse {
    let result = state.service.catalog_all().await;
    respond(&state, result)
}

#[utoipa::path(
    get,
    path = "/api/catalog/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product, if publishable", body = ApiResponse),
        (status = 404, description = "Product missing or not publishable", body = ApiResponse)
    )
)]
pub async fn catalog_by_id_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match state.service.catalog_by_id(id).await {
        Ok(Some(item)) => success(&state, StatusCode::OK, &item),
        Ok(None) => error_response(
            &state,
            LedgerError::NotFound(format!("product {} is not in the catalog", id)),
        ),
        Err(e) => error_response(&state, e),
    }
}

#[utoipa::path(
    get,
    path = "/api/catalog/categories/{id}",
    params(("id" = i32, Path, description = "Category id"), LimitQuery),
    responses(
        (status = 200, description = "Publishable products of the category", body = ApiResponse),
        (status = 400, description = "Negative limit", body = ApiResponse)
    )
)]
pub async fn catalog_by_category_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<LimitQuery>,
) -> impl IntoResponse {
    let result = match query.limit {
        Some(limit) => state.service.catalog_n_by_category(id, limit).await,
        None => state.service.catalog_by_category(id).await,
    };
    respond(&state, result)
}

#[utoipa::path(
    get,
    path = "/api/catalog/enterprises/{id}",
    params(("id" = i32, Path, description = "Enterprise id")),
    responses(
        (status = 200, description = "Enterprise, owner, links and publishable products", body = ApiResponse),
        (status = 404, description = "Enterprise not found", body = ApiResponse)
    )
)]
pub async fn catalog_by_enterprise_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let result = state.service.catalog_by_enterprise(id).await;
    respond(&state, result)
}

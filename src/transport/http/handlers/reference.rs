use crate::storage::reference::ReferenceKind;
use crate::transport::http::handlers::common::{error_response, respond, respond_with};
use crate::transport::http::types::{json_422, ApiResponse, AppState, NameRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/reference/{kind}",
    params(("kind" = String, Path, description = "roles | categories | car-models | brands")),
    responses(
        (status = 200, description = "All rows of the kind", body = ApiResponse),
        (status = 400, description = "Unknown kind", body = ApiResponse)
    )
)]
pub async fn list_reference_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> impl IntoResponse {
    let kind = match kind.parse::<ReferenceKind>() {
        Ok(k) => k,
        Err(e) => return error_response(&state, e),
    };
    let result = state.service.list_reference(kind).await;
    respond(&state, result)
}

#[utoipa::path(
    post,
    path = "/api/reference/{kind}",
    params(("kind" = String, Path, description = "roles | categories | car-models | brands")),
    request_body = NameRequest,
    responses(
        (status = 201, description = "Row created", body = ApiResponse),
        (status = 400, description = "Unknown kind or blank name", body = ApiResponse),
        (status = 409, description = "Name already taken", body = ApiResponse)
    )
)]
pub async fn create_reference_handler(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    request: Result<Json<NameRequest>, JsonRejection>,
) -> impl IntoResponse {
    let kind = match kind.parse::<ReferenceKind>() {
        Ok(k) => k,
        Err(e) => return error_response(&state, e),
    };
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"name\"}").into_response(),
    };
    let result = state.service.create_reference(kind, &request.name).await;
    respond_with(&state, StatusCode::CREATED, result)
}

#[utoipa::path(
    delete,
    path = "/api/reference/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "roles | categories | car-models | brands"),
        ("id" = i32, Path, description = "Row id")
    ),
    responses(
        (status = 200, description = "Row deleted", body = ApiResponse),
        (status = 404, description = "Row not found", body = ApiResponse)
    )
)]
pub async fn delete_reference_handler(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i32)>,
) -> impl IntoResponse {
    let kind = match kind.parse::<ReferenceKind>() {
        Ok(k) => k,
        Err(e) => return error_response(&state, e),
    };
    let result = state
        .service
        .delete_reference(kind, id)
        .await
        .map(|()| serde_json::json!({ "deleted": id }));
    respond(&state, result)
}

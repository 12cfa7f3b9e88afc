use crate::app::{CreateEnterprise, NewExternalLink};
use crate::storage::entities::{EnterprisePatch, LinkPatch};
use crate::transport::http::handlers::common::{respond, respond_with};
use crate::transport::http::types::{json_422, ApiResponse, AppState, EnabledRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/enterprises",
    request_body = CreateEnterprise,
    responses(
        (status = 201, description = "Enterprise created with its links", body = ApiResponse),
        (status = 404, description = "Owner account not found", body = ApiResponse),
        (status = 409, description = "Tax id already registered", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn create_enterprise_handler(
    State(state): State<AppState>,
    request: Result<Json<CreateEnterprise>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(
                e,
                "{\"tax_id\", \"address\", \"representative_name\", \"representative_id_number\"}",
            )
            .into_response()
        }
    };
    let result = state.service.create_enterprise(request).await;
    respond_with(&state, StatusCode::CREATED, result)
}

#[utoipa::path(
    patch,
    path = "/api/enterprises/{id}",
    params(("id" = i32, Path, description = "Enterprise id")),
    request_body = EnterprisePatch,
    responses(
        (status = 200, description = "Enterprise updated", body = ApiResponse),
        (status = 404, description = "Enterprise or new owner not found", body = ApiResponse)
    )
)]
pub async fn update_enterprise_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    request: Result<Json<EnterprisePatch>, JsonRejection>,
) -> impl IntoResponse {
    let Json(patch) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"address\"?, \"description\"?, ...}").into_response(),
    };
    let result = state.service.update_enterprise(id, patch).await;
    respond(&state, result)
}

#[utoipa::path(
    put,
    path = "/api/enterprises/{id}/enabled",
    params(("id" = i32, Path, description = "Enterprise id")),
    request_body = EnabledRequest,
    responses(
        (status = 200, description = "Enterprise enabled or disabled", body = ApiResponse),
        (status = 404, description = "Enterprise not found", body = ApiResponse)
    )
)]
pub async fn set_enabled_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    request: Result<Json<EnabledRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"enabled\": bool}").into_response(),
    };
    let result = state.service.set_enterprise_enabled(id, request.enabled).await;
    respond(&state, result)
}

#[utoipa::path(
    delete,
    path = "/api/enterprises/{id}",
    params(("id" = i32, Path, description = "Enterprise id")),
    responses(
        (status = 200, description = "Enterprise deleted; data is the pre-deletion snapshot", body = ApiResponse),
        (status = 404, description = "Enterprise not found", body = ApiResponse)
    )
)]
pub async fn delete_enterprise_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let result = state.service.delete_enterprise(id).await;
    respond(&state, result)
}

#[utoipa::path(
    post,
    path = "/api/enterprises/{id}/links",
    params(("id" = i32, Path, description = "Enterprise id")),
    request_body = NewExternalLink,
    responses(
        (status = 201, description = "Link added", body = ApiResponse),
        (status = 404, description = "Enterprise not found", body = ApiResponse)
    )
)]
pub async fn add_link_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    request: Result<Json<NewExternalLink>, JsonRejection>,
) -> impl IntoResponse {
    let Json(link) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"name\", \"url\"}").into_response(),
    };
    let result = state.service.add_external_link(id, link).await;
    respond_with(&state, StatusCode::CREATED, result)
}

#[utoipa::path(
    patch,
    path = "/api/links/{id}",
    params(("id" = i32, Path, description = "External link id")),
    request_body = LinkPatch,
    responses(
        (status = 200, description = "Link updated", body = ApiResponse),
        (status = 404, description = "Link not found", body = ApiResponse)
    )
)]
pub async fn update_link_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    request: Result<Json<LinkPatch>, JsonRejection>,
) -> impl IntoResponse {
    let Json(patch) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"name\"?, \"url\"?}").into_response(),
    };
    let result = state.service.update_external_link(id, patch).await;
    respond(&state, result)
}

#[utoipa::path(
    delete,
    path = "/api/links/{id}",
    params(("id" = i32, Path, description = "External link id")),
    responses(
        (status = 200, description = "Link removed", body = ApiResponse),
        (status = 404, description = "Link not found", body = ApiResponse)
    )
)]
pub async fn remove_link_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let result = state.service.remove_external_link(id).await;
    respond(&state, result)
}

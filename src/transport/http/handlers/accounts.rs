use crate::app::{CreateAccount, RegisterEnterpriseAccount};
use crate::domain::audit::EntityKind;
use crate::storage::entities::AccountPatch;
use crate::transport::http::handlers::common::{error_response, respond, respond_with};
use crate::transport::http::types::{json_422, ApiResponse, AppState, EmailQuery};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/accounts",
    request_body = CreateAccount,
    responses(
        (status = 201, description = "Account created", body = ApiResponse),
        (status = 409, description = "Username or email already taken", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn create_account_handler(
    State(state): State<AppState>,
    request: Result<Json<CreateAccount>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"username\", \"email\", \"password_hash\", \"role_ids\": [...]}")
                .into_response()
        }
    };
    let result = state.service.create_account(request).await;
    respond_with(&state, StatusCode::CREATED, result)
}

#[utoipa::path(
    patch,
    path = "/api/accounts/{id}",
    params(("id" = i32, Path, description = "Account id")),
    request_body = AccountPatch,
    responses(
        (status = 200, description = "Account updated", body = ApiResponse),
        (status = 404, description = "Account not found", body = ApiResponse),
        (status = 409, description = "Username or email already taken", body = ApiResponse)
    )
)]
pub async fn update_account_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    request: Result<Json<AccountPatch>, JsonRejection>,
) -> impl IntoResponse {
    let Json(patch) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"username\"?, \"email\"?, \"phone\"?}").into_response(),
    };
    let result = state.service.update_account(id, patch).await;
    respond(&state, result)
}

#[utoipa::path(
    delete,
    path = "/api/accounts/{id}",
    params(("id" = i32, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account deleted; data is the pre-deletion snapshot", body = ApiResponse),
        (status = 404, description = "Account not found", body = ApiResponse)
    )
)]
pub async fn delete_account_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let result = state.service.delete_account(id).await;
    respond(&state, result)
}

#[utoipa::path(
    post,
    path = "/api/accounts/{id}/roles/{role_id}",
    params(
        ("id" = i32, Path, description = "Account id"),
        ("role_id" = i32, Path, description = "Role id")
    ),
    responses(
        (status = 200, description = "Role granted (idempotent)", body = ApiResponse),
        (status = 404, description = "Account or role not found", body = ApiResponse)
    )
)]
pub async fn add_role_handler(
    State(state): State<AppState>,
    Path((id, role_id)): Path<(i32, i32)>,
) -> impl IntoResponse {
    let result = state.service.add_role_to_account(id, role_id).await;
    respond(&state, result)
}

#[utoipa::path(
    delete,
    path = "/api/accounts/{id}/roles/{role_id}",
    params(
        ("id" = i32, Path, description = "Account id"),
        ("role_id" = i32, Path, description = "Role id")
    ),
    responses(
        (status = 200, description = "Role revoked", body = ApiResponse),
        (status = 404, description = "Account does not hold the role", body = ApiResponse)
    )
)]
pub async fn remove_role_handler(
    State(state): State<AppState>,
    Path((id, role_id)): Path<(i32, i32)>,
) -> impl IntoResponse {
    let result = state.service.remove_role_from_account(id, role_id).await;
    respond(&state, result)
}

#[utoipa::path(
    post,
    path = "/api/enterprise-accounts",
    request_body = RegisterEnterpriseAccount,
    responses(
        (status = 201, description = "Account and owned enterprise created", body = ApiResponse),
        (status = 409, description = "Username, email or tax id already taken", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn register_enterprise_account_handler(
    State(state): State<AppState>,
    request: Result<Json<RegisterEnterpriseAccount>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"account\": {...}, \"enterprise\": {...}}").into_response(),
    };
    let result = state.service.register_enterprise_account(request).await;
    respond_with(&state, StatusCode::CREATED, result)
}

#[utoipa::path(
    get,
    path = "/api/profile",
    params(EmailQuery),
    responses(
        (status = 200, description = "Account with roles, enterprise and links", body = ApiResponse),
        (status = 404, description = "No account with that email", body = ApiResponse)
    )
)]
pub async fn profile_handler(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> impl IntoResponse {
    let result = state.service.account_profile_by_email(&query.email).await;
    respond(&state, result)
}

#[utoipa::path(
    get,
    path = "/api/audit/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "account | enterprise | product | save"),
        ("id" = i32, Path, description = "Subject id (account id for saves)")
    ),
    responses(
        (status = 200, description = "Audit entries, oldest first", body = ApiResponse),
        (status = 400, description = "Unknown entity kind", body = ApiResponse)
    )
)]
pub async fn audit_history_handler(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i32)>,
) -> impl IntoResponse {
    let kind = match kind.parse::<EntityKind>() {
        Ok(k) => k,
        Err(e) => return error_response(&state, e),
    };
    let result = state.service.audit_history(kind, id).await;
    respond(&state, result)
}

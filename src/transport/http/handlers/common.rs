use crate::domain::error::{ErrorKind, LedgerError, LedgerResult};
use crate::transport::http::types::{ApiResponse, AppState};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(state: &AppState, err: LedgerError) -> Response {
    let kind = err.kind();
    let message = if kind == ErrorKind::Internal {
        error!(error = %err, "request failed");
        if state.expose_internal_errors {
            err.to_string()
        } else {
            "internal error".to_string()
        }
    } else {
        err.to_string()
    };
    (
        status_for(kind),
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }),
    )
        .into_response()
}

pub fn success<T: Serialize>(state: &AppState, status: StatusCode, value: &T) -> Response {
    match serde_json::to_value(value) {
        Ok(data) => (
            status,
            Json(ApiResponse {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => error_response(state, LedgerError::Snapshot(e)),
    }
}

/// 200 with the value, or the mapped error.
pub fn respond<T: Serialize>(state: &AppState, result: LedgerResult<T>) -> Response {
    respond_with(state, StatusCode::OK, result)
}

pub fn respond_with<T: Serialize>(state: &AppState, status: StatusCode, result: LedgerResult<T>) -> Response {
    match result {
        Ok(value) => success(state, status, &value),
        Err(e) => error_response(state, e),
    }
}

use crate::app::MarketplaceService;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MarketplaceService>,
    /// When false, 500 responses carry a generic message instead of the cause.
    pub expose_internal_errors: bool,
}

impl AppState {
    pub fn new(service: MarketplaceService, expose_internal_errors: bool) -> Self {
        Self {
            service: Arc::new(service),
            expose_internal_errors,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct EnabledRequest {
    pub enabled: bool,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct StockRequest {
    pub stock: i32,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    /// Email of the account to look up.
    pub email: String,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    /// Maximum number of products; all when omitted.
    #[serde(default)]
    pub limit: Option<i64>,
}

pub fn json_422(err: JsonRejection, expected: &str) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(format!("Invalid JSON body: {} (expected: {})", err, expected)),
        }),
    )
}

// src/bin/api_server.rs

use marketplace_ledger::infra::{config, logging};
use marketplace_ledger::transport;
use marketplace_ledger::MarketplaceService;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init();

    // --- Service Initialization (connects and applies the schema) ---
    info!("initializing MarketplaceService");
    let service = MarketplaceService::connect().await?;
    info!(policy = ?service.delete_policy(), "MarketplaceService ready");

    let expose = config::expose_internal_errors();
    if expose {
        warn!("APP_ENV=development: internal error details are returned to clients");
    }
    let app_state = transport::http::AppState::new(service, expose);

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);

    let addr = config::listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received (Ctrl+C)");
        }
    }

    Ok(())
}

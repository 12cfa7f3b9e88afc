use crate::app::{CreateAccount, CreateEnterprise, CreateProduct, ImageInput, NewExternalLink, RegisterEnterpriseAccount};
use crate::storage::entities::{AccountPatch, EnterprisePatch, ImageRef, LinkPatch, ProductPatch, RelatedRef};
use crate::transport::http::handlers::{accounts, catalog, enterprises, health, products, reference, saves};
use crate::transport::http::types::{ApiResponse, EnabledRequest, NameRequest, StockRequest};
use axum::routing::{get, patch, post, put};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        accounts::create_account_handler,
        accounts::update_account_handler,
        accounts::delete_account_handler,
        accounts::add_role_handler,
        accounts::remove_role_handler,
        accounts::register_enterprise_account_handler,
        accounts::profile_handler,
        accounts::audit_history_handler,
        enterprises::create_enterprise_handler,
        enterprises::update_enterprise_handler,
        enterprises::set_enabled_handler,
        enterprises::delete_enterprise_handler,
        enterprises::add_link_handler,
        enterprises::update_link_handler,
        enterprises::remove_link_handler,
        products::create_product_handler,
        products::update_product_handler,
        products::update_stock_handler,
        products::delete_product_handler,
        products::add_image_handler,
        products::add_relation_handler,
        products::remove_relation_handler,
        catalog::catalog_all_handler,
        catalog::catalog_by_id_handler,
        catalog::catalog_by_category_handler,
        catalog::catalog_by_enterprise_handler,
        saves::list_saves_handler,
        saves::save_product_handler,
        saves::unsave_product_handler,
        reference::list_reference_handler,
        reference::create_reference_handler,
        reference::delete_reference_handler
    ),
    components(schemas(
        ApiResponse,
        CreateAccount,
        AccountPatch,
        RegisterEnterpriseAccount,
        CreateEnterprise,
        EnterprisePatch,
        NewExternalLink,
        LinkPatch,
        EnabledRequest,
        CreateProduct,
        ProductPatch,
        ImageInput,
        StockRequest,
        NameRequest,
        RelatedRef,
        ImageRef
    ))
)]
#[allow(dead_code)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        // accounts
        .route("/api/accounts", post(accounts::create_account_handler))
        .route(
            "/api/accounts/:id",
            patch(accounts::update_account_handler).delete(accounts::delete_account_handler),
        )
        .route(
            "/api/accounts/:id/roles/:role_id",
            post(accounts::add_role_handler).delete(accounts::remove_role_handler),
        )
        .route("/api/accounts/:id/saves", get(saves::list_saves_handler))
        .route(
            "/api/accounts/:id/saves/:product_id",
            post(saves::save_product_handler).delete(saves::unsave_product_handler),
        )
        .route(
            "/api/enterprise-accounts",
            post(accounts::register_enterprise_account_handler),
        )
        .route("/api/profile", get(accounts::profile_handler))
        .route("/api/audit/:kind/:id", get(accounts::audit_history_handler))
        // enterprises
        .route("/api/enterprises", post(enterprises::create_enterprise_handler))
        .route(
            "/api/enterprises/:id",
            patch(enterprises::update_enterprise_handler).delete(enterprises::delete_enterprise_handler),
        )
        .route("/api/enterprises/:id/enabled", put(enterprises::set_enabled_handler))
        .route("/api/enterprises/:id/links", post(enterprises::add_link_handler))
        .route(
            "/api/links/:id",
            patch(enterprises::update_link_handler).delete(enterprises::remove_link_handler),
        )
        // products
        .route("/api/products", post(products::create_product_handler))
        .route(
            "/api/products/:id",
            patch(products::update_product_handler).delete(products::delete_product_handler),
        )
        .route("/api/products/:id/stock", put(products::update_stock_handler))
        .route("/api/products/:id/images", post(products::add_image_handler))
        .route(
            "/api/products/:id/:relation/:target_id",
            post(products::add_relation_handler).delete(products::remove_relation_handler),
        )
        // catalog
        .route("/api/catalog", get(catalog::catalog_all_handler))
        .route("/api/catalog/products/:id", get(catalog::catalog_by_id_handler))
        .route("/api/catalog/categories/:id", get(catalog::catalog_by_category_handler))
        .route("/api/catalog/enterprises/:id", get(catalog::catalog_by_enterprise_handler))
        // reference data
        .route(
            "/api/reference/:kind",
            get(reference::list_reference_handler).post(reference::create_reference_handler),
        )
        .route("/api/reference/:kind/:id", axum::routing::delete(reference::delete_reference_handler))
        .with_state(app_state)
}

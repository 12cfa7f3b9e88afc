//! Shared setup for the integration tests.
//!
//! Tests need a PostgreSQL database named by `DATABASE_URL` (a `.env` file is
//! honored). When it is not set, each test prints a notice and returns early.
//! Every row a test creates carries a random suffix, so tests can share one
//! database and run in parallel.

#![allow(dead_code)]

use marketplace_ledger::app::{CreateAccount, CreateEnterprise, CreateProduct, ImageInput, NewExternalLink};
use marketplace_ledger::domain::snapshot::{AccountSnapshot, EnterpriseSnapshot, ProductSnapshot};
use marketplace_ledger::storage::schema;
use marketplace_ledger::{DeleteAuditPolicy, MarketplaceService, ReferenceKind};
use sqlx::postgres::PgPoolOptions;

pub async fn service_with(policy: DeleteAuditPolicy) -> Option<MarketplaceService> {
    dotenv::dotenv().ok();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to DATABASE_URL");
    schema::apply(&pool).await.expect("apply schema");
    Some(MarketplaceService::from_pool(pool, policy))
}

pub async fn service() -> Option<MarketplaceService> {
    service_with(DeleteAuditPolicy::Always).await
}

pub fn suffix() -> String {
    format!("{:016x}", rand::random::<u64>())
}

pub async fn account(svc: &MarketplaceService, role_ids: Vec<i32>) -> AccountSnapshot {
    let tag = suffix();
    svc.create_account(CreateAccount {
        username: format!("user-{}", tag),
        email: format!("user-{}@example.com", tag),
        password_hash: "$argon2id$placeholder".to_string(),
        phone: Some("+591 700 00000".to_string()),
        role_ids,
    })
    .await
    .expect("create account")
}

pub fn enterprise_input(owner: Option<i32>, links: usize) -> CreateEnterprise {
    let tag = suffix();
    CreateEnterprise {
        tax_id: format!("NIT-{}", tag),
        address: "Av. Siempre Viva 742".to_string(),
        description: Some("Spare parts".to_string()),
        representative_name: "Rosa Quispe".to_string(),
        representative_id_number: format!("CI-{}", tag),
        owner_account_id: owner,
        external_links: (0..links)
            .map(|i| NewExternalLink {
                name: format!("link-{}", i),
                url: format!("https://example.com/{}/{}", tag, i),
            })
            .collect(),
    }
}

pub async fn enterprise(svc: &MarketplaceService, owner: Option<i32>, links: usize) -> EnterpriseSnapshot {
    svc.create_enterprise(enterprise_input(owner, links))
        .await
        .expect("create enterprise")
}

pub async fn reference(svc: &MarketplaceService, kind: ReferenceKind) -> i32 {
    svc.create_reference(kind, &format!("{}-{}", kind, suffix()))
        .await
        .expect("create reference row")
        .id
}

/// Ids of one category, car model and brand.
pub struct Taxonomy {
    pub category: i32,
    pub car_model: i32,
    pub brand: i32,
}

pub async fn taxonomy(svc: &MarketplaceService) -> Taxonomy {
    Taxonomy {
        category: reference(svc, ReferenceKind::Category).await,
        car_model: reference(svc, ReferenceKind::CarModel).await,
        brand: reference(svc, ReferenceKind::Brand).await,
    }
}

/// A product that satisfies the catalog predicate.
pub async fn publishable_product(svc: &MarketplaceService, enterprise_id: i32, tax: &Taxonomy) -> ProductSnapshot {
    svc.create_product(CreateProduct {
        name: format!("brake pad {}", suffix()),
        enterprise_id,
        stock: 10,
        price: 45.5,
        category_ids: vec![tax.category],
        car_model_ids: vec![tax.car_model],
        brand_ids: vec![tax.brand],
        images: vec![ImageInput::upload(format!("https://cdn.example.com/{}.png", suffix()))],
    })
    .await
    .expect("create product")
}

pub async fn count(svc: &MarketplaceService, sql: &str, id: i32) -> i64 {
    sqlx::query_scalar(sql)
        .bind(id)
        .fetch_one(svc.pool())
        .await
        .expect("count query")
}

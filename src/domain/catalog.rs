//! Read side: products that meet the publishable predicate.
//!
//! A product is publishable when its enterprise exists, it has exactly one
//! image, and at least one category, one car model and one brand. Every view
//! returns the same [`CatalogItem`] shape, with the single image as an object.

use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::snapshot::{self, ProductPart, ProductSnapshot};
use crate::storage::entities::{
    self, AccountRecord, EnterpriseRecord, ExternalLink, ImageRef, ProductRecord, RelatedRef,
};
use serde::Serialize;
use sqlx::PgConnection;

/// SQL form of the predicate, over `products p`.
const PUBLISHABLE: &str = "EXISTS (SELECT 1 FROM enterprise_accounts e WHERE e.id = p.enterprise_id)
    AND (SELECT count(*) FROM product_images pi WHERE pi.product_id = p.id) = 1
    AND EXISTS (SELECT 1 FROM product_categories pc WHERE pc.product_id = p.id)
    AND EXISTS (SELECT 1 FROM product_car_models pm WHERE pm.product_id = p.id)
    AND EXISTS (SELECT 1 FROM product_brands pb WHERE pb.product_id = p.id)";

#[derive(Debug, Clone, Serialize)]
pub struct CatalogItem {
    pub product: ProductRecord,
    pub enterprise: EnterpriseRecord,
    pub image: ImageRef,
    pub categories: Vec<RelatedRef>,
    pub car_models: Vec<RelatedRef>,
    pub brands: Vec<RelatedRef>,
}

impl CatalogItem {
    /// Applies the predicate to a full product snapshot; `None` when the
    /// product is not publishable or a relation was not loaded.
    pub fn from_snapshot(snapshot: ProductSnapshot) -> Option<CatalogItem> {
        let ProductSnapshot {
            product,
            categories,
            car_models,
            brands,
            images,
            enterprise,
        } = snapshot;

        let mut images = images?;
        if images.len() != 1 {
            return None;
        }
        let categories = categories.filter(|c| !c.is_empty())?;
        let car_models = car_models.filter(|c| !c.is_empty())?;
        let brands = brands.filter(|b| !b.is_empty())?;

        Some(CatalogItem {
            product,
            enterprise: enterprise?,
            image: images.remove(0),
            categories,
            car_models,
            brands,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnterpriseCatalog {
    pub owner: Option<AccountRecord>,
    pub enterprise: EnterpriseRecord,
    pub external_links: Vec<ExternalLink>,
    pub products: Vec<CatalogItem>,
}

async fn items(conn: &mut PgConnection, ids: Vec<i32>) -> LedgerResult<Vec<CatalogItem>> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let full = snapshot::product_snapshot(conn, id, ProductPart::ALL).await?;
        if let Some(item) = CatalogItem::from_snapshot(full) {
            out.push(item);
        }
    }
    Ok(out)
}

pub async fn catalog_all(conn: &mut PgConnection) -> LedgerResult<Vec<CatalogItem>> {
    let sql = format!("SELECT p.id FROM products p WHERE {PUBLISHABLE} ORDER BY p.id");
    let ids: Vec<i32> = sqlx::query_scalar(&sql).fetch_all(&mut *conn).await?;
    items(conn, ids).await
}

pub async fn catalog_by_category(
    conn: &mut PgConnection,
    category_id: i32,
) -> LedgerResult<Vec<CatalogItem>> {
    let sql = format!(
        "SELECT p.id FROM products p
         WHERE {PUBLISHABLE}
           AND EXISTS (SELECT 1 FROM product_categories c
                       WHERE c.product_id = p.id AND c.category_id = $1)
         ORDER BY p.id"
    );
    let ids: Vec<i32> = sqlx::query_scalar(&sql)
        .bind(category_id)
        .fetch_all(&mut *conn)
        .await?;
    items(conn, ids).await
}

/// First `limit` publishable products of a category, by id.
pub async fn catalog_n_by_category(
    conn: &mut PgConnection,
    category_id: i32,
    limit: i64,
) -> LedgerResult<Vec<CatalogItem>> {
    if limit < 0 {
        return Err(LedgerError::Validation("limit must not be negative".to_string()));
    }
    let sql = format!(
        "SELECT p.id FROM products p
         WHERE {PUBLISHABLE}
           AND EXISTS (SELECT 1 FROM product_categories c
                       WHERE c.product_id = p.id AND c.category_id = $1)
         ORDER BY p.id
         LIMIT $2"
    );
    let ids: Vec<i32> = sqlx::query_scalar(&sql)
        .bind(category_id)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;
    items(conn, ids).await
}

/// `None` when the product does not exist or is not publishable.
pub async fn catalog_by_id(
    conn: &mut PgConnection,
    product_id: i32,
) -> LedgerResult<Option<CatalogItem>> {
    match snapshot::product_snapshot(conn, product_id, ProductPart::ALL).await {
        Ok(full) => Ok(CatalogItem::from_snapshot(full)),
        Err(LedgerError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

pub async fn catalog_by_enterprise(
    conn: &mut PgConnection,
    enterprise_id: i32,
) -> LedgerResult<EnterpriseCatalog> {
    let enterprise = entities::find_enterprise(conn, enterprise_id)
        .await?
        .ok_or_else(|| LedgerError::not_found("enterprise", enterprise_id))?;
    let owner = match enterprise.account_id {
        Some(account_id) => entities::find_account(conn, account_id).await?,
        None => None,
    };
    let external_links = entities::links_of(conn, enterprise_id).await?;

    let sql = format!(
        "SELECT p.id FROM products p
         WHERE p.enterprise_id = $1 AND {PUBLISHABLE}
         ORDER BY p.id"
    );
    let ids: Vec<i32> = sqlx::query_scalar(&sql)
        .bind(enterprise_id)
        .fetch_all(&mut *conn)
        .await?;
    let products = items(conn, ids).await?;

    Ok(EnterpriseCatalog {
        owner,
        enterprise,
        external_links,
        products,
    })
}

//! Point-in-time views of one entity plus a chosen subset of its relations.
//!
//! A relation that was asked for is always present as an array (possibly
//! empty); a relation that was not asked for is omitted from the JSON.
//! Collections are ordered by id.

use crate::domain::error::{LedgerError, LedgerResult};
use crate::storage::entities::{
    self, AccountRecord, EnterpriseRecord, ExternalLink, ImageRef, ProductRecord, RelatedRef,
};
use crate::storage::relations::Relation;
use serde::Serialize;
use sqlx::PgConnection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountPart {
    Roles,
    Enterprise,
    SavedProducts,
}

impl AccountPart {
    pub const ALL: &'static [AccountPart] =
        &[AccountPart::Roles, AccountPart::Enterprise, AccountPart::SavedProducts];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterprisePart {
    ExternalLinks,
    Products,
    Owner,
}

impl EnterprisePart {
    pub const ALL: &'static [EnterprisePart] = &[
        EnterprisePart::ExternalLinks,
        EnterprisePart::Products,
        EnterprisePart::Owner,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductPart {
    Categories,
    CarModels,
    Brands,
    Images,
    Enterprise,
}

impl ProductPart {
    pub const ALL: &'static [ProductPart] = &[
        ProductPart::Categories,
        ProductPart::CarModels,
        ProductPart::Brands,
        ProductPart::Images,
        ProductPart::Enterprise,
    ];

    /// The part that shows the given product relation.
    pub fn for_relation(rel: Relation) -> Option<ProductPart> {
        match rel {
            Relation::ProductCategory => Some(ProductPart::Categories),
            Relation::ProductCarModel => Some(ProductPart::CarModels),
            Relation::ProductBrand => Some(ProductPart::Brands),
            Relation::ProductImage => Some(ProductPart::Images),
            Relation::AccountRole | Relation::AccountSave => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountSnapshot {
    pub account: AccountRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<RelatedRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise: Option<EnterpriseRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_products: Option<Vec<RelatedRef>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnterpriseSnapshot {
    pub enterprise: EnterpriseRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_links: Option<Vec<ExternalLink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<RelatedRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<AccountRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductSnapshot {
    pub product: ProductRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<RelatedRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_models: Option<Vec<RelatedRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brands: Option<Vec<RelatedRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise: Option<EnterpriseRecord>,
}

impl ProductSnapshot {
    /// Bare product with every relation unrequested.
    pub fn bare(product: ProductRecord) -> Self {
        Self {
            product,
            categories: None,
            car_models: None,
            brands: None,
            images: None,
            enterprise: None,
        }
    }
}

/// Payload of the save log: the account and the product it saved.
#[derive(Debug, Clone, Serialize)]
pub struct SaveSnapshot {
    pub account: AccountRecord,
    pub product: ProductRecord,
}

/// `{id, name}` entries of a named relation (roles, categories, car models,
/// brands, saved products), joined through `rel` for `owner`.
pub async fn related(conn: &mut PgConnection, rel: Relation, owner: i32) -> LedgerResult<Vec<RelatedRef>> {
    let sql = format!(
        "SELECT t.id, t.name FROM {target} t
         JOIN {join} j ON j.{target_col} = t.id
         WHERE j.{owner_col} = $1
         ORDER BY t.id",
        target = rel.target().table_name(),
        join = rel.table_name(),
        target_col = rel.target_column(),
        owner_col = rel.owner_column(),
    );
    Ok(sqlx::query_as::<_, RelatedRef>(&sql)
        .bind(owner)
        .fetch_all(&mut *conn)
        .await?)
}

pub async fn images_of(conn: &mut PgConnection, product_id: i32) -> LedgerResult<Vec<ImageRef>> {
    Ok(sqlx::query_as::<_, ImageRef>(
        "SELECT i.id, i.url FROM images i
         JOIN product_images pi ON pi.image_id = i.id
         WHERE pi.product_id = $1
         ORDER BY i.id",
    )
    .bind(product_id)
    .fetch_all(&mut *conn)
    .await?)
}

async fn products_named_by_enterprise(
    conn: &mut PgConnection,
    enterprise_id: i32,
) -> LedgerResult<Vec<RelatedRef>> {
    Ok(sqlx::query_as::<_, RelatedRef>(
        "SELECT id, name FROM products WHERE enterprise_id = $1 ORDER BY id",
    )
    .bind(enterprise_id)
    .fetch_all(&mut *conn)
    .await?)
}

pub async fn account_snapshot(
    conn: &mut PgConnection,
    account_id: i32,
    parts: &[AccountPart],
) -> LedgerResult<AccountSnapshot> {
    let account = entities::find_account(conn, account_id)
        .await?
        .ok_or_else(|| LedgerError::not_found("account", account_id))?;

    let mut snapshot = AccountSnapshot {
        account,
        roles: None,
        enterprise: None,
        saved_products: None,
    };
    for part in parts {
        match part {
            AccountPart::Roles => {
                snapshot.roles = Some(related(conn, Relation::AccountRole, account_id).await?);
            }
            AccountPart::Enterprise => {
                snapshot.enterprise = entities::find_enterprise_by_owner(conn, account_id).await?;
            }
            AccountPart::SavedProducts => {
                snapshot.saved_products =
                    Some(related(conn, Relation::AccountSave, account_id).await?);
            }
        }
    }
    Ok(snapshot)
}

pub async fn enterprise_snapshot(
    conn: &mut PgConnection,
    enterprise_id: i32,
    parts: &[EnterprisePart],
) -> LedgerResult<EnterpriseSnapshot> {
    let enterprise = entities::find_enterprise(conn, enterprise_id)
        .await?
        .ok_or_else(|| LedgerError::not_found("enterprise", enterprise_id))?;

    let owner_id = enterprise.account_id;
    let mut snapshot = EnterpriseSnapshot {
        enterprise,
        external_links: None,
        products: None,
        owner: None,
    };
    for part in parts {
        match part {
            EnterprisePart::ExternalLinks => {
                snapshot.external_links = Some(entities::links_of(conn, enterprise_id).await?);
            }
            EnterprisePart::Products => {
                snapshot.products = Some(products_named_by_enterprise(conn, enterprise_id).await?);
            }
            EnterprisePart::Owner => {
                if let Some(owner_id) = owner_id {
                    snapshot.owner = entities::find_account(conn, owner_id).await?;
                }
            }
        }
    }
    Ok(snapshot)
}

pub async fn product_snapshot(
    conn: &mut PgConnection,
    product_id: i32,
    parts: &[ProductPart],
) -> LedgerResult<ProductSnapshot> {
    let product = entities::find_product(conn, product_id)
        .await?
        .ok_or_else(|| LedgerError::not_found("product", product_id))?;

    let enterprise_id = product.enterprise_id;
    let mut snapshot = ProductSnapshot::bare(product);
    for part in parts {
        match part {
            ProductPart::Categories => {
                snapshot.categories =
                    Some(related(conn, Relation::ProductCategory, product_id).await?);
            }
            ProductPart::CarModels => {
                snapshot.car_models =
                    Some(related(conn, Relation::ProductCarModel, product_id).await?);
            }
            ProductPart::Brands => {
                snapshot.brands = Some(related(conn, Relation::ProductBrand, product_id).await?);
            }
            ProductPart::Images => {
                snapshot.images = Some(images_of(conn, product_id).await?);
            }
            ProductPart::Enterprise => {
                snapshot.enterprise = entities::find_enterprise(conn, enterprise_id).await?;
            }
        }
    }
    Ok(snapshot)
}

pub async fn save_snapshot(
    conn: &mut PgConnection,
    account_id: i32,
    product_id: i32,
) -> LedgerResult<SaveSnapshot> {
    let account = entities::find_account(conn, account_id)
        .await?
        .ok_or_else(|| LedgerError::not_found("account", account_id))?;
    let product = entities::find_product(conn, product_id)
        .await?
        .ok_or_else(|| LedgerError::not_found("product", product_id))?;
    Ok(SaveSnapshot { account, product })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{TimeZone, Utc};

    pub fn product(id: i32, enterprise_id: i32) -> ProductRecord {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ProductRecord {
            id,
            name: format!("product-{}", id),
            stock: 3,
            price: 19.5,
            enterprise_id,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn enterprise(id: i32) -> EnterpriseRecord {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        EnterpriseRecord {
            id,
            tax_id: format!("TAX-{}", id),
            address: "Main street 1".to_string(),
            description: None,
            representative_name: "Rep".to_string(),
            representative_id_number: "ID-1".to_string(),
            enabled: true,
            account_id: None,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn named(id: i32, name: &str) -> RelatedRef {
        RelatedRef {
            id,
            name: name.to_string(),
        }
    }
}

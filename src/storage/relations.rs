//! Idempotent maintenance of the many-to-many join tables.
//!
//! `add` never fails on an existing pair; `remove` fails with `NotFound` when
//! the pair is absent, and does so before the caller has written anything to
//! the audit log.

use crate::domain::error::{LedgerError, LedgerResult};
use crate::storage::entities::EntityTable;
use sqlx::PgConnection;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    AccountRole,
    AccountSave,
    ProductCategory,
    ProductCarModel,
    ProductBrand,
    ProductImage,
}

impl Relation {
    pub fn table_name(self) -> &'static str {
        match self {
            Relation::AccountRole => "account_roles",
            Relation::AccountSave => "account_saves",
            Relation::ProductCategory => "product_categories",
            Relation::ProductCarModel => "product_car_models",
            Relation::ProductBrand => "product_brands",
            Relation::ProductImage => "product_images",
        }
    }

    pub fn owner_column(self) -> &'static str {
        match self {
            Relation::AccountRole | Relation::AccountSave => "account_id",
            _ => "product_id",
        }
    }

    pub fn target_column(self) -> &'static str {
        match self {
            Relation::AccountRole => "role_id",
            Relation::AccountSave => "product_id",
            Relation::ProductCategory => "category_id",
            Relation::ProductCarModel => "car_model_id",
            Relation::ProductBrand => "brand_id",
            Relation::ProductImage => "image_id",
        }
    }

    pub fn owner(self) -> EntityTable {
        match self {
            Relation::AccountRole | Relation::AccountSave => EntityTable::Accounts,
            _ => EntityTable::Products,
        }
    }

    pub fn target(self) -> EntityTable {
        match self {
            Relation::AccountRole => EntityTable::Roles,
            Relation::AccountSave => EntityTable::Products,
            Relation::ProductCategory => EntityTable::Categories,
            Relation::ProductCarModel => EntityTable::CarModels,
            Relation::ProductBrand => EntityTable::Brands,
            Relation::ProductImage => EntityTable::Images,
        }
    }

    /// Join tables whose rows die with the product that owns them.
    pub const PRODUCT_RELATIONS: [Relation; 4] = [
        Relation::ProductCategory,
        Relation::ProductCarModel,
        Relation::ProductBrand,
        Relation::ProductImage,
    ];
}

/// Inserts the pair; returns `false` when it was already present.
pub async fn add(conn: &mut PgConnection, rel: Relation, owner: i32, target: i32) -> LedgerResult<bool> {
    let sql = format!(
        "INSERT INTO {} ({}, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        rel.table_name(),
        rel.owner_column(),
        rel.target_column()
    );
    let done = sqlx::query(&sql)
        .bind(owner)
        .bind(target)
        .execute(&mut *conn)
        .await?;
    let inserted = done.rows_affected() == 1;
    if !inserted {
        debug!(relation = rel.table_name(), owner, target, "relation already present");
    }
    Ok(inserted)
}

/// Deletes exactly the pair; `NotFound` if nothing was deleted.
pub async fn remove(conn: &mut PgConnection, rel: Relation, owner: i32, target: i32) -> LedgerResult<()> {
    let sql = format!(
        "DELETE FROM {} WHERE {} = $1 AND {} = $2",
        rel.table_name(),
        rel.owner_column(),
        rel.target_column()
    );
    let done = sqlx::query(&sql)
        .bind(owner)
        .bind(target)
        .execute(&mut *conn)
        .await?;
    if done.rows_affected() == 0 {
        return Err(LedgerError::NotFound(format!(
            "{} {} is not linked to {} {}",
            rel.owner().label(),
            owner,
            rel.target().label(),
            target
        )));
    }
    Ok(())
}

/// Links only the ids that reference an existing target row; unknown ids are
/// dropped. Returns the number of pairs inserted.
pub async fn attach_existing(
    conn: &mut PgConnection,
    rel: Relation,
    owner: i32,
    targets: &[i32],
) -> LedgerResult<u64> {
    if targets.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "INSERT INTO {table} ({owner_col}, {target_col})
         SELECT $1, t.id FROM {target_table} t WHERE t.id = ANY($2)
         ON CONFLICT DO NOTHING",
        table = rel.table_name(),
        owner_col = rel.owner_column(),
        target_col = rel.target_column(),
        target_table = rel.target().table_name(),
    );
    let done = sqlx::query(&sql)
        .bind(owner)
        .bind(targets)
        .execute(&mut *conn)
        .await?;
    Ok(done.rows_affected())
}

/// Target ids linked to `owner`, ascending.
pub async fn targets(conn: &mut PgConnection, rel: Relation, owner: i32) -> LedgerResult<Vec<i32>> {
    let sql = format!(
        "SELECT {target} FROM {table} WHERE {owner_col} = $1 ORDER BY {target}",
        target = rel.target_column(),
        table = rel.table_name(),
        owner_col = rel.owner_column(),
    );
    Ok(sqlx::query_scalar(&sql).bind(owner).fetch_all(&mut *conn).await?)
}

/// Owner ids linked to `target`, ascending.
pub async fn owners(conn: &mut PgConnection, rel: Relation, target: i32) -> LedgerResult<Vec<i32>> {
    let sql = format!(
        "SELECT {owner_col} FROM {table} WHERE {target} = $1 ORDER BY {owner_col}",
        owner_col = rel.owner_column(),
        table = rel.table_name(),
        target = rel.target_column(),
    );
    Ok(sqlx::query_scalar(&sql).bind(target).fetch_all(&mut *conn).await?)
}

/// Removes every pair owned by `owner`.
pub async fn clear_owner(conn: &mut PgConnection, rel: Relation, owner: i32) -> LedgerResult<u64> {
    let sql = format!(
        "DELETE FROM {} WHERE {} = $1",
        rel.table_name(),
        rel.owner_column()
    );
    let done = sqlx::query(&sql).bind(owner).execute(&mut *conn).await?;
    Ok(done.rows_affected())
}

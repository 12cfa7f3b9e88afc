//! Row-level CRUD for the marketplace entities.
//!
//! Every function runs on a caller-supplied connection so that the service
//! layer can compose them inside a single transaction. Updates use merge
//! semantics: a `None` field in a patch keeps the stored value.

use crate::domain::error::{LedgerError, LedgerResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use utoipa::ToSchema;

/// Tables whose rows can be referenced by id from other rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityTable {
    Accounts,
    Roles,
    Enterprises,
    ExternalLinks,
    Products,
    Categories,
    CarModels,
    Brands,
    Images,
}

impl EntityTable {
    pub fn table_name(self) -> &'static str {
        match self {
            EntityTable::Accounts => "accounts",
            EntityTable::Roles => "roles",
            EntityTable::Enterprises => "enterprise_accounts",
            EntityTable::ExternalLinks => "external_links",
            EntityTable::Products => "products",
            EntityTable::Categories => "categories",
            EntityTable::CarModels => "car_models",
            EntityTable::Brands => "brands",
            EntityTable::Images => "images",
        }
    }

    /// Singular noun used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            EntityTable::Accounts => "account",
            EntityTable::Roles => "role",
            EntityTable::Enterprises => "enterprise",
            EntityTable::ExternalLinks => "external link",
            EntityTable::Products => "product",
            EntityTable::Categories => "category",
            EntityTable::CarModels => "car model",
            EntityTable::Brands => "brand",
            EntityTable::Images => "image",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AccountRecord {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EnterpriseRecord {
    pub id: i32,
    pub tax_id: String,
    pub address: String,
    pub description: Option<String>,
    pub representative_name: String,
    pub representative_id_number: String,
    pub enabled: bool,
    pub account_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductRecord {
    pub id: i32,
    pub name: String,
    pub stock: i32,
    pub price: f64,
    pub enterprise_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ExternalLink {
    pub id: i32,
    pub name: String,
    pub url: String,
    pub enterprise_id: i32,
}

/// `{id, name}` entry for roles, categories, car models, brands and products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct RelatedRef {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct ImageRef {
    pub id: i32,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AccountPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EnterprisePatch {
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub representative_name: Option<String>,
    pub representative_id_number: Option<String>,
    pub enabled: Option<bool>,
    pub owner_account_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub stock: Option<i32>,
    pub price: Option<f64>,
    pub enterprise_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LinkPatch {
    pub name: Option<String>,
    pub url: Option<String>,
}

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, phone, created_at, updated_at";
const ENTERPRISE_COLUMNS: &str = "id, tax_id, address, description, representative_name, \
     representative_id_number, enabled, account_id, created_at, updated_at";
const PRODUCT_COLUMNS: &str =
    "id, name, stock, price::float8 AS price, enterprise_id, created_at, updated_at";
const LINK_COLUMNS: &str = "id, name, url, enterprise_id";

// ---------------------------------------------------------------------------
// Existence checks
// ---------------------------------------------------------------------------

pub async fn exists(conn: &mut PgConnection, table: EntityTable, id: i32) -> LedgerResult<bool> {
    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)",
        table.table_name()
    );
    let found: bool = sqlx::query_scalar(&sql).bind(id).fetch_one(&mut *conn).await?;
    Ok(found)
}

/// Fails with `NotFound` unless the row exists.
pub async fn require(conn: &mut PgConnection, table: EntityTable, id: i32) -> LedgerResult<()> {
    if exists(conn, table, id).await? {
        Ok(())
    } else {
        Err(LedgerError::not_found(table.label(), id))
    }
}

/// Takes a `FOR UPDATE` lock on the row until the transaction ends.
///
/// Inserts that reference the row through a foreign key wait for the lock,
/// so nothing can be attached to it between the caller's snapshot and its
/// deletion.
pub async fn lock_row(conn: &mut PgConnection, table: EntityTable, id: i32) -> LedgerResult<()> {
    let sql = format!("SELECT id FROM {} WHERE id = $1 FOR UPDATE", table.table_name());
    let locked: Option<i32> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match locked {
        Some(_) => Ok(()),
        None => Err(LedgerError::not_found(table.label(), id)),
    }
}

/// Fails with `NotFound` naming every id that has no row.
pub async fn require_all(
    conn: &mut PgConnection,
    table: EntityTable,
    ids: &[i32],
) -> LedgerResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let sql = format!("SELECT id FROM {} WHERE id = ANY($1)", table.table_name());
    let found: Vec<i32> = sqlx::query_scalar(&sql)
        .bind(ids)
        .fetch_all(&mut *conn)
        .await?;

    let mut missing: Vec<i32> = ids.iter().copied().filter(|id| !found.contains(id)).collect();
    if missing.is_empty() {
        return Ok(());
    }
    missing.sort_unstable();
    missing.dedup();
    let list = missing
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(LedgerError::NotFound(format!(
        "{} id(s) {} do not exist",
        table.label(),
        list
    )))
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

pub async fn insert_account(
    conn: &mut PgConnection,
    username: &str,
    email: &str,
    password_hash: &str,
    phone: Option<&str>,
) -> LedgerResult<AccountRecord> {
    let sql = format!(
        "INSERT INTO accounts (username, email, password_hash, phone)
         VALUES ($1, $2, $3, $4)
         RETURNING {ACCOUNT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, AccountRecord>(&sql)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(phone)
        .fetch_one(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn find_account(conn: &mut PgConnection, id: i32) -> LedgerResult<Option<AccountRecord>> {
    let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
    Ok(sqlx::query_as::<_, AccountRecord>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?)
}

pub async fn find_account_by_email(
    conn: &mut PgConnection,
    email: &str,
) -> LedgerResult<Option<AccountRecord>> {
    let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
    Ok(sqlx::query_as::<_, AccountRecord>(&sql)
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?)
}

pub async fn update_account(
    conn: &mut PgConnection,
    id: i32,
    patch: &AccountPatch,
) -> LedgerResult<Option<AccountRecord>> {
    let sql = format!(
        "UPDATE accounts SET
            username = COALESCE($2, username),
            email = COALESCE($3, email),
            password_hash = COALESCE($4, password_hash),
            phone = COALESCE($5, phone),
            updated_at = now()
         WHERE id = $1
         RETURNING {ACCOUNT_COLUMNS}"
    );
    Ok(sqlx::query_as::<_, AccountRecord>(&sql)
        .bind(id)
        .bind(patch.username.as_deref())
        .bind(patch.email.as_deref())
        .bind(patch.password_hash.as_deref())
        .bind(patch.phone.as_deref())
        .fetch_optional(&mut *conn)
        .await?)
}

pub async fn delete_account_row(conn: &mut PgConnection, id: i32) -> LedgerResult<()> {
    sqlx::query("DELETE FROM accounts WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Enterprises and external links
// ---------------------------------------------------------------------------

pub async fn insert_enterprise(
    conn: &mut PgConnection,
    tax_id: &str,
    address: &str,
    description: Option<&str>,
    representative_name: &str,
    representative_id_number: &str,
    owner_account_id: Option<i32>,
) -> LedgerResult<EnterpriseRecord> {
    let sql = format!(
        "INSERT INTO enterprise_accounts
            (tax_id, address, description, representative_name, representative_id_number, account_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {ENTERPRISE_COLUMNS}"
    );
    Ok(sqlx::query_as::<_, EnterpriseRecord>(&sql)
        .bind(tax_id)
        .bind(address)
        .bind(description)
        .bind(representative_name)
        .bind(representative_id_number)
        .bind(owner_account_id)
        .fetch_one(&mut *conn)
        .await?)
}

pub async fn find_enterprise(
    conn: &mut PgConnection,
    id: i32,
) -> LedgerResult<Option<EnterpriseRecord>> {
    let sql = format!("SELECT {ENTERPRISE_COLUMNS} FROM enterprise_accounts WHERE id = $1");
    Ok(sqlx::query_as::<_, EnterpriseRecord>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?)
}

pub async fn find_enterprise_by_owner(
    conn: &mut PgConnection,
    account_id: i32,
) -> LedgerResult<Option<EnterpriseRecord>> {
    let sql = format!("SELECT {ENTERPRISE_COLUMNS} FROM enterprise_accounts WHERE account_id = $1");
    Ok(sqlx::query_as::<_, EnterpriseRecord>(&sql)
        .bind(account_id)
        .fetch_optional(&mut *conn)
        .await?)
}

pub async fn update_enterprise(
    conn: &mut PgConnection,
    id: i32,
    patch: &EnterprisePatch,
) -> LedgerResult<Option<EnterpriseRecord>> {
    let sql = format!(
        "UPDATE enterprise_accounts SET
            tax_id = COALESCE($2, tax_id),
            address = COALESCE($3, address),
            description = COALESCE($4, description),
            representative_name = COALESCE($5, representative_name),
            representative_id_number = COALESCE($6, representative_id_number),
            enabled = COALESCE($7, enabled),
            account_id = COALESCE($8, account_id),
            updated_at = now()
         WHERE id = $1
         RETURNING {ENTERPRISE_COLUMNS}"
    );
    Ok(sqlx::query_as::<_, EnterpriseRecord>(&sql)
        .bind(id)
        .bind(patch.tax_id.as_deref())
        .bind(patch.address.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.representative_name.as_deref())
        .bind(patch.representative_id_number.as_deref())
        .bind(patch.enabled)
        .bind(patch.owner_account_id)
        .fetch_optional(&mut *conn)
        .await?)
}

pub async fn delete_enterprise_row(conn: &mut PgConnection, id: i32) -> LedgerResult<()> {
    sqlx::query("DELETE FROM enterprise_accounts WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn insert_link(
    conn: &mut PgConnection,
    enterprise_id: i32,
    name: &str,
    url: &str,
) -> LedgerResult<ExternalLink> {
    let sql = format!(
        "INSERT INTO external_links (name, url, enterprise_id)
         VALUES ($1, $2, $3)
         RETURNING {LINK_COLUMNS}"
    );
    Ok(sqlx::query_as::<_, ExternalLink>(&sql)
        .bind(name)
        .bind(url)
        .bind(enterprise_id)
        .fetch_one(&mut *conn)
        .await?)
}

pub async fn find_link(conn: &mut PgConnection, id: i32) -> LedgerResult<Option<ExternalLink>> {
    let sql = format!("SELECT {LINK_COLUMNS} FROM external_links WHERE id = $1");
    Ok(sqlx::query_as::<_, ExternalLink>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?)
}

/// Links of one enterprise, ordered by id.
pub async fn links_of(conn: &mut PgConnection, enterprise_id: i32) -> LedgerResult<Vec<ExternalLink>> {
    let sql = format!(
        "SELECT {LINK_COLUMNS} FROM external_links WHERE enterprise_id = $1 ORDER BY id"
    );
    Ok(sqlx::query_as::<_, ExternalLink>(&sql)
        .bind(enterprise_id)
        .fetch_all(&mut *conn)
        .await?)
}

pub async fn update_link(
    conn: &mut PgConnection,
    id: i32,
    patch: &LinkPatch,
) -> LedgerResult<Option<ExternalLink>> {
    let sql = format!(
        "UPDATE external_links SET
            name = COALESCE($2, name),
            url = COALESCE($3, url),
            updated_at = now()
         WHERE id = $1
         RETURNING {LINK_COLUMNS}"
    );
    Ok(sqlx::query_as::<_, ExternalLink>(&sql)
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.url.as_deref())
        .fetch_optional(&mut *conn)
        .await?)
}

pub async fn delete_link(conn: &mut PgConnection, id: i32) -> LedgerResult<()> {
    sqlx::query("DELETE FROM external_links WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn delete_links_of(conn: &mut PgConnection, enterprise_id: i32) -> LedgerResult<u64> {
    let done = sqlx::query("DELETE FROM external_links WHERE enterprise_id = $1")
        .bind(enterprise_id)
        .execute(&mut *conn)
        .await?;
    Ok(done.rows_affected())
}

// ---------------------------------------------------------------------------
// Products and images
// ---------------------------------------------------------------------------

pub async fn insert_product(
    conn: &mut PgConnection,
    name: &str,
    enterprise_id: i32,
    stock: i32,
    price: f64,
) -> LedgerResult<ProductRecord> {
    let sql = format!(
        "INSERT INTO products (name, enterprise_id, stock, price)
         VALUES ($1, $2, $3, $4::numeric)
         RETURNING {PRODUCT_COLUMNS}"
    );
    Ok(sqlx::query_as::<_, ProductRecord>(&sql)
        .bind(name)
        .bind(enterprise_id)
        .bind(stock)
        .bind(price)
        .fetch_one(&mut *conn)
        .await?)
}

pub async fn find_product(conn: &mut PgConnection, id: i32) -> LedgerResult<Option<ProductRecord>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
    Ok(sqlx::query_as::<_, ProductRecord>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?)
}

pub async fn update_product(
    conn: &mut PgConnection,
    id: i32,
    patch: &ProductPatch,
) -> LedgerResult<Option<ProductRecord>> {
    let sql = format!(
        "UPDATE products SET
            name = COALESCE($2, name),
            stock = COALESCE($3, stock),
            price = COALESCE($4::numeric, price),
            enterprise_id = COALESCE($5, enterprise_id),
            updated_at = now()
         WHERE id = $1
         RETURNING {PRODUCT_COLUMNS}"
    );
    Ok(sqlx::query_as::<_, ProductRecord>(&sql)
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.stock)
        .bind(patch.price)
        .bind(patch.enterprise_id)
        .fetch_optional(&mut *conn)
        .await?)
}

pub async fn product_ids_of_enterprise(
    conn: &mut PgConnection,
    enterprise_id: i32,
) -> LedgerResult<Vec<i32>> {
    Ok(
        sqlx::query_scalar("SELECT id FROM products WHERE enterprise_id = $1 ORDER BY id")
            .bind(enterprise_id)
            .fetch_all(&mut *conn)
            .await?,
    )
}

/// Products saved by one account, ordered by product id.
pub async fn saved_products_of(
    conn: &mut PgConnection,
    account_id: i32,
) -> LedgerResult<Vec<ProductRecord>> {
    Ok(sqlx::query_as::<_, ProductRecord>(
        "SELECT p.id, p.name, p.stock, p.price::float8 AS price, p.enterprise_id,
                p.created_at, p.updated_at
         FROM products p
         JOIN account_saves s ON s.product_id = p.id
         WHERE s.account_id = $1
         ORDER BY p.id",
    )
    .bind(account_id)
    .fetch_all(&mut *conn)
    .await?)
}

pub async fn delete_product_row(conn: &mut PgConnection, id: i32) -> LedgerResult<()> {
    sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn insert_image(conn: &mut PgConnection, url: &str) -> LedgerResult<ImageRef> {
    Ok(
        sqlx::query_as::<_, ImageRef>("INSERT INTO images (url) VALUES ($1) RETURNING id, url")
            .bind(url)
            .fetch_one(&mut *conn)
            .await?,
    )
}

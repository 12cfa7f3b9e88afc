//! Relational layout: one table per entity, one join table per relation and
//! one append-only log table per audited kind.
//!
//! Owner foreign keys carry no `ON DELETE` action, so a parent row can only
//! disappear after the cascade routine has removed (and logged) its children.
//! Reference-side keys (roles, categories, car models, brands, images) cascade
//! into the join tables.

use sqlx::PgPool;
use tracing::info;

/// Serializes concurrent schema application (parallel tests, multiple servers).
const SCHEMA_LOCK_ID: i64 = 4_240_017;

pub const LOG_TABLES: &[&str] = &["account_log", "enterprise_log", "product_log", "account_save_log"];

const TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS roles (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS accounts (
        id SERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        phone TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS account_roles (
        account_id INTEGER NOT NULL REFERENCES accounts(id),
        role_id INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
        PRIMARY KEY (account_id, role_id)
    )",
    "CREATE TABLE IF NOT EXISTS enterprise_accounts (
        id SERIAL PRIMARY KEY,
        tax_id TEXT NOT NULL UNIQUE,
        address TEXT NOT NULL,
        description TEXT,
        representative_name TEXT NOT NULL,
        representative_id_number TEXT NOT NULL,
        enabled BOOLEAN NOT NULL DEFAULT false,
        account_id INTEGER UNIQUE REFERENCES accounts(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS external_links (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        url TEXT NOT NULL,
        enterprise_id INTEGER NOT NULL REFERENCES enterprise_accounts(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS products (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        stock INTEGER NOT NULL DEFAULT 0,
        price NUMERIC(12, 2) NOT NULL DEFAULT 0,
        enterprise_id INTEGER NOT NULL REFERENCES enterprise_accounts(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS categories (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS car_models (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS brands (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS images (
        id SERIAL PRIMARY KEY,
        url TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS product_categories (
        product_id INTEGER NOT NULL REFERENCES products(id),
        category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
        PRIMARY KEY (product_id, category_id)
    )",
    "CREATE TABLE IF NOT EXISTS product_car_models (
        product_id INTEGER NOT NULL REFERENCES products(id),
        car_model_id INTEGER NOT NULL REFERENCES car_models(id) ON DELETE CASCADE,
        PRIMARY KEY (product_id, car_model_id)
    )",
    "CREATE TABLE IF NOT EXISTS product_brands (
        product_id INTEGER NOT NULL REFERENCES products(id),
        brand_id INTEGER NOT NULL REFERENCES brands(id) ON DELETE CASCADE,
        PRIMARY KEY (product_id, brand_id)
    )",
    "CREATE TABLE IF NOT EXISTS product_images (
        product_id INTEGER NOT NULL REFERENCES products(id),
        image_id INTEGER NOT NULL REFERENCES images(id) ON DELETE CASCADE,
        PRIMARY KEY (product_id, image_id)
    )",
    "CREATE TABLE IF NOT EXISTS account_saves (
        account_id INTEGER NOT NULL REFERENCES accounts(id),
        product_id INTEGER NOT NULL REFERENCES products(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (account_id, product_id)
    )",
];

const APPEND_ONLY_FN: &str = "CREATE OR REPLACE FUNCTION reject_audit_mutation() RETURNS trigger AS $$
BEGIN
    RAISE EXCEPTION 'audit log % is append-only', TG_TABLE_NAME;
END;
$$ LANGUAGE plpgsql";

/// Creates every table, log table and append-only trigger if missing.
pub async fn apply(pool: &PgPool) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_ID)
        .execute(&mut *tx)
        .await?;

    for ddl in TABLES {
        sqlx::query(ddl).execute(&mut *tx).await?;
    }

    sqlx::query(APPEND_ONLY_FN).execute(&mut *tx).await?;

    for table in LOG_TABLES {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id BIGSERIAL PRIMARY KEY,
                subject_id INTEGER NOT NULL,
                action TEXT NOT NULL,
                snapshot JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"
        ))
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {table}_subject_idx ON {table} (subject_id, id)"
        ))
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!("DROP TRIGGER IF EXISTS {table}_append_only ON {table}"))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!(
            "CREATE TRIGGER {table}_append_only BEFORE UPDATE OR DELETE ON {table}
             FOR EACH ROW EXECUTE FUNCTION reject_audit_mutation()"
        ))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!(tables = TABLES.len() + LOG_TABLES.len(), "schema applied");
    Ok(())
}

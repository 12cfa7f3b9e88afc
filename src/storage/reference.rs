//! Shared reference data: roles, categories, car models and brands.
//!
//! These rows are referenced, never owned. Deleting one drops its join rows
//! through `ON DELETE CASCADE` and is not audited.

use crate::domain::error::{LedgerError, LedgerResult};
use crate::storage::entities::{EntityTable, RelatedRef};
use sqlx::PgConnection;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Role,
    Category,
    CarModel,
    Brand,
}

impl ReferenceKind {
    pub fn table(self) -> EntityTable {
        match self {
            ReferenceKind::Role => EntityTable::Roles,
            ReferenceKind::Category => EntityTable::Categories,
            ReferenceKind::CarModel => EntityTable::CarModels,
            ReferenceKind::Brand => EntityTable::Brands,
        }
    }

    /// Plural path segment, e.g. `car-models`.
    pub fn segment(self) -> &'static str {
        match self {
            ReferenceKind::Role => "roles",
            ReferenceKind::Category => "categories",
            ReferenceKind::CarModel => "car-models",
            ReferenceKind::Brand => "brands",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

impl FromStr for ReferenceKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "roles" | "role" => Ok(ReferenceKind::Role),
            "categories" | "category" => Ok(ReferenceKind::Category),
            "car-models" | "car_models" | "car-model" | "car_model" => Ok(ReferenceKind::CarModel),
            "brands" | "brand" => Ok(ReferenceKind::Brand),
            other => Err(LedgerError::Validation(format!(
                "unknown reference kind '{}'",
                other
            ))),
        }
    }
}

pub async fn create(conn: &mut PgConnection, kind: ReferenceKind, name: &str) -> LedgerResult<RelatedRef> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::Validation(format!(
            "{} name must not be blank",
            kind.table().label()
        )));
    }
    let sql = format!(
        "INSERT INTO {} (name) VALUES ($1) RETURNING id, name",
        kind.table().table_name()
    );
    Ok(sqlx::query_as::<_, RelatedRef>(&sql)
        .bind(name)
        .fetch_one(&mut *conn)
        .await?)
}

pub async fn list(conn: &mut PgConnection, kind: ReferenceKind) -> LedgerResult<Vec<RelatedRef>> {
    let sql = format!("SELECT id, name FROM {} ORDER BY id", kind.table().table_name());
    Ok(sqlx::query_as::<_, RelatedRef>(&sql).fetch_all(&mut *conn).await?)
}

pub async fn delete(conn: &mut PgConnection, kind: ReferenceKind, id: i32) -> LedgerResult<()> {
    let sql = format!("DELETE FROM {} WHERE id = $1", kind.table().table_name());
    let done = sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
    if done.rows_affected() == 0 {
        return Err(LedgerError::not_found(kind.table().label(), id));
    }
    Ok(())
}

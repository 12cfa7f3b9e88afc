//! Append-only audit trail, one log table per audited entity kind.
//!
//! Rows are only ever inserted; the schema installs a trigger that rejects
//! `UPDATE` and `DELETE` on every log table.

use crate::domain::error::{LedgerError, LedgerResult};
use crate::storage::relations::Relation;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::{FromRow, PgConnection};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Account,
    Enterprise,
    Product,
    /// Subject id is the saving account.
    Save,
}

impl EntityKind {
    pub fn log_table(self) -> &'static str {
        match self {
            EntityKind::Account => "account_log",
            EntityKind::Enterprise => "enterprise_log",
            EntityKind::Product => "product_log",
            EntityKind::Save => "account_save_log",
        }
    }
}

impl FromStr for EntityKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "account" | "accounts" => Ok(EntityKind::Account),
            "enterprise" | "enterprises" => Ok(EntityKind::Enterprise),
            "product" | "products" => Ok(EntityKind::Product),
            "save" | "saves" => Ok(EntityKind::Save),
            other => Err(LedgerError::Validation(format!("unknown entity kind '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    Updated,
    Deleted,
    RoleAdded,
    RoleRemoved,
    ExternalLinkAdded,
    ExternalLinkRemoved,
    ExternalLinkUpdated,
    Enabled,
    Disabled,
    CategoryAdded,
    CategoryRemoved,
    CarModelAdded,
    CarModelRemoved,
    BrandAdded,
    BrandRemoved,
    ImageAdded,
    ImageRemoved,
    StockUpdated,
    SaveCreated,
    SaveDeleted,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Created => "created",
            Action::Updated => "updated",
            Action::Deleted => "deleted",
            Action::RoleAdded => "role_added",
            Action::RoleRemoved => "role_removed",
            Action::ExternalLinkAdded => "external_link_added",
            Action::ExternalLinkRemoved => "external_link_removed",
            Action::ExternalLinkUpdated => "external_link_updated",
            Action::Enabled => "enabled",
            Action::Disabled => "disabled",
            Action::CategoryAdded => "category_added",
            Action::CategoryRemoved => "category_removed",
            Action::CarModelAdded => "car_model_added",
            Action::CarModelRemoved => "car_model_removed",
            Action::BrandAdded => "brand_added",
            Action::BrandRemoved => "brand_removed",
            Action::ImageAdded => "image_added",
            Action::ImageRemoved => "image_removed",
            Action::StockUpdated => "stock_updated",
            Action::SaveCreated => "save_created",
            Action::SaveDeleted => "save_deleted",
        }
    }

    pub fn relation_added(rel: Relation) -> Action {
        match rel {
            Relation::AccountRole => Action::RoleAdded,
            Relation::AccountSave => Action::SaveCreated,
            Relation::ProductCategory => Action::CategoryAdded,
            Relation::ProductCarModel => Action::CarModelAdded,
            Relation::ProductBrand => Action::BrandAdded,
            Relation::ProductImage => Action::ImageAdded,
        }
    }

    pub fn relation_removed(rel: Relation) -> Action {
        match rel {
            Relation::AccountRole => Action::RoleRemoved,
            Relation::AccountSave => Action::SaveDeleted,
            Relation::ProductCategory => Action::CategoryRemoved,
            Relation::ProductCarModel => Action::CarModelRemoved,
            Relation::ProductBrand => Action::BrandRemoved,
            Relation::ProductImage => Action::ImageRemoved,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One persisted audit row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuditLogEntry {
    pub id: i64,
    pub subject_id: i32,
    pub action: String,
    pub snapshot: JsonValue,
    pub created_at: DateTime<Utc>,
}

/// Whether a deletion writes its `deleted` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteAuditPolicy {
    /// Every deletion is logged.
    #[default]
    Always,
    /// The `deleted` entry is skipped when the subject already has a logged
    /// snapshot.
    WhenNoPriorSnapshot,
}

impl FromStr for DeleteAuditPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "always" => Ok(DeleteAuditPolicy::Always),
            "when_no_prior_snapshot" | "when-no-prior-snapshot" => {
                Ok(DeleteAuditPolicy::WhenNoPriorSnapshot)
            }
            other => Err(format!(
                "unknown delete audit policy '{}' (expected always | when_no_prior_snapshot)",
                other
            )),
        }
    }
}

/// Appends one entry and returns its id.
pub async fn log<S: Serialize>(
    conn: &mut PgConnection,
    kind: EntityKind,
    subject_id: i32,
    action: Action,
    snapshot: &S,
) -> LedgerResult<i64> {
    let payload = serde_json::to_value(snapshot)?;
    let sql = format!(
        "INSERT INTO {} (subject_id, action, snapshot) VALUES ($1, $2, $3) RETURNING id",
        kind.log_table()
    );
    let id: i64 = sqlx::query_scalar(&sql)
        .bind(subject_id)
        .bind(action.as_str())
        .bind(payload)
        .fetch_one(&mut *conn)
        .await?;
    debug!(log = kind.log_table(), subject_id, action = %action, entry = id, "audit entry appended");
    Ok(id)
}

/// Entries for one subject in append order.
pub async fn history(
    conn: &mut PgConnection,
    kind: EntityKind,
    subject_id: i32,
) -> LedgerResult<Vec<AuditLogEntry>> {
    let sql = format!(
        "SELECT id, subject_id, action, snapshot, created_at FROM {}
         WHERE subject_id = $1 ORDER BY id",
        kind.log_table()
    );
    Ok(sqlx::query_as::<_, AuditLogEntry>(&sql)
        .bind(subject_id)
        .fetch_all(&mut *conn)
        .await?)
}

pub async fn has_prior_snapshot(
    conn: &mut PgConnection,
    kind: EntityKind,
    subject_id: i32,
) -> LedgerResult<bool> {
    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE subject_id = $1 AND snapshot <> 'null'::jsonb)",
        kind.log_table()
    );
    Ok(sqlx::query_scalar(&sql)
        .bind(subject_id)
        .fetch_one(&mut *conn)
        .await?)
}

/// Writes the `deleted` entry unless the policy says to skip it.
pub async fn log_deletion<S: Serialize>(
    conn: &mut PgConnection,
    policy: DeleteAuditPolicy,
    kind: EntityKind,
    subject_id: i32,
    snapshot: &S,
) -> LedgerResult<Option<i64>> {
    if policy == DeleteAuditPolicy::WhenNoPriorSnapshot
        && has_prior_snapshot(conn, kind, subject_id).await?
    {
        info!(log = kind.log_table(), subject_id, "deletion not logged: prior snapshot exists");
        return Ok(None);
    }
    log(conn, kind, subject_id, Action::Deleted, snapshot).await.map(Some)
}

//! The marketplace mutation service.
//!
//! Every public mutation runs inside exactly one PostgreSQL transaction:
//! references are validated, rows are mutated, the affected entity's snapshot
//! is rebuilt and the audit entry is appended as the last step before commit.
//! Any error drops the transaction, which rolls everything back.
//!
//! Operations are grouped by entity in the sibling modules (`accounts`,
//! `enterprises`, `products`, `saves`, `catalog`, `reference`).

use crate::domain::audit::{self, AuditLogEntry, DeleteAuditPolicy, EntityKind};
use crate::domain::error::LedgerResult;
use crate::infra::config;
use crate::storage::schema;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

#[derive(Clone)]
pub struct MarketplaceService {
    pub(crate) pool: PgPool,
    pub(crate) delete_policy: DeleteAuditPolicy,
}

impl MarketplaceService {
    /// Connects using environment configuration and applies the schema.
    pub async fn connect() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        let database_url = config::database_url()?;

        let pool = PgPoolOptions::new()
            .max_connections(config::max_connections())
            .connect(&database_url)
            .await?;

        schema::apply(&pool).await?;

        let policy = config::delete_audit_policy()?;
        info!(?policy, "marketplace service connected");
        Ok(Self::from_pool(pool, policy))
    }

    /// Wraps an existing pool. The schema must already be applied.
    pub fn from_pool(pool: PgPool, delete_policy: DeleteAuditPolicy) -> Self {
        Self {
            pool,
            delete_policy,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn delete_policy(&self) -> DeleteAuditPolicy {
        self.delete_policy
    }

    /// Audit entries of one subject, oldest first.
    pub async fn audit_history(
        &self,
        kind: EntityKind,
        subject_id: i32,
    ) -> LedgerResult<Vec<AuditLogEntry>> {
        let mut conn = self.pool.acquire().await?;
        audit::history(&mut conn, kind, subject_id).await
    }
}

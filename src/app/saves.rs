//! Saved products ("wishlist") of an account.

use crate::app::MarketplaceService;
use crate::domain::audit::{self, Action, EntityKind};
use crate::domain::error::LedgerResult;
use crate::domain::snapshot::{self, SaveSnapshot};
use crate::storage::entities::{self, EntityTable, ProductRecord};
use crate::storage::relations::{self, Relation};
use tracing::info;

impl MarketplaceService {
    /// Idempotent on the relation; `save_created` is logged on every call.
    pub async fn save_product(&self, account_id: i32, product_id: i32) -> LedgerResult<SaveSnapshot> {
        let mut tx = self.pool.begin().await?;
        entities::require(&mut tx, EntityTable::Accounts, account_id).await?;
        entities::require(&mut tx, EntityTable::Products, product_id).await?;
        relations::add(&mut tx, Relation::AccountSave, account_id, product_id).await?;

        let snapshot = snapshot::save_snapshot(&mut tx, account_id, product_id).await?;
        audit::log(&mut tx, EntityKind::Save, account_id, Action::SaveCreated, &snapshot).await?;
        tx.commit().await?;

        info!(account_id, product_id, "product saved");
        Ok(snapshot)
    }

    pub async fn unsave_product(&self, account_id: i32, product_id: i32) -> LedgerResult<SaveSnapshot> {
        let mut tx = self.pool.begin().await?;
        relations::remove(&mut tx, Relation::AccountSave, account_id, product_id).await?;

        let snapshot = snapshot::save_snapshot(&mut tx, account_id, product_id).await?;
        audit::log(&mut tx, EntityKind::Save, account_id, Action::SaveDeleted, &snapshot).await?;
        tx.commit().await?;

        info!(account_id, product_id, "product unsaved");
        Ok(snapshot)
    }

    pub async fn get_saved_products(&self, account_id: i32) -> LedgerResult<Vec<ProductRecord>> {
        let mut conn = self.pool.acquire().await?;
        entities::require(&mut conn, EntityTable::Accounts, account_id).await?;
        entities::saved_products_of(&mut conn, account_id).await
    }
}

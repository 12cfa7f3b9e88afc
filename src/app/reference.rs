use crate::app::MarketplaceService;
use crate::domain::error::LedgerResult;
use crate::storage::entities::RelatedRef;
use crate::storage::reference::{self, ReferenceKind};
use tracing::info;

impl MarketplaceService {
    pub async fn create_reference(&self, kind: ReferenceKind, name: &str) -> LedgerResult<RelatedRef> {
        let mut conn = self.pool.acquire().await?;
        let created = reference::create(&mut conn, kind, name).await?;
        info!(kind = %kind, id = created.id, "reference row created");
        Ok(created)
    }

    pub async fn list_reference(&self, kind: ReferenceKind) -> LedgerResult<Vec<RelatedRef>> {
        let mut conn = self.pool.acquire().await?;
        reference::list(&mut conn, kind).await
    }

    /// Join rows that point at the deleted row go with it.
    pub async fn delete_reference(&self, kind: ReferenceKind, id: i32) -> LedgerResult<()> {
        let mut conn = self.pool.acquire().await?;
        reference::delete(&mut conn, kind, id).await?;
        info!(kind = %kind, id, "reference row deleted");
        Ok(())
    }
}

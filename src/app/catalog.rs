use crate::app::MarketplaceService;
use crate::domain::catalog::{self, CatalogItem, EnterpriseCatalog};
use crate::domain::error::LedgerResult;

impl MarketplaceService {
    pub async fn catalog_all(&self) -> LedgerResult<Vec<CatalogItem>> {
        let mut conn = self.pool.acquire().await?;
        catalog::catalog_all(&mut conn).await
    }

    pub async fn catalog_by_id(&self, product_id: i32) -> LedgerResult<Option<CatalogItem>> {
        let mut conn = self.pool.acquire().await?;
        catalog::catalog_by_id(&mut conn, product_id).await
    }

    pub async fn catalog_by_category(&self, category_id: i32) -> LedgerResult<Vec<CatalogItem>> {
        let mut conn = self.pool.acquire().await?;
        catalog::catalog_by_category(&mut conn, category_id).await
    }

    pub async fn catalog_n_by_category(&self, category_id: i32, limit: i64) -> LedgerResult<Vec<CatalogItem>> {
        let mut conn = self.pool.acquire().await?;
        catalog::catalog_n_by_category(&mut conn, category_id, limit).await
    }

    pub async fn catalog_by_enterprise(&self, enterprise_id: i32) -> LedgerResult<EnterpriseCatalog> {
        let mut conn = self.pool.acquire().await?;
        catalog::catalog_by_enterprise(&mut conn, enterprise_id).await
    }
}

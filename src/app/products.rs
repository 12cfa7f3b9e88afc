//! Product operations and the product-side relations (categories, car
//! models, brands, images).
//!
//! Unlike account roles, every category, car model, brand and image id passed
//! here must exist; a single unknown id aborts the whole operation.

use crate::app::MarketplaceService;
use crate::domain::audit::{self, Action, EntityKind};
use crate::domain::cascade;
use crate::domain::error::{LedgerError, LedgerResult};
use crate::domain::snapshot::{self, ProductPart, ProductSnapshot};
use crate::storage::entities::{self, EntityTable, ProductPatch};
use crate::storage::relations::{self, Relation};
use serde::Deserialize;
use sqlx::PgConnection;
use tracing::info;
use utoipa::ToSchema;

/// Either an existing image (`id`) or a new one to create from `url`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ImageInput {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Existing(i32),
    Upload(String),
}

impl ImageInput {
    pub fn existing(id: i32) -> Self {
        Self {
            id: Some(id),
            url: None,
        }
    }

    pub fn upload(url: impl Into<String>) -> Self {
        Self {
            id: None,
            url: Some(url.into()),
        }
    }

    /// `id` wins over `url`; a blank or missing url without an id is rejected.
    pub fn resolve(&self) -> LedgerResult<ImageSource> {
        if let Some(id) = self.id {
            return Ok(ImageSource::Existing(id));
        }
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(ImageSource::Upload(url.to_string())),
            _ => Err(LedgerError::Validation(
                "image needs an existing id or a non-empty url".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProduct {
    pub name: String,
    pub enterprise_id: i32,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub category_ids: Vec<i32>,
    #[serde(default)]
    pub car_model_ids: Vec<i32>,
    #[serde(default)]
    pub brand_ids: Vec<i32>,
    #[serde(default)]
    pub images: Vec<ImageInput>,
}

async fn materialize_image(conn: &mut PgConnection, source: &ImageSource) -> LedgerResult<i32> {
    match source {
        ImageSource::Existing(id) => {
            entities::require(conn, EntityTable::Images, *id).await?;
            Ok(*id)
        }
        ImageSource::Upload(url) => Ok(entities::insert_image(conn, url).await?.id),
    }
}

fn product_part(rel: Relation) -> LedgerResult<ProductPart> {
    ProductPart::for_relation(rel)
        .ok_or_else(|| LedgerError::Internal(format!("{:?} is not a product relation", rel)))
}

impl MarketplaceService {
    pub async fn create_product(&self, input: CreateProduct) -> LedgerResult<ProductSnapshot> {
        let images = input
            .images
            .iter()
            .map(ImageInput::resolve)
            .collect::<LedgerResult<Vec<_>>>()?;

        let mut tx = self.pool.begin().await?;
        entities::require(&mut tx, EntityTable::Enterprises, input.enterprise_id).await?;
        entities::require_all(&mut tx, EntityTable::Categories, &input.category_ids).await?;
        entities::require_all(&mut tx, EntityTable::CarModels, &input.car_model_ids).await?;
        entities::require_all(&mut tx, EntityTable::Brands, &input.brand_ids).await?;

        let product = entities::insert_product(
            &mut tx,
            &input.name,
            input.enterprise_id,
            input.stock,
            input.price,
        )
        .await?;

        let linked = [
            (Relation::ProductCategory, &input.category_ids),
            (Relation::ProductCarModel, &input.car_model_ids),
            (Relation::ProductBrand, &input.brand_ids),
        ];
        for (rel, ids) in linked {
            for id in ids {
                relations::add(&mut tx, rel, product.id, *id).await?;
            }
        }
        for source in &images {
            let image_id = materialize_image(&mut tx, source).await?;
            relations::add(&mut tx, Relation::ProductImage, product.id, image_id).await?;
        }

        let snapshot = snapshot::product_snapshot(&mut tx, product.id, ProductPart::ALL).await?;
        audit::log(&mut tx, EntityKind::Product, product.id, Action::Created, &snapshot).await?;
        tx.commit().await?;

        info!(
            product_id = product.id,
            enterprise_id = input.enterprise_id,
            "product created"
        );
        Ok(snapshot)
    }

    pub async fn update_product(&self, product_id: i32, patch: ProductPatch) -> LedgerResult<ProductSnapshot> {
        self.patch_product(product_id, &patch, Action::Updated).await
    }

    pub async fn update_product_stock(&self, product_id: i32, stock: i32) -> LedgerResult<ProductSnapshot> {
        let patch = ProductPatch {
            stock: Some(stock),
            ..ProductPatch::default()
        };
        self.patch_product(product_id, &patch, Action::StockUpdated).await
    }

    async fn patch_product(
        &self,
        product_id: i32,
        patch: &ProductPatch,
        action: Action,
    ) -> LedgerResult<ProductSnapshot> {
        let mut tx = self.pool.begin().await?;
        if let Some(enterprise_id) = patch.enterprise_id {
            entities::require(&mut tx, EntityTable::Enterprises, enterprise_id).await?;
        }
        entities::update_product(&mut tx, product_id, patch)
            .await?
            .ok_or_else(|| LedgerError::not_found("product", product_id))?;

        let snapshot = snapshot::product_snapshot(&mut tx, product_id, ProductPart::ALL).await?;
        audit::log(&mut tx, EntityKind::Product, product_id, action, &snapshot).await?;
        tx.commit().await?;

        info!(product_id, action = %action, "product changed");
        Ok(snapshot)
    }

    /// Deletes the product, its saves and join rows. Returns the
    /// pre-deletion snapshot.
    pub async fn delete_product(&self, product_id: i32) -> LedgerResult<ProductSnapshot> {
        let mut tx = self.pool.begin().await?;
        let before = cascade::delete_product(&mut tx, self.delete_policy, product_id).await?;
        tx.commit().await?;
        Ok(before)
    }

    async fn link_product(&self, rel: Relation, product_id: i32, target_id: i32) -> LedgerResult<ProductSnapshot> {
        let part = product_part(rel)?;
        let mut tx = self.pool.begin().await?;
        entities::require(&mut tx, EntityTable::Products, product_id).await?;
        entities::require(&mut tx, rel.target(), target_id).await?;
        relations::add(&mut tx, rel, product_id, target_id).await?;

        let snapshot = snapshot::product_snapshot(&mut tx, product_id, &[part]).await?;
        let action = Action::relation_added(rel);
        audit::log(&mut tx, EntityKind::Product, product_id, action, &snapshot).await?;
        tx.commit().await?;

        info!(product_id, target_id, action = %action, "product relation added");
        Ok(snapshot)
    }

    async fn unlink_product(&self, rel: Relation, product_id: i32, target_id: i32) -> LedgerResult<ProductSnapshot> {
        let part = product_part(rel)?;
        let mut tx = self.pool.begin().await?;
        relations::remove(&mut tx, rel, product_id, target_id).await?;

        let snapshot = snapshot::product_snapshot(&mut tx, product_id, &[part]).await?;
        let action = Action::relation_removed(rel);
        audit::log(&mut tx, EntityKind::Product, product_id, action, &snapshot).await?;
        tx.commit().await?;

        info!(product_id, target_id, action = %action, "product relation removed");
        Ok(snapshot)
    }

    pub async fn add_product_category(&self, product_id: i32, category_id: i32) -> LedgerResult<ProductSnapshot> {
        self.link_product(Relation::ProductCategory, product_id, category_id).await
    }

    pub async fn remove_product_category(&self, product_id: i32, category_id: i32) -> LedgerResult<ProductSnapshot> {
        self.unlink_product(Relation::ProductCategory, product_id, category_id).await
    }

    pub async fn add_product_car_model(&self, product_id: i32, car_model_id: i32) -> LedgerResult<ProductSnapshot> {
        self.link_product(Relation::ProductCarModel, product_id, car_model_id).await
    }

    pub async fn remove_product_car_model(&self, product_id: i32, car_model_id: i32) -> LedgerResult<ProductSnapshot> {
        self.unlink_product(Relation::ProductCarModel, product_id, car_model_id).await
    }

    pub async fn add_product_brand(&self, product_id: i32, brand_id: i32) -> LedgerResult<ProductSnapshot> {
        self.link_product(Relation::ProductBrand, product_id, brand_id).await
    }

    pub async fn remove_product_brand(&self, product_id: i32, brand_id: i32) -> LedgerResult<ProductSnapshot> {
        self.unlink_product(Relation::ProductBrand, product_id, brand_id).await
    }

    /// Links an existing image or creates one from a url.
    pub async fn add_product_image(&self, product_id: i32, image: ImageInput) -> LedgerResult<ProductSnapshot> {
        let source = image.resolve()?;
        let mut tx = self.pool.begin().await?;
        entities::require(&mut tx, EntityTable::Products, product_id).await?;
        let image_id = materialize_image(&mut tx, &source).await?;
        relations::add(&mut tx, Relation::ProductImage, product_id, image_id).await?;

        let snapshot = snapshot::product_snapshot(&mut tx, product_id, &[ProductPart::Images]).await?;
        audit::log(&mut tx, EntityKind::Product, product_id, Action::ImageAdded, &snapshot).await?;
        tx.commit().await?;

        info!(product_id, image_id, "product image added");
        Ok(snapshot)
    }

    pub async fn remove_product_image(&self, product_id: i32, image_id: i32) -> LedgerResult<ProductSnapshot> {
        self.unlink_product(Relation::ProductImage, product_id, image_id).await
    }
}

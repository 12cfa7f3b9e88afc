//! Catalog reads only ever surface products that meet the publishable
//! predicate, always in the single-image shape.

mod common;

use marketplace_ledger::app::{CreateProduct, ImageInput};
use marketplace_ledger::{CatalogItem, ErrorKind, ReferenceKind};
use std::collections::BTreeSet;

fn assert_publishable(item: &CatalogItem) {
    assert!(!item.categories.is_empty());
    assert!(!item.car_models.is_empty());
    assert!(!item.brands.is_empty());
    assert_eq!(item.enterprise.id, item.product.enterprise_id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn catalog_all_skips_unpublishable_products() -> Result<(), Box<dyn std::error::Error>> {
    let Some(svc) = common::service().await else {
        return Ok(());
    };
    let enterprise = common::enterprise(&svc, None, 0).await;
    let tax = common::taxonomy(&svc).await;
    let listed = common::publishable_product(&svc, enterprise.enterprise.id, &tax).await;

    let two_images = svc
        .create_product(CreateProduct {
            name: format!("two images {}", common::suffix()),
            enterprise_id: enterprise.enterprise.id,
            stock: 1,
            price: 1.0,
            category_ids: vec![tax.category],
            car_model_ids: vec![tax.car_model],
            brand_ids: vec![tax.brand],
            images: vec![
                ImageInput::upload("https://cdn.example.com/a.png"),
                ImageInput::upload("https://cdn.example.com/b.png"),
            ],
        })
        .await?;
    let no_brand = svc
        .create_product(CreateProduct {
            name: format!("no brand {}", common::suffix()),
            enterprise_id: enterprise.enterprise.id,
            stock: 1,
            price: 1.0,
            category_ids: vec![tax.category],
            car_model_ids: vec![tax.car_model],
            brand_ids: vec![],
            images: vec![ImageInput::upload("https://cdn.example.com/c.png")],
        })
        .await?;

    let catalog = svc.catalog_all().await?;
    catalog.iter().for_each(assert_publishable);
    let ids: BTreeSet<i32> = catalog.iter().map(|i| i.product.id).collect();
    assert!(ids.contains(&listed.product.id));
    assert!(!ids.contains(&two_images.product.id));
    assert!(!ids.contains(&no_brand.product.id));

    assert!(svc.catalog_by_id(two_images.product.id).await?.is_none());
    assert!(svc.catalog_by_id(no_brand.product.id).await?.is_none());
    assert!(svc.catalog_by_id(i32::MAX).await?.is_none());

    // Adding the missing brand publishes the product.
    svc.add_product_brand(no_brand.product.id, tax.brand).await?;
    assert!(svc.catalog_by_id(no_brand.product.id).await?.is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn categories_survive_the_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let Some(svc) = common::service().await else {
        return Ok(());
    };
    let enterprise = common::enterprise(&svc, None, 0).await;
    let tax = common::taxonomy(&svc).await;
    let second_category = common::reference(&svc, ReferenceKind::Category).await;

    let product = svc
        .create_product(CreateProduct {
            name: format!("filter {}", common::suffix()),
            enterprise_id: enterprise.enterprise.id,
            stock: 4,
            price: 12.0,
            category_ids: vec![tax.category, second_category],
            car_model_ids: vec![tax.car_model],
            brand_ids: vec![tax.brand],
            images: vec![ImageInput::upload("https://cdn.example.com/filter.png")],
        })
        .await?;

    let item = svc
        .catalog_by_id(product.product.id)
        .await?
        .expect("publishable");
    let categories: BTreeSet<i32> = item.categories.iter().map(|c| c.id).collect();
    assert_eq!(categories, BTreeSet::from([tax.category, second_category]));
    assert_eq!(item.image.url, "https://cdn.example.com/filter.png");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn category_views_respect_the_limit() -> Result<(), Box<dyn std::error::Error>> {
    let Some(svc) = common::service().await else {
        return Ok(());
    };
    let enterprise = common::enterprise(&svc, None, 0).await;
    let tax = common::taxonomy(&svc).await;
    let mut created = Vec::new();
    for _ in 0..3 {
        created.push(common::publishable_product(&svc, enterprise.enterprise.id, &tax).await.product.id);
    }

    let all = svc.catalog_by_category(tax.category).await?;
    assert_eq!(all.iter().map(|i| i.product.id).collect::<Vec<_>>(), created);

    let first_two = svc.catalog_n_by_category(tax.category, 2).await?;
    assert_eq!(
        first_two.iter().map(|i| i.product.id).collect::<Vec<_>>(),
        created[..2].to_vec()
    );

    let err = svc
        .catalog_n_by_category(tax.category, -1)
        .await
        .expect_err("negative limit");
    assert_eq!(err.kind(), ErrorKind::Validation);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn enterprise_view_bundles_owner_links_and_products() -> Result<(), Box<dyn std::error::Error>> {
    let Some(svc) = common::service().await else {
        return Ok(());
    };
    let owner = common::account(&svc, vec![]).await;
    let enterprise = common::enterprise(&svc, Some(owner.account.id), 2).await;
    let tax = common::taxonomy(&svc).await;
    let product = common::publishable_product(&svc, enterprise.enterprise.id, &tax).await;

    let view = svc.catalog_by_enterprise(enterprise.enterprise.id).await?;
    assert_eq!(view.owner.map(|a| a.id), Some(owner.account.id));
    assert_eq!(view.external_links.len(), 2);
    assert_eq!(view.products.len(), 1);
    assert_eq!(view.products[0].product.id, product.product.id);

    let orphan = common::enterprise(&svc, None, 0).await;
    let view = svc.catalog_by_enterprise(orphan.enterprise.id).await?;
    assert!(view.owner.is_none());
    assert!(view.external_links.is_empty());
    assert!(view.products.is_empty());

    let err = svc
        .catalog_by_enterprise(i32::MAX)
        .await
        .expect_err("no enterprise");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    Ok(())
}

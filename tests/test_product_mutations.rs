//! Product, external link and save mutations: strict reference checks,
//! rollback on failure, relation idempotence and per-mutation audit entries.

mod common;

use marketplace_ledger::app::{CreateProduct, ImageInput, NewExternalLink};
use marketplace_ledger::storage::entities::{LinkPatch, ProductPatch};
use marketplace_ledger::{EntityKind, ErrorKind, ReferenceKind};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_category_rolls_back_the_whole_product() -> Result<(), Box<dyn std::error::Error>> {
    let Some(svc) = common::service().await else {
        return Ok(());
    };
    let enterprise = common::enterprise(&svc, None, 0).await;
    let tax = common::taxonomy(&svc).await;
    let name = format!("ghost {}", common::suffix());
    let image_url = format!("https://cdn.example.com/ghost-{}.png", common::suffix());

    let err = svc
        .create_product(CreateProduct {
            name: name.clone(),
            enterprise_id: enterprise.enterprise.id,
            stock: 1,
            price: 9.99,
            category_ids: vec![tax.category, -7],
            car_model_ids: vec![tax.car_model],
            brand_ids: vec![tax.brand],
            images: vec![ImageInput::upload(image_url.clone())],
        })
        .await
        .expect_err("category -7 does not exist");
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let products: i64 = sqlx::query_scalar("SELECT count(*) FROM products WHERE name = $1")
        .bind(&name)
        .fetch_one(svc.pool())
        .await?;
    assert_eq!(products, 0);
    let images: i64 = sqlx::query_scalar("SELECT count(*) FROM images WHERE url = $1")
        .bind(&image_url)
        .fetch_one(svc.pool())
        .await?;
    assert_eq!(images, 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn image_without_id_or_url_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let Some(svc) = common::service().await else {
        return Ok(());
    };
    let enterprise = common::enterprise(&svc, None, 0).await;
    let name = format!("blank image {}", common::suffix());

    let err = svc
        .create_product(CreateProduct {
            name: name.clone(),
            enterprise_id: enterprise.enterprise.id,
            stock: 0,
            price: 0.0,
            category_ids: vec![],
            car_model_ids: vec![],
            brand_ids: vec![],
            images: vec![ImageInput::upload("   ")],
        })
        .await
        .expect_err("blank url");
    assert_eq!(err.kind(), ErrorKind::Validation);

    let products: i64 = sqlx::query_scalar("SELECT count(*) FROM products WHERE name = $1")
        .bind(&name)
        .fetch_one(svc.pool())
        .await?;
    assert_eq!(products, 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn product_for_missing_enterprise_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let Some(svc) = common::service().await else {
        return Ok(());
    };
    let err = svc
        .create_product(CreateProduct {
            name: "orphan".to_string(),
            enterprise_id: i32::MAX,
            stock: 0,
            price: 0.0,
            category_ids: vec![],
            car_model_ids: vec![],
            brand_ids: vec![],
            images: vec![],
        })
        .await
        .expect_err("no enterprise");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn created_product_snapshot_holds_every_relation() -> Result<(), Box<dyn std::error::Error>> {
    let Some(svc) = common::service().await else {
        return Ok(());
    };
    let enterprise = common::enterprise(&svc, None, 0).await;
    let tax = common::taxonomy(&svc).await;
    let product = common::publishable_product(&svc, enterprise.enterprise.id, &tax).await;
    let id = product.product.id;

    assert_eq!(product.categories.as_ref().map(Vec::len), Some(1));
    assert_eq!(product.car_models.as_ref().map(Vec::len), Some(1));
    assert_eq!(product.brands.as_ref().map(Vec::len), Some(1));
    assert_eq!(product.images.as_ref().map(Vec::len), Some(1));
    assert_eq!(product.enterprise.as_ref().map(|e| e.id), Some(enterprise.enterprise.id));
    assert!((product.product.price - 45.5).abs() < f64::EPSILON);

    let history = svc.audit_history(EntityKind::Product, id).await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, "created");
    assert_eq!(history[0].snapshot["categories"][0]["id"], tax.category);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn brand_relation_is_idempotent_and_strict_on_removal() -> Result<(), Box<dyn std::error::Error>> {
    let Some(svc) = common::service().await else {
        return Ok(());
    };
    let enterprise = common::enterprise(&svc, None, 0).await;
    let tax = common::taxonomy(&svc).await;
    let product = common::publishable_product(&svc, enterprise.enterprise.id, &tax).await;
    let id = product.product.id;
    let extra = common::reference(&svc, ReferenceKind::Brand).await;

    svc.add_product_brand(id, extra).await?;
    let again = svc.add_product_brand(id, extra).await?;
    assert_eq!(again.brands.as_ref().map(Vec::len), Some(2));
    assert!(again.categories.is_none());

    let rows = common::count(&svc, "SELECT count(*) FROM product_brands WHERE product_id = $1", id).await;
    assert_eq!(rows, 2);

    svc.remove_product_brand(id, extra).await?;
    let logged = svc.audit_history(EntityKind::Product, id).await?.len();

    let err = svc
        .remove_product_brand(id, extra)
        .await
        .expect_err("already removed");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(svc.audit_history(EntityKind::Product, id).await?.len(), logged);

    let actions: Vec<String> = svc
        .audit_history(EntityKind::Product, id)
        .await?
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(actions, vec!["created", "brand_added", "brand_added", "brand_removed"]);

    let err = svc
        .add_product_category(id, -3)
        .await
        .expect_err("unknown category");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn images_are_linked_by_id_or_url() -> Result<(), Box<dyn std::error::Error>> {
    let Some(svc) = common::service().await else {
        return Ok(());
    };
    let enterprise = common::enterprise(&svc, None, 0).await;
    let tax = common::taxonomy(&svc).await;
    let product = common::publishable_product(&svc, enterprise.enterprise.id, &tax).await;
    let first_image = product.images.as_ref().expect("images")[0].id;

    let other = common::publishable_product(&svc, enterprise.enterprise.id, &tax).await;
    let by_id = svc
        .add_product_image(other.product.id, ImageInput::existing(first_image))
        .await?;
    assert_eq!(by_id.images.as_ref().map(Vec::len), Some(2));

    let url = format!("https://cdn.example.com/{}.jpg", common::suffix());
    let by_url = svc
        .add_product_image(product.product.id, ImageInput::upload(url.clone()))
        .await?;
    let images = by_url.images.expect("images");
    assert_eq!(images.len(), 2);
    assert!(images.iter().any(|i| i.url == url));

    let removed = svc.remove_product_image(product.product.id, first_image).await?;
    assert_eq!(removed.images.as_ref().map(Vec::len), Some(1));

    let err = svc
        .add_product_image(product.product.id, ImageInput::existing(-1))
        .await
        .expect_err("unknown image");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stock_and_field_updates_are_logged() -> Result<(), Box<dyn std::error::Error>> {
    let Some(svc) = common::service().await else {
        return Ok(());
    };
    let enterprise = common::enterprise(&svc, None, 0).await;
    let tax = common::taxonomy(&svc).await;
    let product = common::publishable_product(&svc, enterprise.enterprise.id, &tax).await;
    let id = product.product.id;

    let stocked = svc.update_product_stock(id, 3).await?;
    assert_eq!(stocked.product.stock, 3);
    assert_eq!(stocked.product.name, product.product.name);

    let renamed = svc
        .update_product(
            id,
            ProductPatch {
                name: Some("renamed".to_string()),
                ..ProductPatch::default()
            },
        )
        .await?;
    assert_eq!(renamed.product.name, "renamed");
    assert_eq!(renamed.product.stock, 3);

    let err = svc
        .update_product(
            id,
            ProductPatch {
                enterprise_id: Some(i32::MAX),
                ..ProductPatch::default()
            },
        )
        .await
        .expect_err("unknown enterprise");
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let actions: Vec<String> = svc
        .audit_history(EntityKind::Product, id)
        .await?
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(actions, vec!["created", "stock_updated", "updated"]);

    // Update entries carry the same full view as `created`.
    assert_eq!(renamed.categories.as_ref().map(Vec::len), Some(1));
    assert_eq!(renamed.images.as_ref().map(Vec::len), Some(1));
    let history = svc.audit_history(EntityKind::Product, id).await?;
    for entry in &history[1..] {
        assert_eq!(entry.snapshot["brands"][0]["id"], tax.brand);
        assert_eq!(entry.snapshot["car_models"][0]["id"], tax.car_model);
        assert_eq!(entry.snapshot["enterprise"]["id"], enterprise.enterprise.id);
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn out_of_range_price_is_a_validation_error() -> Result<(), Box<dyn std::error::Error>> {
    let Some(svc) = common::service().await else {
        return Ok(());
    };
    let enterprise = common::enterprise(&svc, None, 0).await;
    let tax = common::taxonomy(&svc).await;
    let product = common::publishable_product(&svc, enterprise.enterprise.id, &tax).await;
    let id = product.product.id;

    // NUMERIC(12, 2) holds at most ten integer digits.
    let err = svc
        .update_product(
            id,
            ProductPatch {
                price: Some(1.0e12),
                ..ProductPatch::default()
            },
        )
        .await
        .expect_err("price overflows the column");
    assert_eq!(err.kind(), ErrorKind::Validation);

    let name = format!("overpriced {}", common::suffix());
    let err = svc
        .create_product(CreateProduct {
            name: name.clone(),
            enterprise_id: enterprise.enterprise.id,
            stock: 1,
            price: 5.0e11,
            category_ids: vec![tax.category],
            car_model_ids: vec![],
            brand_ids: vec![],
            images: vec![],
        })
        .await
        .expect_err("price overflows the column");
    assert_eq!(err.kind(), ErrorKind::Validation);

    let stored: i64 = sqlx::query_scalar("SELECT count(*) FROM products WHERE name = $1")
        .bind(&name)
        .fetch_one(svc.pool())
        .await?;
    assert_eq!(stored, 0);
    assert_eq!(svc.audit_history(EntityKind::Product, id).await?.len(), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn external_links_log_against_their_enterprise() -> Result<(), Box<dyn std::error::Error>> {
    let Some(svc) = common::service().await else {
        return Ok(());
    };
    let enterprise = common::enterprise(&svc, None, 1).await;
    let id = enterprise.enterprise.id;

    let added = svc
        .add_external_link(
            id,
            NewExternalLink {
                name: "store".to_string(),
                url: "https://store.example.com".to_string(),
            },
        )
        .await?;
    let links = added.external_links.expect("links");
    assert_eq!(links.len(), 2);
    let store = links.iter().find(|l| l.name == "store").expect("new link").id;

    let updated = svc
        .update_external_link(
            store,
            LinkPatch {
                url: Some("https://shop.example.com".to_string()),
                ..LinkPatch::default()
            },
        )
        .await?;
    let link = updated
        .external_links
        .as_ref()
        .and_then(|l| l.iter().find(|l| l.id == store).cloned())
        .expect("updated link");
    assert_eq!(link.name, "store");
    assert_eq!(link.url, "https://shop.example.com");

    let removed = svc.remove_external_link(store).await?;
    assert_eq!(removed.external_links.as_ref().map(Vec::len), Some(1));

    let err = svc.remove_external_link(store).await.expect_err("already gone");
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let actions: Vec<String> = svc
        .audit_history(EntityKind::Enterprise, id)
        .await?
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(
        actions,
        vec![
            "created",
            "external_link_added",
            "external_link_updated",
            "external_link_removed"
        ]
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn enabling_and_owner_changes_are_checked_and_logged() -> Result<(), Box<dyn std::error::Error>> {
    let Some(svc) = common::service().await else {
        return Ok(());
    };
    let enterprise = common::enterprise(&svc, None, 0).await;
    let id = enterprise.enterprise.id;
    assert!(!enterprise.enterprise.enabled);

    let enabled = svc.set_enterprise_enabled(id, true).await?;
    assert!(enabled.enterprise.enabled);
    let disabled = svc.set_enterprise_enabled(id, false).await?;
    assert!(!disabled.enterprise.enabled);

    let err = svc
        .update_enterprise(
            id,
            marketplace_ledger::storage::entities::EnterprisePatch {
                owner_account_id: Some(i32::MAX),
                ..Default::default()
            },
        )
        .await
        .expect_err("owner does not exist");
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = svc
        .create_enterprise(common::enterprise_input(Some(i32::MAX), 1))
        .await
        .expect_err("owner does not exist");
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let actions: Vec<String> = svc
        .audit_history(EntityKind::Enterprise, id)
        .await?
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(actions, vec!["created", "enabled", "disabled"]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn saving_is_idempotent_but_logged_every_time() -> Result<(), Box<dyn std::error::Error>> {
    let Some(svc) = common::service().await else {
        return Ok(());
    };
    let enterprise = common::enterprise(&svc, None, 0).await;
    let tax = common::taxonomy(&svc).await;
    let product = common::publishable_product(&svc, enterprise.enterprise.id, &tax).await;
    let buyer = common::account(&svc, vec![]).await;
    let account_id = buyer.account.id;

    svc.save_product(account_id, product.product.id).await?;
    svc.save_product(account_id, product.product.id).await?;

    let saved = svc.get_saved_products(account_id).await?;
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, product.product.id);

    svc.unsave_product(account_id, product.product.id).await?;
    let err = svc
        .unsave_product(account_id, product.product.id)
        .await
        .expect_err("not saved anymore");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(svc.get_saved_products(account_id).await?.is_empty());

    let actions: Vec<String> = svc
        .audit_history(EntityKind::Save, account_id)
        .await?
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(actions, vec!["save_created", "save_created", "save_deleted"]);

    let err = svc
        .save_product(account_id, i32::MAX)
        .await
        .expect_err("unknown product");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    Ok(())
}

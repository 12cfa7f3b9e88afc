//! Drives the router over a real socket: envelope shape, status mapping and
//! a full create → publish → delete flow.

mod common;

use marketplace_ledger::transport;
use serde_json::{json, Value};

async fn serve() -> Result<Option<String>, Box<dyn std::error::Error>> {
    let Some(svc) = common::service().await else {
        return Ok(None);
    };
    let router = transport::http::create_router(transport::http::AppState::new(svc, false));

    // Bind to an ephemeral port to avoid conflicts if an API server is already running.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Ok(Some(format!("http://127.0.0.1:{}", port)))
}

async fn call(
    client: &reqwest::Client,
    method: reqwest::Method,
    url: String,
    body: Option<Value>,
) -> Result<(u16, Value), Box<dyn std::error::Error>> {
    let mut req = client.request(method, url);
    if let Some(body) = body {
        req = req.json(&body);
    }
    let resp = req.send().await?;
    let status = resp.status().as_u16();
    let body = resp.json::<Value>().await?;
    Ok((status, body))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn marketplace_flow_over_http() -> Result<(), Box<dyn std::error::Error>> {
    let Some(base_url) = serve().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let tag = common::suffix();

    let (status, health) = call(&client, reqwest::Method::GET, format!("{}/health", base_url), None).await?;
    assert_eq!(status, 200);
    assert_eq!(health["data"]["status"], "ok");

    // Reference data.
    let mut ids = Vec::new();
    for kind in ["roles", "categories", "car-models", "brands"] {
        let (status, body) = call(
            &client,
            reqwest::Method::POST,
            format!("{}/api/reference/{}", base_url, kind),
            Some(json!({ "name": format!("{}-{}", kind, tag) })),
        )
        .await?;
        assert_eq!(status, 201, "{}: {}", kind, body);
        ids.push(body["data"]["id"].as_i64().expect("id"));
    }
    let (role, category, car_model, brand) = (ids[0], ids[1], ids[2], ids[3]);

    // Account + owned enterprise in one call.
    let (status, registered) = call(
        &client,
        reqwest::Method::POST,
        format!("{}/api/enterprise-accounts", base_url),
        Some(json!({
            "account": {
                "username": format!("seller-{}", tag),
                "email": format!("seller-{}@example.com", tag),
                "password_hash": "hash",
                "role_ids": [role]
            },
            "enterprise": {
                "tax_id": format!("NIT-{}", tag),
                "address": "Calle 1",
                "representative_name": "Ana",
                "representative_id_number": format!("CI-{}", tag),
                "external_links": [{ "name": "web", "url": "https://seller.example.com" }]
            }
        })),
    )
    .await?;
    assert_eq!(status, 201, "{}", registered);
    assert_eq!(registered["success"], true);
    let account_id = registered["data"]["account"]["account"]["id"].as_i64().expect("account id");
    let enterprise_id = registered["data"]["enterprise"]["enterprise"]["id"]
        .as_i64()
        .expect("enterprise id");
    assert_eq!(registered["data"]["enterprise"]["enterprise"]["account_id"], account_id);
    assert_eq!(registered["data"]["account"]["roles"][0]["id"], role);

    // Removing a role the account does not hold is a 404 and leaves the log alone.
    let (status, body) = call(
        &client,
        reqwest::Method::DELETE,
        format!("{}/api/accounts/{}/roles/{}", base_url, account_id, category),
        None,
    )
    .await?;
    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
    let (_, history) = call(
        &client,
        reqwest::Method::GET,
        format!("{}/api/audit/account/{}", base_url, account_id),
        None,
    )
    .await?;
    assert_eq!(history["data"].as_array().map(Vec::len), Some(1));

    // Product with everything the catalog needs.
    let (status, product) = call(
        &client,
        reqwest::Method::POST,
        format!("{}/api/products", base_url),
        Some(json!({
            "name": format!("clutch-{}", tag),
            "enterprise_id": enterprise_id,
            "stock": 2,
            "price": 120.0,
            "category_ids": [category],
            "car_model_ids": [car_model],
            "brand_ids": [brand],
            "images": [{ "url": "https://cdn.example.com/clutch.png" }]
        })),
    )
    .await?;
    assert_eq!(status, 201, "{}", product);
    let product_id = product["data"]["product"]["id"].as_i64().expect("product id");

    let (status, item) = call(
        &client,
        reqwest::Method::GET,
        format!("{}/api/catalog/products/{}", base_url, product_id),
        None,
    )
    .await?;
    assert_eq!(status, 200);
    assert!(item["data"]["image"].is_object());
    assert_eq!(item["data"]["categories"][0]["id"], category);

    let (status, _) = call(
        &client,
        reqwest::Method::GET,
        format!("{}/api/catalog/categories/{}?limit=1", base_url, category),
        None,
    )
    .await?;
    assert_eq!(status, 200);

    // Deleting the enterprise takes the product out of the catalog.
    let (status, deleted) = call(
        &client,
        reqwest::Method::DELETE,
        format!("{}/api/enterprises/{}", base_url, enterprise_id),
        None,
    )
    .await?;
    assert_eq!(status, 200, "{}", deleted);
    assert_eq!(deleted["data"]["external_links"].as_array().map(Vec::len), Some(1));

    let (status, _) = call(
        &client,
        reqwest::Method::GET,
        format!("{}/api/catalog/products/{}", base_url, product_id),
        None,
    )
    .await?;
    assert_eq!(status, 404);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn errors_map_to_status_codes() -> Result<(), Box<dyn std::error::Error>> {
    let Some(base_url) = serve().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();

    let (status, body) = call(
        &client,
        reqwest::Method::GET,
        format!("{}/api/reference/colors", base_url),
        None,
    )
    .await?;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap_or_default().contains("colors"));

    let (status, _) = call(
        &client,
        reqwest::Method::POST,
        format!("{}/api/accounts", base_url),
        Some(json!({ "username": "missing-fields" })),
    )
    .await?;
    assert_eq!(status, 422);

    let (status, _) = call(
        &client,
        reqwest::Method::DELETE,
        format!("{}/api/products/{}", base_url, i32::MAX),
        None,
    )
    .await?;
    assert_eq!(status, 404);

    let (status, body) = call(
        &client,
        reqwest::Method::POST,
        format!("{}/api/products/1/images", base_url),
        Some(json!({})),
    )
    .await?;
    assert_eq!(status, 400, "{}", body);

    let (status, _) = call(
        &client,
        reqwest::Method::POST,
        format!("{}/api/products/1/colors/2", base_url),
        None,
    )
    .await?;
    assert_eq!(status, 400);
    Ok(())
}

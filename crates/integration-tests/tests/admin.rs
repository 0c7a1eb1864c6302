//! Admin API flows against the stub backend.

#![allow(clippy::unwrap_used)]

use circuit_bazaar_integration_tests::{StubBackend, login, spawn_admin};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_api_requires_login() {
    let backend = StubBackend::with_catalog().await;
    let admin = spawn_admin(&backend).await;

    let resp = admin.client.get(admin.url("/api/products")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = admin.client.get(admin.url("/auth/me")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bad_credentials_are_rejected() {
    let backend = StubBackend::spawn().await;
    let admin = spawn_admin(&backend).await;

    let resp = admin
        .client
        .post(admin.url("/auth/login"))
        .json(&json!({"email": "ada@example.com", "password": "guess"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = admin
        .client
        .post(admin.url("/auth/login"))
        .json(&json!({"email": "", "password": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["fields"], json!(["email", "password"]));
}

#[tokio::test]
async fn test_login_then_crud() {
    let backend = StubBackend::spawn().await;
    let admin = spawn_admin(&backend).await;

    let resp = login(&admin).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: Value = resp.json().await.unwrap();
    assert_eq!(profile["name"], "Ada");

    let me: Value = admin
        .client
        .get(admin.url("/auth/me"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["email"], "ada@example.com");

    // Create
    let resp = admin
        .client
        .post(admin.url("/api/brands"))
        .json(&json!({"name": "Acme"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    // List
    let list: Value = admin
        .client
        .get(admin.url("/api/brands?search=acm"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["data"][0]["name"], "Acme");
    assert_eq!(list["pagination"]["total"], 1);

    // Update
    let resp = admin
        .client
        .put(admin.url(&format!("/api/brands/{id}")))
        .json(&json!({"name": "Acme Corp"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(backend.records("brands")[0]["name"], "Acme Corp");

    // Status
    let resp = admin
        .client
        .patch(admin.url(&format!("/api/brands/{id}/status")))
        .json(&json!({"status": "inactive"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(backend.records("brands")[0]["status"], "inactive");

    // Delete
    let resp = admin
        .client
        .delete(admin.url(&format!("/api/brands/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(backend.records("brands").is_empty());

    let resp = admin
        .client
        .get(admin.url(&format!("/api/brands/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_resource_is_not_found() {
    let backend = StubBackend::spawn().await;
    let admin = spawn_admin(&backend).await;
    login(&admin).await;

    let resp = admin.client.get(admin.url("/api/customers")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_fields_are_reported() {
    let backend = StubBackend::spawn().await;
    let admin = spawn_admin(&backend).await;
    login(&admin).await;

    let resp = admin
        .client
        .post(admin.url("/api/banners"))
        .json(&json!({"title": "Sale"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["fields"], json!(["image"]));
    assert!(backend.records("banners").is_empty());
}

#[tokio::test]
async fn test_duplicate_sku_options_conflict() {
    let backend = StubBackend::with_catalog().await;
    let admin = spawn_admin(&backend).await;
    login(&admin).await;

    let duplicate = json!({
        "product_id": "phone",
        "price": "519.00",
        "options": [
            {"variation_id": "color", "option_id": "red"},
            {"variation_id": "storage", "option_id": "64"}
        ]
    });
    let resp = admin
        .client
        .post(admin.url("/api/product-skus"))
        .json(&duplicate)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(backend.records("product-skus").len(), 3);

    // The SKU that owns the set may keep it
    let resp = admin
        .client
        .put(admin.url("/api/product-skus/red-64"))
        .json(&duplicate)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let validation: Value = admin
        .client
        .post(admin.url("/api/products/phone/skus/validate"))
        .json(&json!({"options": duplicate["options"]}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(validation["valid"], false);
    assert_eq!(validation["duplicate_sku_id"], "red-64");
}

#[tokio::test]
async fn test_sku_options_repeating_a_variation_rejected() {
    let backend = StubBackend::with_catalog().await;
    let admin = spawn_admin(&backend).await;
    login(&admin).await;

    let resp = admin
        .client
        .post(admin.url("/api/product-skus"))
        .json(&json!({
            "product_id": "phone",
            "price": "499.00",
            "options": [
                {"variation_id": "color", "option_id": "red"},
                {"variation_id": "color", "option_id": "blue"}
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.records("product-skus").len(), 3);
}

#[tokio::test]
async fn test_product_skus_listing() {
    let backend = StubBackend::with_catalog().await;
    let admin = spawn_admin(&backend).await;
    login(&admin).await;

    let skus: Value = admin
        .client
        .get(admin.url("/api/products/phone/skus"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(skus["data"].as_array().unwrap().len(), 3);

    let resp = admin.client.get(admin.url("/api/brands/x/skus")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_backend_rejection_ends_session() {
    let backend = StubBackend::with_catalog().await;
    let admin = spawn_admin(&backend).await;
    login(&admin).await;

    let resp = admin.client.get(admin.url("/api/products")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    backend.revoke_token();
    let resp = admin.client.get(admin.url("/api/products")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // The session is gone, not just this request
    let resp = admin.client.get(admin.url("/auth/me")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

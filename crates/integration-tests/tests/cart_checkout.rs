//! Cart, wishlist and checkout flows through the HTTP API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use dreamy_layers_integration_tests::TestApp;

fn checkout_body(total: Option<f64>) -> Value {
    let mut body = json!({
        "name": "Nila Menon",
        "phone": "+91 98765 43210",
        "shippingAddress": "12 Frosting Lane, Kochi",
        "paymentMethod": "cod",
    });
    if let Some(total) = total {
        body["total"] = json!(total);
    }
    body
}

fn quantities(items: &Value) -> Vec<u64> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|line| line["quantity"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_checkout_orders_cart_and_empties_it() {
    let app = TestApp::new();
    let (mut nila, id) = app.customer("Nila Menon", "nila@example.com").await;
    let opera = app.product("Opera", 10).await;
    let eclair = app.product("Eclair", 5).await;
    let cart = format!("/api/cart/{id}");

    nila.post(&cart, json!({ "product": { "id": opera } })).await;
    nila.post(&cart, json!({ "product": { "_id": opera.to_string() } })).await;
    let added = nila
        .post(&cart, json!({ "product": { "productId": eclair, "price": 1 } }))
        .await;
    assert_eq!(added.status, StatusCode::OK);
    assert_eq!(quantities(&added.body), vec![2, 1]);
    assert_eq!(added.body[0]["name"], "Opera");

    let order = nila.post("/api/orders", checkout_body(Some(25.0))).await;
    assert_eq!(order.status, StatusCode::CREATED, "{}", order.body);
    assert_eq!(order.body["total"].as_f64(), Some(25.0));
    assert_eq!(order.body["status"], "Pending");
    assert_eq!(order.body["paymentMethod"], "cod");
    assert_eq!(order.body["items"], added.body);

    let after = nila.get(&cart).await;
    assert_eq!(after.body, json!({ "items": [] }));

    let history = nila.get(&format!("/api/orders/user/{id}")).await;
    assert_eq!(history.body.as_array().unwrap().len(), 1);
    assert_eq!(history.body[0]["id"], order.body["id"]);
}

#[tokio::test]
async fn test_checkout_rejects_empty_cart() {
    let app = TestApp::new();
    let (mut nila, id) = app.customer("Nila Menon", "nila@example.com").await;

    let response = nila.post("/api/orders", checkout_body(None)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Cart is empty");

    let history = nila.get(&format!("/api/orders/user/{id}")).await;
    assert_eq!(history.body, json!([]));
}

#[tokio::test]
async fn test_empty_cart_is_reported_before_contact_fields() {
    let app = TestApp::new();
    let (mut nila, _) = app.customer("Nila Menon", "nila@example.com").await;

    let mut body = checkout_body(None);
    body["phone"] = json!("");
    let response = nila.post("/api/orders", body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Cart is empty");
}

#[tokio::test]
async fn test_add_twice_decrease_then_checkout() {
    let app = TestApp::new();
    let (mut nila, id) = app.customer("Nila Menon", "nila@example.com").await;
    let p1 = app.product("Black Forest", 100).await;
    let cart = format!("/api/cart/{id}");

    let first = nila.post(&cart, json!({ "product": { "id": p1 } })).await;
    assert_eq!(quantities(&first.body), vec![1]);

    let second = nila.post(&cart, json!({ "product": { "id": p1 } })).await;
    assert_eq!(quantities(&second.body), vec![2]);

    let decreased = nila
        .put(&format!("{cart}/decrease"), json!({ "productId": p1 }))
        .await;
    assert_eq!(quantities(&decreased.body), vec![1]);

    let mut body = checkout_body(None);
    body["shippingAddress"] = json!("X");
    let order = nila.post("/api/orders", body).await;

    assert_eq!(order.status, StatusCode::CREATED, "{}", order.body);
    assert_eq!(order.body["total"].as_f64(), Some(100.0));
    assert_eq!(order.body["shippingAddress"], "X");
    let items = order.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["productId"], json!(p1));
    assert_eq!(items[0]["quantity"], 1);

    assert_eq!(nila.get(&cart).await.body, json!({ "items": [] }));
}

#[tokio::test]
async fn test_checkout_with_stale_total_changes_nothing() {
    let app = TestApp::new();
    let (mut nila, id) = app.customer("Nila Menon", "nila@example.com").await;
    let opera = app.product("Opera", 10).await;
    let cart = format!("/api/cart/{id}");
    nila.post(&cart, json!({ "product": { "id": opera } })).await;

    let response = nila.post("/api/orders", checkout_body(Some(12.0))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert_eq!(quantities(&nila.get(&cart).await.body["items"]), vec![1]);
    let history = nila.get(&format!("/api/orders/user/{id}")).await;
    assert_eq!(history.body, json!([]));
}

#[tokio::test]
async fn test_checkout_requires_contact_fields() {
    let app = TestApp::new();
    let (mut nila, id) = app.customer("Nila Menon", "nila@example.com").await;
    let opera = app.product("Opera", 10).await;
    nila.post(&format!("/api/cart/{id}"), json!({ "product": { "id": opera } }))
        .await;

    let mut body = checkout_body(None);
    body["shippingAddress"] = json!("   ");
    let response = nila.post("/api/orders", body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(
        response.body["message"]
            .as_str()
            .unwrap()
            .contains("shippingAddress")
    );
}

#[tokio::test]
async fn test_cart_price_is_locked_at_first_add() {
    let app = TestApp::new();
    let mut admin = app.admin().await;
    let (mut nila, id) = app.customer("Nila Menon", "nila@example.com").await;
    let opera = app.product("Opera", 10).await;
    let cart = format!("/api/cart/{id}");

    nila.post(&cart, json!({ "product": { "id": opera } })).await;
    let updated = admin
        .put(&format!("/api/products/{opera}"), json!({ "price": 40 }))
        .await;
    assert_eq!(updated.body["price"].as_f64(), Some(40.0));

    let lines = nila.post(&cart, json!({ "product": { "id": opera } })).await;
    assert_eq!(lines.body[0]["price"].as_f64(), Some(10.0));

    let order = nila.post("/api/orders", checkout_body(None)).await;
    assert_eq!(order.body["total"].as_f64(), Some(20.0));
}

#[tokio::test]
async fn test_quantity_adjustments() {
    let app = TestApp::new();
    let (mut nila, id) = app.customer("Nila Menon", "nila@example.com").await;
    let opera = app.product("Opera", 10).await;
    let eclair = app.product("Eclair", 5).await;
    let cart = format!("/api/cart/{id}");

    nila.post(&cart, json!({ "product": { "id": opera } })).await;
    nila.post(&cart, json!({ "product": { "id": eclair } })).await;

    let up = nila
        .put(&format!("{cart}/increase"), json!({ "productId": opera }))
        .await;
    assert_eq!(quantities(&up.body), vec![2, 1]);

    nila.put(&format!("{cart}/decrease"), json!({ "productId": opera }))
        .await;
    let floor = nila
        .put(&format!("{cart}/decrease"), json!({ "productId": opera }))
        .await;
    assert_eq!(quantities(&floor.body), vec![1, 1]);

    let missing = nila
        .put(&format!("{cart}/increase"), json!({ "productId": 999 }))
        .await;
    assert_eq!(missing.status, StatusCode::OK);
    assert_eq!(quantities(&missing.body), vec![1, 1]);

    let removed = nila.delete(&format!("{cart}/{opera}")).await;
    assert_eq!(removed.body.as_array().unwrap().len(), 1);
    assert_eq!(removed.body[0]["productId"], json!(eclair));
}

#[tokio::test]
async fn test_clear_keeps_cart_and_delete_removes_it() {
    let app = TestApp::new();
    let (mut nila, id) = app.customer("Nila Menon", "nila@example.com").await;
    let opera = app.product("Opera", 10).await;
    let cart = format!("/api/cart/{id}");

    nila.post(&cart, json!({ "product": { "id": opera } })).await;
    let cleared = nila.delete(&format!("{cart}/all")).await;
    assert_eq!(cleared.body, json!({ "items": [] }));

    nila.post(&cart, json!({ "product": { "id": opera } })).await;
    let deleted = nila.delete(&cart).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert_eq!(nila.get(&cart).await.body, json!({ "items": [] }));
}

#[tokio::test]
async fn test_unknown_or_malformed_ids_are_not_found() {
    let app = TestApp::new();
    let (mut nila, id) = app.customer("Nila Menon", "nila@example.com").await;
    let cart = format!("/api/cart/{id}");

    let unknown = nila.post(&cart, json!({ "product": { "id": 404 } })).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["message"], "Product not found");

    let garbled = nila.post(&cart, json!({ "product": { "id": "abc" } })).await;
    assert_eq!(garbled.status, StatusCode::NOT_FOUND);

    let missing = nila.post(&cart, json!({ "product": {} })).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let bad_owner = nila.get("/api/cart/not-a-user").await;
    assert_eq!(bad_owner.status, StatusCode::NOT_FOUND);

    let bad_order = nila.get("/api/orders/xyz").await;
    assert_eq!(bad_order.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_can_manage_someone_elses_cart() {
    let app = TestApp::new();
    let mut admin = app.admin().await;
    let (_nila, id) = app.customer("Nila Menon", "nila@example.com").await;
    let opera = app.product("Opera", 10).await;

    let added = admin
        .post(&format!("/api/cart/{id}"), json!({ "product": { "id": opera } }))
        .await;
    assert_eq!(added.status, StatusCode::OK);
    assert_eq!(quantities(&added.body), vec![1]);
}

#[tokio::test]
async fn test_wishlist_has_no_duplicates() {
    let app = TestApp::new();
    let (mut nila, id) = app.customer("Nila Menon", "nila@example.com").await;
    let opera = app.product("Opera", 10).await;
    let eclair = app.product("Eclair", 5).await;
    let wishlist = format!("/api/wishlist/{id}");

    assert_eq!(nila.get(&wishlist).await.body, json!({ "items": [] }));

    nila.post(&wishlist, json!({ "product": { "id": opera } })).await;
    nila.post(&wishlist, json!({ "product": { "id": eclair } })).await;
    let again = nila.post(&wishlist, json!({ "product": { "id": opera } })).await;
    assert_eq!(again.body.as_array().unwrap().len(), 2);
    assert!(again.body[0].get("quantity").is_none());

    let removed = nila.delete(&format!("{wishlist}/{opera}")).await;
    assert_eq!(removed.body.as_array().unwrap().len(), 1);

    let noop = nila.delete(&format!("{wishlist}/{opera}")).await;
    assert_eq!(noop.status, StatusCode::OK);
    assert_eq!(nila.get(&wishlist).await.body["items"][0]["name"], "Eclair");
}

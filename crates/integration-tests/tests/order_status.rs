//! Order status tracking: admin transitions, owner cancellation, and order
//! visibility.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use dreamy_layers_core::UserId;
use dreamy_layers_integration_tests::{TestApp, TestClient};

async fn place_order(app: &TestApp, client: &mut TestClient<'_>, user: UserId) -> Value {
    let product = app.product("Red Velvet", 12).await;
    client
        .post(
            &format!("/api/cart/{user}"),
            json!({ "product": { "id": product } }),
        )
        .await;
    let order = client
        .post(
            "/api/orders",
            json!({
                "name": "Nila Menon",
                "phone": "98765",
                "shippingAddress": "12 Frosting Lane",
                "paymentMethod": "razorpay",
                "items": [{ "productId": 1, "quantity": 99 }],
            }),
        )
        .await;
    assert_eq!(order.status, StatusCode::CREATED, "{}", order.body);
    order.body
}

async fn set_status(admin: &mut TestClient<'_>, order_id: &Value, status: &str) -> (StatusCode, Value) {
    let response = admin
        .put(
            &format!("/api/orders/{order_id}/status"),
            json!({ "status": status }),
        )
        .await;
    (response.status, response.body)
}

#[tokio::test]
async fn test_client_items_are_ignored() {
    let app = TestApp::new();
    let (mut nila, id) = app.customer("Nila Menon", "nila@example.com").await;
    let order = place_order(&app, &mut nila, id).await;

    assert_eq!(order["items"][0]["quantity"], 1);
    assert_eq!(order["items"][0]["name"], "Red Velvet");
    assert_eq!(order["total"].as_f64(), Some(12.0));
}

#[tokio::test]
async fn test_admin_moves_order_forward() {
    let app = TestApp::new();
    let mut admin = app.admin().await;
    let (mut nila, id) = app.customer("Nila Menon", "nila@example.com").await;
    let order = place_order(&app, &mut nila, id).await;
    let order_id = &order["id"];

    let (status, body) = set_status(&mut admin, order_id, "Processing").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Processing");

    // Skipping ahead is allowed
    let (status, _) = set_status(&mut admin, order_id, "Delivered").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = set_status(&mut admin, order_id, "Shipped").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Delivered"));

    let seen = nila.get(&format!("/api/orders/{order_id}")).await;
    assert_eq!(seen.body["status"], "Delivered");
}

#[tokio::test]
async fn test_admin_cancellation_rules() {
    let app = TestApp::new();
    let mut admin = app.admin().await;
    let (mut nila, id) = app.customer("Nila Menon", "nila@example.com").await;

    let processing = place_order(&app, &mut nila, id).await;
    set_status(&mut admin, &processing["id"], "Processing").await;
    let (status, body) = set_status(&mut admin, &processing["id"], "Cancelled").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Cancelled");

    let shipped = place_order(&app, &mut nila, id).await;
    set_status(&mut admin, &shipped["id"], "Shipped").await;
    let (status, _) = set_status(&mut admin, &shipped["id"], "Cancelled").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_same_status_is_a_noop_and_unknown_status_rejected() {
    let app = TestApp::new();
    let mut admin = app.admin().await;
    let (mut nila, id) = app.customer("Nila Menon", "nila@example.com").await;
    let order = place_order(&app, &mut nila, id).await;

    let (status, body) = set_status(&mut admin, &order["id"], "Pending").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedAt"], order["updatedAt"]);

    let (status, _) = set_status(&mut admin, &order["id"], "Baking").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = set_status(&mut admin, &json!(424_242), "Shipped").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_owner_cancels_only_while_pending() {
    let app = TestApp::new();
    let mut admin = app.admin().await;
    let (mut nila, id) = app.customer("Nila Menon", "nila@example.com").await;

    let first = place_order(&app, &mut nila, id).await;
    let cancelled = nila
        .put_empty(&format!("/api/orders/{}/cancel", first["id"]))
        .await;
    assert_eq!(cancelled.status, StatusCode::OK);
    assert_eq!(cancelled.body["status"], "Cancelled");

    let second = place_order(&app, &mut nila, id).await;
    set_status(&mut admin, &second["id"], "Processing").await;
    let refused = nila
        .put_empty(&format!("/api/orders/{}/cancel", second["id"]))
        .await;
    assert_eq!(refused.status, StatusCode::BAD_REQUEST);
    assert_eq!(refused.body["message"], "Order cannot be cancelled");

    let still = nila.get(&format!("/api/orders/{}", second["id"])).await;
    assert_eq!(still.body["status"], "Processing");
}

#[tokio::test]
async fn test_other_users_cannot_see_or_cancel() {
    let app = TestApp::new();
    let (mut nila, nila_id) = app.customer("Nila Menon", "nila@example.com").await;
    let (mut ravi, _) = app.customer("Ravi Iyer", "ravi@example.com").await;
    let order = place_order(&app, &mut nila, nila_id).await;

    let read = ravi.get(&format!("/api/orders/{}", order["id"])).await;
    assert_eq!(read.status, StatusCode::FORBIDDEN);

    let cancel = ravi
        .put_empty(&format!("/api/orders/{}/cancel", order["id"]))
        .await;
    assert_eq!(cancel.status, StatusCode::FORBIDDEN);

    let history = ravi.get(&format!("/api/orders/user/{nila_id}")).await;
    assert_eq!(history.status, StatusCode::FORBIDDEN);

    let status = ravi
        .put(
            &format!("/api/orders/{}/status", order["id"]),
            json!({ "status": "Shipped" }),
        )
        .await;
    assert_eq!(status.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_lists_all_orders_newest_first_with_customer() {
    let app = TestApp::new();
    let mut admin = app.admin().await;
    let (mut nila, nila_id) = app.customer("Nila Menon", "nila@example.com").await;
    let (mut ravi, ravi_id) = app.customer("Ravi Iyer", "ravi@example.com").await;

    let older = place_order(&app, &mut nila, nila_id).await;
    let newer = place_order(&app, &mut ravi, ravi_id).await;

    let all = admin.get("/api/orders").await;
    assert_eq!(all.status, StatusCode::OK);
    let orders = all.body.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], newer["id"]);
    assert_eq!(orders[1]["id"], older["id"]);
    assert_eq!(orders[1]["customer"]["name"], "Nila Menon");
    assert_eq!(orders[1]["customer"]["email"], "nila@example.com");

    let forbidden = nila.get("/api/orders").await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
}

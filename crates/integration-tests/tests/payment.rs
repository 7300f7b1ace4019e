//! Payment-order creation against a stubbed provider.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::json;

use dreamy_layers_integration_tests::TestApp;
use dreamy_layers_storefront::services::payment::{
    PaymentError, PaymentGateway, PaymentOrder, PaymentOrderRequest,
};

#[derive(Default)]
struct StubGateway {
    requests: Mutex<Vec<PaymentOrderRequest>>,
    fail: bool,
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_order(
        &self,
        request: &PaymentOrderRequest,
    ) -> Result<PaymentOrder, PaymentError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(PaymentError::Provider {
                status: 401,
                body: "bad key".to_string(),
            });
        }
        Ok(PaymentOrder {
            id: "order_stub_1".to_string(),
            amount: request.amount,
            currency: request.currency.to_string(),
            receipt: Some(request.receipt.clone()),
            status: "created".to_string(),
        })
    }
}

#[tokio::test]
async fn test_creates_provider_order_in_paise() {
    let gateway = Arc::new(StubGateway::default());
    let app = TestApp::with_payments(gateway.clone());
    let (mut nila, _) = app.customer("Nila Menon", "nila@example.com").await;

    let response = nila
        .post("/api/payment/create-order", json!({ "amount": 499.5 }))
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["id"], "order_stub_1");
    assert_eq!(response.body["amount"], 49_950);
    assert_eq!(response.body["currency"], "INR");
    assert!(
        response.body["receipt"]
            .as_str()
            .unwrap()
            .starts_with("receipt_")
    );
    assert_eq!(gateway.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rejects_bad_amounts_without_calling_provider() {
    let gateway = Arc::new(StubGateway::default());
    let app = TestApp::with_payments(gateway.clone());
    let (mut nila, _) = app.customer("Nila Menon", "nila@example.com").await;

    for body in [json!({}), json!({ "amount": 0 }), json!({ "amount": -20 })] {
        let response = nila.post("/api/payment/create-order", body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }
    assert!(gateway.requests.lock().unwrap().is_empty());

    let anonymous = app
        .client()
        .post("/api/payment/create-order", json!({ "amount": 10 }))
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_provider_failure_is_bad_gateway() {
    let gateway = Arc::new(StubGateway {
        fail: true,
        ..StubGateway::default()
    });
    let app = TestApp::with_payments(gateway);
    let (mut nila, _) = app.customer("Nila Menon", "nila@example.com").await;

    let response = nila
        .post("/api/payment/create-order", json!({ "amount": 10 }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["message"], "Payment provider error");
}

#[tokio::test]
async fn test_unconfigured_provider_is_server_error() {
    let app = TestApp::new();
    let (mut nila, _) = app.customer("Nila Menon", "nila@example.com").await;

    let response = nila
        .post("/api/payment/create-order", json!({ "amount": 10 }))
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["message"], "Internal server error");
}

//! Payment-order creation.
//!
//! Checkout with Razorpay starts by creating a provider order for the cart
//! amount; the browser then completes payment against that order id. The
//! provider sits behind [`PaymentGateway`] so tests can substitute it.
//!
//! # API Reference
//!
//! - Orders API: <https://razorpay.com/docs/api/orders/create/>

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use dreamy_layers_core::{CurrencyCode, to_minor_units};

use crate::config::RazorpayConfig;
use crate::error::{AppError, Result};

/// Errors from the payment provider.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },
}

/// Request for a provider order, in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentOrderRequest {
    pub amount: i64,
    pub currency: CurrencyCode,
    pub receipt: String,
}

/// A provider order as returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    pub status: String,
}

/// Creates orders with an external payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        request: &PaymentOrderRequest,
    ) -> std::result::Result<PaymentOrder, PaymentError>;
}

/// Client for the Razorpay Orders API.
pub struct RazorpayClient {
    client: reqwest::Client,
    config: RazorpayConfig,
}

impl RazorpayClient {
    #[must_use]
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    #[instrument(skip(self), fields(amount = request.amount, receipt = %request.receipt))]
    async fn create_order(
        &self,
        request: &PaymentOrderRequest,
    ) -> std::result::Result<PaymentOrder, PaymentError> {
        let response = self
            .client
            .post(format!("{}/orders", self.config.api_base))
            .basic_auth(&self.config.key_id, Some(self.config.secret()))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "payment provider rejected order");
            return Err(PaymentError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<PaymentOrder>().await?)
    }
}

/// Body of `POST /api/payment/create-order`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentOrder {
    #[serde(default)]
    pub amount: Option<Decimal>,
}

/// Validate the amount and create a provider order for it.
///
/// # Errors
///
/// Returns `AppError::Validation` for a missing or non-positive amount,
/// `AppError::Internal` when no provider is configured and
/// `AppError::Payment` when the provider call fails.
pub async fn create_payment_order(
    gateway: Option<&dyn PaymentGateway>,
    currency: CurrencyCode,
    body: &CreatePaymentOrder,
) -> Result<PaymentOrder> {
    let amount = body
        .amount
        .ok_or_else(|| AppError::Validation("Amount is required".to_string()))?;
    let minor = to_minor_units(amount, currency).map_err(|e| AppError::Validation(e.to_string()))?;

    let gateway =
        gateway.ok_or_else(|| AppError::Internal("payment provider not configured".to_string()))?;

    let request = PaymentOrderRequest {
        amount: minor,
        currency,
        receipt: format!("receipt_{}", Utc::now().timestamp_millis()),
    };

    let order = gateway.create_order(&request).await?;
    tracing::info!(payment_order_id = %order.id, amount = minor, "payment order created");
    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingGateway {
        seen: Mutex<Vec<PaymentOrderRequest>>,
    }

    #[async_trait]
    impl PaymentGateway for RecordingGateway {
        async fn create_order(
            &self,
            request: &PaymentOrderRequest,
        ) -> std::result::Result<PaymentOrder, PaymentError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(PaymentOrder {
                id: "order_test".to_string(),
                amount: request.amount,
                currency: request.currency.to_string(),
                receipt: Some(request.receipt.clone()),
                status: "created".to_string(),
            })
        }
    }

    fn body(amount: Option<i64>) -> CreatePaymentOrder {
        CreatePaymentOrder {
            amount: amount.map(Decimal::from),
        }
    }

    #[tokio::test]
    async fn test_amount_is_sent_in_paise() {
        let gateway = RecordingGateway::default();
        let order = create_payment_order(Some(&gateway), CurrencyCode::INR, &body(Some(450)))
            .await
            .unwrap();

        assert_eq!(order.amount, 45_000);
        let seen = gateway.seen.lock().unwrap();
        assert_eq!(seen[0].currency, CurrencyCode::INR);
        assert!(seen[0].receipt.starts_with("receipt_"));
    }

    #[tokio::test]
    async fn test_missing_or_zero_amount_is_rejected() {
        let gateway = RecordingGateway::default();
        for amount in [None, Some(0), Some(-10)] {
            let result = create_payment_order(Some(&gateway), CurrencyCode::INR, &body(amount)).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
        assert!(gateway.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_internal_error() {
        let result = create_payment_order(None, CurrencyCode::INR, &body(Some(10))).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_request_serializes_currency_code() {
        let request = PaymentOrderRequest {
            amount: 100,
            currency: CurrencyCode::INR,
            receipt: "receipt_1".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["currency"], "INR");
        assert_eq!(json["amount"], 100);
    }
}

//! Payment route handlers.

use axum::{Json, extract::State};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::payment::{CreatePaymentOrder, PaymentOrder, create_payment_order};
use crate::state::AppState;

/// `POST /api/payment/create-order`
pub async fn create_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CreatePaymentOrder>,
) -> Result<Json<PaymentOrder>> {
    tracing::debug!(user_id = %user.id, "creating payment order");
    let order =
        create_payment_order(state.payments(), state.config().payment_currency, &body).await?;
    Ok(Json(order))
}

//! Order route handlers: checkout, history, and status changes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use dreamy_layers_core::{CheckoutRequest, Order, OrderId, OrderStatus, UserId};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth, ensure_access};
use crate::models::OrderWithCustomer;
use crate::routes::parse_id;
use crate::services::orders::OrderService;
use crate::state::AppState;

/// Body of `PUT /api/orders/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: String,
}

impl StatusUpdate {
    fn parse(&self) -> Result<OrderStatus> {
        self.status
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid status: {:?}", self.status)))
    }
}

/// `POST /api/orders` - checkout the caller's cart.
///
/// Client-sent `items` are ignored; the stored cart is ordered.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CheckoutRequest>,
) -> Result<impl IntoResponse> {
    let order = OrderService::new(state.repos()).place(&user, &body).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders` - every order with its customer, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<OrderWithCustomer>>> {
    Ok(Json(OrderService::new(state.repos()).list_all().await?))
}

/// `GET /api/orders/user/{user_id}`
pub async fn for_user(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Order>>> {
    let owner: UserId = parse_id(&user_id, "User")?;
    ensure_access(&user, owner)?;
    Ok(Json(
        OrderService::new(state.repos()).list_for_user(owner).await?,
    ))
}

/// `GET /api/orders/{id}`
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let id: OrderId = parse_id(&id, "Order")?;
    Ok(Json(OrderService::new(state.repos()).get(&user, id).await?))
}

/// `PUT /api/orders/{id}/status`
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<Order>> {
    let id: OrderId = parse_id(&id, "Order")?;
    let next = body.parse()?;
    Ok(Json(
        OrderService::new(state.repos()).update_status(id, next).await?,
    ))
}

/// `PUT /api/orders/{id}/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let id: OrderId = parse_id(&id, "Order")?;
    Ok(Json(OrderService::new(state.repos()).cancel(&user, id).await?))
}

//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                           - Liveness
//! GET    /health/ready                     - Readiness (storage reachable)
//!
//! # Users
//! POST   /api/users/register               - Create account
//! POST   /api/users/login                  - Start session
//! POST   /api/users/logout                 - End session
//! GET    /api/users/me                     - Current user
//! GET    /api/users                        - All users (admin)
//! GET    /api/users/{id}                   - One user (admin)
//! PUT    /api/users/block/{id}             - Block (admin)
//! PUT    /api/users/unblock/{id}           - Unblock (admin)
//!
//! # Products
//! GET    /api/products                     - Catalog
//! GET    /api/products/{id}                - One product
//! POST   /api/products                     - Create (admin)
//! PUT    /api/products/{id}                - Update (admin)
//! DELETE /api/products/{id}                - Delete (admin)
//!
//! # Cart (owner or admin)
//! GET    /api/cart/{user_id}               - Cart contents
//! POST   /api/cart/{user_id}               - Add one unit
//! PUT    /api/cart/{user_id}/increase      - Quantity + 1
//! PUT    /api/cart/{user_id}/decrease      - Quantity - 1 (floor 1)
//! DELETE /api/cart/{user_id}/all           - Empty the cart
//! DELETE /api/cart/{user_id}/{product_id}  - Remove a line
//! DELETE /api/cart/{user_id}               - Delete the cart
//!
//! # Wishlist (owner or admin)
//! GET    /api/wishlist/{user_id}
//! POST   /api/wishlist/{user_id}
//! DELETE /api/wishlist/{user_id}/{product_id}
//!
//! # Orders
//! POST   /api/orders                       - Checkout the caller's cart
//! GET    /api/orders                       - All orders (admin)
//! GET    /api/orders/user/{user_id}        - A user's orders (owner or admin)
//! GET    /api/orders/{id}                  - One order (owner or admin)
//! PUT    /api/orders/{id}/status           - Status change (admin)
//! PUT    /api/orders/{id}/cancel           - Cancel while pending (owner)
//!
//! # Payment
//! POST   /api/payment/create-order         - Provider order for an amount
//! ```

pub mod cart;
pub mod orders;
pub mod payment;
pub mod products;
pub mod users;
pub mod wishlist;

use std::str::FromStr;

use axum::{
    Router,
    extract::State,
    http::{Request, Response, StatusCode},
    middleware::from_fn,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

use dreamy_layers_core::ProductId;

use crate::error::{AppError, Result};
use crate::middleware::{
    auth_rate_limiter, build_cors_layer, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// User routes. Login and registration are rate limited when enabled.
pub fn user_routes(rate_limit: bool) -> Router<AppState> {
    let credentials = Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login));
    let credentials = if rate_limit {
        credentials.layer(auth_rate_limiter())
    } else {
        credentials
    };

    Router::new()
        .merge(credentials)
        .route("/logout", post(users::logout))
        .route("/me", get(users::me))
        .route("/", get(users::index))
        .route("/{id}", get(users::show))
        .route("/block/{id}", put(users::block))
        .route("/unblock/{id}", put(users::unblock))
}

/// Product catalog routes.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
}

/// Cart routes.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{user_id}",
            get(cart::show).post(cart::add).delete(cart::destroy),
        )
        .route("/{user_id}/increase", put(cart::increase))
        .route("/{user_id}/decrease", put(cart::decrease))
        .route("/{user_id}/all", delete(cart::clear))
        .route("/{user_id}/{product_id}", delete(cart::remove))
}

/// Wishlist routes.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(wishlist::show).post(wishlist::add))
        .route("/{user_id}/{product_id}", delete(wishlist::remove))
}

/// Order routes.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::index))
        .route("/user/{user_id}", get(orders::for_user))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::update_status))
        .route("/{id}/cancel", put(orders::cancel))
}

/// Payment routes.
pub fn payment_routes() -> Router<AppState> {
    Router::new().route("/create-order", post(payment::create_order))
}

/// All API routes, without middleware.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/users", user_routes(rate_limit))
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/wishlist", wishlist_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/payment", payment_routes())
}

/// The complete application: routes plus the middleware stack.
///
/// The session store is a parameter so tests can run against an in-memory
/// store. Sentry layers are added by the binary.
pub fn app<S>(state: AppState, sessions: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    let cors = build_cors_layer(&state.config().cors);

    routes(state.config().rate_limit)
        .layer(sessions)
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: std::time::Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if storage is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.repos().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Parse an id path segment. Malformed ids name nothing, so they are 404s.
pub(crate) fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("{what} not found")))
}

/// Product id as sent by clients, either a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

/// Reference to a catalog product in a request body.
///
/// Accepts `id`, `_id` or `productId`; any other fields (name, price...)
/// are ignored because the catalog is authoritative.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductRef {
    #[serde(default, alias = "_id", alias = "productId")]
    pub id: Option<RawId>,
}

impl ProductRef {
    /// Resolve to a product id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when no id was sent and
    /// `AppError::NotFound` when it cannot name a product.
    pub fn product_id(&self) -> Result<ProductId> {
        let not_found = || AppError::NotFound("Product not found".to_string());
        match &self.id {
            None => Err(AppError::Validation("Product id is required".to_string())),
            Some(RawId::Number(n)) => i32::try_from(*n)
                .ok()
                .filter(|n| *n > 0)
                .map(ProductId::new)
                .ok_or_else(not_found),
            Some(RawId::Text(s)) => s.trim().parse().map_err(|_| not_found()),
        }
    }
}

/// Body of add-to-cart and add-to-wishlist: `{"product": {"id": ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddProductBody {
    #[serde(default)]
    pub product: ProductRef,
}

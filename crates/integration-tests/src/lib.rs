//! End-to-end test harness for the storefront API.
//!
//! [`TestApp`] builds the real router from [`routes::app`] over in-memory
//! repositories and an in-memory session store, then drives it with
//! `tower::ServiceExt::oneshot`. No database or network is needed:
//!
//! ```bash
//! cargo test -p dreamy-layers-integration-tests
//! ```
//!
//! Each [`TestClient`] keeps its own session cookie, so one test can act as
//! several users at once.

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use dreamy_layers_core::{CurrencyCode, Email, ProductId, UserId, UserRole};
use dreamy_layers_storefront::config::{CorsConfig, StorefrontConfig};
use dreamy_layers_storefront::db::Repositories;
use dreamy_layers_storefront::middleware::{session::SESSION_COOKIE_NAME, session_layer};
use dreamy_layers_storefront::models::NewProduct;
use dreamy_layers_storefront::routes;
use dreamy_layers_storefront::services::auth::{AuthService, Registration};
use dreamy_layers_storefront::services::payment::PaymentGateway;
use dreamy_layers_storefront::services::products::ProductService;
use dreamy_layers_storefront::state::AppState;

/// Password used for every account the harness creates.
pub const PASSWORD: &str = "layer-cake-42";

/// Configuration for an in-process test server.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://unused"),
        host: [127, 0, 0, 1].into(),
        port: 5001,
        base_url: "http://localhost:5001".to_string(),
        cors: CorsConfig::default(),
        rate_limit: false,
        razorpay: None,
        payment_currency: CurrencyCode::INR,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The full application over in-memory storage.
pub struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// An app whose payment provider is `gateway`.
    #[must_use]
    pub fn with_payments(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self::build(Some(gateway))
    }

    fn build(payments: Option<Arc<dyn PaymentGateway>>) -> Self {
        let config = test_config();
        let sessions = session_layer(tower_sessions::MemoryStore::default(), &config);
        let state = AppState::new(config, Repositories::in_memory(), payments);
        let router = routes::app(state.clone(), sessions);
        Self { router, state }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// A client with no session.
    #[must_use]
    pub const fn client(&self) -> TestClient<'_> {
        TestClient {
            app: self,
            cookie: None,
        }
    }

    /// Register through the API, then log in. Returns the client and user id.
    pub async fn customer(&self, name: &str, email: &str) -> (TestClient<'_>, UserId) {
        let mut client = self.client();
        let response = client
            .post(
                "/api/users/register",
                serde_json::json!({ "name": name, "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        let id = client.login(email, PASSWORD).await;
        (client, id)
    }

    /// Create an admin directly in storage and log in as it.
    pub async fn admin(&self) -> TestClient<'_> {
        let registration = Registration {
            name: "Bakery Admin".to_string(),
            email: "admin@dreamylayers.test".to_string(),
            password: PASSWORD.to_string(),
        };
        AuthService::new(self.state.repos())
            .register_with_role(&registration, UserRole::Admin)
            .await
            .unwrap();

        let mut client = self.client();
        client.login(&registration.email, PASSWORD).await;
        client
    }

    /// Add a product to the catalog directly.
    pub async fn product(&self, name: &str, price: i64) -> ProductId {
        ProductService::new(self.state.repos(), self.state.product_cache())
            .create(NewProduct {
                name: name.to_string(),
                price: Decimal::from(price),
                description: format!("{name} from the test oven"),
                image: Some(format!("https://cdn.dreamylayers.test/{price}.jpg")),
                category: Some("cakes".to_string()),
            })
            .await
            .unwrap()
            .id
    }

    /// Whether an account with this email exists.
    pub async fn has_user(&self, email: &str) -> bool {
        let email = Email::parse(email).unwrap();
        self.state
            .repos()
            .users
            .get_credentials(&email)
            .await
            .unwrap()
            .is_some()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// JSON body, `Value::Null` when empty, or the raw text when not JSON.
    pub body: Value,
}

/// A browser-like client holding one session cookie.
pub struct TestClient<'a> {
    app: &'a TestApp,
    cookie: Option<String>,
}

impl TestClient<'_> {
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&mut self, path: &str, body: Value) -> TestResponse {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn post_empty(&mut self, path: &str) -> TestResponse {
        self.send(Method::POST, path, None).await
    }

    pub async fn put(&mut self, path: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn put_empty(&mut self, path: &str) -> TestResponse {
        self.send(Method::PUT, path, None).await
    }

    pub async fn delete(&mut self, path: &str) -> TestResponse {
        self.send(Method::DELETE, path, None).await
    }

    /// Log in and return the user id from the response.
    pub async fn login(&mut self, email: &str, password: &str) -> UserId {
        let response = self
            .post(
                "/api/users/login",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        let id = response.body["user"]["id"].as_i64().unwrap();
        UserId::new(i32::try_from(id).unwrap())
    }

    /// Send a raw request through the router.
    pub async fn request(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.app.router.clone().oneshot(request).await.unwrap();
        self.remember_cookie(response.headers());

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    async fn send(&mut self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.request(request).await
    }

    /// Track the session cookie the way a browser would.
    fn remember_cookie(&mut self, headers: &HeaderMap) {
        let prefix = format!("{SESSION_COOKIE_NAME}=");
        for value in headers.get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let Some(pair) = value.split(';').next() else {
                continue;
            };
            if !pair.starts_with(&prefix) {
                continue;
            }
            let expired = pair.len() == prefix.len() || value.contains("Max-Age=0");
            self.cookie = (!expired).then(|| pair.to_string());
        }
    }
}

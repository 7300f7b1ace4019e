//! CORS policy for the browser frontend.
//!
//! Sessions are cookie based, so credentials are allowed and every origin
//! must be matched explicitly: configured exact origins, configured host
//! suffixes (preview deployments), and optionally localhost on any port.

use std::time::Duration;

use axum::http::{
    HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
    request::Parts,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsConfig;

/// Build the CORS layer from config.
#[must_use]
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let config = config.clone();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .is_ok_and(|origin| is_allowed_origin(&config, origin))
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Whether a browser `Origin` header value may call the API.
#[must_use]
pub fn is_allowed_origin(config: &CorsConfig, origin: &str) -> bool {
    if config.origins.iter().any(|allowed| allowed == origin) {
        return true;
    }

    let Some(host) = origin_host(origin) else {
        return false;
    };

    if config.allow_localhost && matches!(host, "localhost" | "127.0.0.1") {
        return true;
    }

    origin.starts_with("https://")
        && config
            .origin_suffixes
            .iter()
            .any(|suffix| host.ends_with(suffix.as_str()) && host.len() > suffix.len())
}

/// Host part of `scheme://host[:port]`.
fn origin_host(origin: &str) -> Option<&str> {
    let rest = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"))?;
    let host = rest.split([':', '/']).next()?;
    (!host.is_empty()).then_some(host)
}

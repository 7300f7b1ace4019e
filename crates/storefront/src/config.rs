//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DREAMY_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `DREAMY_HOST` - Bind address (default: 127.0.0.1)
//! - `DREAMY_PORT` - Listen port (default: 5001)
//! - `DREAMY_BASE_URL` - Public URL of the API (default: `http://localhost:5001`)
//! - `DREAMY_CORS_ORIGINS` - Comma-separated exact origins allowed by CORS
//! - `DREAMY_CORS_ORIGIN_SUFFIXES` - Comma-separated host suffixes (default: `.vercel.app`)
//! - `DREAMY_CORS_ALLOW_LOCALHOST` - Allow any localhost origin (default: true)
//! - `DREAMY_RATE_LIMIT` - Rate limit login/register (default: true)
//! - `RAZORPAY_KEY_ID` / `RAZORPAY_KEY_SECRET` - Razorpay credentials (both or neither)
//! - `RAZORPAY_API_BASE` - Razorpay API root (default: `https://api.razorpay.com/v1`)
//! - `PAYMENT_CURRENCY` - Currency for payment orders (default: INR)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use dreamy_layers_core::CurrencyCode;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the API
    pub base_url: String,
    /// Allowed cross-origin callers
    pub cors: CorsConfig,
    /// Whether login and registration are rate limited
    pub rate_limit: bool,
    /// Razorpay credentials, if payments are enabled
    pub razorpay: Option<RazorpayConfig>,
    /// Currency used when creating payment orders
    pub payment_currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Exact origins, e.g. `https://dreamylayers.com`
    pub origins: Vec<String>,
    /// Host suffixes, e.g. `.vercel.app` for preview deployments
    pub origin_suffixes: Vec<String>,
    /// Allow `http(s)://localhost:*` and `127.0.0.1`
    pub allow_localhost: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: Vec::new(),
            origin_suffixes: vec![".vercel.app".to_string()],
            allow_localhost: true,
        }
    }
}

/// Razorpay Orders API credentials.
///
/// Implements `Debug` manually to redact the key secret.
#[derive(Clone)]
pub struct RazorpayConfig {
    /// Public key id (sent as the basic-auth username)
    pub key_id: String,
    /// Key secret (sent as the basic-auth password)
    pub key_secret: SecretString,
    /// API root without trailing slash
    pub api_base: String,
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("DREAMY_DATABASE_URL")?;
        let host = parse_env("DREAMY_HOST", "127.0.0.1")?;
        let port = parse_env("DREAMY_PORT", "5001")?;
        let base_url = get_env_or_default("DREAMY_BASE_URL", "http://localhost:5001");

        let cors = CorsConfig {
            origins: get_list_env("DREAMY_CORS_ORIGINS").unwrap_or_default(),
            origin_suffixes: get_list_env("DREAMY_CORS_ORIGIN_SUFFIXES")
                .unwrap_or_else(|| CorsConfig::default().origin_suffixes),
            allow_localhost: parse_bool_env("DREAMY_CORS_ALLOW_LOCALHOST", true)?,
        };
        let rate_limit = parse_bool_env("DREAMY_RATE_LIMIT", true)?;

        let razorpay = RazorpayConfig::from_env()?;
        let payment_currency = get_env_or_default("PAYMENT_CURRENCY", "INR")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("PAYMENT_CURRENCY".to_string(), e))?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_rate_env("SENTRY_SAMPLE_RATE", "1.0")?;
        let sentry_traces_sample_rate = parse_rate_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            cors,
            rate_limit,
            razorpay,
            payment_currency,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl RazorpayConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let key_id = get_optional_env("RAZORPAY_KEY_ID");
        let key_secret = get_optional_env("RAZORPAY_KEY_SECRET");

        match (key_id, key_secret) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar("RAZORPAY_KEY_SECRET".to_string())),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("RAZORPAY_KEY_ID".to_string())),
            (Some(key_id), Some(key_secret)) => {
                validate_secret_strength(&key_secret, "RAZORPAY_KEY_SECRET")?;
                let api_base = get_env_or_default("RAZORPAY_API_BASE", DEFAULT_RAZORPAY_API_BASE)
                    .trim_end_matches('/')
                    .to_string();
                Ok(Some(Self {
                    key_id,
                    key_secret: SecretString::from(key_secret),
                    api_base,
                }))
            }
        }
    }

    /// Basic-auth password.
    #[must_use]
    pub fn secret(&self) -> &str {
        self.key_secret.expose_secret()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a variable (or its default) with `FromStr`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_bool_env(key: &str, default: bool) -> Result<bool, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |value| parse_bool(&value, key))
}

fn parse_bool(value: &str, key: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Parse a sample rate and check it lies in `0.0..=1.0`.
fn parse_rate_env(key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_env(key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

/// Split a comma-separated variable into trimmed, non-empty entries.
fn get_list_env(key: &str) -> Option<Vec<String>> {
    get_optional_env(key).map(|value| split_list(&value))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key secret from the Razorpay dashboard."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/dreamy_layers"),
            host: "127.0.0.1".parse().unwrap(),
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

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-razorpay-key", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("Qm7vT2rXk9LpZ4wN8bYc1HsE", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE", "K").unwrap());
        assert!(!parse_bool("off", "K").unwrap());
        assert!(parse_bool("maybe", "K").is_err());
    }

    #[test]
    fn test_split_list_drops_blanks() {
        assert_eq!(
            split_list(" https://a.com, ,https://b.com ,"),
            vec!["https://a.com".to_string(), "https://b.com".to_string()]
        );
    }

    #[test]
    fn test_socket_addr_and_https() {
        let mut config = config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5001);
        assert!(!config.is_https());

        config.base_url = "https://api.dreamylayers.com".to_string();
        assert!(config.is_https());
    }

    #[test]
    fn test_razorpay_config_debug_redacts_secret() {
        let razorpay = RazorpayConfig {
            key_id: "rzp_test_visible".to_string(),
            key_secret: SecretString::from("hidden_value_123"),
            api_base: DEFAULT_RAZORPAY_API_BASE.to_string(),
        };

        let debug_output = format!("{razorpay:?}");
        assert!(debug_output.contains("rzp_test_visible"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hidden_value_123"));
    }
}

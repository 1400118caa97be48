//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SOUK_API_BASE_URL` - Base URL of the marketplace REST API
//! - `SOUK_API_TOKEN` - API access token (high entropy, no placeholders)
//!
//! ## Optional
//! - `SOUK_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `SOUK_CATALOG_CACHE_TTL_SECS` - Catalog list cache TTL (default: 300)
//! - `SOUK_DRAFT_TTL_SECS` - Checkout draft lifetime (default: 1800)
//! - `SOUK_STATUS_POLL_INTERVAL_SECS` - Order status poll interval (default: 5)
//! - `SOUK_STATUS_POLL_MAX_BACKOFF_SECS` - Poll backoff ceiling (default: 60)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

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
    /// Marketplace REST API configuration
    pub api: ApiConfig,
    /// TTL for cached catalog list responses
    pub catalog_cache_ttl: Duration,
    /// Lifetime of a persisted checkout draft
    pub draft_ttl: Duration,
    /// Base interval between order status polls
    pub status_poll_interval: Duration,
    /// Ceiling for order status poll backoff after errors
    pub status_poll_max_backoff: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Marketplace REST API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL of the REST API (e.g. `https://api.souk.example/v1/`)
    pub base_url: Url,
    /// API access token sent on every request
    pub api_token: SecretString,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &"[REDACTED]")
            .field("request_timeout", &self.request_timeout)
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
    /// if the API token fails validation (placeholder detection, entropy
    /// check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = ApiConfig::from_env()?;
        let catalog_cache_ttl = get_duration_secs("SOUK_CATALOG_CACHE_TTL_SECS", 300)?;
        let draft_ttl = get_duration_secs("SOUK_DRAFT_TTL_SECS", 1800)?;
        let status_poll_interval = get_duration_secs("SOUK_STATUS_POLL_INTERVAL_SECS", 5)?;
        let status_poll_max_backoff = get_duration_secs("SOUK_STATUS_POLL_MAX_BACKOFF_SECS", 60)?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            api,
            catalog_cache_ttl,
            draft_ttl,
            status_poll_interval,
            status_poll_max_backoff,
            sentry_dsn,
            sentry_environment,
        })
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_required_env("SOUK_API_BASE_URL")?;
        let base_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SOUK_API_BASE_URL".to_string(), e.to_string())
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "SOUK_API_BASE_URL".to_string(),
                "must be an absolute http(s) URL".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            api_token: get_validated_secret("SOUK_API_TOKEN")?,
            request_timeout: get_duration_secs("SOUK_REQUEST_TIMEOUT_SECS", 30)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get a duration in whole seconds with a default.
fn get_duration_secs(key: &str, default_secs: u64) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(Duration::from_secs(default_secs)),
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
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

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

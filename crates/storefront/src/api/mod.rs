//! Typed clients for the marketplace REST API.
//!
//! # Architecture
//!
//! - The backend is the source of truth - no local sync, direct API calls
//! - All payloads are JSON over HTTPS; responses are normalized to
//!   canonical types at this boundary so internal code never branches on
//!   upstream shape variants
//! - Catalog list responses are cached in-memory via `moka`
//!
//! # Clients
//!
//! - [`OrdersClient`] - order submission and lookup (the [`OrderApi`] seam)
//! - [`AddressApiClient`] - customer address book CRUD
//! - [`CatalogClient`] - categories, banners, paginated products

mod addresses;
mod catalog;
mod orders;

pub use addresses::AddressApiClient;
pub use catalog::{Banner, CatalogClient, Category, ProductPage, ProductSummary};
pub use orders::{OrderApi, OrdersClient};

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;

/// Errors that can occur when talking to the marketplace API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (unreachable, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a structured error response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON decoding of a response body failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// A request path did not form a valid URL.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Whether this is a transport-level failure (no structured response),
    /// as opposed to an error the backend deliberately returned.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

/// Structured error body the backend attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Shared REST plumbing: base URL joining, auth header, response
/// classification.
#[derive(Clone)]
pub(crate) struct RestClient {
    client: reqwest::Client,
    base_url: Url,
    api_token: String,
}

impl RestClient {
    pub(crate) fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_token: config.api_token.expose_secret().to_string(),
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.base_url.join(path)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        Self::decode(path, response).await
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let url = self.base_url.join(path)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await?;
        Self::decode(path, response).await
    }

    pub(crate) async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let url = self.base_url.join(path)?;
        let response = self
            .client
            .put(url)
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await?;
        Self::decode(path, response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.base_url.join(path)?;
        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        Self::check_status(path, response).await.map(|_| ())
    }

    /// Classify the response status, then decode the body.
    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = Self::check_status(path, response).await?;

        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    path,
                    error = %e,
                    body = %text.chars().take(500).collect::<String>(),
                    "Failed to parse API response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    /// Map non-success statuses to errors, returning the body text on
    /// success for the caller to decode.
    async fn check_status(path: &str, response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        // Read the body as text first for better error diagnostics.
        let text = response.text().await?;

        if !status.is_success() {
            // Prefer the structured `error` field; fall back to a truncated
            // body snippet.
            let message = serde_json::from_str::<ErrorBody>(&text).map_or_else(
                |_| text.chars().take(200).collect::<String>(),
                |body| body.error,
            );
            tracing::error!(
                path,
                status = %status,
                message = %message,
                "API returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(text)
    }
}

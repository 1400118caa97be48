//! Order API client.

use std::future::Future;

use souk_core::OrderId;

use crate::api::{ApiError, RestClient};
use crate::checkout::placement::OrderPayload;
use crate::config::ApiConfig;
use crate::orders::{OrderRecord, OrderReceipt};

/// The seam between checkout orchestration and the external Order API.
///
/// Production uses [`OrdersClient`]; tests substitute scripted
/// implementations.
pub trait OrderApi: Send + Sync {
    /// Submit a vendor-partitioned order payload.
    fn submit_order(
        &self,
        payload: &OrderPayload,
    ) -> impl Future<Output = Result<OrderReceipt, ApiError>> + Send;

    /// Fetch a persisted order.
    fn fetch_order(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<OrderRecord, ApiError>> + Send;
}

/// REST client for the Order API.
#[derive(Clone)]
pub struct OrdersClient {
    rest: RestClient,
}

impl OrdersClient {
    /// Create a new Order API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Ok(Self {
            rest: RestClient::new(config)?,
        })
    }
}

impl OrderApi for OrdersClient {
    async fn submit_order(&self, payload: &OrderPayload) -> Result<OrderReceipt, ApiError> {
        self.rest.post_json("order", payload).await
    }

    async fn fetch_order(&self, id: OrderId) -> Result<OrderRecord, ApiError> {
        self.rest.get_json(&format!("order/{id}")).await
    }
}

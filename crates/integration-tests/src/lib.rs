//! Integration tests for Souk.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p souk-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Full cart-to-order walks against a scripted Order API
//! - `session_state` - Persistence round-trips across store hydration
//!
//! Everything runs in-process: the Order API seam is substituted with
//! scripted implementations from [`ScriptedOrderApi`], so no network or
//! backend is required.

use std::sync::Mutex;

use souk_core::OrderId;
use souk_storefront::api::{ApiError, OrderApi};
use souk_storefront::checkout::placement::OrderPayload;
use souk_storefront::orders::{OrderReceipt, OrderRecord};

/// Scripted stand-in for the remote Order API.
///
/// Records every submitted payload; configured at construction to accept
/// or reject submissions.
pub struct ScriptedOrderApi {
    submissions: Mutex<Vec<OrderPayload>>,
    outcome: Outcome,
}

enum Outcome {
    Accept { order_id: i64 },
    Reject { status: u16, message: String },
}

impl ScriptedOrderApi {
    /// An API that accepts every submission, echoing `order_id`.
    #[must_use]
    pub fn accepting(order_id: i64) -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            outcome: Outcome::Accept { order_id },
        }
    }

    /// An API that rejects every submission with a structured error.
    #[must_use]
    pub fn rejecting(status: u16, message: &str) -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            outcome: Outcome::Reject {
                status,
                message: message.to_string(),
            },
        }
    }

    /// Every payload submitted so far.
    ///
    /// # Panics
    ///
    /// Panics if the recording mutex is poisoned.
    #[must_use]
    pub fn submissions(&self) -> Vec<OrderPayload> {
        self.submissions
            .lock()
            .expect("submission log poisoned")
            .clone()
    }
}

impl OrderApi for ScriptedOrderApi {
    async fn submit_order(&self, payload: &OrderPayload) -> Result<OrderReceipt, ApiError> {
        self.submissions
            .lock()
            .expect("submission log poisoned")
            .push(payload.clone());

        match &self.outcome {
            Outcome::Accept { order_id } => Ok(OrderReceipt {
                order_id: Some(OrderId::new(*order_id)),
                reference: Some(format!("SO-{order_id}")),
            }),
            Outcome::Reject { status, message } => Err(ApiError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }

    async fn fetch_order(&self, id: OrderId) -> Result<OrderRecord, ApiError> {
        Err(ApiError::NotFound(format!("order/{id}")))
    }
}

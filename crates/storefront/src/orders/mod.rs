//! Order records and status watching.

pub mod status;

pub use status::OrderStatusWatcher;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use souk_core::{AddressForm, OrderId, OrderStatus, PaymentMethod, SavedAddress};

/// What the Order API echoes back after accepting a placement.
///
/// Some backends return the created order identifier, some only a display
/// reference, and some nothing at all; callers treat any receipt as
/// success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub reference: Option<String>,
}

impl OrderReceipt {
    /// A generic success token for backends that echo no identifier.
    #[must_use]
    pub const fn accepted() -> Self {
        Self {
            order_id: None,
            reference: None,
        }
    }

    /// Whether the backend identified the created order.
    #[must_use]
    pub const fn is_identified(&self) -> bool {
        self.order_id.is_some() || self.reference.is_some()
    }
}

/// Free-form order metadata the backend persists alongside an order.
///
/// When a customer enters a shipping address manually instead of picking a
/// saved one, it is embedded here rather than attached as an address
/// record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderMetadata {
    #[serde(default)]
    pub billing_address: Option<AddressForm>,
    #[serde(default)]
    pub note: Option<String>,
}

/// A persisted order as returned by `GET /order/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub total: Decimal,
    /// Explicitly attached shipping address record, if any.
    #[serde(default)]
    pub shipping_address: Option<SavedAddress>,
    #[serde(default)]
    pub metadata: OrderMetadata,
}

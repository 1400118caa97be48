//! Checkout flow: draft state, step gating, and order placement.
//!
//! The draft is owned by the active checkout flow. It hydrates from the
//! session cache on entry, is persisted (with a TTL) as step forms mutate
//! it, and is discarded on successful placement or explicit reset.

pub mod address;
pub mod placement;
pub mod steps;

pub use address::{SaveAddressVerdict, SaveBlockedReason, can_save_address, resolve_shipping_address};
pub use placement::{OrderPayload, PlaceOrderError, PlacementRequest, place_order};
pub use steps::{Advance, CheckoutStep, StepController, StepValidator, StepVerdict, validator_fn};

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use souk_core::{AddressForm, PaymentMethod};

use crate::session::{SessionCache, keys};

/// Payment method and (for gateway methods) transaction reference chosen
/// at the payment step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSelection {
    pub method: Option<PaymentMethod>,
    pub reference: Option<String>,
}

/// The in-progress, not-yet-submitted checkout state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutDraft {
    pub billing: AddressForm,
    /// `None` means "ship to the billing address".
    pub shipping: Option<AddressForm>,
    pub payment: PaymentSelection,
    pub active_step: CheckoutStep,
}

impl CheckoutDraft {
    /// Restore the persisted draft, or start fresh if none survives.
    #[must_use]
    pub fn hydrate(session: &SessionCache) -> Self {
        session.get(keys::CHECKOUT_DRAFT).unwrap_or_default()
    }

    /// Persist the draft for `ttl`; an abandoned draft expires on its own.
    pub fn persist(&self, session: &SessionCache, ttl: Duration) {
        if let Err(e) = session.insert_with_ttl(keys::CHECKOUT_DRAFT, self, ttl) {
            warn!(error = %e, "Failed to persist checkout draft");
        }
    }

    /// Discard the persisted draft.
    pub fn reset(session: &SessionCache) {
        session.remove(keys::CHECKOUT_DRAFT);
    }

    /// The address the order ships to.
    #[must_use]
    pub fn shipping_or_billing(&self) -> &AddressForm {
        self.shipping.as_ref().unwrap_or(&self.billing)
    }
}

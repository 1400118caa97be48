//! Order placement orchestration.
//!
//! Converts the cart plus the collected checkout draft into a
//! vendor-partitioned payload, submits it once, and reconciles the
//! outcome: success consumes the entire cart and discards the draft;
//! failure leaves every piece of state untouched for the caller to retry.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use souk_core::{AddressForm, CustomerId, NormalizedAddress, PaymentMethod, ProductId, VariantId, VendorId};

use crate::api::{ApiError, OrderApi};
use crate::orders::OrderReceipt;
use crate::session::SessionCache;
use crate::stores::cart::{Cart, CartStore};

use super::{CheckoutDraft, PaymentSelection};

/// Order placement failures.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The customer must be signed in to place an order.
    #[error("customer is not authenticated")]
    Unauthenticated,

    /// No payment method was selected.
    #[error("no payment method selected")]
    MissingPaymentMethod,

    /// The cart holds nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// The Order API rejected or never received the submission.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// One ordered item within a vendor group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// The per-seller partition of the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorOrder {
    pub vendor_id: VendorId,
    pub items: Vec<OrderItem>,
}

/// The payload submitted to `POST /order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub customer_id: CustomerId,
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<String>,
    pub shipping_address: NormalizedAddress,
    /// Fresh per attempt; the backend deduplicates resubmissions on it.
    pub idempotency_key: Uuid,
    pub vendors: Vec<VendorOrder>,
}

/// Inputs collected by the checkout flow.
#[derive(Debug, Clone, Copy)]
pub struct PlacementRequest<'a> {
    /// `None` when the session is not authenticated.
    pub customer: Option<CustomerId>,
    pub billing: &'a AddressForm,
    /// `None` means "ship to the billing address".
    pub shipping: Option<&'a AddressForm>,
    pub payment: &'a PaymentSelection,
}

/// Place the order described by the cart and the collected checkout data.
///
/// Preconditions are checked before any network activity. The submission
/// itself happens exactly once here - transport-level retries belong to
/// the HTTP client, not this orchestrator.
///
/// On success the cart is cleared in full (a single checkout consumes the
/// entire cart, whichever vendors it spans) and the persisted draft is
/// discarded. On failure neither is touched.
///
/// # Errors
///
/// `Unauthenticated`, `MissingPaymentMethod`, or `EmptyCart` before
/// submission; `Api` wrapping whatever the Order API returned.
#[instrument(skip_all, fields(customer = ?request.customer))]
pub async fn place_order<A: OrderApi>(
    api: &A,
    cart: &CartStore,
    session: &SessionCache,
    request: PlacementRequest<'_>,
) -> Result<OrderReceipt, PlaceOrderError> {
    let customer_id = request.customer.ok_or(PlaceOrderError::Unauthenticated)?;
    let method = request
        .payment
        .method
        .ok_or(PlaceOrderError::MissingPaymentMethod)?;

    let snapshot = cart.snapshot();
    if snapshot.is_empty() {
        return Err(PlaceOrderError::EmptyCart);
    }

    let payload = build_payload(&snapshot, customer_id, method, &request);
    if payload.vendors.is_empty() {
        return Err(PlaceOrderError::EmptyCart);
    }

    info!(
        idempotency_key = %payload.idempotency_key,
        vendors = payload.vendors.len(),
        items = snapshot.total_items(),
        total = %snapshot.total_price(),
        "Submitting order"
    );

    let receipt = api.submit_order(&payload).await?;

    // Single checkout consumes the entire cart.
    cart.clear();
    CheckoutDraft::reset(session);

    info!(order_id = ?receipt.order_id, "Order placed");
    Ok(receipt)
}

/// Partition the cart by vendor into the wire shape.
fn build_payload(
    cart: &Cart,
    customer_id: CustomerId,
    payment_method: PaymentMethod,
    request: &PlacementRequest<'_>,
) -> OrderPayload {
    let vendors = cart
        .vendors
        .iter()
        .map(|(&vendor_id, group)| VendorOrder {
            vendor_id,
            items: group
                .items
                .iter()
                .filter(|line| line.quantity >= 1)
                .map(|line| OrderItem {
                    product_id: line.product_id,
                    variant_id: line.variant_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    line_total: line.line_total(),
                })
                .collect::<Vec<_>>(),
        })
        .filter(|vendor| !vendor.items.is_empty())
        .collect();

    let shipping = request.shipping.unwrap_or(request.billing);

    OrderPayload {
        customer_id,
        payment_method,
        payment_reference: request.payment.reference.clone(),
        shipping_address: NormalizedAddress::from(shipping),
        idempotency_key: Uuid::new_v4(),
        vendors,
    }
}

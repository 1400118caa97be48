//! Full checkout flow: cart mutations, step-gated validation, placement,
//! and reconciliation of the outcome against session state.

use std::time::Duration;

use rust_decimal::Decimal;

use souk_core::{AddressForm, CustomerId, PaymentMethod, ProductId, VendorId};
use souk_integration_tests::ScriptedOrderApi;
use souk_storefront::checkout::placement::{PlacementRequest, place_order};
use souk_storefront::checkout::steps::{
    Advance, CheckoutStep, StepController, StepVerdict, validator_fn,
};
use souk_storefront::checkout::{CheckoutDraft, PaymentSelection, PlaceOrderError};
use souk_storefront::session::{SessionCache, keys};
use souk_storefront::stores::cart::{CartLine, CartStore};

fn line(vendor: i64, product: i64, price: i64, quantity: u32) -> CartLine {
    CartLine {
        product_id: ProductId::new(product),
        variant_id: None,
        vendor_id: VendorId::new(vendor),
        vendor_name: format!("vendor-{vendor}"),
        name: format!("product-{product}"),
        unit_price: Decimal::from(price),
        quantity,
        image_ref: None,
    }
}

fn billing() -> AddressForm {
    AddressForm {
        full_name: "Rahim Uddin".to_string(),
        phone: "01700000000".to_string(),
        line1: "12 Lake Road".to_string(),
        area: "Banani".to_string(),
        city: "Dhaka".to_string(),
        postal_code: "1213".to_string(),
        ..AddressForm::default()
    }
}

fn payment() -> PaymentSelection {
    PaymentSelection {
        method: Some(PaymentMethod::CashOnDelivery),
        reference: None,
    }
}

/// Walks the whole flow: two vendors in the cart, billing and payment
/// collected step by step, placement succeeds, cart and draft are
/// consumed.
#[tokio::test]
async fn test_two_vendor_checkout_end_to_end() {
    let session = SessionCache::new();
    let cart = CartStore::hydrate(session.clone());
    cart.add(line(1, 1, 500, 2)).expect("add");
    cart.add(line(2, 2, 1000, 1)).expect("add");
    assert_eq!(cart.total_items(), 3);
    assert_eq!(cart.total_price(), Decimal::from(2000));

    // Step through checkout, persisting the draft as the forms fill in.
    let mut draft = CheckoutDraft::hydrate(&session);
    let mut controller = StepController::starting_at(draft.active_step);
    controller.register_validator(
        CheckoutStep::Billing,
        validator_fn(|draft| StepVerdict::from(!draft.billing.phone.is_empty())),
    );
    controller.register_validator(
        CheckoutStep::Payment,
        validator_fn(|draft| {
            if draft.payment.method.is_some() {
                StepVerdict::Valid
            } else {
                StepVerdict::invalid("#payment-method")
            }
        }),
    );

    // Billing form incomplete: blocked in place.
    assert_eq!(
        controller.go_next(&draft).await,
        Advance::Blocked { focus: None }
    );
    assert_eq!(controller.active(), CheckoutStep::Billing);

    draft.billing = billing();
    draft.persist(&session, Duration::from_secs(1800));
    assert_eq!(
        controller.go_next(&draft).await,
        Advance::Moved(CheckoutStep::Shipping)
    );

    // No shipping validator registered: advances freely.
    assert_eq!(
        controller.go_next(&draft).await,
        Advance::Moved(CheckoutStep::Payment)
    );

    // Payment step blocks until a method is chosen, naming the field.
    assert_eq!(
        controller.go_next(&draft).await,
        Advance::Blocked {
            focus: Some("#payment-method".to_string())
        }
    );
    draft.payment = payment();
    draft.persist(&session, Duration::from_secs(1800));
    assert_eq!(
        controller.go_next(&draft).await,
        Advance::Moved(CheckoutStep::Review)
    );

    // Review: place the order.
    let api = ScriptedOrderApi::accepting(1001);
    let receipt = place_order(
        &api,
        &cart,
        &session,
        PlacementRequest {
            customer: Some(CustomerId::new(7)),
            billing: &draft.billing,
            shipping: draft.shipping.as_ref(),
            payment: &draft.payment,
        },
    )
    .await
    .expect("placement succeeds");

    assert!(receipt.is_identified());
    assert_eq!(receipt.reference.as_deref(), Some("SO-1001"));

    // Payload: one group per vendor, line totals computed.
    let submissions = api.submissions();
    assert_eq!(submissions.len(), 1);
    let payload = &submissions[0];
    assert_eq!(payload.vendors.len(), 2);
    assert!(payload.vendors.iter().all(|v| !v.items.is_empty()));
    let totals: Vec<Decimal> = payload
        .vendors
        .iter()
        .flat_map(|v| &v.items)
        .map(|item| item.line_total)
        .collect();
    assert_eq!(totals, vec![Decimal::from(1000), Decimal::from(1000)]);
    assert_eq!(payload.shipping_address.city, "Dhaka");

    // Success consumed everything: cart empty (both vendors) and the
    // persisted draft discarded.
    assert_eq!(cart.total_items(), 0);
    assert!(cart.snapshot().is_empty());
    assert!(session.get::<CheckoutDraft>(keys::CHECKOUT_DRAFT).is_none());
}

/// A rejected placement surfaces the backend's message and leaves the
/// session exactly as it was.
#[tokio::test]
async fn test_rejected_placement_preserves_session_state() {
    let session = SessionCache::new();
    let cart = CartStore::hydrate(session.clone());
    cart.add(line(1, 1, 500, 2)).expect("add");
    cart.add(line(2, 2, 1000, 1)).expect("add");

    let draft = CheckoutDraft {
        billing: billing(),
        payment: payment(),
        active_step: CheckoutStep::Review,
        ..CheckoutDraft::default()
    };
    draft.persist(&session, Duration::from_secs(1800));

    let api = ScriptedOrderApi::rejecting(422, "vendor 2 is closed");
    let result = place_order(
        &api,
        &cart,
        &session,
        PlacementRequest {
            customer: Some(CustomerId::new(7)),
            billing: &draft.billing,
            shipping: None,
            payment: &draft.payment,
        },
    )
    .await;

    match result {
        Err(PlaceOrderError::Api(err)) => {
            assert_eq!(err.to_string(), "API error (422): vendor 2 is closed");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    assert_eq!(cart.total_items(), 3);
    assert_eq!(cart.total_price(), Decimal::from(2000));
    assert_eq!(
        session.get::<CheckoutDraft>(keys::CHECKOUT_DRAFT),
        Some(draft)
    );
}

/// Double-submitting (e.g. a double click the shell failed to debounce)
/// sends two distinct idempotency keys, so the backend can deduplicate.
#[tokio::test]
async fn test_resubmission_rotates_idempotency_key() {
    let session = SessionCache::new();
    let cart = CartStore::hydrate(session.clone());
    cart.add(line(1, 1, 500, 1)).expect("add");

    let api = ScriptedOrderApi::rejecting(503, "temporarily unavailable");
    let draft_billing = billing();
    let selection = payment();
    for _ in 0..2 {
        let _ = place_order(
            &api,
            &cart,
            &session,
            PlacementRequest {
                customer: Some(CustomerId::new(7)),
                billing: &draft_billing,
                shipping: None,
                payment: &selection,
            },
        )
        .await;
    }

    let submissions = api.submissions();
    assert_eq!(submissions.len(), 2);
    assert_ne!(
        submissions[0].idempotency_key,
        submissions[1].idempotency_key
    );
}

/// Preconditions short-circuit before any submission reaches the API.
#[tokio::test]
async fn test_precondition_failures_never_submit() {
    let session = SessionCache::new();
    let cart = CartStore::hydrate(session.clone());
    let api = ScriptedOrderApi::accepting(1);
    let draft_billing = billing();

    // Empty cart.
    let selection = payment();
    let result = place_order(
        &api,
        &cart,
        &session,
        PlacementRequest {
            customer: Some(CustomerId::new(7)),
            billing: &draft_billing,
            shipping: None,
            payment: &selection,
        },
    )
    .await;
    assert!(matches!(result, Err(PlaceOrderError::EmptyCart)));

    // No payment method.
    cart.add(line(1, 1, 500, 1)).expect("add");
    let no_method = PaymentSelection::default();
    let result = place_order(
        &api,
        &cart,
        &session,
        PlacementRequest {
            customer: Some(CustomerId::new(7)),
            billing: &draft_billing,
            shipping: None,
            payment: &no_method,
        },
    )
    .await;
    assert!(matches!(result, Err(PlaceOrderError::MissingPaymentMethod)));

    // Unauthenticated.
    let selection = payment();
    let result = place_order(
        &api,
        &cart,
        &session,
        PlacementRequest {
            customer: None,
            billing: &draft_billing,
            shipping: None,
            payment: &selection,
        },
    )
    .await;
    assert!(matches!(result, Err(PlaceOrderError::Unauthenticated)));

    assert!(api.submissions().is_empty());
    assert_eq!(cart.total_items(), 1);
}

//! Unified error handling with Sentry integration.
//!
//! Provides a unified `StorefrontError` type plus the mapping from every
//! failure class to the copy a host shell renders. No error escapes as an
//! unhandled rejection: call sites catch, call [`StorefrontError::report`]
//! (which captures internal classes to Sentry), and surface
//! [`StorefrontError::user_message`] as a toast or inline message.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::placement::PlaceOrderError;
use crate::config::ConfigError;
use crate::stores::cart::CartError;

/// Application-level error type for the storefront session.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration loading failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A marketplace API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A cart mutation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Order placement failed.
    #[error("Order placement error: {0}")]
    Placement(#[from] PlaceOrderError),
}

impl StorefrontError {
    /// The message a host shell shows the customer for this error.
    ///
    /// Structured backend errors are surfaced verbatim; transport-level
    /// failures get a generic retry prompt.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(_) => "The store is misconfigured. Please try again later.".to_string(),
            Self::Api(api) => api_user_message(api),
            Self::Cart(cart) => match cart {
                CartError::InvalidQuantity(_) => "Quantities must be at least 1.".to_string(),
                CartError::InvalidUnitPrice(_) => {
                    "That item cannot be added right now.".to_string()
                }
                CartError::LineNotFound { .. } => {
                    "That item is no longer in your cart.".to_string()
                }
            },
            Self::Placement(placement) => match placement {
                PlaceOrderError::Unauthenticated => {
                    "Please sign in to place your order.".to_string()
                }
                PlaceOrderError::MissingPaymentMethod => {
                    "Select a payment method to continue.".to_string()
                }
                PlaceOrderError::EmptyCart => "Your cart is empty.".to_string(),
                PlaceOrderError::Api(api) => api_user_message(api),
            },
        }
    }

    /// Capture internal error classes to Sentry and log the rest.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::warn!(error = %self, "Storefront error");
        }
    }

    /// Internal classes are unexpected (transport, decoding, config);
    /// everything else is a customer-recoverable outcome.
    fn is_internal(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Api(api) | Self::Placement(PlaceOrderError::Api(api)) => {
                matches!(api, ApiError::Http(_) | ApiError::Parse(_) | ApiError::Url(_))
            }
            Self::Cart(_) | Self::Placement(_) => false,
        }
    }
}

fn api_user_message(api: &ApiError) -> String {
    match api {
        ApiError::Http(_) => {
            "Could not reach the store. Please check your connection and try again.".to_string()
        }
        // The backend's message is already customer-facing.
        ApiError::Api { message, .. } => message.clone(),
        ApiError::Parse(_) | ApiError::Url(_) => {
            "Something went wrong. Please try again.".to_string()
        }
        ApiError::NotFound(_) => "We couldn't find what you were looking for.".to_string(),
        ApiError::RateLimited(_) => {
            "Too many requests. Please wait a moment and try again.".to_string()
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_api_message_is_surfaced_verbatim() {
        let err = StorefrontError::Api(ApiError::Api {
            status: 422,
            message: "Item sold out".to_string(),
        });
        assert_eq!(err.user_message(), "Item sold out");
    }

    #[test]
    fn test_placement_precondition_messages() {
        assert_eq!(
            StorefrontError::Placement(PlaceOrderError::EmptyCart).user_message(),
            "Your cart is empty."
        );
        assert_eq!(
            StorefrontError::Placement(PlaceOrderError::MissingPaymentMethod).user_message(),
            "Select a payment method to continue."
        );
        assert_eq!(
            StorefrontError::Placement(PlaceOrderError::Unauthenticated).user_message(),
            "Please sign in to place your order."
        );
    }

    #[test]
    fn test_cart_errors_are_not_internal() {
        let err = StorefrontError::Cart(CartError::InvalidQuantity(0));
        assert!(!err.is_internal());
    }

    #[test]
    fn test_parse_failures_are_internal() {
        let parse_err =
            serde_json::from_str::<u32>("not json").expect_err("must fail");
        let err = StorefrontError::Api(ApiError::Parse(parse_err));
        assert!(err.is_internal());
    }
}

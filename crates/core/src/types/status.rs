//! Status enums for orders and payment selection.

use serde::{Deserialize, Serialize};

/// Order lifecycle status as reported by the Order API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether this status ends the order lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Processing => write!(f, "processing"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Payment method selected at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CashOnDelivery,
    Card,
    MobileWallet,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CashOnDelivery => write!(f, "cash_on_delivery"),
            Self::Card => write!(f, "card"),
            Self::MobileWallet => write!(f, "mobile_wallet"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash_on_delivery" => Ok(Self::CashOnDelivery),
            "card" => Ok(Self::Card),
            "mobile_wallet" => Ok(Self::MobileWallet),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_terminal() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
    }

    #[test]
    fn test_payment_method_roundtrip() {
        for method in [
            PaymentMethod::CashOnDelivery,
            PaymentMethod::Card,
            PaymentMethod::MobileWallet,
        ] {
            let parsed: PaymentMethod = method.to_string().parse().expect("parse");
            assert_eq!(parsed, method);
        }
    }

    #[test]
    fn test_order_status_serde_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Shipped).expect("serialize");
        assert_eq!(json, "\"shipped\"");
    }
}

//! Address types shared between checkout and the Address API.

use serde::{Deserialize, Serialize};

use crate::types::id::AddressId;

/// Kind of saved address. A customer keeps at most one of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AddressType {
    #[default]
    Home,
    Office,
}

impl std::fmt::Display for AddressType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "home"),
            Self::Office => write!(f, "office"),
        }
    }
}

/// Address data as collected by the billing/shipping step forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AddressForm {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub area: String,
    pub city: String,
    pub postal_code: String,
    pub address_type: AddressType,
    /// Whether the customer asked to persist this address to their book.
    pub save_address: bool,
}

/// A persisted address from the customer's address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAddress {
    pub id: AddressId,
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub area: String,
    pub city: String,
    pub postal_code: String,
    pub address_type: AddressType,
}

/// The single address shape downstream consumers (invoices, status pages)
/// see, regardless of whether it came from an attached shipping record or
/// from billing data embedded in order metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedAddress {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub area: String,
    pub city: String,
    pub postal_code: String,
}

impl From<&AddressForm> for NormalizedAddress {
    fn from(form: &AddressForm) -> Self {
        Self {
            full_name: form.full_name.clone(),
            phone: form.phone.clone(),
            line1: form.line1.clone(),
            area: form.area.clone(),
            city: form.city.clone(),
            postal_code: form.postal_code.clone(),
        }
    }
}

impl From<&SavedAddress> for NormalizedAddress {
    fn from(saved: &SavedAddress) -> Self {
        Self {
            full_name: saved.full_name.clone(),
            phone: saved.phone.clone(),
            line1: saved.line1.clone(),
            area: saved.area.clone(),
            city: saved.city.clone(),
            postal_code: saved.postal_code.clone(),
        }
    }
}

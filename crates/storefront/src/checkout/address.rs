//! Address reconciliation rules.
//!
//! Two pure decision functions: which address an order effectively shipped
//! to, and whether a billing address is eligible for saving to the
//! customer's book. Neither touches the network - callers act on the
//! verdicts.

use souk_core::{AddressForm, AddressType, NormalizedAddress, SavedAddress};

use crate::orders::OrderRecord;

/// A customer keeps at most this many saved addresses.
pub const MAX_SAVED_ADDRESSES: usize = 2;

/// Why an address may not be saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveBlockedReason {
    /// The address book is full.
    CapReached,
    /// An address of this type (home/office) already exists.
    DuplicateType(AddressType),
    /// An address with the same line1/area/city already exists.
    DuplicateContent,
}

impl std::fmt::Display for SaveBlockedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapReached => write!(f, "address book is full ({MAX_SAVED_ADDRESSES} max)"),
            Self::DuplicateType(kind) => write!(f, "a {kind} address is already saved"),
            Self::DuplicateContent => write!(f, "this address is already saved"),
        }
    }
}

/// Verdict of [`can_save_address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAddressVerdict {
    Allowed,
    Blocked(SaveBlockedReason),
}

impl SaveAddressVerdict {
    /// Whether saving may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Decide whether `billing` may be persisted to the address book.
///
/// Checks, in order: the address cap, a duplicate address type, and
/// duplicate content (normalized `line1 + area + city`). Pure - callers
/// decide whether to actually persist.
#[must_use]
pub fn can_save_address(billing: &AddressForm, existing: &[SavedAddress]) -> SaveAddressVerdict {
    if existing.len() >= MAX_SAVED_ADDRESSES {
        return SaveAddressVerdict::Blocked(SaveBlockedReason::CapReached);
    }

    if existing
        .iter()
        .any(|saved| saved.address_type == billing.address_type)
    {
        return SaveAddressVerdict::Blocked(SaveBlockedReason::DuplicateType(
            billing.address_type,
        ));
    }

    let candidate = content_key(&billing.line1, &billing.area, &billing.city);
    if existing
        .iter()
        .any(|saved| content_key(&saved.line1, &saved.area, &saved.city) == candidate)
    {
        return SaveAddressVerdict::Blocked(SaveBlockedReason::DuplicateContent);
    }

    SaveAddressVerdict::Allowed
}

/// The address an order effectively shipped to.
///
/// Priority: (a) the explicitly attached shipping record, else (b) the
/// billing address embedded in order metadata, else `None`. Invoice
/// rendering depends on seeing one normalized shape whichever source won.
#[must_use]
pub fn resolve_shipping_address(order: &OrderRecord) -> Option<NormalizedAddress> {
    order
        .shipping_address
        .as_ref()
        .map(NormalizedAddress::from)
        .or_else(|| {
            order
                .metadata
                .billing_address
                .as_ref()
                .map(NormalizedAddress::from)
        })
}

fn content_key(line1: &str, area: &str, city: &str) -> String {
    format!(
        "{}|{}|{}",
        normalize(line1),
        normalize(area),
        normalize(city)
    )
}

fn normalize(part: &str) -> String {
    part.trim().to_lowercase()
}

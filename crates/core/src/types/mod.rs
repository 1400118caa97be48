//! Core types for Souk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod id;
pub mod status;

pub use address::{AddressForm, AddressType, NormalizedAddress, SavedAddress};
pub use id::*;
pub use status::*;

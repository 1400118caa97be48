//! Souk Core - Shared types library.
//!
//! This crate provides common types used across all Souk components:
//! - `storefront` - The client-session engine (cart, checkout, orders)
//! - `integration-tests` - Cross-module flow tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, statuses, and addresses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

//! Souk Storefront - client-session engine for a multi-vendor marketplace.
//!
//! This crate provides the state and orchestration core a storefront shell
//! embeds: vendor-partitioned cart and wishlist stores, the step-gated
//! checkout flow, order placement against the remote Order API, address
//! book rules, and a session-scoped persistent cache.
//!
//! # Architecture
//!
//! - The backend is the source of truth for catalog and orders - thin typed
//!   REST clients in [`api`], no local sync
//! - Session state (cart, wishlist, checkout draft) lives in the
//!   [`session::SessionCache`] and is re-read on hydration
//! - Catalog list responses are cached in-memory via `moka`
//!
//! Rendering, authentication UI, and the backend itself are out of scope;
//! everything here is callable from whatever shell hosts the session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod orders;
pub mod session;
pub mod state;
pub mod stores;
pub mod telemetry;

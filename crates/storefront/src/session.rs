//! Session-scoped persistent cache.
//!
//! The Rust stand-in for browser sessionStorage: a namespaced key-value
//! store with process lifetime. Cart, wishlist, and checkout draft
//! snapshots persist here without expiry; read-through caches (categories,
//! banners) persist with a TTL stamped as an absolute deadline at write
//! time. A read past the deadline misses and evicts the entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Fixed keys for session-persisted state.
pub mod keys {
    /// Key for the persisted cart snapshot (never expires).
    pub const CART: &str = "souk.cart";

    /// Key for the persisted wishlist snapshot (never expires).
    pub const WISHLIST: &str = "souk.wishlist";

    /// Key for the in-progress checkout draft (TTL'd).
    pub const CHECKOUT_DRAFT: &str = "souk.checkout.draft";

    /// Prefix for catalog-domain cache entries.
    pub const CATALOG_PREFIX: &str = "souk.catalog.";
}

struct Entry {
    payload: serde_json::Value,
    expires_at: Option<Instant>,
}

/// Session-scoped key-value cache with optional per-entry TTL.
///
/// Cheaply cloneable; clones share the same underlying store. Writes
/// serialize through an internal mutex, matching the single-state-owner
/// model of the session.
#[derive(Clone, Default)]
pub struct SessionCache {
    inner: Arc<Mutex<HashMap<String, Entry>>>,
}

impl SessionCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value with no expiry.
    ///
    /// # Errors
    ///
    /// Returns the serialization error if the value cannot be represented
    /// as JSON. Callers persisting snapshots treat this as a warning, not a
    /// failure of the mutation itself.
    pub fn insert<T: Serialize>(&self, key: &str, value: &T) -> Result<(), serde_json::Error> {
        let payload = serde_json::to_value(value)?;
        self.insert_entry(key, payload, None);
        Ok(())
    }

    /// Insert a value that expires `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns the serialization error if the value cannot be represented
    /// as JSON.
    pub fn insert_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), serde_json::Error> {
        self.insert_with_ttl_at(key, value, ttl, Instant::now())
    }

    /// Read a value, evicting it first if its deadline has passed.
    ///
    /// Returns `None` on a missing, expired, or undecodable entry. An
    /// undecodable entry (e.g. a snapshot written by an older build) is
    /// evicted and logged, never surfaced as an error.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, Instant::now())
    }

    /// Remove an entry, returning whether it existed.
    pub fn remove(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Remove every entry under a domain prefix.
    pub fn clear_domain(&self, prefix: &str) {
        self.lock().retain(|key, _| !key.starts_with(prefix));
    }

    fn insert_with_ttl_at<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
        now: Instant,
    ) -> Result<(), serde_json::Error> {
        let payload = serde_json::to_value(value)?;
        self.insert_entry(key, payload, Some(now + ttl));
        Ok(())
    }

    fn get_at<T: DeserializeOwned>(&self, key: &str, now: Instant) -> Option<T> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;

        if entry.expires_at.is_some_and(|deadline| now > deadline) {
            entries.remove(key);
            return None;
        }

        let payload = entry.payload.clone();
        match serde_json::from_value(payload) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Evicting undecodable session entry");
                entries.remove(key);
                None
            }
        }
    }

    fn insert_entry(&self, key: &str, payload: serde_json::Value, expires_at: Option<Instant>) {
        self.lock()
            .insert(key.to_string(), Entry { payload, expires_at });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        // A poisoned lock only means a panic mid-write; the map itself is
        // still structurally sound.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! Wishlist store.
//!
//! Set semantics: at most one entry per product. Persistence and hydration
//! mirror the cart store under an independent session key.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::warn;

use souk_core::ProductId;

use crate::session::{SessionCache, keys};

/// A saved product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub brand: Option<String>,
    pub primary_image: Option<String>,
    pub category_path: Option<String>,
}

/// The wishlist state owner.
pub struct WishlistStore {
    session: SessionCache,
    state: Mutex<BTreeMap<ProductId, WishlistEntry>>,
    tx: watch::Sender<Vec<WishlistEntry>>,
}

impl WishlistStore {
    /// Create a store hydrated from the persisted session snapshot, if any.
    #[must_use]
    pub fn hydrate(session: SessionCache) -> Self {
        let entries: BTreeMap<ProductId, WishlistEntry> =
            session.get(keys::WISHLIST).unwrap_or_default();
        let (tx, _rx) = watch::channel(entries.values().cloned().collect());
        Self {
            session,
            state: Mutex::new(entries),
            tx,
        }
    }

    /// Add the product if absent, remove it if present. Returns the new
    /// membership state.
    pub fn toggle(&self, entry: WishlistEntry) -> bool {
        let mut entries = self.lock();
        let member = match entries.remove(&entry.product_id) {
            Some(_) => false,
            None => {
                entries.insert(entry.product_id, entry);
                true
            }
        };
        self.commit(entries);
        member
    }

    /// Remove a product, returning whether it was present.
    pub fn remove(&self, product_id: ProductId) -> bool {
        let mut entries = self.lock();
        let removed = entries.remove(&product_id).is_some();
        if removed {
            self.commit(entries);
        }
        removed
    }

    /// Empty the wishlist.
    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.clear();
        self.commit(entries);
    }

    /// Pure membership lookup.
    #[must_use]
    pub fn is_in_wishlist(&self, product_id: ProductId) -> bool {
        self.lock().contains_key(&product_id)
    }

    /// Saved entries, ordered by product ID.
    #[must_use]
    pub fn entries(&self) -> Vec<WishlistEntry> {
        self.lock().values().cloned().collect()
    }

    /// Number of saved products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no products are saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Subscribe to wishlist updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<WishlistEntry>> {
        self.tx.subscribe()
    }

    fn commit(&self, guard: MutexGuard<'_, BTreeMap<ProductId, WishlistEntry>>) {
        let snapshot = guard.clone();
        drop(guard);

        if let Err(e) = self.session.insert(keys::WISHLIST, &snapshot) {
            warn!(error = %e, "Failed to persist wishlist snapshot");
        }
        self.tx.send_replace(snapshot.into_values().collect());
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ProductId, WishlistEntry>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entry(product: i64) -> WishlistEntry {
        WishlistEntry {
            product_id: ProductId::new(product),
            name: format!("product-{product}"),
            price: Decimal::from(250),
            brand: None,
            primary_image: None,
            category_path: Some("women/shoes".to_string()),
        }
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let wishlist = WishlistStore::hydrate(SessionCache::new());

        assert!(wishlist.toggle(entry(1)));
        assert!(wishlist.is_in_wishlist(ProductId::new(1)));

        assert!(!wishlist.toggle(entry(1)));
        assert!(!wishlist.is_in_wishlist(ProductId::new(1)));
        assert!(wishlist.is_empty());
    }

    #[test]
    fn test_at_most_one_entry_per_product() {
        let wishlist = WishlistStore::hydrate(SessionCache::new());
        wishlist.toggle(entry(1));
        wishlist.toggle(entry(2));
        wishlist.toggle(entry(2));
        wishlist.toggle(entry(2));

        assert_eq!(wishlist.len(), 2);
    }

    #[test]
    fn test_remove_reports_membership() {
        let wishlist = WishlistStore::hydrate(SessionCache::new());
        wishlist.toggle(entry(1));

        assert!(wishlist.remove(ProductId::new(1)));
        assert!(!wishlist.remove(ProductId::new(1)));
    }

    #[test]
    fn test_clear_then_empty() {
        let wishlist = WishlistStore::hydrate(SessionCache::new());
        wishlist.toggle(entry(1));
        wishlist.toggle(entry(2));

        wishlist.clear();
        assert!(wishlist.entries().is_empty());
    }

    #[test]
    fn test_persists_across_hydration() {
        let session = SessionCache::new();
        let wishlist = WishlistStore::hydrate(session.clone());
        wishlist.toggle(entry(1));
        wishlist.toggle(entry(2));

        let rehydrated = WishlistStore::hydrate(session);
        assert_eq!(rehydrated.len(), 2);
        assert!(rehydrated.is_in_wishlist(ProductId::new(1)));
    }
}

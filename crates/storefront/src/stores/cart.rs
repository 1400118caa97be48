//! Multi-vendor cart store.
//!
//! The cart is partitioned by vendor, since checkout splits a single cart
//! into per-seller sub-orders. Lines are unique by `(product_id,
//! variant_id)` within a vendor; adding an existing line increments its
//! quantity. A vendor group that loses its last line is removed - the cart
//! never holds empty groups.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::warn;

use souk_core::{ProductId, VariantId, VendorId};

use crate::session::{SessionCache, keys};

/// Cart mutation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Quantities below 1 are rejected; callers wanting zero should remove
    /// the line instead.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// Unit prices are never negative.
    #[error("invalid unit price: {0}")]
    InvalidUnitPrice(Decimal),

    /// The addressed line does not exist in the cart.
    #[error("no such line: product {product_id} in vendor {vendor_id}")]
    LineNotFound {
        vendor_id: VendorId,
        product_id: ProductId,
    },
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub vendor_id: VendorId,
    pub vendor_name: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub image_ref: Option<String>,
}

impl CartLine {
    /// Total price of this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Lines belonging to one vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorGroup {
    pub vendor_name: String,
    pub items: Vec<CartLine>,
}

/// Immutable cart snapshot: vendor-partitioned lines plus derived totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub vendors: BTreeMap<VendorId, VendorGroup>,
}

impl Cart {
    /// Whether the cart holds no lines at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }

    /// Sum of quantities across all vendors.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.vendors
            .values()
            .flat_map(|group| &group.items)
            .map(|line| line.quantity)
            .sum()
    }

    /// Sum of `unit_price * quantity` across all vendors.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.vendors
            .values()
            .flat_map(|group| &group.items)
            .map(CartLine::line_total)
            .sum()
    }

    fn find_line_mut(
        &mut self,
        vendor_id: VendorId,
        product_id: ProductId,
        variant_id: Option<VariantId>,
    ) -> Option<&mut CartLine> {
        self.vendors.get_mut(&vendor_id)?.items.iter_mut().find(
            |line| line.product_id == product_id && line.variant_id == variant_id,
        )
    }
}

/// The cart state owner.
///
/// All mutations go through `&self` methods and serialize on an internal
/// mutex; every mutation persists the full snapshot to the session cache
/// (no TTL - the cart never auto-expires) and publishes it to watchers.
pub struct CartStore {
    session: SessionCache,
    state: Mutex<Cart>,
    tx: watch::Sender<Cart>,
}

impl CartStore {
    /// Create a store hydrated from the persisted session snapshot, if any.
    #[must_use]
    pub fn hydrate(session: SessionCache) -> Self {
        let cart: Cart = session.get(keys::CART).unwrap_or_default();
        let (tx, _rx) = watch::channel(cart.clone());
        Self {
            session,
            state: Mutex::new(cart),
            tx,
        }
    }

    /// Insert a line, or merge it into an existing line for the same
    /// `(product_id, variant_id)` under the same vendor by adding
    /// quantities. Returns the updated snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for a zero quantity and
    /// `CartError::InvalidUnitPrice` for a negative unit price.
    pub fn add(&self, line: CartLine) -> Result<Cart, CartError> {
        if line.quantity < 1 {
            return Err(CartError::InvalidQuantity(line.quantity));
        }
        if line.unit_price < Decimal::ZERO {
            return Err(CartError::InvalidUnitPrice(line.unit_price));
        }

        let mut cart = self.lock();
        let added = line.quantity;
        let merged = cart
            .find_line_mut(line.vendor_id, line.product_id, line.variant_id)
            .map(|existing| existing.quantity += added)
            .is_some();
        if !merged {
            let group = cart
                .vendors
                .entry(line.vendor_id)
                .or_insert_with(|| VendorGroup {
                    vendor_name: line.vendor_name.clone(),
                    items: Vec::new(),
                });
            group.items.push(line);
        }
        Ok(self.commit(cart))
    }

    /// Replace the quantity of an existing line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for `quantity < 1` (call
    /// [`Self::remove`] instead) and `CartError::LineNotFound` when the
    /// addressed line does not exist.
    pub fn update_quantity(
        &self,
        vendor_id: VendorId,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let mut cart = self.lock();
        let line = cart
            .find_line_mut(vendor_id, product_id, variant_id)
            .ok_or(CartError::LineNotFound {
                vendor_id,
                product_id,
            })?;
        line.quantity = quantity;
        Ok(self.commit(cart))
    }

    /// Delete a line; the vendor group goes with it if it becomes empty.
    /// Removing a line that is not present is a no-op.
    pub fn remove(
        &self,
        vendor_id: VendorId,
        product_id: ProductId,
        variant_id: Option<VariantId>,
    ) -> Cart {
        let mut cart = self.lock();
        if let Some(group) = cart.vendors.get_mut(&vendor_id) {
            group
                .items
                .retain(|line| !(line.product_id == product_id && line.variant_id == variant_id));
            if group.items.is_empty() {
                cart.vendors.remove(&vendor_id);
            }
        }
        self.commit(cart)
    }

    /// Empty the entire cart.
    pub fn clear(&self) -> Cart {
        let mut cart = self.lock();
        cart.vendors.clear();
        self.commit(cart)
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.lock().clone()
    }

    /// Sum of quantities across all vendors.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lock().total_items()
    }

    /// Sum of `unit_price * quantity` across all vendors.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lock().total_price()
    }

    /// Subscribe to snapshot updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.tx.subscribe()
    }

    fn commit(&self, guard: MutexGuard<'_, Cart>) -> Cart {
        let snapshot = guard.clone();
        drop(guard);

        if let Err(e) = self.session.insert(keys::CART, &snapshot) {
            warn!(error = %e, "Failed to persist cart snapshot");
        }
        self.tx.send_replace(snapshot.clone());
        snapshot
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(vendor: i64, product: i64, price: Decimal, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(product),
            variant_id: None,
            vendor_id: VendorId::new(vendor),
            vendor_name: format!("vendor-{vendor}"),
            name: format!("product-{product}"),
            unit_price: price,
            quantity,
            image_ref: None,
        }
    }

    fn store() -> CartStore {
        CartStore::hydrate(SessionCache::new())
    }

    #[test]
    fn test_add_merges_same_product_and_variant() {
        let cart = store();
        cart.add(line(1, 10, Decimal::from(100), 1)).unwrap();
        let snapshot = cart.add(line(1, 10, Decimal::from(100), 2)).unwrap();

        assert_eq!(snapshot.total_items(), 3);
        assert_eq!(snapshot.vendors.len(), 1);
        let group = &snapshot.vendors[&VendorId::new(1)];
        assert_eq!(group.items.len(), 1);
    }

    #[test]
    fn test_add_distinct_variants_are_separate_lines() {
        let cart = store();
        let mut a = line(1, 10, Decimal::from(100), 1);
        a.variant_id = Some(VariantId::new(1));
        let mut b = line(1, 10, Decimal::from(100), 1);
        b.variant_id = Some(VariantId::new(2));

        cart.add(a).unwrap();
        let snapshot = cart.add(b).unwrap();
        assert_eq!(snapshot.vendors[&VendorId::new(1)].items.len(), 2);
    }

    #[test]
    fn test_add_rejects_zero_quantity() {
        let cart = store();
        assert_eq!(
            cart.add(line(1, 10, Decimal::from(100), 0)),
            Err(CartError::InvalidQuantity(0))
        );
    }

    #[test]
    fn test_add_rejects_negative_price() {
        let cart = store();
        assert_eq!(
            cart.add(line(1, 10, Decimal::from(-1), 1)),
            Err(CartError::InvalidUnitPrice(Decimal::from(-1)))
        );
    }

    #[test]
    fn test_totals_across_vendors() {
        let cart = store();
        cart.add(line(1, 1, Decimal::from(500), 2)).unwrap();
        cart.add(line(2, 2, Decimal::from(1000), 1)).unwrap();

        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Decimal::from(2000));
    }

    #[test]
    fn test_totals_unaffected_by_operation_order() {
        // Same final line state reached along two different paths.
        let a = store();
        a.add(line(1, 1, Decimal::from(500), 1)).unwrap();
        a.add(line(2, 2, Decimal::from(1000), 1)).unwrap();
        a.add(line(1, 1, Decimal::from(500), 1)).unwrap();

        let b = store();
        b.add(line(2, 2, Decimal::from(1000), 1)).unwrap();
        b.add(line(1, 1, Decimal::from(500), 2)).unwrap();

        assert_eq!(a.total_items(), b.total_items());
        assert_eq!(a.total_price(), b.total_price());
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_update_quantity_replaces() {
        let cart = store();
        cart.add(line(1, 10, Decimal::from(100), 5)).unwrap();
        let snapshot = cart
            .update_quantity(VendorId::new(1), ProductId::new(10), None, 2)
            .unwrap();
        assert_eq!(snapshot.total_items(), 2);
    }

    #[test]
    fn test_update_quantity_rejects_zero() {
        let cart = store();
        cart.add(line(1, 10, Decimal::from(100), 1)).unwrap();
        assert_eq!(
            cart.update_quantity(VendorId::new(1), ProductId::new(10), None, 0),
            Err(CartError::InvalidQuantity(0))
        );
    }

    #[test]
    fn test_update_quantity_missing_line() {
        let cart = store();
        assert!(matches!(
            cart.update_quantity(VendorId::new(1), ProductId::new(10), None, 2),
            Err(CartError::LineNotFound { .. })
        ));
    }

    #[test]
    fn test_remove_last_line_drops_vendor_group() {
        let cart = store();
        cart.add(line(1, 10, Decimal::from(100), 1)).unwrap();
        cart.add(line(1, 11, Decimal::from(200), 1)).unwrap();

        cart.remove(VendorId::new(1), ProductId::new(10), None);
        assert!(cart.snapshot().vendors.contains_key(&VendorId::new(1)));

        let snapshot = cart.remove(VendorId::new(1), ProductId::new(11), None);
        assert!(!snapshot.vendors.contains_key(&VendorId::new(1)));
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_clear_empties_everything() {
        let cart = store();
        cart.add(line(1, 1, Decimal::from(500), 2)).unwrap();
        cart.add(line(2, 2, Decimal::from(1000), 1)).unwrap();

        let snapshot = cart.clear();
        assert!(snapshot.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_mutations_persist_and_hydrate() {
        let session = SessionCache::new();
        let cart = CartStore::hydrate(session.clone());
        cart.add(line(1, 1, Decimal::from(500), 2)).unwrap();
        cart.add(line(2, 2, Decimal::from(1000), 1)).unwrap();

        // A fresh store over the same session sees the same state.
        let rehydrated = CartStore::hydrate(session);
        assert_eq!(rehydrated.total_items(), 3);
        assert_eq!(rehydrated.total_price(), Decimal::from(2000));
        assert_eq!(rehydrated.snapshot(), cart.snapshot());
    }

    #[test]
    fn test_subscribe_observes_mutations() {
        let cart = store();
        let rx = cart.subscribe();
        cart.add(line(1, 1, Decimal::from(500), 1)).unwrap();
        assert_eq!(rx.borrow().total_items(), 1);
    }
}

//! Session persistence round-trips: stores write snapshots on every
//! mutation and fresh stores hydrate to an equivalent view, the way a
//! page reload re-reads persisted state.

use rust_decimal::Decimal;

use souk_core::{ProductId, VariantId, VendorId};
use souk_storefront::session::SessionCache;
use souk_storefront::stores::cart::{CartLine, CartStore};
use souk_storefront::stores::wishlist::{WishlistEntry, WishlistStore};

fn line(vendor: i64, product: i64, price: i64, quantity: u32) -> CartLine {
    CartLine {
        product_id: ProductId::new(product),
        variant_id: None,
        vendor_id: VendorId::new(vendor),
        vendor_name: format!("vendor-{vendor}"),
        name: format!("product-{product}"),
        unit_price: Decimal::from(price),
        quantity,
        image_ref: None,
    }
}

#[test]
fn test_cart_hydrates_equivalent_store() {
    let session = SessionCache::new();
    let cart = CartStore::hydrate(session.clone());
    cart.add(line(1, 1, 500, 2)).expect("add");
    let mut variant = line(1, 1, 500, 1);
    variant.variant_id = Some(VariantId::new(42));
    cart.add(variant).expect("add");
    cart.add(line(2, 2, 1000, 1)).expect("add");
    cart.update_quantity(VendorId::new(2), ProductId::new(2), None, 3)
        .expect("update");

    // Simulates a page reload: a second tab-load reads the same session.
    let reloaded = CartStore::hydrate(session);
    assert_eq!(reloaded.snapshot(), cart.snapshot());
    assert_eq!(reloaded.total_items(), 6);
    assert_eq!(reloaded.total_price(), Decimal::from(4500));
}

#[test]
fn test_cart_and_wishlist_keys_are_independent() {
    let session = SessionCache::new();
    let cart = CartStore::hydrate(session.clone());
    let wishlist = WishlistStore::hydrate(session.clone());

    cart.add(line(1, 1, 500, 1)).expect("add");
    wishlist.toggle(WishlistEntry {
        product_id: ProductId::new(9),
        name: "Clay Mug".to_string(),
        price: Decimal::from(120),
        brand: Some("Clay & Co".to_string()),
        primary_image: None,
        category_path: Some("home/kitchen".to_string()),
    });

    // Clearing one store leaves the other's persisted snapshot intact.
    cart.clear();
    let reloaded_wishlist = WishlistStore::hydrate(session.clone());
    assert!(reloaded_wishlist.is_in_wishlist(ProductId::new(9)));

    let reloaded_cart = CartStore::hydrate(session);
    assert!(reloaded_cart.snapshot().is_empty());
}

#[test]
fn test_remove_last_line_is_persisted_without_vendor_group() {
    let session = SessionCache::new();
    let cart = CartStore::hydrate(session.clone());
    cart.add(line(1, 1, 500, 1)).expect("add");
    cart.remove(VendorId::new(1), ProductId::new(1), None);

    let reloaded = CartStore::hydrate(session);
    assert!(reloaded.snapshot().is_empty());
    assert!(!reloaded.snapshot().vendors.contains_key(&VendorId::new(1)));
}

//! Session state stores.
//!
//! Each store is the single owner of its state: mutations serialize
//! through an internal mutex, persist a full snapshot to the session
//! cache, and publish the snapshot on a watch channel so independent UI
//! surfaces observe a consistent view.

pub mod cart;
pub mod wishlist;

pub use cart::{Cart, CartError, CartLine, CartStore, VendorGroup};
pub use wishlist::{WishlistEntry, WishlistStore};

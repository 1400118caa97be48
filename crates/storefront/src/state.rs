//! Application state shared across the session.

use std::sync::Arc;

use souk_core::OrderId;

use crate::api::{AddressApiClient, ApiError, CatalogClient, OrdersClient};
use crate::config::StorefrontConfig;
use crate::orders::OrderStatusWatcher;
use crate::session::SessionCache;
use crate::stores::{CartStore, WishlistStore};

/// Application state shared across all UI surfaces of the session.
///
/// This struct is cheaply cloneable via `Arc` and is the explicit state
/// owner: every surface reads the same stores and clients through it
/// instead of ambient globals.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    session: SessionCache,
    cart: CartStore,
    wishlist: WishlistStore,
    catalog: CatalogClient,
    orders: OrdersClient,
    addresses: AddressApiClient,
}

impl AppState {
    /// Create state with a fresh session cache.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        Self::with_session(config, SessionCache::new())
    }

    /// Create state over an existing session cache, hydrating the cart and
    /// wishlist from whatever snapshots it holds.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client fails to build.
    pub fn with_session(
        config: StorefrontConfig,
        session: SessionCache,
    ) -> Result<Self, ApiError> {
        let catalog = CatalogClient::new(&config.api, config.catalog_cache_ttl)?;
        let orders = OrdersClient::new(&config.api)?;
        let addresses = AddressApiClient::new(&config.api)?;
        let cart = CartStore::hydrate(session.clone());
        let wishlist = WishlistStore::hydrate(session.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                session,
                cart,
                wishlist,
                catalog,
                orders,
                addresses,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the session cache.
    #[must_use]
    pub fn session(&self) -> &SessionCache {
        &self.inner.session
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the wishlist store.
    #[must_use]
    pub fn wishlist(&self) -> &WishlistStore {
        &self.inner.wishlist
    }

    /// Get a reference to the catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the Order API client.
    #[must_use]
    pub fn orders(&self) -> &OrdersClient {
        &self.inner.orders
    }

    /// Get a reference to the Address API client.
    #[must_use]
    pub fn addresses(&self) -> &AddressApiClient {
        &self.inner.addresses
    }

    /// Start watching an order's status with the configured poll cadence.
    #[must_use]
    pub fn watch_order(&self, order_id: OrderId) -> OrderStatusWatcher {
        OrderStatusWatcher::spawn(
            self.inner.orders.clone(),
            order_id,
            self.inner.config.status_poll_interval,
            self.inner.config.status_poll_max_backoff,
        )
    }
}

//! Order status subscription.
//!
//! Polls the Order API on a fixed interval and dispatches status
//! transitions on a watch channel, so order status pages update without
//! ambient socket state. Poll errors back off exponentially with jitter
//! up to a ceiling; the next success restores the base interval. The loop
//! ends when a terminal status is observed or the watcher is dropped.

use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use souk_core::{OrderId, OrderStatus};

use crate::api::OrderApi;

/// Handle to a background order status poller.
///
/// Dropping the watcher stops the poll loop.
pub struct OrderStatusWatcher {
    rx: watch::Receiver<OrderStatus>,
    handle: JoinHandle<()>,
}

impl OrderStatusWatcher {
    /// Spawn a poller for `order_id`.
    ///
    /// `poll_interval` is the base cadence; `max_backoff` caps the delay
    /// after consecutive errors.
    #[must_use]
    pub fn spawn<A>(
        api: A,
        order_id: OrderId,
        poll_interval: Duration,
        max_backoff: Duration,
    ) -> Self
    where
        A: OrderApi + 'static,
    {
        let (tx, rx) = watch::channel(OrderStatus::Pending);
        let handle = tokio::spawn(poll_loop(api, order_id, tx, poll_interval, max_backoff));
        Self { rx, handle }
    }

    /// Subscribe to status transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<OrderStatus> {
        self.rx.clone()
    }

    /// The most recently observed status.
    #[must_use]
    pub fn latest(&self) -> OrderStatus {
        *self.rx.borrow()
    }

    /// Whether the poll loop has ended (terminal status observed).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for OrderStatusWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn poll_loop<A: OrderApi>(
    api: A,
    order_id: OrderId,
    tx: watch::Sender<OrderStatus>,
    base: Duration,
    max_backoff: Duration,
) {
    let mut delay = base;
    let mut backoff = base;

    loop {
        tokio::time::sleep(delay).await;

        match api.fetch_order(order_id).await {
            Ok(record) => {
                backoff = base;
                delay = base;

                let status = record.status;
                tx.send_if_modified(|current| {
                    if *current == status {
                        false
                    } else {
                        *current = status;
                        true
                    }
                });

                if status.is_terminal() {
                    debug!(%order_id, %status, "Order reached terminal status; stopping watcher");
                    break;
                }
            }
            Err(e) => {
                backoff = (backoff * 2).min(max_backoff);
                delay = jitter(backoff);
                warn!(%order_id, error = %e, next_poll = ?delay, "Order status poll failed");
            }
        }
    }
}

/// Spread a delay by up to +25% so reconnecting sessions don't align.
fn jitter(base: Duration) -> Duration {
    let millis = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    let spread = millis / 4;
    if spread == 0 {
        return base;
    }
    base + Duration::from_millis(rand::rng().random_range(0..spread))
}

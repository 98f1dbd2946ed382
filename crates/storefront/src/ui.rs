//! UI event-binding helpers.
//!
//! Rapid add-to-cart clicks are collapsed here, at the input boundary. The
//! store itself applies every mutation immediately; the debouncer decides
//! which clicks become mutations at all.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use pinebrook_core::ProductId;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cart::CartStore;

/// Quiet period after the last click before the add is applied.
pub const ADD_DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// Trailing-edge debouncer for add-to-cart clicks, keyed per product.
///
/// A burst of clicks for one product collapses to a single add applied
/// after the quiet period. Clicks for different products within the window
/// are independent: each product gets its own timer, so adding "A" then "B"
/// in quick succession applies both.
pub struct AddDebouncer {
    store: Arc<Mutex<CartStore>>,
    window: Duration,
    pending: Mutex<HashMap<ProductId, JoinHandle<()>>>,
}

impl AddDebouncer {
    /// Create a debouncer over a shared cart store.
    #[must_use]
    pub fn new(store: Arc<Mutex<CartStore>>, window: Duration) -> Self {
        Self {
            store,
            window,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Register an add-to-cart click.
    ///
    /// Supersedes any pending add for the same product; the add fires after
    /// the quiet period elapses without another click for that product.
    pub async fn press(&self, product_id: ProductId) {
        let mut pending = self.pending.lock().await;

        if let Some(previous) = pending.remove(&product_id) {
            debug!(pid = %product_id, "Superseding pending add");
            previous.abort();
        }

        let store = Arc::clone(&self.store);
        let window = self.window;
        let id = product_id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            store.lock().await.add(&id);
        });

        pending.insert(product_id, handle);
    }

    /// Wait until every pending add has fired or been superseded.
    pub async fn settle(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut pending = self.pending.lock().await;
            pending.drain().map(|(_, handle)| handle).collect()
        };
        for handle in handles {
            // Superseded adds resolve as aborted; that is their point
            let _ = handle.await;
        }
    }
}

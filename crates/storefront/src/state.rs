//! Application state shared across pages and commands.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::ApiClient;
use crate::cart::persist::CartFile;
use crate::cart::CartStore;
use crate::config::ClientConfig;
use crate::error::AppError;

/// Shared storefront state.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the API client, configuration, and the in-memory cart.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: ClientConfig,
    api: ApiClient,
    cart: Mutex<CartStore>,
    cart_file: CartFile,
}

impl Storefront {
    /// Create the storefront state, loading the cart snapshot from disk.
    ///
    /// A missing snapshot file starts an empty cart; a corrupt one is an
    /// error so a real cart is never silently discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built or the cart
    /// snapshot exists but cannot be parsed.
    pub fn new(config: ClientConfig) -> Result<Self, AppError> {
        let api = ApiClient::new(&config)?;
        let cart_file = CartFile::new(&config.cart_file);
        let cart = cart_file.load()?;

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                cart: Mutex::new(cart),
                cart_file,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// The in-memory cart. Mutations go through this lock; nothing touches
    /// disk until [`Storefront::save_cart`].
    #[must_use]
    pub fn cart(&self) -> &Mutex<CartStore> {
        &self.inner.cart
    }

    /// Persist the current cart to its snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub async fn save_cart(&self) -> Result<(), AppError> {
        let cart = self.inner.cart.lock().await;
        self.inner.cart_file.save(&cart)?;
        Ok(())
    }
}

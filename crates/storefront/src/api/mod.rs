//! Pinebrook backend API client.
//!
//! # Architecture
//!
//! - Plain REST JSON over `reqwest` with a cookie store, so every request
//!   carries the session cookie (the browser's `credentials: 'include'`)
//! - The backend is source of truth - catalog data is never stored locally,
//!   only cached in-memory via `moka` (5 minute TTL)
//! - State-changing requests replay the CSRF token captured from the
//!   session check: `_csrf` in POST bodies, `CSRF-Token` header on order reads
//!
//! # Example
//!
//! ```rust,ignore
//! use pinebrook_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config)?;
//!
//! let status = client.check_auth().await?;
//! let products = client.products(&CategoryId::new("1")).await?;
//! let detail = client.product_detail(&products[0].pid).await?;
//! ```

mod cache;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use pinebrook_core::{CategoryId, ProductId};

use crate::config::ClientConfig;

use cache::CacheValue;
use types::{
    AuthStatus, Category, ChangePasswordRequest, ErrorBody, LoginRequest, LoginResponse,
    LogoutRequest, Order, ProductDetail, ProductSummary,
};

/// Errors that can occur when talking to the Pinebrook backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport failed (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend responded with a non-success status.
    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint path could not be resolved against the base URL.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// The message the backend attached to a rejection, if any.
    ///
    /// Used by the presentation boundary for login and change-password
    /// failures, where the backend's reason is shown verbatim.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Backend { message, .. } => Some(message),
            _ => None,
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Pinebrook backend REST API.
///
/// Cheaply cloneable via `Arc`. Catalog lookups are cached for 5 minutes;
/// session and order reads always hit the backend.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: url::Url,
    cache: Cache<String, CacheValue>,
    csrf_token: RwLock<Option<SecretString>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.http_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
                cache,
                csrf_token: RwLock::new(None),
            }),
        })
    }

    /// The CSRF token captured from the last session check, or empty.
    async fn csrf_token(&self) -> String {
        self.inner
            .csrf_token
            .read()
            .await
            .as_ref()
            .map(|token| token.expose_secret().to_string())
            .unwrap_or_default()
    }

    /// Parse a response body, mapping non-success statuses to typed errors.
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|e| e.error)
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse backend response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    /// Issue a GET request with optional query parameters.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.inner.base_url.join(path)?;
        let response = self.inner.client.get(url).query(query).send().await?;
        Self::read_json(response).await
    }

    /// Issue a GET request carrying the CSRF token header (order reads).
    async fn get_json_csrf<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.inner.base_url.join(path)?;
        let response = self
            .inner
            .client
            .get(url)
            .header("Content-Type", "application/json")
            .header("CSRF-Token", self.csrf_token().await)
            .send()
            .await?;
        Self::read_json(response).await
    }

    /// Issue a POST request with a JSON body.
    async fn post_json<B: serde::Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.inner.base_url.join(path)?;
        let response = self.inner.client.post(url).json(body).send().await?;
        Self::read_json(response).await
    }

    // =========================================================================
    // Session Methods
    // =========================================================================

    /// Check the current session status.
    ///
    /// Captures the CSRF token from the response for later state-changing
    /// requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn check_auth(&self) -> Result<AuthStatus, ApiError> {
        let status: AuthStatus = self.get_json("/check-auth", &[]).await?;

        if let Some(token) = &status.csrf_token {
            *self.inner.csrf_token.write().await = Some(SecretString::from(token.clone()));
        }

        Ok(status)
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Backend` with the backend's reason if the
    /// credentials are rejected.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let csrf = self.csrf_token().await;
        self.post_json(
            "/login",
            &LoginRequest {
                email,
                password,
                csrf: &csrf,
            },
        )
        .await
    }

    /// Log out the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let csrf = self.csrf_token().await;
        let url = self.inner.base_url.join("/logout")?;
        let response = self
            .inner
            .client
            .post(url)
            .json(&LogoutRequest { csrf: &csrf })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|e| e.error)
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    /// Change the current user's password.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Backend` with the backend's reason on rejection
    /// (wrong current password, policy violation, ...).
    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let csrf = self.csrf_token().await;
        let _: serde_json::Value = self
            .post_json(
                "/change-password",
                &ChangePasswordRequest {
                    current_password,
                    new_password,
                    csrf: &csrf,
                },
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get the full category listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get_json("/", &[]).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Get the ancestor path of a category for breadcrumb rendering.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(catid = %catid))]
    pub async fn category_path(&self, catid: &CategoryId) -> Result<Vec<Category>, ApiError> {
        self.get_json("/categories", &[("catid", catid.as_str())])
            .await
    }

    /// Get the products of a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(catid = %catid))]
    pub async fn products(&self, catid: &CategoryId) -> Result<Vec<ProductSummary>, ApiError> {
        let cache_key = format!("products:{catid}");

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<ProductSummary> = self
            .get_json("/products", &[("catid", catid.as_str())])
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get the authoritative detail (name, price) for a single product.
    ///
    /// This is the lookup the cart render fans out over.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(pid = %pid))]
    pub async fn product_detail(&self, pid: &ProductId) -> Result<ProductDetail, ApiError> {
        let cache_key = format!("detail:{pid}");

        if let Some(CacheValue::Detail(detail)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product detail");
            return Ok(*detail);
        }

        let detail: ProductDetail = self
            .get_json("/getProductDetails", &[("pid", pid.as_str())])
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Detail(Box::new(detail.clone())))
            .await;

        Ok(detail)
    }

    /// Get the product page sections for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(pid = %pid))]
    pub async fn product_sections(&self, pid: &ProductId) -> Result<Vec<ProductDetail>, ApiError> {
        self.get_json("/productInformation", &[("pid", pid.as_str())])
            .await
    }

    /// Get the breadcrumb path for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(pid = %pid))]
    pub async fn product_path(&self, pid: &ProductId) -> Result<Vec<ProductSummary>, ApiError> {
        self.get_json("/productPath", &[("pid", pid.as_str())])
            .await
    }

    /// Get the flat product listing used by the admin management selects.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn product_list(&self) -> Result<Vec<ProductSummary>, ApiError> {
        self.get_json("/productList", &[]).await
    }

    // =========================================================================
    // Order Methods (not cached - session-scoped state)
    // =========================================================================

    /// Get the signed-in member's recent orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not authenticated or the request
    /// fails.
    #[instrument(skip(self))]
    pub async fn member_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get_json_csrf("/memberOrdersTable").await
    }

    /// Get all orders (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not an admin or the request fails.
    #[instrument(skip(self))]
    pub async fn admin_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get_json_csrf("/adminOrdersTable").await
    }
}

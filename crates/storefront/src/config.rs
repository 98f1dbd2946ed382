//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PINEBROOK_API_BASE_URL` - Backend origin (e.g., <http://localhost:3000>)
//!
//! ## Optional
//! - `PINEBROOK_CART_FILE` - Cart snapshot path (default: cart.json)
//! - `PINEBROOK_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend API origin. All endpoint paths are joined onto this URL.
    pub api_base_url: Url,
    /// Path of the local cart snapshot file.
    pub cart_file: PathBuf,
    /// Blanket timeout applied to every HTTP request.
    pub http_timeout: Duration,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_required_env("PINEBROOK_API_BASE_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PINEBROOK_API_BASE_URL".to_string(), e.to_string())
            })?;
        let cart_file = PathBuf::from(get_env_or_default("PINEBROOK_CART_FILE", "cart.json"));
        let timeout_secs = get_env_or_default("PINEBROOK_HTTP_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "PINEBROOK_HTTP_TIMEOUT_SECS".to_string(),
                    e.to_string(),
                )
            })?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api_base_url,
            cart_file,
            http_timeout: Duration::from_secs(timeout_secs),
            sentry_dsn,
        })
    }

    /// Resolve an endpoint path against the API base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the path cannot be joined onto the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
        self.api_base_url.join(path).map_err(|e| {
            ConfigError::InvalidEnvVar("PINEBROOK_API_BASE_URL".to_string(), e.to_string())
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

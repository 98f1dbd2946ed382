//! Integration tests for the Pinebrook storefront client.
//!
//! These tests run against a live backend and are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! # Point at the backend under test
//! export PINEBROOK_API_BASE_URL=http://localhost:3000
//!
//! # Seeded member credentials for the account flow tests
//! export PINEBROOK_TEST_EMAIL=shopper@example.com
//! export PINEBROOK_TEST_PASSWORD=...
//!
//! cargo test -p pinebrook-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - Category and product endpoint shapes
//! - `account` - Login, logout, and session gate flows
//! - `cart_pricing` - Cart pricing against live catalog data

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use pinebrook_storefront::config::ClientConfig;

/// Base URL of the backend under test.
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("PINEBROOK_API_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Client configuration for the backend under test, with an isolated
/// per-run cart snapshot so tests never touch a real cart file.
///
/// # Panics
///
/// Panics if the configured base URL is not a valid URL.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_config() -> ClientConfig {
    ClientConfig {
        api_base_url: api_base_url().parse().unwrap(),
        cart_file: std::env::temp_dir()
            .join(format!("pinebrook-itest-{}.json", uuid::Uuid::new_v4())),
        http_timeout: Duration::from_secs(10),
        sentry_dsn: None,
    }
}

/// A cookie-holding HTTP client for raw endpoint tests.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn raw_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// Seeded member credentials, if provided by the environment.
#[must_use]
pub fn member_credentials() -> Option<(String, String)> {
    let email = std::env::var("PINEBROOK_TEST_EMAIL").ok()?;
    let password = std::env::var("PINEBROOK_TEST_PASSWORD").ok()?;
    Some((email, password))
}

//! Unified error handling with Sentry integration.
//!
//! Every failure funnels into `AppError` and is surfaced at exactly one
//! presentation boundary: [`AppError::present`]. Page and command code
//! returns `Result<T, AppError>` and never prints error text itself.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::persist::CartStorageError;
use crate::config::ConfigError;
use crate::session::AccountError;
use crate::upload::UploadError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Backend API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Cart snapshot could not be read or written.
    #[error("Cart storage error: {0}")]
    CartStorage(#[from] CartStorageError),

    /// Login, logout or password change failed.
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// Image file rejected before upload.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Template rendering failed.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// Bad command-line input.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this error is worth a Sentry event.
    ///
    /// Transport failures, broken snapshots and render bugs are ours;
    /// backend rejections and bad user input are not.
    fn is_reportable(&self) -> bool {
        match self {
            Self::Api(ApiError::Http(_) | ApiError::Parse(_) | ApiError::InvalidUrl(_)) => true,
            Self::Account(AccountError::Api(
                ApiError::Http(_) | ApiError::Parse(_) | ApiError::InvalidUrl(_),
            )) => true,
            Self::CartStorage(_) | Self::Render(_) | Self::Config(_) => true,
            Self::Api(_) | Self::Account(_) | Self::Upload(_) | Self::BadRequest(_) => false,
        }
    }

    /// The single presentation boundary.
    ///
    /// Captures reportable errors to Sentry, logs every error, and returns
    /// the one line shown to the user. Backend rejection messages for
    /// account operations are passed through verbatim, matching what the
    /// server intends the user to read; everything else gets a generic
    /// message so internals never leak into the page.
    #[must_use]
    pub fn present(&self) -> String {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Storefront error");
        } else {
            tracing::warn!(error = %self, "Storefront error");
        }

        match self {
            Self::Account(AccountError::Api(api)) => api
                .backend_message()
                .map_or_else(|| "Network error, please try again later".to_string(), ToString::to_string),
            Self::Account(err) => err.to_string(),
            Self::Api(ApiError::NotFound(_)) => "Product not found".to_string(),
            Self::Api(ApiError::Backend { message, .. }) => message.clone(),
            Self::Api(_) => "Failed to load data, please try again later".to_string(),
            Self::Upload(err) => err.to_string(),
            Self::BadRequest(message) => message.clone(),
            Self::CartStorage(_) => "Saved cart could not be loaded".to_string(),
            Self::Config(_) | Self::Render(_) => "Internal error".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_account_rejection_surfaces_backend_message() {
        let err = AppError::Account(AccountError::Api(ApiError::Backend {
            status: 401,
            message: "Invalid email or password".to_string(),
        }));
        assert_eq!(err.present(), "Invalid email or password");
    }

    #[test]
    fn test_password_mismatch_is_client_side() {
        let err = AppError::Account(AccountError::PasswordMismatch);
        assert!(!err.is_reportable());
        assert_eq!(err.present(), "new passwords do not match");
    }

    #[test]
    fn test_transport_errors_are_reportable_and_generic() {
        let parse: serde_json::Error = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = AppError::Api(ApiError::Parse(parse));
        assert!(err.is_reportable());
        assert_eq!(err.present(), "Failed to load data, please try again later");
    }

    #[test]
    fn test_missing_product_has_its_own_message() {
        let err = AppError::Api(ApiError::NotFound("pid 99".to_string()));
        assert_eq!(err.present(), "Product not found");
    }
}

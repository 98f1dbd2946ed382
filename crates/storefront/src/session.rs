//! Session gate and account flows.
//!
//! The session check yields a three-state display switch - guest, member,
//! admin - that drives nav labels, which account forms are shown, and the
//! admin page guard. It is re-evaluated on every page load and after
//! login/logout; there is no transition table beyond that.

use pinebrook_core::{Email, EmailError};
use tracing::instrument;

use crate::api::types::AuthStatus;
use crate::api::{ApiClient, ApiError};

/// Who is looking at the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Guest,
    Member { email: Option<Email> },
    Admin { email: Option<Email> },
}

impl Viewer {
    /// Whether this viewer may see the admin page.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin { .. })
    }

    /// Whether this viewer is signed in at all.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Guest)
    }

    /// The user-display text: the email, or "Guest".
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Guest => "Guest",
            Self::Member { email } | Self::Admin { email } => {
                email.as_ref().map_or("", Email::as_str)
            }
        }
    }

    /// Nav button label and destination for this viewer.
    #[must_use]
    pub const fn nav_link(&self) -> (&'static str, &'static str) {
        match self {
            Self::Guest => ("Login", "login.html"),
            Self::Member { .. } => ("Member Panel/Logout", "login.html"),
            Self::Admin { .. } => ("Admin Panel/Logout", "admin.html"),
        }
    }
}

impl From<AuthStatus> for Viewer {
    fn from(status: AuthStatus) -> Self {
        if !status.authenticated {
            return Self::Guest;
        }
        if status.is_admin {
            Self::Admin {
                email: status.email,
            }
        } else {
            Self::Member {
                email: status.email,
            }
        }
    }
}

/// Where to send the browser after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Index,
    Login,
    Admin,
}

impl Destination {
    /// The page path for this destination.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Index => "index.html",
            Self::Login => "login.html",
            Self::Admin => "admin.html",
        }
    }
}

/// Guard for the admin page context.
///
/// # Errors
///
/// Returns the login redirect for anyone who is not an admin.
pub const fn admin_gate(viewer: &Viewer) -> Result<(), Destination> {
    if viewer.is_admin() {
        Ok(())
    } else {
        Err(Destination::Login)
    }
}

/// Errors from account flows.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Email failed client-side validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// New password and confirmation differ.
    #[error("new passwords do not match")]
    PasswordMismatch,

    /// Backend call failed or was rejected.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Log in, returning where to send the user on success.
///
/// # Errors
///
/// Returns an error if the email is structurally invalid or the backend
/// rejects the credentials.
#[instrument(skip(api, password), fields(email = %email))]
pub async fn login(
    api: &ApiClient,
    email: &str,
    password: &str,
) -> Result<Destination, AccountError> {
    let email = Email::parse(email)?;
    let response = api.login(email.as_str(), password).await?;
    Ok(if response.is_admin {
        Destination::Admin
    } else {
        Destination::Index
    })
}

/// Log out, returning the login page destination.
///
/// # Errors
///
/// Returns an error if the backend call fails.
#[instrument(skip(api))]
pub async fn logout(api: &ApiClient) -> Result<Destination, AccountError> {
    api.logout().await?;
    Ok(Destination::Login)
}

/// Change the current user's password, then force a fresh login.
///
/// The confirmation-match check happens client-side, before any request is
/// made. On success the session is logged out so the user re-authenticates
/// with the new password.
///
/// # Errors
///
/// Returns `PasswordMismatch` without touching the network if the
/// confirmation differs, or the backend's rejection otherwise.
#[instrument(skip_all)]
pub async fn change_password(
    api: &ApiClient,
    current_password: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<Destination, AccountError> {
    if new_password != confirm_password {
        return Err(AccountError::PasswordMismatch);
    }

    api.change_password(current_password, new_password).await?;
    logout(api).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn status(authenticated: bool, is_admin: bool, email: Option<&str>) -> AuthStatus {
        AuthStatus {
            authenticated,
            is_admin,
            email: email.map(|e| Email::parse(e).unwrap()),
            csrf_token: None,
        }
    }

    #[test]
    fn test_viewer_from_auth_status() {
        assert_eq!(Viewer::from(status(false, false, None)), Viewer::Guest);
        // isAdmin without authenticated is still a guest
        assert_eq!(Viewer::from(status(false, true, None)), Viewer::Guest);

        let member = Viewer::from(status(true, false, Some("a@b.com")));
        assert!(member.is_authenticated());
        assert!(!member.is_admin());
        assert_eq!(member.display_name(), "a@b.com");

        let admin = Viewer::from(status(true, true, Some("root@b.com")));
        assert!(admin.is_admin());
    }

    #[test]
    fn test_nav_links_per_viewer() {
        assert_eq!(Viewer::Guest.nav_link(), ("Login", "login.html"));
        assert_eq!(
            Viewer::Member { email: None }.nav_link(),
            ("Member Panel/Logout", "login.html")
        );
        assert_eq!(
            Viewer::Admin { email: None }.nav_link(),
            ("Admin Panel/Logout", "admin.html")
        );
    }

    #[test]
    fn test_admin_gate_redirects_non_admins() {
        assert_eq!(admin_gate(&Viewer::Guest), Err(Destination::Login));
        assert_eq!(
            admin_gate(&Viewer::Member { email: None }),
            Err(Destination::Login)
        );
        assert_eq!(admin_gate(&Viewer::Admin { email: None }), Ok(()));
    }

    #[tokio::test]
    async fn test_change_password_mismatch_short_circuits() {
        // Unroutable backend: proves the mismatch check fires before any request
        let config = crate::config::ClientConfig {
            api_base_url: "http://127.0.0.1:9".parse().unwrap(),
            cart_file: "cart.json".into(),
            http_timeout: std::time::Duration::from_millis(250),
            sentry_dsn: None,
        };
        let api = ApiClient::new(&config).unwrap();

        let result = change_password(&api, "old", "new-one", "new-two").await;
        assert!(matches!(result, Err(AccountError::PasswordMismatch)));
    }

    #[tokio::test]
    async fn test_login_rejects_invalid_email_client_side() {
        let config = crate::config::ClientConfig {
            api_base_url: "http://127.0.0.1:9".parse().unwrap(),
            cart_file: "cart.json".into(),
            http_timeout: std::time::Duration::from_millis(250),
            sentry_dsn: None,
        };
        let api = ApiClient::new(&config).unwrap();

        let result = login(&api, "not-an-email", "pw").await;
        assert!(matches!(result, Err(AccountError::InvalidEmail(_))));
    }
}

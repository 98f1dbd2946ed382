//! Wire types for the Pinebrook backend JSON payloads.
//!
//! Field names mirror the backend contract exactly (`catid`, `pid`,
//! `orderId`, `isAdmin`), with serde renames where they differ from Rust
//! naming conventions.

use chrono::{DateTime, Utc};
use pinebrook_core::{CategoryId, Email, OrderId, OrderStatus, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A category as returned by the category listing and breadcrumb endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub catid: CategoryId,
    pub name: String,
}

/// A product row as returned by the listing, breadcrumb, and admin select
/// endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductSummary {
    pub pid: ProductId,
    #[serde(default)]
    pub catid: Option<CategoryId>,
    pub name: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Authoritative product detail, fetched per cart entry and for the product
/// page sections.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductDetail {
    pub pid: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Session status from `/check-auth`.
///
/// Drives the three-state viewer switch (guest / member / admin). The
/// optional CSRF token is captured here and replayed on state-changing
/// requests.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(rename = "csrfToken", default)]
    pub csrf_token: Option<String>,
}

/// One product line within an order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// An order row from the member or admin order table endpoints.
///
/// `username` is only present in the admin listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    #[serde(rename = "orderId")]
    pub order_id: OrderId,
    #[serde(default)]
    pub username: Option<String>,
    pub products: Vec<OrderLine>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub date: DateTime<Utc>,
}

/// Login request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(rename = "_csrf")]
    pub csrf: &'a str,
}

/// Change-password request body.
#[derive(Debug, Serialize)]
pub struct ChangePasswordRequest<'a> {
    #[serde(rename = "currentPassword")]
    pub current_password: &'a str,
    #[serde(rename = "newPassword")]
    pub new_password: &'a str,
    #[serde(rename = "_csrf")]
    pub csrf: &'a str,
}

/// Logout request body (CSRF only).
#[derive(Debug, Serialize)]
pub struct LogoutRequest<'a> {
    #[serde(rename = "_csrf")]
    pub csrf: &'a str,
}

/// Successful login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
}

/// Error body returned by the backend on rejected requests.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_deserializes() {
        let category: Category =
            serde_json::from_value(json!({"catid": "2", "name": "Hand Tools"})).unwrap();
        assert_eq!(category.catid, CategoryId::new("2"));
        assert_eq!(category.name, "Hand Tools");
    }

    #[test]
    fn test_product_summary_full_row() {
        let product: ProductSummary = serde_json::from_value(json!({
            "pid": "11",
            "catid": "2",
            "name": "Claw Hammer",
            "price": 19.99,
            "image_url": "hammer.png"
        }))
        .unwrap();
        assert_eq!(product.pid, ProductId::new("11"));
        assert_eq!(product.price, Some("19.99".parse().unwrap()));
    }

    #[test]
    fn test_product_summary_admin_select_row() {
        // /productList only carries pid and name
        let product: ProductSummary =
            serde_json::from_value(json!({"pid": "11", "name": "Claw Hammer"})).unwrap();
        assert!(product.catid.is_none());
        assert!(product.price.is_none());
    }

    #[test]
    fn test_auth_status_guest() {
        let status: AuthStatus = serde_json::from_value(json!({"authenticated": false})).unwrap();
        assert!(!status.authenticated);
        assert!(!status.is_admin);
        assert!(status.email.is_none());
    }

    #[test]
    fn test_auth_status_admin() {
        let status: AuthStatus = serde_json::from_value(json!({
            "authenticated": true,
            "isAdmin": true,
            "email": "admin@example.com",
            "csrfToken": "tok-123"
        }))
        .unwrap();
        assert!(status.is_admin);
        assert_eq!(status.email.unwrap().as_str(), "admin@example.com");
        assert_eq!(status.csrf_token.as_deref(), Some("tok-123"));
    }

    #[test]
    fn test_order_deserializes() {
        let order: Order = serde_json::from_value(json!({
            "orderId": 1204,
            "username": "alice",
            "products": [{"name": "Claw Hammer", "price": 19.99, "quantity": 2}],
            "total": 39.98,
            "status": "shipped",
            "date": "2026-02-14T09:30:00Z"
        }))
        .unwrap();
        assert_eq!(order.order_id, OrderId::new(1204));
        assert_eq!(order.products.len(), 1);
        assert_eq!(order.status, OrderStatus::Shipped);
    }

    #[test]
    fn test_member_order_has_no_username() {
        let order: Order = serde_json::from_value(json!({
            "orderId": 7,
            "products": [],
            "total": 0,
            "status": "pending",
            "date": "2026-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(order.username.is_none());
    }

    #[test]
    fn test_login_request_csrf_field_name() {
        let body = serde_json::to_value(LoginRequest {
            email: "user@example.com",
            password: "hunter2",
            csrf: "tok",
        })
        .unwrap();
        assert_eq!(body["_csrf"], "tok");
    }
}

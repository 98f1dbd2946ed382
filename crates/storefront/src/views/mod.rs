//! Page fragment renderers.
//!
//! Each fragment is an independent template over a display struct; data is
//! fetched elsewhere and converted here via `From` impls, so templates never
//! see wire types or options. Fragment markup mirrors the DOM the classic
//! storefront built by hand: same element ids, same layout classes.

use askama::Template;
use pinebrook_core::Price;
use rust_decimal::Decimal;

use crate::api::types::{Category, Order, ProductDetail, ProductSummary};
use crate::cart::render::CartViewModel;
use crate::filters;
use crate::session::Viewer;

/// Category id the grid falls back to when a row lacks one.
const ROOT_CATEGORY: &str = "1";

// =============================================================================
// Nav
// =============================================================================

/// Nav fragment: login button and user display.
#[derive(Template)]
#[template(path = "nav.html")]
pub struct NavTemplate {
    pub label: &'static str,
    pub href: &'static str,
    pub display_name: String,
}

impl From<&Viewer> for NavTemplate {
    fn from(viewer: &Viewer) -> Self {
        let (label, href) = viewer.nav_link();
        Self {
            label,
            href,
            display_name: viewer.display_name().to_string(),
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Sidebar category listing.
#[derive(Template)]
#[template(path = "category_list.html")]
pub struct CategoryListTemplate {
    pub categories: Vec<Category>,
}

/// One breadcrumb link.
pub struct Crumb {
    pub href: String,
    pub label: String,
}

/// Breadcrumb trail, for both category and product paths.
#[derive(Template)]
#[template(path = "breadcrumb.html")]
pub struct BreadcrumbTemplate {
    pub trail: Vec<Crumb>,
}

impl BreadcrumbTemplate {
    /// Trail of ancestor categories.
    #[must_use]
    pub fn for_categories(path: &[Category]) -> Self {
        Self {
            trail: path
                .iter()
                .map(|category| Crumb {
                    href: format!("index.html?catid={}", category.catid),
                    label: category.name.clone(),
                })
                .collect(),
        }
    }

    /// Trail ending at a product.
    #[must_use]
    pub fn for_products(path: &[ProductSummary]) -> Self {
        Self {
            trail: path
                .iter()
                .map(|product| Crumb {
                    href: format!(
                        "product.html?catid={}&pid={}",
                        product
                            .catid
                            .as_ref()
                            .map_or(ROOT_CATEGORY, pinebrook_core::CategoryId::as_str),
                        product.pid
                    ),
                    label: product.name.clone(),
                })
                .collect(),
        }
    }
}

/// One card in the product grid.
pub struct ProductCard {
    pub pid: String,
    pub catid: String,
    pub name: String,
    pub price: Decimal,
    pub image_url: String,
}

impl From<&ProductSummary> for ProductCard {
    fn from(product: &ProductSummary) -> Self {
        Self {
            pid: product.pid.to_string(),
            catid: product
                .catid
                .as_ref()
                .map_or_else(|| ROOT_CATEGORY.to_string(), ToString::to_string),
            name: product.name.clone(),
            price: product.price.unwrap_or_default(),
            image_url: product.image_url.clone().unwrap_or_default(),
        }
    }
}

/// Product grid for the listing page.
#[derive(Template)]
#[template(path = "product_grid.html")]
pub struct ProductGridTemplate {
    pub products: Vec<ProductCard>,
}

impl ProductGridTemplate {
    #[must_use]
    pub fn new(products: &[ProductSummary]) -> Self {
        Self {
            products: products.iter().map(ProductCard::from).collect(),
        }
    }
}

/// One section of the product detail page.
pub struct ProductSection {
    pub pid: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
}

impl From<&ProductDetail> for ProductSection {
    fn from(detail: &ProductDetail) -> Self {
        Self {
            pid: detail.pid.to_string(),
            name: detail.name.clone(),
            description: detail.description.clone().unwrap_or_default(),
            price: detail.price,
            image_url: detail.image_url.clone().unwrap_or_default(),
        }
    }
}

/// Product detail sections.
#[derive(Template)]
#[template(path = "product_detail.html")]
pub struct ProductDetailTemplate {
    pub sections: Vec<ProductSection>,
}

impl ProductDetailTemplate {
    #[must_use]
    pub fn new(sections: &[ProductDetail]) -> Self {
        Self {
            sections: sections.iter().map(ProductSection::from).collect(),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One rendered cart line.
pub struct CartLineRow {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_total: Price,
}

/// Cart items and total.
#[derive(Template)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub lines: Vec<CartLineRow>,
    pub total: Price,
}

impl From<&CartViewModel> for CartTemplate {
    fn from(view: &CartViewModel) -> Self {
        Self {
            lines: view
                .lines
                .iter()
                .map(|line| CartLineRow {
                    product_id: line.product_id.to_string(),
                    name: line.name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    line_total: line.line_total,
                })
                .collect(),
            total: view.total,
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One product line within a rendered order row.
pub struct OrderLineRow {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// One rendered order table row.
pub struct OrderRow {
    pub order_id: String,
    pub username: String,
    pub lines: Vec<OrderLineRow>,
    pub total: Decimal,
    pub status: String,
    pub date: String,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id.to_string(),
            username: order.username.clone().unwrap_or_default(),
            lines: order
                .products
                .iter()
                .map(|line| OrderLineRow {
                    name: line.name.clone(),
                    price: line.price,
                    quantity: line.quantity,
                })
                .collect(),
            total: order.total,
            status: order.status.to_string(),
            date: order.date.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Member order history table.
#[derive(Template)]
#[template(path = "orders_member.html")]
pub struct MemberOrdersTemplate {
    pub orders: Vec<OrderRow>,
}

impl MemberOrdersTemplate {
    #[must_use]
    pub fn new(orders: &[Order]) -> Self {
        Self {
            orders: orders.iter().map(OrderRow::from).collect(),
        }
    }
}

/// Admin order table (all orders, with the ordering user).
#[derive(Template)]
#[template(path = "orders_admin.html")]
pub struct AdminOrdersTemplate {
    pub orders: Vec<OrderRow>,
}

impl AdminOrdersTemplate {
    #[must_use]
    pub fn new(orders: &[Order]) -> Self {
        Self {
            orders: orders.iter().map(OrderRow::from).collect(),
        }
    }
}

// =============================================================================
// Admin selects
// =============================================================================

/// One option in a management select box.
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Category and product management selects for the admin page.
#[derive(Template)]
#[template(path = "admin_selects.html")]
pub struct AdminSelectsTemplate {
    pub categories: Vec<SelectOption>,
    pub products: Vec<SelectOption>,
}

impl AdminSelectsTemplate {
    #[must_use]
    pub fn new(categories: &[Category], products: &[ProductSummary]) -> Self {
        Self {
            categories: categories
                .iter()
                .map(|category| SelectOption {
                    value: category.catid.to_string(),
                    label: category.name.clone(),
                })
                .collect(),
            products: products
                .iter()
                .map(|product| SelectOption {
                    value: product.pid.to_string(),
                    label: product.name.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pinebrook_core::{CategoryId, OrderId, OrderStatus, ProductId};

    fn category(catid: &str, name: &str) -> Category {
        Category {
            catid: CategoryId::new(catid),
            name: name.to_string(),
        }
    }

    fn summary(pid: &str, name: &str, price: &str) -> ProductSummary {
        ProductSummary {
            pid: ProductId::new(pid),
            catid: Some(CategoryId::new("2")),
            name: name.to_string(),
            price: Some(price.parse().unwrap()),
            image_url: Some(format!("{pid}.png")),
        }
    }

    #[test]
    fn test_nav_renders_viewer() {
        let viewer = Viewer::Member {
            email: Some("a@b.com".parse().unwrap()),
        };
        let html = NavTemplate::from(&viewer).render().unwrap();
        assert!(html.contains("Member Panel/Logout"));
        assert!(html.contains(r#"<span id="user-display">a@b.com</span>"#));
    }

    #[test]
    fn test_category_list_links() {
        let html = CategoryListTemplate {
            categories: vec![category("2", "Hand Tools")],
        }
        .render()
        .unwrap();
        assert!(html.contains(r#"href="index.html?catid=2""#));
        assert!(html.contains("Hand Tools"));
    }

    #[test]
    fn test_product_grid_card() {
        let html = ProductGridTemplate::new(&[summary("11", "Claw Hammer", "19.99")])
            .render()
            .unwrap();
        assert!(html.contains(r#"href="product.html?catid=2&amp;pid=11""#));
        assert!(html.contains("$19.99"));
        assert!(html.contains(r#"data-pid="11""#));
        assert!(html.contains(r#"src="uploads/11.png""#));
    }

    #[test]
    fn test_product_name_is_escaped() {
        let html = ProductGridTemplate::new(&[summary("11", "Saw <3\"", "9.99")])
            .render()
            .unwrap();
        assert!(html.contains("Saw &#60;3"));
        assert!(!html.contains("Saw <3"));
    }

    #[test]
    fn test_cart_renders_lines_and_total() {
        let view = CartViewModel {
            lines: vec![crate::cart::render::CartLine {
                product_id: ProductId::new("P1"),
                name: "Claw Hammer".to_string(),
                quantity: 2,
                unit_price: Price::usd("19.99".parse().unwrap()),
                line_total: Price::usd("39.98".parse().unwrap()),
            }],
            total: Price::usd("39.98".parse().unwrap()),
        };
        let html = CartTemplate::from(&view).render().unwrap();
        assert!(html.contains("Claw Hammer - $19.99"));
        assert!(html.contains(r#"value="2""#));
        assert!(html.contains("= $39.98"));
        assert!(html.contains("Total: $39.98"));
    }

    #[test]
    fn test_member_orders_empty_state() {
        let html = MemberOrdersTemplate::new(&[]).render().unwrap();
        assert!(html.contains(r#"<tr><td colspan="5">No recent orders</td></tr>"#));
    }

    #[test]
    fn test_admin_orders_row() {
        let order = Order {
            order_id: OrderId::new(1204),
            username: Some("alice".to_string()),
            products: vec![crate::api::types::OrderLine {
                name: "Claw Hammer".to_string(),
                price: "19.99".parse().unwrap(),
                quantity: 2,
            }],
            total: "39.98".parse().unwrap(),
            status: OrderStatus::Shipped,
            date: chrono::Utc.with_ymd_and_hms(2026, 2, 14, 9, 30, 0).unwrap(),
        };
        let html = AdminOrdersTemplate::new(&[order]).render().unwrap();
        assert!(html.contains("<td>1204</td>"));
        assert!(html.contains("<td>alice</td>"));
        assert!(html.contains("Claw Hammer: $19.99 x 2"));
        assert!(html.contains("<td>Shipped</td>"));
        assert!(html.contains("2026-02-14 09:30"));
    }

    #[test]
    fn test_admin_selects_have_all_five_boxes() {
        let html = AdminSelectsTemplate::new(
            &[category("2", "Hand Tools")],
            &[summary("11", "Claw Hammer", "19.99")],
        )
        .render()
        .unwrap();
        for id in [
            "category-edit-select",
            "category-delete-select",
            "category-add-select",
            "product-edit-select",
            "product-delete-select",
        ] {
            assert!(html.contains(id), "missing select {id}");
        }
        assert!(html.contains(r#"<option value="11">Claw Hammer</option>"#));
    }

    #[test]
    fn test_breadcrumb_trails() {
        let html = BreadcrumbTemplate::for_categories(&[category("1", "Tools")])
            .render()
            .unwrap();
        assert!(html.contains(r#"href="index.html?catid=1""#));

        // The href is built in Rust, so the template escapes its `&`
        let html = BreadcrumbTemplate::for_products(&[summary("11", "Claw Hammer", "19.99")])
            .render()
            .unwrap();
        assert!(html.contains(r#"href="product.html?catid=2&#38;pid=11""#));
    }
}

//! Page assembly.
//!
//! A page is a set of independently rendered fragments keyed by the DOM
//! slot they fill. Fetches for one page run concurrently; a fragment whose
//! data fails to load is dropped and its error goes through the single
//! presentation boundary, so one broken endpoint never blanks the page.
//! Only the product description surfaces its failure to the user; listing
//! and cart fragments degrade silently.
//!
//! The cart fragment is special: its snapshot is written to disk only after
//! the fragment renders, so a failed price lookup leaves the last good
//! snapshot in place.

use pinebrook_core::{CategoryId, ProductId};
use tracing::instrument;
use url::Url;

use crate::api::ApiError;
use crate::cart;
use crate::error::AppError;
use crate::session::{self, Destination, Viewer};
use crate::state::Storefront;
use crate::views::{
    AdminOrdersTemplate, AdminSelectsTemplate, BreadcrumbTemplate, CartTemplate,
    CategoryListTemplate, MemberOrdersTemplate, NavTemplate, ProductDetailTemplate,
    ProductGridTemplate,
};
use askama::Template;

/// Which storefront page a URL names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Index,
    Product,
    Login,
    Admin,
}

/// Everything a page load needs from the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub kind: PageKind,
    pub catid: CategoryId,
    pub pid: Option<ProductId>,
}

/// Base for resolving page-relative URLs like `index.html?catid=2`.
const LOCAL_BASE: &str = "http://localhost/";

impl PageContext {
    /// Parse a page URL, absolute or site-relative.
    ///
    /// The page is chosen by the last path segment; anything unrecognized
    /// is the index. `catid` defaults to the root category.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` if the URL cannot be parsed at all.
    pub fn from_url(input: &str) -> Result<Self, AppError> {
        let url = Url::parse(input).or_else(|_| {
            Url::parse(LOCAL_BASE)
                .and_then(|base| base.join(input))
                .map_err(|err| AppError::BadRequest(format!("invalid page URL {input}: {err}")))
        })?;

        let kind = match url.path_segments().and_then(Iterator::last) {
            Some("product.html") => PageKind::Product,
            Some("login.html") => PageKind::Login,
            Some("admin.html") => PageKind::Admin,
            _ => PageKind::Index,
        };

        let mut catid = None;
        let mut pid = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "catid" => catid = Some(CategoryId::new(value.as_ref())),
                "pid" => pid = Some(ProductId::new(value.as_ref())),
                _ => {}
            }
        }

        Ok(Self {
            kind,
            catid: catid.unwrap_or_else(|| CategoryId::new("1")),
            pid,
        })
    }
}

/// One rendered fragment, keyed by the DOM slot it fills.
#[derive(Debug)]
pub struct Fragment {
    pub slot: &'static str,
    pub html: String,
}

/// A fully assembled page.
#[derive(Debug)]
pub struct RenderedPage {
    pub title: &'static str,
    pub viewer: Viewer,
    pub fragments: Vec<Fragment>,
    /// User-facing lines from fragments that failed to load.
    pub notices: Vec<String>,
}

/// Result of a page load: content, or somewhere else to go.
#[derive(Debug)]
pub enum PageOutcome {
    Rendered(RenderedPage),
    Redirect(Destination),
}

/// What happens to a fragment's failure: shown to the user, or only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Surface {
    /// The failure message becomes a page notice.
    Notice,
    /// The failure is logged at the presentation boundary; the slot stays
    /// empty.
    Silent,
}

/// Load and render the page named by `context`.
///
/// # Errors
///
/// Returns an error only for failures that have no fragment to absorb
/// them, such as a missing `pid` on the product page.
#[instrument(skip(state))]
pub async fn load(state: &Storefront, context: &PageContext) -> Result<PageOutcome, AppError> {
    // The session check gates every page; if it fails we browse as guest.
    let viewer = match state.api().check_auth().await {
        Ok(status) => Viewer::from(status),
        Err(err) => {
            let _ = AppError::from(err).present();
            Viewer::Guest
        }
    };

    if context.kind == PageKind::Admin {
        if let Err(destination) = session::admin_gate(&viewer) {
            return Ok(PageOutcome::Redirect(destination));
        }
    }

    let mut page = RenderedPage {
        title: match context.kind {
            PageKind::Index => "Pinebrook Hardware",
            PageKind::Product => "Product",
            PageKind::Login => "Account",
            PageKind::Admin => "Admin Panel",
        },
        viewer: viewer.clone(),
        fragments: Vec::new(),
        notices: Vec::new(),
    };
    page.push(render_nav(&viewer), "nav", Surface::Silent);

    match context.kind {
        PageKind::Index => index_page(state, context, &mut page).await,
        PageKind::Product => product_page(state, context, &mut page).await?,
        PageKind::Login => login_page(state, &viewer, &mut page).await,
        PageKind::Admin => admin_page(state, &mut page).await,
    }

    Ok(PageOutcome::Rendered(page))
}

impl RenderedPage {
    /// Attach a fragment, or route its failure through the presentation
    /// boundary. Whether the failure surfaces as a notice is decided per
    /// slot, not per error: listings degrade silently, the product
    /// description tells the user.
    fn push(&mut self, fragment: Result<String, AppError>, slot: &'static str, surface: Surface) {
        match fragment {
            Ok(html) => self.fragments.push(Fragment { slot, html }),
            Err(err) => {
                let message = err.present();
                if surface == Surface::Notice {
                    self.notices.push(message);
                }
            }
        }
    }
}

fn render_nav(viewer: &Viewer) -> Result<String, AppError> {
    Ok(NavTemplate::from(viewer).render()?)
}

async fn index_page(state: &Storefront, context: &PageContext, page: &mut RenderedPage) {
    let api = state.api();
    let (categories, trail, products, cart_html) = tokio::join!(
        api.categories(),
        api.category_path(&context.catid),
        api.products(&context.catid),
        cart_fragment(state),
    );

    page.push(render_categories(categories), "category-list", Surface::Silent);
    page.push(render_category_trail(trail), "navigation-path", Surface::Silent);
    page.push(render_grid(products), "product-list", Surface::Silent);
    page.push(cart_html, "cart-items", Surface::Silent);
}

async fn product_page(
    state: &Storefront,
    context: &PageContext,
    page: &mut RenderedPage,
) -> Result<(), AppError> {
    let pid = context
        .pid
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("product page needs a pid".to_string()))?;

    let api = state.api();
    let (categories, sections, category_trail, product_trail, cart_html) = tokio::join!(
        api.categories(),
        api.product_sections(pid),
        api.category_path(&context.catid),
        api.product_path(pid),
        cart_fragment(state),
    );

    page.push(render_categories(categories), "category-list", Surface::Silent);
    page.push(
        sections.map_err(AppError::from).and_then(|sections| {
            Ok(ProductDetailTemplate::new(&sections).render()?)
        }),
        "product-description",
        Surface::Notice,
    );
    page.push(
        render_category_trail(category_trail),
        "navigation-path",
        Surface::Silent,
    );
    page.push(
        render_product_trail(product_trail),
        "navigation-product-path",
        Surface::Silent,
    );
    page.push(cart_html, "cart-items", Surface::Silent);
    Ok(())
}

async fn login_page(state: &Storefront, viewer: &Viewer, page: &mut RenderedPage) {
    let api = state.api();
    let (categories, cart_html) = tokio::join!(api.categories(), cart_fragment(state));

    page.push(render_categories(categories), "category-list", Surface::Silent);
    page.push(cart_html, "cart-items", Surface::Silent);

    // Only plain members get the order table here; guests see the login
    // form and admins belong on the admin panel.
    if matches!(viewer, Viewer::Member { .. }) {
        let orders = api.member_orders().await;
        page.push(
            orders.map_err(AppError::from).and_then(|orders| {
                Ok(MemberOrdersTemplate::new(&orders).render()?)
            }),
            "user-orders-table",
            Surface::Silent,
        );
    }
}

async fn admin_page(state: &Storefront, page: &mut RenderedPage) {
    let api = state.api();
    let (categories, products, orders) =
        tokio::join!(api.categories(), api.product_list(), api.admin_orders());

    page.push(
        match (categories, products) {
            (Ok(categories), Ok(products)) => {
                AdminSelectsTemplate::new(&categories, &products)
                    .render()
                    .map_err(AppError::from)
            }
            (Err(err), _) | (_, Err(err)) => Err(AppError::from(err)),
        },
        "admin-selects",
        Surface::Silent,
    );
    page.push(
        orders.map_err(AppError::from).and_then(|orders| {
            Ok(AdminOrdersTemplate::new(&orders).render()?)
        }),
        "orders-table",
        Surface::Silent,
    );
}

/// Render the cart and, only once that succeeds, persist the snapshot.
async fn cart_fragment(state: &Storefront) -> Result<String, AppError> {
    let view = {
        let store = state.cart().lock().await;
        cart::render::build_view(&store, state.api()).await?
    };
    let html = CartTemplate::from(&view).render()?;
    state.save_cart().await?;
    Ok(html)
}

fn render_categories(
    categories: Result<Vec<crate::api::types::Category>, ApiError>,
) -> Result<String, AppError> {
    let categories = categories?;
    Ok(CategoryListTemplate { categories }.render()?)
}

fn render_category_trail(
    trail: Result<Vec<crate::api::types::Category>, ApiError>,
) -> Result<String, AppError> {
    Ok(BreadcrumbTemplate::for_categories(&trail?).render()?)
}

fn render_product_trail(
    trail: Result<Vec<crate::api::types::ProductSummary>, ApiError>,
) -> Result<String, AppError> {
    Ok(BreadcrumbTemplate::for_products(&trail?).render()?)
}

fn render_grid(
    products: Result<Vec<crate::api::types::ProductSummary>, ApiError>,
) -> Result<String, AppError> {
    Ok(ProductGridTemplate::new(&products?).render()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn state_at(base: &str, name: &str) -> Storefront {
        let config = ClientConfig {
            api_base_url: base.parse().unwrap(),
            cart_file: std::env::temp_dir()
                .join(format!("pinebrook-pages-{}-{name}.json", std::process::id())),
            http_timeout: std::time::Duration::from_millis(250),
            sentry_dsn: None,
        };
        Storefront::new(config).unwrap()
    }

    fn unroutable_state(name: &str) -> Storefront {
        state_at("http://127.0.0.1:9", name)
    }

    /// Minimal one-response-per-connection backend for page-load tests.
    /// Routes map a request path to a status and JSON body.
    async fn spawn_backend(routes: fn(&str) -> (u16, &'static str)) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let mut read = 0;
                    while read < buf.len() {
                        match socket.read(&mut buf[read..]).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => read += n,
                        }
                        if buf[..read].windows(4).any(|window| window == b"\r\n\r\n") {
                            break;
                        }
                    }
                    let request = String::from_utf8_lossy(&buf[..read]);
                    let path = request.split_whitespace().nth(1).unwrap_or("/");
                    let (status, body) = routes(path);
                    let reason = if status == 200 { "OK" } else { "Error" };
                    let response = format!(
                        "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len(),
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                });
            }
        });
        format!("http://{addr}")
    }

    fn broken_backend(_path: &str) -> (u16, &'static str) {
        (500, r#"{"error":"database exploded"}"#)
    }

    fn guest_catalog(path: &str) -> (u16, &'static str) {
        if path.starts_with("/check-auth") {
            (200, r#"{"authenticated":false,"isAdmin":false}"#)
        } else if path.starts_with("/productInformation") {
            (200, r#"[{"pid":"11","name":"Claw Hammer","price":19.99}]"#)
        } else if path.starts_with("/productPath") {
            (
                200,
                r#"[{"pid":"11","name":"Claw Hammer","catid":"2","price":19.99}]"#,
            )
        } else {
            // root listing and /categories share the category shape
            (200, r#"[{"catid":"1","name":"Tools"}]"#)
        }
    }

    fn member_session(path: &str) -> (u16, &'static str) {
        if path.starts_with("/check-auth") {
            (
                200,
                r#"{"authenticated":true,"isAdmin":false,"email":"shopper@example.com"}"#,
            )
        } else if path.starts_with("/memberOrdersTable") {
            (200, "[]")
        } else {
            (200, r#"[{"catid":"1","name":"Tools"}]"#)
        }
    }

    fn admin_session(path: &str) -> (u16, &'static str) {
        if path.starts_with("/check-auth") {
            (
                200,
                r#"{"authenticated":true,"isAdmin":true,"email":"boss@example.com"}"#,
            )
        } else {
            (200, r#"[{"catid":"1","name":"Tools"}]"#)
        }
    }

    fn slots(page: &RenderedPage) -> Vec<&'static str> {
        page.fragments.iter().map(|fragment| fragment.slot).collect()
    }

    fn rendered(outcome: PageOutcome) -> RenderedPage {
        match outcome {
            PageOutcome::Rendered(page) => page,
            PageOutcome::Redirect(destination) => {
                panic!("expected a rendered page, got redirect to {destination:?}")
            }
        }
    }

    #[test]
    fn test_from_url_detects_pages() {
        let ctx = PageContext::from_url("product.html?catid=2&pid=11").unwrap();
        assert_eq!(ctx.kind, PageKind::Product);
        assert_eq!(ctx.catid.as_str(), "2");
        assert_eq!(ctx.pid.as_ref().unwrap().as_str(), "11");

        let ctx = PageContext::from_url("https://shop.example.com/admin.html").unwrap();
        assert_eq!(ctx.kind, PageKind::Admin);

        let ctx = PageContext::from_url("login.html").unwrap();
        assert_eq!(ctx.kind, PageKind::Login);
    }

    #[test]
    fn test_from_url_defaults_to_root_index() {
        let ctx = PageContext::from_url("index.html").unwrap();
        assert_eq!(ctx.kind, PageKind::Index);
        assert_eq!(ctx.catid.as_str(), "1");
        assert!(ctx.pid.is_none());

        // Unknown paths fall back to the index too
        let ctx = PageContext::from_url("somewhere/else").unwrap();
        assert_eq!(ctx.kind, PageKind::Index);
    }

    #[test]
    fn test_product_page_requires_pid() {
        let ctx = PageContext::from_url("product.html").unwrap();
        assert_eq!(ctx.kind, PageKind::Product);
        assert!(ctx.pid.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_backend_still_renders_nav() {
        let state = unroutable_state("nav");
        let ctx = PageContext::from_url("index.html").unwrap();

        let page = rendered(load(&state, &ctx).await.unwrap());
        assert_eq!(page.viewer, Viewer::Guest);
        // Nav needs no backend; the empty cart renders without lookups.
        assert_eq!(slots(&page), ["nav", "cart-items"]);
    }

    #[test]
    fn test_push_surfaces_by_slot_not_by_error() {
        let mut page = RenderedPage {
            title: "Product",
            viewer: Viewer::Guest,
            fragments: Vec::new(),
            notices: Vec::new(),
        };
        let rejection = || {
            AppError::Api(ApiError::Backend {
                status: 500,
                message: "database exploded".to_string(),
            })
        };

        page.push(Err(rejection()), "product-list", Surface::Silent);
        assert!(page.notices.is_empty());

        page.push(Err(rejection()), "product-description", Surface::Notice);
        assert_eq!(page.notices, ["database exploded"]);
    }

    #[tokio::test]
    async fn test_listing_failures_never_become_notices() {
        let base = spawn_backend(broken_backend).await;
        let state = state_at(&base, "broken-index");
        let ctx = PageContext::from_url("index.html").unwrap();

        let page = rendered(load(&state, &ctx).await.unwrap());
        assert!(page.notices.is_empty(), "notices: {:?}", page.notices);
        assert_eq!(slots(&page), ["nav", "cart-items"]);
    }

    #[tokio::test]
    async fn test_product_description_failure_reaches_the_user() {
        let base = spawn_backend(broken_backend).await;
        let state = state_at(&base, "broken-product");
        let ctx = PageContext::from_url("product.html?pid=11").unwrap();

        let page = rendered(load(&state, &ctx).await.unwrap());
        // The description is the only slot whose failure the user sees
        assert_eq!(page.notices, ["database exploded"]);
    }

    #[tokio::test]
    async fn test_product_page_renders_both_trails() {
        let base = spawn_backend(guest_catalog).await;
        let state = state_at(&base, "trails");
        let ctx = PageContext::from_url("product.html?catid=1&pid=11").unwrap();

        let page = rendered(load(&state, &ctx).await.unwrap());
        let slots = slots(&page);
        assert!(slots.contains(&"navigation-path"), "slots: {slots:?}");
        assert!(slots.contains(&"navigation-product-path"), "slots: {slots:?}");

        let product_trail = page
            .fragments
            .iter()
            .find(|fragment| fragment.slot == "navigation-product-path")
            .unwrap();
        assert!(product_trail.html.contains("catid=2&#38;pid=11"));
    }

    #[tokio::test]
    async fn test_account_page_orders_are_member_only() {
        let base = spawn_backend(member_session).await;
        let state = state_at(&base, "member-orders");
        let ctx = PageContext::from_url("login.html").unwrap();
        let page = rendered(load(&state, &ctx).await.unwrap());
        assert!(slots(&page).contains(&"user-orders-table"));

        let base = spawn_backend(admin_session).await;
        let state = state_at(&base, "admin-account");
        let page = rendered(load(&state, &ctx).await.unwrap());
        assert!(!slots(&page).contains(&"user-orders-table"));
    }

    #[tokio::test]
    async fn test_admin_page_redirects_guests_to_login() {
        let state = unroutable_state("gate");
        let ctx = PageContext::from_url("admin.html").unwrap();

        let outcome = load(&state, &ctx).await.unwrap();
        assert!(matches!(
            outcome,
            PageOutcome::Redirect(Destination::Login)
        ));
    }

    #[tokio::test]
    async fn test_product_page_without_pid_is_rejected() {
        let state = unroutable_state("nopid");
        let ctx = PageContext::from_url("product.html").unwrap();

        let result = load(&state, &ctx).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}

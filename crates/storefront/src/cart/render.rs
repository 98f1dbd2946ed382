//! Cart view assembly.
//!
//! Rendering never mutates the store: each entry's authoritative name and
//! price are fetched from the backend (all lookups issued in parallel and
//! joined before assembly), line totals and the cart total are computed in
//! decimal, and any lookup failure abandons the whole render - the caller
//! keeps its stale view and the store and snapshot stay untouched.

use futures::future;
use pinebrook_core::{Price, ProductId};

use crate::api::types::ProductDetail;
use crate::api::{ApiClient, ApiError};

use super::{CartEntry, CartStore};

/// One priced cart line, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_total: Price,
}

/// The fully priced cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartViewModel {
    pub lines: Vec<CartLine>,
    pub total: Price,
}

impl CartViewModel {
    /// An empty priced cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            total: Price::sum(Vec::new()),
        }
    }
}

/// Price the cart against the backend.
///
/// All product-detail lookups are issued in parallel; assembly waits for
/// every one. If any lookup fails the error propagates and no view is
/// produced.
///
/// # Errors
///
/// Returns the first lookup failure.
pub async fn build_view(store: &CartStore, api: &ApiClient) -> Result<CartViewModel, ApiError> {
    let lookups = store
        .entries()
        .iter()
        .map(|entry| api.product_detail(&entry.product_id));

    let details = future::try_join_all(lookups).await?;

    Ok(assemble(store.entries(), &details))
}

/// Join cart entries with their fetched details into a priced view.
///
/// `details` must be in entry order, one per entry, as produced by
/// [`build_view`].
fn assemble(entries: &[CartEntry], details: &[ProductDetail]) -> CartViewModel {
    debug_assert_eq!(entries.len(), details.len());

    let lines: Vec<CartLine> = entries
        .iter()
        .zip(details)
        .map(|(entry, detail)| {
            let unit_price = Price::usd(detail.price);
            CartLine {
                product_id: entry.product_id.clone(),
                name: detail.name.clone(),
                quantity: entry.quantity,
                unit_price,
                line_total: unit_price.times(entry.quantity),
            }
        })
        .collect();

    let total = Price::sum(lines.iter().map(|line| line.line_total));

    CartViewModel { lines, total }
}

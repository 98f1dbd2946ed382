//! Client-local shopping cart.
//!
//! The cart is an insertion-ordered list of (product id, quantity) pairs
//! owned by the session, mirrored to a JSON snapshot on disk
//! ([`persist`]) and joined with authoritative product details at render
//! time ([`render`]).
//!
//! Mutations are immediate and infallible: they touch only the in-memory
//! sequence. Rate-limiting of rapid add clicks is a UI concern and lives in
//! [`crate::ui`], not here.

pub mod persist;
pub mod render;

use pinebrook_core::ProductId;
use serde::{Deserialize, Serialize};

/// One cart line: a product and how many of it.
///
/// The `pid` wire name matches the snapshot format. A quantity of zero is
/// never stored; reaching zero removes the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(rename = "pid")]
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Insertion-ordered cart store, unique by product id.
///
/// Constructed once per page context and passed by reference to renderers;
/// there is no global cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartStore {
    entries: Vec<CartEntry>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create a cart from hydrated entries, dropping any zero-quantity
    /// entries a stale snapshot might carry.
    #[must_use]
    pub fn from_entries(entries: Vec<CartEntry>) -> Self {
        Self {
            entries: entries.into_iter().filter(|e| e.quantity > 0).collect(),
        }
    }

    /// Add one unit of a product.
    ///
    /// Increments the existing entry's quantity, or appends a new entry with
    /// quantity 1. Position in iteration order is preserved on increment.
    pub fn add(&mut self, product_id: &ProductId) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| &e.product_id == product_id)
        {
            entry.quantity += 1;
        } else {
            self.entries.push(CartEntry {
                product_id: product_id.clone(),
                quantity: 1,
            });
        }
    }

    /// Remove a product's entry entirely. No-op if absent.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.entries.retain(|e| &e.product_id != product_id);
    }

    /// Set the quantity of an existing entry.
    ///
    /// A quantity of zero behaves as [`Self::remove`]. No-op if the product
    /// has no entry.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| &e.product_id == product_id)
        {
            entry.quantity = quantity;
        }
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

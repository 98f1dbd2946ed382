//! Cache types for backend API responses.

use crate::api::types::{Category, ProductDetail, ProductSummary};

/// Cached value types.
///
/// Catalog reads are cached; session and order reads never are.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Products(Vec<ProductSummary>),
    Detail(Box<ProductDetail>),
}

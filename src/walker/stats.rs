//! Per-category aggregation
//!
//! Turns a fetched product list into [`CategoryStats`]. Each category is
//! computed from its own `count`, the `count` of its direct children and its
//! own products, so categories can be processed in any order.

use crate::catalog::types::{CategoryStats, Product};

/// Parameters of the aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsOptions {
    /// Size of the best-seller slice
    pub top_n: usize,

    /// Country code counted by the origin percentage (exact, case-sensitive)
    pub target_origin: String,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            top_n: 5,
            target_origin: "SE".to_string(),
        }
    }
}

/// Items attributed directly to a category
///
/// `count` covers the whole subtree, so subtracting the children's subtree
/// counts leaves the category's own items. A malformed tree can make this
/// negative; it is reported as computed. Saturates at the `i64` bounds.
pub fn count_own(count: i64, children_count: i64) -> i64 {
    count.saturating_sub(children_count)
}

/// The `n` best sellers, highest `soldCount` first
///
/// The sort is stable, so products with equal sales keep their input order.
/// Everything past the first `n` is dropped.
pub fn top_products(mut products: Vec<Product>, n: usize) -> Vec<Product> {
    products.sort_by(|a, b| b.sold_count().cmp(&a.sold_count()));
    products.truncate(n);
    products
}

/// Percentage (0-100, rounded half away from zero) of products whose origin
/// is `target`
///
/// An empty list yields 0. Products with no known origin never match.
pub fn origin_percentage(products: &[Product], target: &str) -> u32 {
    if products.is_empty() {
        return 0;
    }

    let matching = products
        .iter()
        .filter(|p| p.country_of_origin() == Some(target))
        .count();

    (100.0 * (matching as f64 / products.len() as f64)).round() as u32
}

/// Compute all statistics for one category
pub fn compute(
    count: i64,
    children_count: i64,
    products: Vec<Product>,
    options: &StatsOptions,
) -> CategoryStats {
    let origin_percentage = origin_percentage(&products, &options.target_origin);

    CategoryStats {
        count_own: count_own(count, children_count),
        top_products: top_products(products, options.top_n),
        origin_percentage,
    }
}

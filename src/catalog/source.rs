//! Boundaries between the walker and the catalog backends

use crate::catalog::types::{Category, CategoryId, Product};
use crate::error::FetchResult;

/// Supplies the initial, unenriched category tree
pub trait TreeSource {
    /// Fetch the whole tree in one call.
    ///
    /// Every node comes back with `count` and `sub_categories` populated and
    /// `stats` unset. An error here aborts the run before any traversal.
    fn fetch_tree(&self) -> FetchResult<Category>;
}

/// Supplies the product list of a single category
///
/// Shared by every worker of a walk, so implementations must be `Sync`.
/// Retries and timeouts are the implementation's business; the walker calls
/// this exactly once per category.
pub trait ProductSource: Send + Sync {
    /// Fetch the full, unordered product list for `id`
    fn fetch_products(&self, id: &CategoryId) -> FetchResult<Vec<Product>>;
}

impl<T: ProductSource + ?Sized> ProductSource for &T {
    fn fetch_products(&self, id: &CategoryId) -> FetchResult<Vec<Product>> {
        (**self).fetch_products(id)
    }
}

impl<T: TreeSource + ?Sized> TreeSource for &T {
    fn fetch_tree(&self) -> FetchResult<Category> {
        (**self).fetch_tree()
    }
}

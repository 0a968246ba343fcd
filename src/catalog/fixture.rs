//! Directory-backed catalog source
//!
//! Serves the catalog from JSON files on disk:
//!
//! ```text
//! <dir>/categoryTree.json   the tree payload
//! <dir>/<id>.json           product list of category <id>
//! ```
//!
//! Handy for offline runs against a saved snapshot of the API and for tests.

use crate::catalog::source::{ProductSource, TreeSource};
use crate::catalog::types::{display_id, Category, CategoryId, Product};
use crate::error::{FetchError, FetchResult};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the tree payload inside a fixture directory
pub const TREE_FILE: &str = "categoryTree.json";

/// Catalog source reading saved payloads from a directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the product list for `id`
    pub fn products_path(&self, id: &CategoryId) -> PathBuf {
        self.root.join(format!("{}.json", display_id(id)))
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> FetchResult<T> {
        let bytes = fs::read(path).map_err(|e| FetchError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode {
            url: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl TreeSource for DirectorySource {
    fn fetch_tree(&self) -> FetchResult<Category> {
        let path = self.root.join(TREE_FILE);
        debug!(path = %path.display(), "Reading category tree");
        Self::read_json(&path)
    }
}

impl ProductSource for DirectorySource {
    fn fetch_products(&self, id: &CategoryId) -> FetchResult<Vec<Product>> {
        Self::read_json(&self.products_path(id))
    }
}

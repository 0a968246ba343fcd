//! HTTP catalog client
//!
//! Talks to the catalog API with a blocking `reqwest` client. Each worker
//! thread calls into the same client; `reqwest::blocking::Client` pools
//! connections internally and is safe to share.
//!
//! No retries are performed here. A failed request is reported once and the
//! walker aborts the run.

use crate::catalog::source::{ProductSource, TreeSource};
use crate::catalog::types::{display_id, Category, CategoryId, Product};
use crate::error::{FetchError, FetchResult};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};

/// Endpoint returning the whole category tree
pub const DEFAULT_TREE_URL: &str = "https://mat.se/api/product/getCategoryTree";

/// Endpoint prefix returning one category's products; the id is appended
pub const DEFAULT_PRODUCTS_URL_PREFIX: &str =
    "https://mat.se/api/product/listCategory?categoryId=";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for [`CatalogClient`]
#[derive(Debug, Clone)]
pub struct CatalogClientBuilder {
    tree_url: String,
    products_url_prefix: String,
    timeout: Duration,
}

impl Default for CatalogClientBuilder {
    fn default() -> Self {
        Self {
            tree_url: DEFAULT_TREE_URL.to_string(),
            products_url_prefix: DEFAULT_PRODUCTS_URL_PREFIX.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl CatalogClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree_url(mut self, url: impl Into<String>) -> Self {
        self.tree_url = url.into();
        self
    }

    pub fn products_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.products_url_prefix = prefix.into();
        self
    }

    /// Whole-request timeout (connect + transfer)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> FetchResult<CatalogClient> {
        let products = ProductsEndpoint::parse(&self.products_url_prefix)?;

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("catalog-walker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport {
                url: self.tree_url.clone(),
                reason: format!("can't initialize HTTP client: {}", e),
            })?;

        Ok(CatalogClient {
            client,
            tree_url: self.tree_url,
            products,
        })
    }
}

/// Where a category id goes in the product list URL
#[derive(Debug, Clone)]
enum ProductsEndpoint {
    /// `...?key=` prefix: the id becomes the value of `key`
    Query { base: Url, key: String },

    /// Anything else: the id becomes the last path segment
    Path(Url),
}

impl ProductsEndpoint {
    fn parse(prefix: &str) -> FetchResult<Self> {
        let invalid = |reason: String| FetchError::Transport {
            url: prefix.to_string(),
            reason: format!("invalid product list URL: {}", reason),
        };

        if let Some(head) = prefix.strip_suffix('=') {
            if let Some(split) = head.rfind(['?', '&']) {
                let base = Url::parse(&head[..split]).map_err(|e| invalid(e.to_string()))?;
                let key = head[split + 1..].to_string();
                return Ok(ProductsEndpoint::Query { base, key });
            }
        }

        let url = Url::parse(prefix).map_err(|e| invalid(e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(invalid("cannot carry a path".to_string()));
        }
        Ok(ProductsEndpoint::Path(url))
    }

    /// Full URL for `id`, percent-encoded
    fn url_for(&self, id: &str) -> String {
        match self {
            ProductsEndpoint::Query { base, key } => {
                let mut url = base.clone();
                url.query_pairs_mut().append_pair(key, id);
                url.into()
            }
            ProductsEndpoint::Path(base) => {
                let mut url = base.clone();
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.pop_if_empty().push(id);
                }
                url.into()
            }
        }
    }
}

/// Catalog API client implementing both sources
#[derive(Debug)]
pub struct CatalogClient {
    client: Client,
    tree_url: String,
    products: ProductsEndpoint,
}

impl CatalogClient {
    pub fn builder() -> CatalogClientBuilder {
        CatalogClientBuilder::new()
    }

    pub fn tree_url(&self) -> &str {
        &self.tree_url
    }

    /// URL listing the products of `id`
    ///
    /// The id is percent-encoded, so ids with `&`, `#` or spaces address the
    /// right category.
    pub fn products_url(&self, id: &CategoryId) -> String {
        self.products.url_for(&display_id(id))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        trace!(url = %url, "GET");

        let response = self.client.get(url).send().map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl TreeSource for CatalogClient {
    fn fetch_tree(&self) -> FetchResult<Category> {
        debug!(url = %self.tree_url, "Fetching category tree");
        self.get_json(&self.tree_url)
    }
}

impl ProductSource for CatalogClient {
    fn fetch_products(&self, id: &CategoryId) -> FetchResult<Vec<Product>> {
        let url = self.products_url(id);
        debug!(id = %display_id(id), "Fetching category");
        self.get_json(&url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_products_url() {
        let client = CatalogClient::builder()
            .products_url_prefix("http://localhost:9/list?categoryId=")
            .build()
            .unwrap();

        assert_eq!(
            client.products_url(&json!(1234)),
            "http://localhost:9/list?categoryId=1234"
        );
        assert_eq!(
            client.products_url(&json!("dairy")),
            "http://localhost:9/list?categoryId=dairy"
        );
    }

    #[test]
    fn test_products_url_encodes_id() {
        let client = CatalogClient::builder()
            .products_url_prefix("http://localhost:9/list?categoryId=")
            .build()
            .unwrap();

        assert_eq!(
            client.products_url(&json!("fruit & veg#1")),
            "http://localhost:9/list?categoryId=fruit+%26+veg%231"
        );
    }

    #[test]
    fn test_products_url_keeps_other_query_params() {
        let client = CatalogClient::builder()
            .products_url_prefix("http://localhost:9/list?store=7&categoryId=")
            .build()
            .unwrap();

        assert_eq!(
            client.products_url(&json!(12)),
            "http://localhost:9/list?store=7&categoryId=12"
        );
    }

    #[test]
    fn test_products_url_path_prefix() {
        let client = CatalogClient::builder()
            .products_url_prefix("http://localhost:9/categories/")
            .build()
            .unwrap();

        assert_eq!(
            client.products_url(&json!("a/b c")),
            "http://localhost:9/categories/a%2Fb%20c"
        );
    }

    #[test]
    fn test_invalid_products_prefix() {
        let err = CatalogClient::builder()
            .products_url_prefix("not a url?categoryId=")
            .build()
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[test]
    fn test_builder_defaults() {
        let client = CatalogClient::builder().build().unwrap();
        assert_eq!(client.tree_url(), DEFAULT_TREE_URL);
        assert!(client.products_url(&json!(1)).starts_with(DEFAULT_PRODUCTS_URL_PREFIX));
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        // Port 9 (discard) on localhost is closed on any sane test machine
        let client = CatalogClient::builder()
            .tree_url("http://127.0.0.1:9/tree")
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        match client.fetch_tree() {
            Err(FetchError::Transport { url, .. }) => assert_eq!(url, "http://127.0.0.1:9/tree"),
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}

//! Catalog payloads and the sources that produce them
//!
//! - [`types`]: the category tree and product types, with pass-through of
//!   fields the walker does not interpret
//! - [`source`]: the [`TreeSource`] and [`ProductSource`] traits the walker
//!   is written against
//! - [`http`]: the catalog API client
//! - [`fixture`]: saved payloads read from a directory

pub mod fixture;
pub mod http;
pub mod source;
pub mod types;

pub use fixture::DirectorySource;
pub use http::{CatalogClient, CatalogClientBuilder};
pub use source::{ProductSource, TreeSource};
pub use types::{display_id, Category, CategoryId, CategoryStats, Product};

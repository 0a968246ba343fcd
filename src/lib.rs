//! catalog-walker - Product Category Tree Enrichment
//!
//! Fetches a product-category tree from a catalog API and annotates every
//! category with statistics derived from its product list:
//!
//! - `countOwn`: items directly in the category, excluding its subtree
//! - `topProducts`: the best sellers, highest `soldCount` first
//! - `originPercentage`: share of products from a given country (0-100)
//!
//! # Features
//!
//! - **Bounded Parallelism**: A fixed pool of worker threads, so at most
//!   `pool_size` product fetches are in flight no matter how wide or deep
//!   the tree is.
//!
//! - **Fail Fast**: The first failed fetch cancels the whole run. Workers
//!   and the enumerator notice at once and every thread is joined before
//!   the error is returned.
//!
//! - **Exactly Once**: Each category's statistics slot is lent to exactly one
//!   worker, so no category is fetched twice and none is skipped.
//!
//! - **Lossless Output**: Fields the walker does not interpret are passed
//!   through untouched.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Catalog API                               │
//! │          getCategoryTree          listCategory?categoryId=       │
//! └──────────────┬───────────────────────────────┬──────────────────┘
//!                │ 1 call                        │ 1 call per category
//!                ▼                               │
//!        ┌───────────────┐                       │
//!        │  TreeSource   │                       │
//!        └───────┬───────┘                       │
//!                │ Category tree                 │
//!                ▼                               │
//! ┌──────────────────────────────┐     ┌─────────┴────────────┐
//! │      EnrichCoordinator       │     │    Worker Threads     │
//! │  pre-order ──► bounded queue ├────►│ fetch ─► compute ─►   │
//! │                              │     │ write stats in place  │
//! └──────────────────────────────┘     └──────────────────────┘
//!                │
//!                ▼
//!         enriched tree (JSON)
//! ```
//!
//! # Example
//!
//! ```bash
//! # Enrich the live catalog
//! catalog-walker -o tree.json
//!
//! # Offline, from a saved snapshot
//! catalog-walker --from-dir ./snapshot --origin DK --top 10
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod progress;
pub mod walker;

pub use catalog::{Category, CategoryStats, Product, ProductSource, TreeSource};
pub use config::{CliArgs, SourceConfig, WalkConfig};
pub use error::{FetchError, Result, WalkerError};
pub use walker::{
    enrich, process_category_tree, EnrichCoordinator, EnrichOptions, EnrichStats, StatsOptions,
};

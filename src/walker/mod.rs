//! Parallel category tree walker
//!
//! This module implements the enrichment engine: a fixed pool of worker
//! threads pulling categories from one bounded queue, fetching each
//! category's products and writing its statistics in place.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │    EnrichCoordinator    │
//!                     │  - pre-order Tasks      │
//!                     │  - monitor (deadline)   │
//!                     └───────────┬─────────────┘
//!                                 │ bounded queue (crossbeam)
//!       ┌─────────────────────────┼─────────────────────────┐
//!       │                         │                         │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │  Worker 1 │             │  Worker 2 │             │  Worker N │
//! │  fetch    │             │  fetch    │             │  fetch    │
//! │  compute  │             │  compute  │             │  compute  │
//! └─────┬─────┘             └─────┬─────┘             └─────┬─────┘
//!       └────────── first error ──┴──► CancelToken ◄─────────┘
//! ```

pub mod cancel;
pub mod coordinator;
pub mod queue;
pub mod stats;
pub mod worker;

pub use cancel::CancelToken;
pub use coordinator::{
    enrich, process_category_tree, EnrichCoordinator, EnrichOptions, EnrichProgress, EnrichStats,
    DEFAULT_POOL_SIZE, DEFAULT_QUEUE_SIZE,
};
pub use stats::StatsOptions;

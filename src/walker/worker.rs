//! Worker thread logic for parallel category enrichment
//!
//! Each worker:
//! - Pulls category tasks from the work queue
//! - Fetches the category's product list from the shared [`ProductSource`]
//! - Computes the category statistics and writes them into its slot
//! - On a fetch failure, records the error on the run's [`CancelToken`] and
//!   stops
//!
//! Workers are scoped threads: they borrow the tree, the source and the token
//! from the coordinator and are all joined before the coordinator returns.

use crate::catalog::source::ProductSource;
use crate::catalog::types::display_id;
use crate::error::{FetchError, WalkerError, WorkerError};
use crate::walker::cancel::CancelToken;
use crate::walker::queue::{NodeTask, WorkQueueReceiver};
use crate::walker::stats::{self, StatsOptions};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, Scope, ScopedJoinHandle};
use tracing::{debug, trace, warn};

/// Statistics collected by a worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Categories enriched
    pub categories_processed: AtomicU64,

    /// Products fetched (before top-N truncation)
    pub products_fetched: AtomicU64,

    /// Failed product fetches
    pub failures: AtomicU64,
}

impl WorkerStats {
    fn record_category(&self, products: u64) {
        self.categories_processed.fetch_add(1, Ordering::Relaxed);
        self.products_fetched.fetch_add(products, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }
}

/// Everything a worker borrows from the coordinator
pub struct WorkerContext<'a, S: ?Sized> {
    pub source: &'a S,
    pub options: &'a StatsOptions,
    pub cancel: &'a CancelToken,
}

impl<S: ?Sized> Clone for WorkerContext<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for WorkerContext<'_, S> {}

/// A scoped worker thread processing category tasks
pub struct Worker<'scope> {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<ScopedJoinHandle<'scope, ()>>,

    /// Worker statistics
    stats: Arc<WorkerStats>,
}

impl<'scope> Worker<'scope> {
    /// Spawn a new worker thread inside `scope`
    pub fn spawn<'env, 't, S>(
        scope: &'scope Scope<'scope, 'env>,
        id: usize,
        ctx: WorkerContext<'scope, S>,
        queue: WorkQueueReceiver<'t>,
    ) -> Result<Self, WorkerError>
    where
        S: ProductSource + ?Sized,
        't: 'scope,
    {
        let stats = Arc::new(WorkerStats::default());
        let stats_clone = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(format!("walker-{}", id))
            .spawn_scoped(scope, move || worker_loop(id, ctx, queue, &stats_clone))
            .map_err(|e| WorkerError::SpawnFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Shared handle to the statistics, for progress reporting
    pub fn stats_handle(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|payload| WorkerError::Panicked {
                id: self.id,
                message: panic_message(payload.as_ref()),
            }),
            None => Ok(()),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Worker thread panicked".into()
    }
}

/// Cancels the run if the worker unwinds, so the others stop promptly
struct PanicGuard<'a> {
    id: usize,
    cancel: &'a CancelToken,
}

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.cancel.fail(WalkerError::Worker(WorkerError::Panicked {
                id: self.id,
                message: "panicked while enriching a category".into(),
            }));
        }
    }
}

/// Main worker loop
fn worker_loop<S: ProductSource + ?Sized>(
    id: usize,
    ctx: WorkerContext<'_, S>,
    queue: WorkQueueReceiver<'_>,
    stats: &WorkerStats,
) {
    let _guard = PanicGuard {
        id,
        cancel: ctx.cancel,
    };
    debug!(worker = id, "Worker starting");

    while let Some(task) = queue.recv(ctx.cancel) {
        let category = display_id(task.id);
        let index = task.index;

        match process_category(task, ctx.source, ctx.options) {
            Ok(products) => {
                stats.record_category(products);
                trace!(worker = id, category = %category, index, products, "Category enriched");
            }
            Err(e) => {
                stats.record_failure();
                warn!(worker = id, category = %category, url = %e.url(), error = %e, "Category failed");
                ctx.cancel.fail(e.into());
                break;
            }
        }
    }

    debug!(
        worker = id,
        categories = stats.categories_processed.load(Ordering::Relaxed),
        cancelled = ctx.cancel.is_cancelled(),
        "Worker shutting down"
    );
}

/// Enrich a single category. Returns the number of products fetched.
pub fn process_category<S: ProductSource + ?Sized>(
    task: NodeTask<'_>,
    source: &S,
    options: &StatsOptions,
) -> Result<u64, FetchError> {
    let products = source.fetch_products(task.id)?;
    let fetched = products.len() as u64;

    let computed = stats::compute(task.count, task.children_count, products, options);
    if computed.count_own < 0 {
        warn!(
            category = %display_id(task.id),
            count = task.count,
            children = task.children_count,
            "Children count exceeds category count"
        );
    }

    *task.slot = Some(computed);
    Ok(fetched)
}

/// Aggregate statistics from multiple workers: (categories, products, failures)
pub fn aggregate_stats(stats: &[Arc<WorkerStats>]) -> (u64, u64, u64) {
    let mut categories = 0u64;
    let mut products = 0u64;
    let mut failures = 0u64;

    for s in stats {
        categories += s.categories_processed.load(Ordering::Relaxed);
        products += s.products_fetched.load(Ordering::Relaxed);
        failures += s.failures.load(Ordering::Relaxed);
    }

    (categories, products, failures)
}

//! Enrichment coordinator - orchestrates the parallel category walk
//!
//! The coordinator is responsible for:
//! - Setting up the work queue and the worker pool
//! - Enumerating the tree pre-order into the queue
//! - Running the monitor thread (progress callback, deadline)
//! - Joining every thread before returning
//! - Turning the run's cancel reason into the returned error
//!
//! A run either enriches every category or fails. On failure the tree has
//! been partially written and must be thrown away.

use crate::catalog::source::{ProductSource, TreeSource};
use crate::catalog::types::Category;
use crate::error::{Result, WalkerError, WorkerError};
use crate::walker::cancel::CancelToken;
use crate::walker::queue::{work_queue, QueueStats, Tasks};
use crate::walker::stats::StatsOptions;
use crate::walker::worker::{aggregate_stats, Worker, WorkerContext, WorkerStats};
use crossbeam_channel::{bounded, select, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default number of concurrent workers
pub const DEFAULT_POOL_SIZE: usize = 6;

/// Default work queue capacity
pub const DEFAULT_QUEUE_SIZE: usize = 64;

/// How often the monitor thread wakes up
const MONITOR_TICK: Duration = Duration::from_millis(100);

/// Tunables of an enrichment run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Number of concurrent workers (and so of concurrent product fetches)
    pub pool_size: usize,

    /// Work queue capacity
    pub queue_size: usize,

    /// Aggregation parameters (top N, origin code)
    pub stats: StatsOptions,

    /// Fail the run if it has not finished after this long
    pub deadline: Option<Duration>,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            queue_size: DEFAULT_QUEUE_SIZE,
            stats: StatsOptions::default(),
            deadline: None,
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct EnrichStats {
    /// Categories enriched
    pub categories: u64,

    /// Products fetched across all categories
    pub products: u64,

    /// Workers used
    pub workers: usize,

    /// Time taken for the run
    pub duration: Duration,
}

/// Progress information for display
#[derive(Debug, Clone, Default)]
pub struct EnrichProgress {
    /// Categories enriched so far
    pub categories: u64,

    /// Categories in the tree
    pub total_categories: u64,

    /// Products fetched so far
    pub products: u64,

    /// Failed fetches so far
    pub failures: u64,

    /// Categories waiting in the work queue
    pub queued: u64,

    /// Total workers
    pub total_workers: usize,

    /// Elapsed time
    pub elapsed: Duration,
}

impl EnrichProgress {
    /// Calculate categories per second rate
    pub fn categories_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.categories as f64 / secs
        } else {
            0.0
        }
    }

    /// Fraction of categories done, 0.0-1.0
    pub fn fraction_done(&self) -> f64 {
        if self.total_categories == 0 {
            1.0
        } else {
            self.categories as f64 / self.total_categories as f64
        }
    }
}

/// Coordinates one parallel enrichment run
pub struct EnrichCoordinator {
    /// Configuration
    options: EnrichOptions,

    /// Cancellation shared with workers and outside callers
    cancel: Arc<CancelToken>,
}

impl EnrichCoordinator {
    /// Create a new coordinator
    pub fn new(options: EnrichOptions) -> Self {
        Self {
            options,
            cancel: Arc::new(CancelToken::new()),
        }
    }

    /// Get a handle to the run's cancel token (for signal handlers)
    ///
    /// Cancelling it makes the run fail with [`WalkerError::Interrupted`]
    /// unless a more specific error was recorded first.
    pub fn cancel_token(&self) -> Arc<CancelToken> {
        Arc::clone(&self.cancel)
    }

    /// Enrich every category of `tree` in place
    pub fn run<S>(self, tree: &mut Category, source: &S) -> Result<EnrichStats>
    where
        S: ProductSource + ?Sized,
    {
        self.run_with_progress(tree, source, |_| {})
    }

    /// Enrich every category of `tree` in place, calling `progress`
    /// periodically from a monitor thread
    pub fn run_with_progress<S, F>(
        self,
        tree: &mut Category,
        source: &S,
        progress: F,
    ) -> Result<EnrichStats>
    where
        S: ProductSource + ?Sized,
        F: Fn(&EnrichProgress) + Sync,
    {
        let start = Instant::now();
        let total = tree.node_count() as u64;
        let pool_size = self.options.pool_size.max(1);
        let cancel: &CancelToken = &self.cancel;
        let stats_options = &self.options.stats;
        let deadline = self.options.deadline;
        let progress = &progress;

        info!(
            categories = total,
            workers = pool_size,
            queue_size = self.options.queue_size,
            "Starting enrichment"
        );

        let (categories, products) = thread::scope(|scope| {
            let (queue_tx, queue_rx) = work_queue(self.options.queue_size);
            let (done_tx, done_rx) = bounded::<()>(0);
            let ctx = WorkerContext {
                source,
                options: stats_options,
                cancel,
            };

            // Spawn workers
            let mut workers = Vec::with_capacity(pool_size);
            for id in 0..pool_size {
                match Worker::spawn(scope, id, ctx, queue_rx.clone()) {
                    Ok(worker) => workers.push(worker),
                    Err(e) => {
                        cancel.fail(e.into());
                        break;
                    }
                }
            }
            drop(queue_rx);
            debug!(count = workers.len(), "Workers spawned");

            let worker_stats: Vec<Arc<WorkerStats>> =
                workers.iter().map(Worker::stats_handle).collect();
            let queue_stats = queue_tx.stats();

            let monitor = {
                let worker_stats = worker_stats.clone();
                let queue_stats = Arc::clone(&queue_stats);
                let workers_len = workers.len();
                thread::Builder::new()
                    .name("walker-monitor".into())
                    .spawn_scoped(scope, move || {
                        monitor_loop(
                            done_rx,
                            cancel,
                            deadline,
                            start,
                            total,
                            workers_len,
                            &worker_stats,
                            &queue_stats,
                            progress,
                        )
                    })
            };
            if let Err(e) = &monitor {
                cancel.fail(WalkerError::Worker(WorkerError::SpawnFailed {
                    id: pool_size,
                    reason: e.to_string(),
                }));
            }

            // Feed the queue in pre-order
            let mut sent = 0u64;
            for task in Tasks::new(tree) {
                if !queue_tx.send(task, cancel) {
                    debug!(sent, total, "Enumeration stopped by cancellation");
                    break;
                }
                sent += 1;
            }
            drop(queue_tx);

            // Wait for workers to finish
            for worker in workers {
                let id = worker.id();
                if let Err(e) = worker.join() {
                    warn!(worker = id, error = %e, "Worker failed to join cleanly");
                    cancel.fail(e.into());
                }
            }

            drop(done_tx);
            if let Ok(handle) = monitor {
                if handle.join().is_err() {
                    warn!("Monitor thread panicked");
                }
            }

            let (categories, products, _) = aggregate_stats(&worker_stats);
            (categories, products)
        });

        let duration = start.elapsed();

        // A deadline or cancel that lands after the last category is moot
        let finished = categories == total;
        match self.cancel.take_error() {
            Some(WalkerError::DeadlineExceeded(_)) | None if finished => {
                if self.cancel.is_cancelled() {
                    debug!("Cancelled after every category was enriched");
                }
            }
            Some(error) => {
                warn!(
                    categories,
                    total,
                    duration_ms = duration.as_millis() as u64,
                    error = %error,
                    "Enrichment aborted"
                );
                return Err(error);
            }
            None if self.cancel.is_cancelled() => {
                warn!(categories, total, "Enrichment interrupted");
                return Err(WalkerError::Interrupted);
            }
            None => {}
        }

        info!(
            categories,
            products,
            duration_ms = duration.as_millis() as u64,
            "Enrichment completed"
        );

        Ok(EnrichStats {
            categories,
            products,
            workers: pool_size,
            duration,
        })
    }
}

/// Periodic progress reporting and deadline enforcement.
///
/// Exits once the coordinator drops the `done` sender. The deadline is not
/// enforced once every category has been enriched.
#[allow(clippy::too_many_arguments)]
fn monitor_loop<F: Fn(&EnrichProgress)>(
    done: Receiver<()>,
    cancel: &CancelToken,
    mut deadline: Option<Duration>,
    start: Instant,
    total: u64,
    total_workers: usize,
    worker_stats: &[Arc<WorkerStats>],
    queue_stats: &QueueStats,
    progress: &F,
) {
    loop {
        let wait = match deadline {
            Some(limit) => MONITOR_TICK.min(limit.saturating_sub(start.elapsed())),
            None => MONITOR_TICK,
        };

        select! {
            recv(done) -> _ => break,
            default(wait) => {}
        }

        let (categories, products, failures) = aggregate_stats(worker_stats);

        if let Some(limit) = deadline {
            if categories >= total {
                deadline = None;
            } else if start.elapsed() >= limit {
                warn!(deadline_ms = limit.as_millis() as u64, "Deadline exceeded, cancelling");
                cancel.fail(WalkerError::DeadlineExceeded(limit));
                deadline = None;
            }
        }

        progress(&EnrichProgress {
            categories,
            total_categories: total,
            products,
            failures,
            queued: queue_stats.pending(),
            total_workers,
            elapsed: start.elapsed(),
        });
    }
}

/// Enrich every category of `tree` in place with a fresh coordinator.
///
/// Returns the first fetch failure if any category could not be processed;
/// which one is reported when several fail concurrently is timing dependent.
pub fn enrich<S>(tree: &mut Category, source: &S, options: &EnrichOptions) -> Result<EnrichStats>
where
    S: ProductSource + ?Sized,
{
    EnrichCoordinator::new(options.clone()).run(tree, source)
}

/// Fetch the category tree and enrich it.
///
/// No tree is returned unless every category was enriched.
pub fn process_category_tree<T, P>(
    trees: &T,
    products: &P,
    options: &EnrichOptions,
) -> Result<(Category, EnrichStats)>
where
    T: TreeSource + ?Sized,
    P: ProductSource + ?Sized,
{
    info!("Fetching category tree");
    let mut tree = trees.fetch_tree()?;
    let stats = enrich(&mut tree, products, options)?;
    Ok((tree, stats))
}

//! Work items and the bounded work queue
//!
//! The tree is enumerated pre-order into [`NodeTask`]s. Each task carries a
//! read-only snapshot of what its category needs (`id`, `count`, the
//! children's total `count`) plus an exclusive `&mut` to that category's
//! statistics slot. Slots of different categories are disjoint borrows of the
//! tree, so workers can fill them concurrently without locking, and a slot
//! can only ever be handed out once.
//!
//! The queue is a bounded crossbeam channel. Both ends wait with a `select!`
//! on the run's [`CancelToken`], so a cancelled run never leaves the
//! enumerator or a worker parked on the channel.

use crate::catalog::types::{id_field, Category, CategoryId, CategoryStats};
use crate::walker::cancel::CancelToken;
use crossbeam_channel::{bounded, select, Receiver, Sender};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A category waiting to be enriched
#[derive(Debug)]
pub struct NodeTask<'t> {
    /// Position in pre-order (root = 0)
    pub index: usize,

    pub id: &'t CategoryId,

    /// Subtree count of this category
    pub count: i64,

    /// Sum of the direct children's subtree counts
    pub children_count: i64,

    /// Where the computed statistics go
    pub slot: &'t mut Option<CategoryStats>,
}

/// Pre-order enumeration of a tree into tasks
///
/// Lazy: the next category is only split off when the queue has taken the
/// previous one.
pub struct Tasks<'t> {
    stack: Vec<&'t mut Category>,
    next_index: usize,
}

impl<'t> Tasks<'t> {
    pub fn new(root: &'t mut Category) -> Self {
        Self {
            stack: vec![root],
            next_index: 0,
        }
    }
}

impl<'t> Iterator for Tasks<'t> {
    type Item = NodeTask<'t>;

    fn next(&mut self) -> Option<NodeTask<'t>> {
        let node = self.stack.pop()?;
        let children_count = node.children_count();

        let Category {
            count,
            sub_categories,
            stats,
            extra,
        } = node;

        if let Some(children) = sub_categories {
            self.stack.extend(children.iter_mut().rev());
        }
        let extra: &'t Map<String, Value> = extra;

        let index = self.next_index;
        self.next_index += 1;

        Some(NodeTask {
            index,
            id: id_field(extra),
            count: *count,
            children_count,
            slot: stats,
        })
    }
}

/// Statistics for the work queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total tasks enqueued
    pub enqueued: AtomicU64,

    /// Total tasks dequeued
    pub dequeued: AtomicU64,
}

impl QueueStats {
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    pub fn dequeued(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    /// Tasks sitting in the queue right now
    pub fn pending(&self) -> u64 {
        self.enqueued().saturating_sub(self.dequeued())
    }
}

/// Create a bounded work queue
///
/// A capacity of 0 makes every handoff a rendezvous between the enumerator
/// and a worker. The queue closes once the sender is dropped and drained.
pub fn work_queue<'t>(capacity: usize) -> (WorkQueueSender<'t>, WorkQueueReceiver<'t>) {
    let (sender, receiver) = bounded(capacity);
    let stats = Arc::new(QueueStats::default());

    (
        WorkQueueSender {
            sender,
            stats: Arc::clone(&stats),
        },
        WorkQueueReceiver { receiver, stats },
    )
}

/// Enumerator side of the queue
pub struct WorkQueueSender<'t> {
    sender: Sender<NodeTask<'t>>,
    stats: Arc<QueueStats>,
}

impl<'t> WorkQueueSender<'t> {
    /// Hand a task to the pool, waiting for room.
    ///
    /// Returns `false` if the run was cancelled or every worker is gone; the
    /// task is dropped in that case.
    pub fn send(&self, task: NodeTask<'t>, cancel: &CancelToken) -> bool {
        if cancel.is_cancelled() {
            return false;
        }

        select! {
            send(self.sender, task) -> res => {
                if res.is_ok() {
                    self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                    true
                } else {
                    false
                }
            }
            recv(cancel.signal()) -> _ => false,
        }
    }

    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }
}

/// Worker side of the queue
#[derive(Clone)]
pub struct WorkQueueReceiver<'t> {
    receiver: Receiver<NodeTask<'t>>,
    stats: Arc<QueueStats>,
}

impl<'t> WorkQueueReceiver<'t> {
    /// Wait for the next task.
    ///
    /// Returns `None` once the run is cancelled or the queue is closed and
    /// drained.
    pub fn recv(&self, cancel: &CancelToken) -> Option<NodeTask<'t>> {
        if cancel.is_cancelled() {
            return None;
        }

        select! {
            recv(self.receiver) -> msg => {
                let task = msg.ok()?;
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Some(task)
            }
            recv(cancel.signal()) -> _ => None,
        }
    }
}

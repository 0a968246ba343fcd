//! Run-wide cancellation
//!
//! A [`CancelToken`] is shared by the enumerator, every worker, the monitor
//! thread and any outside party (signal handler). Cancelling is a broadcast:
//! the token holds the only sender of a channel that never carries a message,
//! and dropping that sender disconnects the channel. Anyone blocked in a
//! `select!` on [`CancelToken::signal`] wakes up at once, so no thread stays
//! parked on a queue nobody will service.
//!
//! The token also keeps the reason for the cancel. The first recorded error
//! wins; later ones are discarded.

use crate::error::WalkerError;
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Broadcast cancellation flag with first-error-wins reporting
#[derive(Debug)]
pub struct CancelToken {
    cancelled: AtomicBool,
    trigger: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
    first_error: Mutex<Option<WalkerError>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (trigger, signal) = bounded(0);
        Self {
            cancelled: AtomicBool::new(false),
            trigger: Mutex::new(Some(trigger)),
            signal,
            first_error: Mutex::new(None),
        }
    }

    /// Cancel without an error. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // Dropping the sender disconnects `signal` for every receiver
        self.trigger.lock().take();
    }

    /// Record `error` as the reason for the cancel and cancel.
    ///
    /// Returns `true` if this was the first error recorded. Later errors are
    /// dropped.
    pub fn fail(&self, error: WalkerError) -> bool {
        let first = {
            let mut slot = self.first_error.lock();
            if slot.is_none() {
                *slot = Some(error);
                true
            } else {
                debug!(error = %error, "Discarding error after cancellation");
                false
            }
        };
        self.cancel();
        first
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Receiver that becomes ready (disconnected) once the token is cancelled.
    ///
    /// Meant for `select!` next to a blocking channel operation.
    pub fn signal(&self) -> &Receiver<()> {
        &self.signal
    }

    /// Take the recorded error, if any
    pub fn take_error(&self) -> Option<WalkerError> {
        self.first_error.lock().take()
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

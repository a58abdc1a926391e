//! The privileged work queue.
//!
//! Documents may only be modified on one thread. [`PrivilegedQueue`] owns
//! that thread: it runs queued jobs one at a time, in submission order, and
//! marks its thread with the queue id, which
//! [`is_privileged_thread`] reports.
//!
//! ```ignore
//! let queue = PrivilegedQueue::start("savefix-writer")?;
//! let handle = queue.handle();
//!
//! handle.invoke_later(|| apply_fixes());
//! handle.flush()?; // wait for everything queued so far
//! ```

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, error, warn};

use crate::SaveActionError;
use crate::error::panic_message;

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_QUEUE: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Returns whether the current thread is the worker of a privileged queue.
pub fn is_privileged_thread() -> bool {
    current_queue_id().is_some()
}

/// Id of the queue whose worker is the current thread.
pub(crate) fn current_queue_id() -> Option<u64> {
    CURRENT_QUEUE.with(Cell::get)
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Single-consumer FIFO queue backed by a dedicated thread.
///
/// The queue owns the only strong reference to its sender. Dropping it
/// closes every handle, lets the worker finish each job that was accepted,
/// then joins it. Handles that outlive the queue get
/// [`SaveActionError::QueueClosed`].
pub struct PrivilegedQueue {
    id: u64,
    sender: Option<Arc<Sender<Job>>>,
    worker: Option<JoinHandle<()>>,
}

impl PrivilegedQueue {
    /// Spawns the worker thread.
    pub fn start(name: impl Into<String>) -> Result<Self, SaveActionError> {
        let id = NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = crossbeam_channel::unbounded();
        let worker = thread::Builder::new()
            .name(name.into())
            .spawn(move || worker_loop(id, receiver))?;

        Ok(Self {
            id,
            sender: Some(Arc::new(sender)),
            worker: Some(worker),
        })
    }

    /// Returns a handle for submitting work.
    pub fn handle(&self) -> QueueHandle {
        QueueHandle {
            id: self.id,
            sender: self.sender.as_ref().map(Arc::downgrade).unwrap_or_default(),
        }
    }
}

impl Drop for PrivilegedQueue {
    fn drop(&mut self) {
        // Handles holding an upgraded sender keep the channel open until
        // their send returns, so accepted jobs still reach the worker.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if current_queue_id() == Some(self.id) {
                return;
            }
            if worker.join().is_err() {
                error!("Privileged queue worker terminated abnormally");
            }
        }
    }
}

fn worker_loop(id: u64, receiver: Receiver<Job>) {
    CURRENT_QUEUE.with(|current| current.set(Some(id)));

    for job in receiver {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
            error!("Queued job panicked: {}", panic_message(&*payload));
        }
    }

    debug!("Privileged queue worker stopped");
}

/// Cloneable handle to a [`PrivilegedQueue`].
#[derive(Clone)]
pub struct QueueHandle {
    id: u64,
    sender: Weak<Sender<Job>>,
}

impl std::fmt::Debug for QueueHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueHandle")
            .field("id", &self.id)
            .field("pending", &self.pending())
            .finish()
    }
}

impl QueueHandle {
    /// Queues `job` to run on the privileged thread.
    ///
    /// Never blocks. Returns `false` (and drops the job) when the queue has
    /// shut down. A job for which this returns `true` always runs.
    pub fn invoke_later<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let sent = match self.sender.upgrade() {
            Some(sender) => sender.send(Box::new(job)).is_ok(),
            None => false,
        };
        if !sent {
            warn!("Privileged queue is closed, dropping job");
        }
        sent
    }

    /// Runs `job` on the privileged thread and waits for its result.
    ///
    /// Runs the job inline when already on this queue's worker. Called from
    /// another queue's worker, the job is queued like any other.
    pub fn invoke_and_wait<F, R>(&self, job: F) -> Result<R, SaveActionError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if current_queue_id() == Some(self.id) {
            return Ok(job());
        }

        let (result_tx, result_rx) = crossbeam_channel::bounded(1);
        let queued = self.invoke_later(move || {
            let _ = result_tx.send(job());
        });
        if !queued {
            return Err(SaveActionError::QueueClosed);
        }

        result_rx.recv().map_err(|_| SaveActionError::Interrupted)
    }

    /// Waits until every job queued before this call has run.
    pub fn flush(&self) -> Result<(), SaveActionError> {
        self.invoke_and_wait(|| ())
    }

    /// Returns the number of jobs waiting to run.
    pub fn pending(&self) -> usize {
        self.sender.upgrade().map_or(0, |sender| sender.len())
    }

    /// Returns true once the queue has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.strong_count() == 0
    }
}

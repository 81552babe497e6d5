//! Dynamically sized pool of asynchronous workers.
//!
//! This module defines the [`WorkerPool`] handle. All workers consume one
//! bounded FIFO queue; the pool only manages who is consuming it and when they
//! stop, never what an item means.
//!
//! Cancellation forms a two-level tree. The pool owns a root
//! [`CancellationToken`]; every worker gets a child of it. Removing a worker
//! cancels its child alone, and shutdown cancels the root, which reaches every
//! child that exists or will ever be created.
//!
//! Worker tasks are spawned on a [`TaskTracker`], which shutdown waits on. A
//! task leaves the tracker on every exit path, panics included.

use super::{
    registry::Registry,
    worker::{SharedQueue, worker_loop},
};
use crate::{Error, Job, Result, WorkerId};
use core::{fmt, time::Duration};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

/// How an accepted item made it into the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// There was a free slot.
    Immediate,
    /// The queue was full and the sender waited for a slot to free up.
    AfterBackpressure,
}

/// Handle to a pool of workers consuming a shared bounded queue.
///
/// Cloning the handle is cheap and every clone drives the same pool.
pub struct WorkerPool<T, J> {
    shared: Arc<Shared<T, J>>,
}

struct Shared<T, J> {
    capacity: usize,
    /// `None` once the queue has been closed. Taking it out is what makes
    /// closing happen exactly once.
    sender: Mutex<Option<mpsc::Sender<T>>>,
    queue: SharedQueue<T>,
    registry: Mutex<Registry>,
    root: CancellationToken,
    tracker: TaskTracker,
    job: Arc<J>,
}

impl<T, J> Clone for WorkerPool<T, J> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, J> fmt::Debug for WorkerPool<T, J> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("capacity", &self.shared.capacity)
            .field("workers", &self.shared.registry.lock().len())
            .field("active", &self.shared.tracker.len())
            .field("shutdown", &self.shared.root.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<T, J> WorkerPool<T, J>
where
    T: Send + 'static,
    J: Job<T>,
{
    /// Creates an empty pool whose queue holds up to `capacity` items.
    ///
    /// No workers exist until [`add_worker`](Self::add_worker) is called. A
    /// capacity of 0 is accepted but the underlying channel needs at least one
    /// slot, so a zero-capacity pool still buffers one item: a send with no
    /// worker waiting returns at once instead of handing off synchronously.
    pub fn new(capacity: usize, job: J) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        #[cfg(feature = "tracing")]
        tracing::info!(capacity, "Worker pool created");

        Self {
            shared: Arc::new(Shared {
                capacity,
                sender: Mutex::new(Some(sender)),
                queue: Arc::new(tokio::sync::Mutex::new(receiver)),
                registry: Mutex::new(Registry::default()),
                root: CancellationToken::new(),
                tracker: TaskTracker::new(),
                job: Arc::new(job),
            }),
        }
    }

    /// Starts a new worker and returns its freshly minted identity.
    ///
    /// Always succeeds. After shutdown has begun the identity is still fresh
    /// but is not registered: the worker's token is born cancelled, so it
    /// exits without taking any item and never shows up in
    /// [`worker_ids`](Self::worker_ids).
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn add_worker(&self) -> WorkerId {
        let shared = &self.shared;
        let mut registry = shared.registry.lock();

        // Checked under the registry lock, and shutdown cancels the root before
        // draining under the same lock, so a member admitted here is always
        // drained later.
        let (worker_id, token) = if shared.root.is_cancelled() {
            (registry.mint(), shared.root.child_token())
        } else {
            registry.admit(&shared.root)
        };
        shared.tracker.spawn(worker_loop(
            worker_id,
            Arc::clone(&shared.queue),
            token,
            Arc::clone(&shared.job),
        ));

        #[cfg(feature = "tracing")]
        tracing::info!(%worker_id, workers = registry.len(), "Worker added");
        worker_id
    }

    /// Stops the worker registered under `worker_id`.
    ///
    /// Returns `true` if the identity was registered. The worker stops at its
    /// next suspension point: an item it is already processing runs to
    /// completion, but it takes no further items. Returns `false` for an
    /// identity that never existed or was already removed.
    pub fn remove_worker(&self, worker_id: WorkerId) -> bool {
        let mut registry = self.shared.registry.lock();

        match registry.evict(worker_id) {
            Some(token) => {
                token.cancel();
                #[cfg(feature = "tracing")]
                tracing::info!(%worker_id, workers = registry.len(), "Worker marked for removal");
                true
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::info!(%worker_id, "Worker not found for removal");
                false
            }
        }
    }

    /// Enqueues `item`, waiting for a free slot if the queue is full.
    ///
    /// - With a free slot the item is queued at once.
    /// - Once shutdown has begun the item is dropped and
    ///   [`Error::ShuttingDown`] is returned without waiting.
    /// - Otherwise the caller waits for a slot. Shutdown releases the wait
    ///   with [`Error::ShuttingDown`].
    ///
    /// The first two outcomes are decided under the same lock that closes the
    /// queue, so an item is never queued after the queue was closed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShuttingDown`] if the item was refused.
    pub async fn send(&self, item: T) -> Result<Delivery> {
        let (sender, item) = {
            let guard = self.shared.sender.lock();
            let Some(sender) = self.open_sender(&guard) else {
                return Err(self.refuse());
            };

            match sender.try_send(item) {
                Ok(()) => return Ok(Delivery::Immediate),
                Err(TrySendError::Closed(_)) => return Err(self.refuse()),
                Err(TrySendError::Full(item)) => (sender.clone(), item),
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(capacity = self.shared.capacity, "Queue full, waiting for capacity");

        tokio::select! {
            biased;
            () = self.shared.root.cancelled() => Err(self.refuse()),
            res = sender.send(item) => match res {
                Ok(()) => Ok(Delivery::AfterBackpressure),
                Err(_) => Err(self.refuse()),
            },
        }
    }

    /// Enqueues `item` only if there is a free slot right now.
    ///
    /// # Errors
    ///
    /// - [`Error::QueueFull`] if the queue has no free slot. The item is
    ///   dropped.
    /// - [`Error::ShuttingDown`] if shutdown has begun.
    pub fn try_send(&self, item: T) -> Result<()> {
        let guard = self.shared.sender.lock();
        let Some(sender) = self.open_sender(&guard) else {
            return Err(self.refuse());
        };

        sender.try_send(item).map_err(|e| match e {
            TrySendError::Full(_) => Error::QueueFull,
            TrySendError::Closed(_) => self.refuse(),
        })
    }

    /// Shuts the pool down and waits until every worker has exited.
    ///
    /// - Cancels the root token, stopping every worker at its next suspension
    ///   point and releasing every sender waiting for a slot.
    /// - Closes the queue so no item is accepted afterwards.
    /// - Waits for every worker task, including ones added after this call
    ///   started.
    ///
    /// Items still queued are dropped with the pool. Calling this again is
    /// safe and only repeats the wait.
    pub async fn shutdown(&self) {
        self.begin_shutdown();
        self.shared.tracker.wait().await;

        #[cfg(feature = "tracing")]
        tracing::info!("All workers stopped, pool shut down");
    }

    /// Like [`shutdown`](Self::shutdown), but stops waiting after `timeout`.
    ///
    /// Workers are cancelled either way. A worker stuck inside its job keeps
    /// running until the job returns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShutdownTimedOut`] with the number of workers still
    /// running if the deadline passed first.
    pub async fn shutdown_timeout(&self, timeout: Duration) -> Result<()> {
        self.begin_shutdown();

        match tokio::time::timeout(timeout, self.shared.tracker.wait()).await {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                tracing::info!("All workers stopped, pool shut down");
                Ok(())
            }
            Err(_) => {
                let outstanding = self.shared.tracker.len();
                #[cfg(feature = "tracing")]
                tracing::warn!(outstanding, "Shutdown timed out after {:?}", timeout);
                Err(Error::ShutdownTimedOut { outstanding })
            }
        }
    }

    /// Queue capacity requested at construction.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Number of registered workers.
    pub fn worker_count(&self) -> usize {
        self.shared.registry.lock().len()
    }

    /// Registered worker identities in ascending order.
    pub fn worker_ids(&self) -> Vec<WorkerId> {
        self.shared.registry.lock().ids()
    }

    /// Number of worker tasks that have not exited yet.
    ///
    /// Can exceed [`worker_count`](Self::worker_count) while removed workers
    /// finish their current item.
    pub fn active_workers(&self) -> usize {
        self.shared.tracker.len()
    }

    /// Number of items waiting in the queue. Always 0 once the queue is
    /// closed.
    pub fn queued(&self) -> usize {
        self.shared
            .sender
            .lock()
            .as_ref()
            .map_or(0, |sender| sender.max_capacity() - sender.capacity())
    }

    /// Whether shutdown has begun.
    pub fn is_shutdown(&self) -> bool {
        self.shared.root.is_cancelled()
    }

    fn open_sender<'a>(
        &self,
        sender: &'a Option<mpsc::Sender<T>>,
    ) -> Option<&'a mpsc::Sender<T>> {
        if self.shared.root.is_cancelled() {
            return None;
        }
        sender.as_ref()
    }

    fn refuse(&self) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!("Pool is shutting down, dropping item");
        Error::ShuttingDown
    }

    fn begin_shutdown(&self) {
        let shared = &self.shared;
        shared.root.cancel();

        // Taking the sender under its lock is the close. Later calls find
        // nothing to take and fall through to waiting.
        let Some(sender) = shared.sender.lock().take() else {
            #[cfg(feature = "tracing")]
            tracing::debug!("Shutdown already in progress");
            return;
        };
        drop(sender);

        #[cfg(feature = "tracing")]
        tracing::info!("Root cancelled, input queue closed");

        let _forgotten = shared.registry.lock().drain();
        shared.tracker.close();

        #[cfg(feature = "tracing")]
        tracing::debug!(forgotten = _forgotten, "Waiting for workers to exit");
    }
}

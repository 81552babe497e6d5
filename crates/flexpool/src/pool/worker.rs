use crate::{Job, WorkerId};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

/// The pool's single queue receiver, shared by every worker.
///
/// Whoever holds the lock is the one worker currently waiting on the queue;
/// the rest queue up on the lock, which keeps delivery FIFO.
pub(crate) type SharedQueue<T> = Arc<Mutex<mpsc::Receiver<T>>>;

/// Why a worker stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WorkerExit {
    /// The worker's own token, or the pool's root token, fired.
    Cancelled,
    /// The queue was closed and had nothing left to hand out.
    QueueClosed,
}

/// Worker task body.
///
/// Each iteration races the worker's token against the next queued item.
/// Cancellation is polled first, so a cancelled worker never takes another
/// item even when one is ready. An item that was taken is processed to
/// completion before the token is looked at again.
///
/// # Arguments
///
/// - `worker_id`: identity the worker was registered under (used for the job
///   and for logs).
/// - `queue`: the pool's shared receiver.
/// - `token`: child of the pool's root token, owned by this worker alone.
/// - `job`: unit of work invoked once per item.
pub(crate) async fn worker_loop<T, J>(
    worker_id: WorkerId,
    queue: SharedQueue<T>,
    token: CancellationToken,
    job: Arc<J>,
) -> WorkerExit
where
    T: Send + 'static,
    J: Job<T>,
{
    #[cfg(feature = "tracing")]
    tracing::debug!(%worker_id, "Worker started");

    let exit = loop {
        let next = tokio::select! {
            biased;
            () = token.cancelled() => break WorkerExit::Cancelled,
            item = next_item(&queue) => item,
        };

        match next {
            Some(item) => job.run(worker_id, item).await,
            None => break WorkerExit::QueueClosed,
        }
    };

    #[cfg(feature = "tracing")]
    match exit {
        WorkerExit::Cancelled => tracing::debug!(%worker_id, "Worker cancelled, exiting"),
        WorkerExit::QueueClosed => tracing::debug!(%worker_id, "Queue closed and drained, exiting"),
    }
    exit
}

/// Waits for the queue lock, then for an item. Both waits are cancel safe, so
/// dropping this future mid-way loses nothing.
async fn next_item<T>(queue: &Mutex<mpsc::Receiver<T>>) -> Option<T> {
    queue.lock().await.recv().await
}

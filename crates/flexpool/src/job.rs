use crate::WorkerId;
use core::future::Future;

/// The unit of work a worker performs for each item it receives.
///
/// A worker awaits `run` to completion before taking its next item, so
/// cancellation is observed between items and never in the middle of one.
/// Nothing is returned to the pool; results, retries and failures are the
/// job's own business.
///
/// Any `Fn(WorkerId, T) -> impl Future<Output = ()>` closure is a job:
///
/// ```
/// use flexpool::{Job, WorkerId};
///
/// fn assert_job<T, J: Job<T>>(_: &J) {}
///
/// let job = |worker: WorkerId, item: u32| async move {
///     let _ = (worker, item);
/// };
/// assert_job::<u32, _>(&job);
/// ```
pub trait Job<T>: Send + Sync + 'static {
    /// Processes one item on behalf of `worker`.
    fn run(&self, worker: WorkerId, item: T) -> impl Future<Output = ()> + Send;
}

impl<T, F, Fut> Job<T> for F
where
    F: Fn(WorkerId, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    fn run(&self, worker: WorkerId, item: T) -> impl Future<Output = ()> + Send {
        self(worker, item)
    }
}

//! Error types for the worker pool.
//!
//! The taxonomy is intentionally small. Most pool operations are infallible:
//! adding a worker always succeeds and removing an unknown worker reports
//! `false` rather than an error.
//!
//! ## Error Cases
//! - `ShuttingDown`: an item was offered after shutdown began and was dropped.
//! - `QueueFull`: a non-blocking send found no free slot.
//! - `ShutdownTimedOut`: a bounded shutdown gave up waiting on workers.

/// A result type defaulting to the pool [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `flexpool` can emit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The pool's root token has fired or its queue is closed. The offered
    /// item was dropped.
    #[error("Pool is shutting down")]
    ShuttingDown,

    /// The queue had no free slot for a non-blocking send.
    #[error("Queue is full")]
    QueueFull,

    /// Shutdown stopped waiting before every worker exited.
    #[error("Shutdown timed out with {outstanding} worker(s) still running")]
    ShutdownTimedOut { outstanding: usize },
}

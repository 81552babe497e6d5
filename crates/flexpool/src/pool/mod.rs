//! Dynamic worker pool.
//!
//! ## Structure
//!
//! - [`manager`] - the [`WorkerPool`] handle and its public operations.
//! - [`registry`] - identity counter and per-worker cancellation tokens.
//! - [`worker`] - the loop each worker task runs.

mod manager;
mod registry;
mod worker;


pub use manager::{Delivery, WorkerPool};

//! Pieces of the demo binary.
//!
//! ## Structure
//!
//! - [`config`] - CLI / environment configuration.
//! - [`job`] - the simulated unit of work.
//! - [`script`] - the scripted sequence of pool operations.
//! - [`telemetry`] - log subscriber setup.

pub mod config;
pub mod job;
pub mod script;
pub mod telemetry;

#![doc = include_str!("../README.md")]

mod error;
mod id;
mod job;
mod pool;

pub use crate::error::*;
pub use crate::id::*;
pub use crate::job::*;
pub use crate::pool::*;

//! Statistics module for the monitor.
//!
//! Holds the per-target accumulators and the lock-guarded table that
//! pollers update and consumers snapshot.

mod models;
mod table;

pub use models::*;
pub use table::*;

//! N-Way Cache - A fixed-capacity set-associative cache
//!
//! Partitions a fixed number of slots into sets of ways, like a CPU cache,
//! with least-recently-used eviction scoped to each set and one
//! reader/writer lock per set. Also ships a small HTTP front-end.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStats, NWaySetAssociativeCache, Upsert};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_stats_task;

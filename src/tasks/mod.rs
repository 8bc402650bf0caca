//! Background Tasks Module
//!
//! Contains background tasks that run alongside the HTTP server.
//!
//! # Tasks
//! - Stats reporter: periodically logs cache occupancy and hit rate

pub mod stats_reporter;

pub use stats_reporter::spawn_stats_task;

//! Cache Module
//!
//! Provides a fixed-capacity N-way set-associative cache with per-set LRU
//! eviction and per-set reader/writer locking.

mod entry;
mod hash;
mod iter;
mod set;
mod stats;
mod store;


// Re-export public types
pub use entry::Entry;
pub use hash::{BuildIdentityHasher, IdentityHasher};
pub use iter::{Iter, Keys, Values};
pub use set::{EntrySet, Upsert};
pub use stats::{CacheStats, SetCounters};
pub use store::NWaySetAssociativeCache;

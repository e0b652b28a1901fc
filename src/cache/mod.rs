//! Cache Module
//!
//! Provides the in-memory response cache with modification-time staleness checks.

mod entry;
mod lock;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub(crate) use lock::mutex_lock;
pub use stats::CacheStats;
pub use store::{CacheStore, SharedCache};

//! Cache Module
//!
//! Bounded key-value storage and the statistics reported about it.

mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

use std::sync::Arc;

use parking_lot::RwLock;

// Re-export public types
pub use lru::LruTracker;
pub use stats::{CacheStats, ReloadStats};
pub use store::BoundedStore;

/// Store shared between the engine, its loader and the scheduler task.
///
/// Readers take the lock in shared mode; `set`, `purge` and full replaces
/// take it exclusively.
pub type SharedStore<K, V> = Arc<RwLock<BoundedStore<K, V>>>;

/// Wraps a fresh store of the given capacity for sharing.
pub fn shared_store<K, V>(capacity: usize) -> SharedStore<K, V>
where
    K: Eq + std::hash::Hash + Clone,
    V: Clone,
{
    Arc::new(RwLock::new(BoundedStore::new(capacity)))
}

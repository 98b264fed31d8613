//! The public cache contract shared by the engine and its decorators.

use std::collections::HashMap;

use crate::error::Result;

/// A periodically refreshed, capacity-bounded key-value cache.
///
/// Reads never trigger a load and never fail: a missing key is `None`.
/// Between reloads, callers see stale-but-valid data or an empty store.
pub trait LoadableCache<K, V>: Send + Sync {
    /// Returns the value currently stored under `key`.
    fn get(&self, key: &K) -> Option<V>;

    /// Returns a copy of the whole store. Later writes never affect it.
    fn get_all(&self) -> HashMap<K, V>;

    /// Returns the values of [`get_all`](Self::get_all), re-derived on each call.
    fn values(&self) -> Vec<V>;

    /// Inserts or overwrites one entry without consulting the refresh source.
    ///
    /// The entry lives until the next successful reload replaces the store.
    fn set(&self, key: K, value: V) -> Result<()>;

    /// Empties the store. The scheduler keeps running.
    fn purge(&self);

    /// Runs the refresh source once, now, on the calling thread.
    ///
    /// Returns whether a result was applied. Source errors and panics both
    /// yield `false`.
    fn try_reload_now(&self) -> bool;

    /// Stops scheduled reloads. Calling it again is a no-op.
    fn stop(&self);

    /// Re-arms the timer and relaunches scheduled reloads after a `stop`.
    fn restart(&self);
}

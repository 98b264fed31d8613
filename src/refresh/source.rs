//! Refresh Source
//!
//! The caller-supplied producer of full replacement data sets.

use std::collections::HashMap;

/// Produces the complete contents the store should hold.
///
/// The engine never inspects a source beyond calling it, and never calls it
/// concurrently with itself. Any closure of the right shape is a source.
pub trait RefreshSource<K, V>: Send + Sync {
    fn refresh(&self) -> anyhow::Result<HashMap<K, V>>;
}

impl<K, V, F> RefreshSource<K, V> for F
where
    F: Fn() -> anyhow::Result<HashMap<K, V>> + Send + Sync,
{
    fn refresh(&self) -> anyhow::Result<HashMap<K, V>> {
        self()
    }
}

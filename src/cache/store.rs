//! Bounded Store Module
//!
//! Capacity-bounded key-value storage. Not synchronized on its own: the engine
//! wraps it in a [`SharedStore`](crate::cache::SharedStore).

use std::collections::HashMap;
use std::hash::Hash;

use crate::cache::LruTracker;
use crate::error::{CacheError, Result};

// == Bounded Store ==
/// Key-value storage that never holds more than `capacity` entries.
#[derive(Debug)]
pub struct BoundedStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, V>,
    /// Write-recency tracker, drives eviction
    lru: LruTracker<K>,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Entries dropped to stay within capacity
    evictions: u64,
}

impl<K, V> BoundedStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty store holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(1024)),
            lru: LruTracker::new(),
            capacity,
            evictions: 0,
        }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    // == Set ==
    /// Stores a key-value pair, overwriting any previous value.
    ///
    /// When a new key arrives at capacity, the least recently written entry
    /// is evicted first.
    pub fn set(&mut self, key: K, value: V) -> Result<()> {
        if self.insert_bounded(key, value) {
            Ok(())
        } else {
            Err(CacheError::CacheFull(format!(
                "store capacity is {} and nothing can be evicted",
                self.capacity
            )))
        }
    }

    // == Replace All ==
    /// Purges the store and inserts `entries`, resetting eviction order.
    ///
    /// Returns the number of entries held afterwards, which is below the
    /// input size when the input exceeds capacity.
    pub fn replace_all<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.purge();
        for (key, value) in entries {
            self.insert_bounded(key, value);
        }
        self.entries.len()
    }

    /// Removes every entry.
    pub fn purge(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    /// Copies the current contents out.
    pub fn snapshot(&self) -> HashMap<K, V> {
        self.entries.clone()
    }

    /// Copies the current values out.
    pub fn values(&self) -> Vec<V> {
        self.entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total entries evicted since the store was created.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    fn insert_bounded(&mut self, key: K, value: V) -> bool {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            match self.lru.evict_oldest() {
                Some(evicted) => {
                    self.entries.remove(&evicted);
                    self.evictions += 1;
                }
                None => return false,
            }
        }

        self.lru.touch(key.clone());
        self.entries.insert(key, value);
        true
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn store_of(capacity: usize) -> BoundedStore<String, String> {
        BoundedStore::new(capacity)
    }

    #[test]
    fn test_store_new() {
        let store = store_of(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 100);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store_of(100);

        store.set("key1".to_string(), "value1".to_string()).unwrap();

        assert_eq!(store.get(&"key1".to_string()), Some(&"value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store = store_of(100);
        assert!(store.get(&"nonexistent".to_string()).is_none());
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store_of(100);

        store.set("key1".to_string(), "value1".to_string()).unwrap();
        store.set("key1".to_string(), "value2".to_string()).unwrap();

        assert_eq!(store.get(&"key1".to_string()), Some(&"value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_eviction_keeps_capacity() {
        let mut store = store_of(3);

        for i in 1..=4 {
            store.set(format!("key{}", i), format!("value{}", i)).unwrap();
        }

        assert_eq!(store.len(), 3);
        assert_eq!(store.evictions(), 1);
        assert!(store.get(&"key1".to_string()).is_none());
        assert!(store.get(&"key4".to_string()).is_some());
    }

    #[test]
    fn test_store_overwrite_refreshes_recency() {
        let mut store = store_of(3);

        store.set("key1".to_string(), "v".to_string()).unwrap();
        store.set("key2".to_string(), "v".to_string()).unwrap();
        store.set("key3".to_string(), "v".to_string()).unwrap();
        store.set("key1".to_string(), "v2".to_string()).unwrap();
        store.set("key4".to_string(), "v".to_string()).unwrap();

        assert!(store.get(&"key1".to_string()).is_some());
        assert!(store.get(&"key2".to_string()).is_none());
    }

    #[test]
    fn test_store_zero_capacity_rejects_set() {
        let mut store = store_of(0);
        let result = store.set("key".to_string(), "value".to_string());
        assert!(matches!(result, Err(CacheError::CacheFull(_))));
    }

    #[test]
    fn test_store_replace_all_discards_previous_entries() {
        let mut store = store_of(10);
        store.set("stale".to_string(), "old".to_string()).unwrap();

        let held = store.replace_all(vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ]);

        assert_eq!(held, 2);
        assert!(store.get(&"stale".to_string()).is_none());
        assert_eq!(store.get(&"a".to_string()), Some(&"1".to_string()));
    }

    #[test]
    fn test_store_replace_all_larger_than_capacity() {
        let mut store: BoundedStore<u32, u32> = BoundedStore::new(5);

        let held = store.replace_all((0..20).map(|i| (i, i)));

        assert_eq!(held, 5);
        assert_eq!(store.len(), 5);
        assert_eq!(store.evictions(), 15);
    }

    #[test]
    fn test_store_replace_all_with_empty_input_empties_store() {
        let mut store = store_of(10);
        store.set("a".to_string(), "1".to_string()).unwrap();

        assert_eq!(store.replace_all(Vec::new()), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_snapshot_is_a_copy() {
        let mut store = store_of(10);
        store.set("a".to_string(), "1".to_string()).unwrap();

        let snapshot = store.snapshot();
        store.set("a".to_string(), "2".to_string()).unwrap();

        assert_eq!(snapshot.get("a"), Some(&"1".to_string()));
    }

    #[test]
    fn test_store_replace_all_large_input_is_fast() {
        let mut store: BoundedStore<u64, u64> = BoundedStore::new(100_000);
        let input: HashMap<u64, u64> = (0..50_000).map(|i| (i, i)).collect();

        let started = Instant::now();
        let held = store.replace_all(input.clone());
        store.replace_all(input);
        let elapsed = started.elapsed();

        assert_eq!(held, 50_000);
        assert!(
            elapsed < Duration::from_secs(2),
            "two 50k-entry replaces took {:?}",
            elapsed
        );
    }

    #[test]
    fn test_store_eviction_after_many_overwrites() {
        let mut store: BoundedStore<u32, u32> = BoundedStore::new(3);
        for round in 0..100 {
            store.set(1, round).unwrap();
            store.set(2, round).unwrap();
        }
        store.set(3, 0).unwrap();
        store.set(4, 0).unwrap();

        // key 1 was written before key 2 in the last round
        assert!(store.get(&1).is_none());
        assert_eq!(store.get(&2), Some(&99));
        assert_eq!(store.len(), 3);
    }
}

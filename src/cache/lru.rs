//! LRU Tracker Module
//!
//! Tracks write recency so the bounded store knows which key to evict.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

// == LRU Tracker ==
/// Tracks write order for eviction.
///
/// Every write stamps the key with a monotonically increasing counter:
/// - `stamps` maps key -> latest stamp
/// - `order` maps stamp -> key, so the smallest stamp is the oldest write
///
/// Touch and evict are both O(log n).
///
/// Reads never touch the tracker: the store is read under a shared lock, so
/// eviction follows write recency only.
#[derive(Debug)]
pub struct LruTracker<K> {
    stamps: HashMap<K, u64>,
    order: BTreeMap<u64, K>,
    next_stamp: u64,
}

impl<K> LruTracker<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            stamps: HashMap::new(),
            order: BTreeMap::new(),
            next_stamp: 0,
        }
    }

    // == Touch ==
    /// Marks a key as most recently written.
    pub fn touch(&mut self, key: K) {
        let stamp = self.next_stamp;
        self.next_stamp += 1;

        if let Some(previous) = self.stamps.insert(key.clone(), stamp) {
            self.order.remove(&previous);
        }
        self.order.insert(stamp, key);
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently written key.
    pub fn evict_oldest(&mut self) -> Option<K> {
        let (_, key) = self.order.pop_first()?;
        self.stamps.remove(&key);
        Some(key)
    }

    /// Forgets every key.
    pub fn clear(&mut self) {
        self.stamps.clear();
        self.order.clear();
        self.next_stamp = 0;
    }
}

impl<K> Default for LruTracker<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_new() {
        let mut lru: LruTracker<u32> = LruTracker::new();
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_touch_existing_key_moves_to_front() {
        let mut lru = LruTracker::new();

        lru.touch("a");
        lru.touch("b");
        lru.touch("c");
        lru.touch("a");

        assert_eq!(lru.evict_oldest(), Some("b"));
        assert_eq!(lru.evict_oldest(), Some("c"));
        assert_eq!(lru.evict_oldest(), Some("a"));
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_evict_order() {
        let mut lru = LruTracker::new();

        lru.touch(1);
        lru.touch(2);
        lru.touch(3);

        assert_eq!(lru.evict_oldest(), Some(1));
        assert_eq!(lru.evict_oldest(), Some(2));
        assert_eq!(lru.evict_oldest(), Some(3));
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_clear() {
        let mut lru = LruTracker::new();
        lru.touch(1);
        lru.touch(2);
        lru.clear();

        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_many_touches_stay_ordered() {
        let mut lru = LruTracker::new();
        for i in 0..1_000u32 {
            lru.touch(i % 10);
        }

        // last round touched 0..10 in order
        for expected in 0..10 {
            assert_eq!(lru.evict_oldest(), Some(expected));
        }
        assert_eq!(lru.evict_oldest(), None);
    }
}

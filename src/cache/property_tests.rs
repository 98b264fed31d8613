//! Property-Based Tests for the store and the retry-gated loader
//!
//! Uses proptest to check the store's capacity bound, purge and full-replace
//! semantics, and the loader's failure gate.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::cache::{shared_store, BoundedStore, SharedStore};
use crate::refresh::{Loader, RefreshSource, TickOutcome};

// == Test Configuration ==
const TEST_CAPACITY: usize = 100;

// == Strategies ==
/// Generates cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,16}"
}

/// Generates cache values
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,32}"
}

fn snapshot_strategy(max: usize) -> impl Strategy<Value = HashMap<String, String>> {
    prop::collection::hash_map(key_strategy(), value_strategy(), 0..max)
}

/// Generates a sequence of store operations
#[derive(Debug, Clone)]
enum StoreOp {
    Set { key: String, value: String },
    Purge,
    Replace(HashMap<String, String>),
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        6 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| StoreOp::Set { key, value }),
        1 => Just(StoreOp::Purge),
        1 => snapshot_strategy(40).prop_map(StoreOp::Replace),
    ]
}

fn failing_loader(
    initial: HashMap<String, String>,
    threshold: u32,
) -> (SharedStore<String, String>, Loader<String, String>) {
    let store = shared_store(TEST_CAPACITY);
    store.write().replace_all(initial);
    let source: Arc<dyn RefreshSource<String, String>> =
        Arc::new(|| -> anyhow::Result<HashMap<String, String>> { anyhow::bail!("source down") });
    let loader = Loader::new(source, Arc::clone(&store), threshold);
    (store, loader)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of writes, the store never holds more than its capacity.
    #[test]
    fn prop_capacity_enforcement(ops in prop::collection::vec(store_op_strategy(), 1..200)) {
        let capacity = 25;
        let mut store = BoundedStore::new(capacity);

        for op in ops {
            match op {
                StoreOp::Set { key, value } => store.set(key, value).unwrap(),
                StoreOp::Purge => store.purge(),
                StoreOp::Replace(entries) => {
                    store.replace_all(entries);
                }
            }
            prop_assert!(
                store.len() <= capacity,
                "Store size {} exceeds capacity {}",
                store.len(),
                capacity
            );
        }
    }

    // Purging any store once or twice leaves it empty.
    #[test]
    fn prop_purge_idempotent(entries in snapshot_strategy(60), twice in any::<bool>()) {
        let mut store = BoundedStore::new(TEST_CAPACITY);
        store.replace_all(entries);

        store.purge();
        if twice {
            store.purge();
        }

        prop_assert!(store.snapshot().is_empty());
        prop_assert_eq!(store.len(), 0);
    }

    // A replace within capacity leaves exactly the new data set behind.
    #[test]
    fn prop_replace_all_is_full_replace(
        before in snapshot_strategy(60),
        after in snapshot_strategy(60)
    ) {
        let mut store = BoundedStore::new(TEST_CAPACITY);
        store.replace_all(before);

        let held = store.replace_all(after.clone());

        prop_assert_eq!(held, after.len());
        prop_assert_eq!(store.snapshot(), after);
    }

    // A set entry is visible until a successful reload that does not carry it.
    #[test]
    fn prop_set_survives_until_reload(
        reloaded in snapshot_strategy(30),
        key in "[A-Z]{20}",
        value in value_strategy()
    ) {
        prop_assume!(!reloaded.contains_key(&key));

        let store = shared_store(TEST_CAPACITY);
        let data = reloaded.clone();
        let source: Arc<dyn RefreshSource<String, String>> =
            Arc::new(move || -> anyhow::Result<HashMap<String, String>> { Ok(data.clone()) });
        let loader = Loader::new(source, Arc::clone(&store), 0);

        store.write().set(key.clone(), value.clone()).unwrap();
        let seen = store.read().get(&key).cloned();
        prop_assert_eq!(seen, Some(value.clone()));

        let outcome = loader.scheduled_load();
        prop_assert_eq!(outcome, TickOutcome::Applied { entries: reloaded.len() });
        prop_assert!(store.read().get(&key).is_none());
        prop_assert_eq!(store.read().snapshot(), reloaded);
    }

    // With no threshold, any number of failed ticks leaves the data untouched.
    #[test]
    fn prop_failures_never_flush_without_threshold(
        initial in snapshot_strategy(40),
        ticks in 1u32..30
    ) {
        let (store, loader) = failing_loader(initial.clone(), 0);

        for _ in 0..ticks {
            let outcome = loader.scheduled_load();
            prop_assert!(
                matches!(outcome, TickOutcome::Suppressed { .. }),
                "unexpected outcome {:?}",
                outcome
            );
        }

        prop_assert_eq!(store.read().snapshot(), initial);
    }

    // With threshold T, the T-th consecutive failure flushes and not before.
    #[test]
    fn prop_threshold_flush_is_exact(
        initial in snapshot_strategy(40),
        threshold in 1u32..8
    ) {
        prop_assume!(!initial.is_empty());
        let (store, loader) = failing_loader(initial.clone(), threshold);

        for tick in 1..threshold {
            prop_assert_eq!(
                loader.scheduled_load(),
                TickOutcome::Suppressed { consecutive_failures: tick }
            );
            prop_assert_eq!(store.read().snapshot(), initial.clone());
        }

        prop_assert_eq!(
            loader.scheduled_load(),
            TickOutcome::Flushed { consecutive_failures: threshold }
        );
        prop_assert!(store.read().is_empty());
    }
}

// Concurrent readers against a writer replacing the whole store.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // Every snapshot a reader takes is entirely the old data set or entirely the new one.
    #[test]
    fn prop_full_replace_is_atomic(
        old in snapshot_strategy(50),
        new in snapshot_strategy(50)
    ) {
        let store: SharedStore<String, String> = shared_store(TEST_CAPACITY);
        store.write().replace_all(old.clone());

        let done = Arc::new(AtomicBool::new(false));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    let mut seen = Vec::new();
                    while !done.load(Ordering::SeqCst) {
                        seen.push(store.read().snapshot());
                    }
                    seen.push(store.read().snapshot());
                    seen
                })
            })
            .collect();

        for round in 0..10 {
            let next = if round % 2 == 0 { new.clone() } else { old.clone() };
            store.write().replace_all(next);
        }
        done.store(true, Ordering::SeqCst);

        for reader in readers {
            let seen = reader.join().expect("reader thread panicked");
            for snapshot in seen {
                prop_assert!(
                    snapshot == old || snapshot == new,
                    "reader observed a mixed snapshot of {} entries",
                    snapshot.len()
                );
            }
        }
    }
}

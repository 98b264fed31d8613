//! Retry-Gated Loader
//!
//! Runs the refresh source against the shared store. The first load retries
//! with jittered backoff; scheduled loads run once per tick and count
//! consecutive failures to decide when a failure may flush stale data.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::cache::{ReloadStats, SharedStore};
use crate::error::RefreshError;
use crate::refresh::{guarded_refresh, RefreshSource};

// == Tick Outcome ==
/// What a scheduled load did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The source succeeded and its result replaced the store
    Applied { entries: usize },
    /// The source failed and the store was left untouched
    Suppressed { consecutive_failures: u32 },
    /// The source failed often enough in a row that the store was emptied
    Flushed { consecutive_failures: u32 },
}

// == Loader ==
/// Applies refresh results to a shared store, one invocation at a time.
pub struct Loader<K, V> {
    source: Arc<dyn RefreshSource<K, V>>,
    store: SharedStore<K, V>,
    /// Consecutive scheduled failures tolerated before a flush (0 = never flush)
    retry_threshold: u32,
    /// Held for the whole of a load so the source never runs concurrently with itself
    gate: Mutex<()>,
    stats: Mutex<ReloadStats>,
}

impl<K, V> Loader<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(
        source: Arc<dyn RefreshSource<K, V>>,
        store: SharedStore<K, V>,
        retry_threshold: u32,
    ) -> Self {
        Self {
            source,
            store,
            retry_threshold,
            gate: Mutex::new(()),
            stats: Mutex::new(ReloadStats::default()),
        }
    }

    /// Current reload counters.
    pub fn reload_stats(&self) -> ReloadStats {
        self.stats.lock().clone()
    }

    // == Reload Once ==
    /// Invokes the source once and applies a successful result.
    ///
    /// Failures are counted but never touch the store and never advance the
    /// scheduled-failure run. Used by first-load attempts and manual reloads.
    pub fn reload_once(&self) -> Result<usize, RefreshError> {
        let _gate = self.gate.lock();

        match guarded_refresh(self.source.as_ref()) {
            Ok(entries) => {
                let held = self.apply(entries);
                self.stats.lock().record_success();
                Ok(held)
            }
            Err(err) => {
                self.stats.lock().record_failure();
                Err(err)
            }
        }
    }

    // == Scheduled Load ==
    /// Runs one scheduler tick.
    ///
    /// A successful result always replaces the store, even when empty. A
    /// failure leaves the store alone until `retry_threshold` consecutive
    /// failures have been seen; from then on each failure empties it.
    pub fn scheduled_load(&self) -> TickOutcome {
        let _gate = self.gate.lock();

        match guarded_refresh(self.source.as_ref()) {
            Ok(entries) => {
                let held = self.apply(entries);
                self.stats.lock().record_success();
                debug!("Scheduled reload applied {} entries", held);
                TickOutcome::Applied { entries: held }
            }
            Err(err) => {
                let failures = self.stats.lock().record_scheduled_failure();

                if self.retry_threshold > 0 && failures >= self.retry_threshold {
                    self.apply(HashMap::new());
                    warn!(
                        consecutive_failures = failures,
                        retry_threshold = self.retry_threshold,
                        "Scheduled reload failed, flushing stale entries: {}",
                        err
                    );
                    TickOutcome::Flushed {
                        consecutive_failures: failures,
                    }
                } else {
                    warn!(
                        consecutive_failures = failures,
                        "Scheduled reload failed, keeping current entries: {}",
                        err
                    );
                    TickOutcome::Suppressed {
                        consecutive_failures: failures,
                    }
                }
            }
        }
    }

    // == First Load ==
    /// Loads the initial data set, making up to `attempts` attempts with a
    /// random pause of at most `max_backoff` between them.
    ///
    /// The source runs on the blocking pool so a slow source does not stall
    /// the async workers.
    pub async fn first_load(
        self: &Arc<Self>,
        attempts: u32,
        max_backoff: Duration,
    ) -> Result<usize, RefreshError> {
        for attempt in 1..=attempts {
            let loader = Arc::clone(self);
            let result = tokio::task::spawn_blocking(move || loader.reload_once())
                .await
                .unwrap_or_else(|join_err| Err(RefreshError::Panicked(join_err.to_string())));

            match result {
                Ok(held) => {
                    info!("First load applied {} entries on attempt {}", held, attempt);
                    return Ok(held);
                }
                Err(err) if attempt == attempts => return Err(err),
                Err(err) => {
                    let pause = jitter(max_backoff);
                    warn!(
                        attempt,
                        attempts,
                        "First load attempt failed, retrying in {:?}: {}",
                        pause,
                        err
                    );
                    tokio::time::sleep(pause).await;
                }
            }
        }

        Err(RefreshError::Source(anyhow::anyhow!(
            "no first load attempts were configured"
        )))
    }

    fn apply(&self, entries: HashMap<K, V>) -> usize {
        let mut store = self.store.write();
        store.replace_all(entries)
    }
}

/// Random delay in `[0, max]`.
fn jitter(max: Duration) -> Duration {
    let max_ms = max.as_millis() as u64;
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
}

//! Refreshable Cache Engine
//!
//! Composition root: owns the shared store, the loader and the scheduler's
//! timer and cancellation token.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::builder::CacheBuilder;
use crate::cache::{shared_store, CacheStats, SharedStore};
use crate::config::{CacheConfig, FirstLoadPolicy};
use crate::error::{CacheError, Result};
use crate::refresh::{Loader, RefreshSource};
use crate::tasks::{spawn_scheduler, FirstLoad};
use crate::traits::LoadableCache;

// == Lifecycle State ==
/// Scheduler lifecycle as seen from outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Built, first load in progress, scheduler not yet started
    Initializing,
    /// Scheduler task is live
    Running,
    /// Scheduler stopped, or never started because there is no refresh source
    Stopped,
}

struct SchedulerControl {
    state: LifecycleState,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

// == Refreshable Cache ==
/// Bounded in-memory cache reloaded in full from a [`RefreshSource`] every
/// expiration interval.
///
/// Without a refresh source the engine is a plain bounded store: nothing is
/// scheduled and `try_reload_now` returns `false`.
///
/// Dropping the engine cancels its scheduler.
pub struct RefreshableCache<K, V> {
    store: SharedStore<K, V>,
    loader: Option<Arc<Loader<K, V>>>,
    runtime: Option<Handle>,
    period: Duration,
    control: Mutex<SchedulerControl>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> RefreshableCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Starts configuring a new engine.
    pub fn builder() -> CacheBuilder<K, V> {
        CacheBuilder::new()
    }

    // == Start ==
    /// Builds the engine and performs (or schedules) the first load.
    pub(crate) async fn start(
        config: CacheConfig,
        source: Option<Arc<dyn RefreshSource<K, V>>>,
    ) -> Result<Self> {
        config.validate()?;

        let store = shared_store(config.capacity);
        let Some(source) = source else {
            debug!("No refresh source configured, running as a plain bounded store");
            return Ok(Self::assemble(
                store,
                None,
                None,
                &config,
                LifecycleState::Stopped,
            ));
        };

        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        let loader = Arc::new(Loader::new(
            source,
            Arc::clone(&store),
            config.retry_threshold,
        ));
        let engine = Self::assemble(
            store,
            Some(Arc::clone(&loader)),
            Some(runtime),
            &config,
            LifecycleState::Initializing,
        );

        let first_load = FirstLoad {
            attempts: config.first_load_attempts,
            max_backoff: config.first_load_max_backoff,
        };

        if config.block_on_first_load {
            match loader
                .first_load(first_load.attempts, first_load.max_backoff)
                .await
            {
                Ok(_) => {}
                Err(err) => match config.on_first_load_exhausted {
                    FirstLoadPolicy::FailFast => {
                        return Err(CacheError::FirstLoadExhausted {
                            attempts: first_load.attempts,
                            source: err,
                        });
                    }
                    FirstLoadPolicy::StartEmpty => {
                        warn!(
                            attempts = first_load.attempts,
                            "First load exhausted its attempts, starting empty: {}",
                            err
                        );
                    }
                },
            }
            engine.launch(None);
        } else {
            if config.on_first_load_exhausted == FirstLoadPolicy::FailFast {
                debug!("Fail-fast first load only applies to blocking builds");
            }
            engine.launch(Some(first_load));
        }

        Ok(engine)
    }

    fn assemble(
        store: SharedStore<K, V>,
        loader: Option<Arc<Loader<K, V>>>,
        runtime: Option<Handle>,
        config: &CacheConfig,
        state: LifecycleState,
    ) -> Self {
        Self {
            store,
            loader,
            runtime,
            period: config.expiration,
            control: Mutex::new(SchedulerControl {
                state,
                cancel: CancellationToken::new(),
                handle: None,
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Spawns a fresh scheduler instance with its own token.
    ///
    /// Returns false when there is nothing to schedule or a scheduler is
    /// already running.
    fn launch(&self, first_load: Option<FirstLoad>) -> bool {
        let (Some(loader), Some(runtime)) = (&self.loader, &self.runtime) else {
            return false;
        };

        let mut control = self.control.lock();
        if control.state == LifecycleState::Running {
            return false;
        }

        let cancel = CancellationToken::new();
        let handle = spawn_scheduler(
            runtime,
            Arc::clone(loader),
            self.period,
            cancel.clone(),
            first_load,
        );

        control.cancel = cancel;
        control.handle = Some(handle);
        control.state = LifecycleState::Running;
        true
    }

    /// Current scheduler lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.control.lock().state
    }

    /// Period between scheduled reloads.
    pub fn expiration(&self) -> Duration {
        self.period
    }

    // == Stats ==
    /// Returns a snapshot of lookup, eviction and reload counters.
    pub fn stats(&self) -> CacheStats {
        let (total_entries, capacity, evictions) = {
            let store = self.store.read();
            (store.len(), store.capacity(), store.evictions())
        };
        let reload = self
            .loader
            .as_ref()
            .map(|loader| loader.reload_stats())
            .unwrap_or_default();

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions,
            total_entries,
            capacity,
            reloads: reload.reloads,
            failed_reloads: reload.failed_reloads,
            consecutive_failures: reload.consecutive_failures,
            last_reload_at: reload.last_reload_at,
            state: self.state(),
        }
    }

    // == Shutdown ==
    /// Stops the scheduler and waits for its task to exit.
    pub async fn shutdown(&self) {
        self.stop();
        let handle = self.control.lock().handle.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!("Reload scheduler ended abnormally: {}", err);
            }
        }
    }
}

impl<K, V> LoadableCache<K, V> for RefreshableCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        let value = self.store.read().get(key).cloned();
        let counter = if value.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        value
    }

    fn get_all(&self) -> HashMap<K, V> {
        self.store.read().snapshot()
    }

    fn values(&self) -> Vec<V> {
        self.store.read().values()
    }

    fn set(&self, key: K, value: V) -> Result<()> {
        self.store.write().set(key, value)
    }

    fn purge(&self) {
        self.store.write().purge();
    }

    fn try_reload_now(&self) -> bool {
        let Some(loader) = &self.loader else {
            debug!("Manual reload requested without a refresh source");
            return false;
        };

        match loader.reload_once() {
            Ok(held) => {
                info!("Manual reload applied {} entries", held);
                true
            }
            Err(err) => {
                warn!("Manual reload failed: {}", err);
                false
            }
        }
    }

    fn stop(&self) {
        let mut control = self.control.lock();
        control.cancel.cancel();
        if control.state == LifecycleState::Running {
            control.state = LifecycleState::Stopped;
            info!("Reload scheduler stop requested");
        }
    }

    fn restart(&self) {
        if self.launch(None) {
            info!("Reload scheduler restarted");
        } else {
            debug!("Restart ignored: scheduler already running or no refresh source");
        }
    }
}

impl<K, V> Drop for RefreshableCache<K, V> {
    fn drop(&mut self) {
        self.control.get_mut().cancel.cancel();
    }
}

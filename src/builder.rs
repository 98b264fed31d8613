//! Option-style builder for [`RefreshableCache`].

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{CacheConfig, FirstLoadPolicy};
use crate::engine::RefreshableCache;
use crate::error::Result;
use crate::refresh::RefreshSource;
use crate::traced::{TraceProvider, TracedCache};
use crate::traits::LoadableCache;

/// Collects engine options. Unset options keep the [`CacheConfig`] defaults.
pub struct CacheBuilder<K, V> {
    config: CacheConfig,
    source: Option<Arc<dyn RefreshSource<K, V>>>,
    provider: Option<Arc<dyn TraceProvider>>,
}

impl<K, V> CacheBuilder<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            config: CacheConfig::default(),
            source: None,
            provider: None,
        }
    }

    /// Replaces every tunable at once, e.g. with [`CacheConfig::from_env`].
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses a closure as the refresh source.
    pub fn refresh_with<F>(self, refresh: F) -> Self
    where
        F: Fn() -> anyhow::Result<HashMap<K, V>> + Send + Sync + 'static,
    {
        self.source(refresh)
    }

    /// Uses any [`RefreshSource`] implementation as the refresh source.
    pub fn source<S>(mut self, source: S) -> Self
    where
        S: RefreshSource<K, V> + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn expiration(mut self, period: Duration) -> Self {
        self.config.expiration = period;
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Makes `build` wait until the first load has finished.
    pub fn block_on_first_load(mut self) -> Self {
        self.config.block_on_first_load = true;
        self
    }

    pub fn retry_threshold(mut self, threshold: u32) -> Self {
        self.config.retry_threshold = threshold;
        self
    }

    pub fn on_first_load_exhausted(mut self, policy: FirstLoadPolicy) -> Self {
        self.config.on_first_load_exhausted = policy;
        self
    }

    pub fn first_load_attempts(mut self, attempts: u32) -> Self {
        self.config.first_load_attempts = attempts;
        self
    }

    pub fn first_load_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.config.first_load_max_backoff = max_backoff;
        self
    }

    /// Wraps the built engine in a [`TracedCache`] reporting to `provider`.
    pub fn tracing(mut self, provider: Arc<dyn TraceProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Builds the bare engine, ignoring any tracing provider.
    pub async fn build_engine(self) -> Result<RefreshableCache<K, V>> {
        RefreshableCache::start(self.config, self.source).await
    }

    /// Builds the engine, wrapped for tracing when a provider was given.
    pub async fn build(self) -> Result<Box<dyn LoadableCache<K, V>>>
    where
        K: fmt::Debug,
    {
        let provider = self.provider.clone();
        let engine = self.build_engine().await?;

        let cache: Box<dyn LoadableCache<K, V>> = match provider {
            Some(provider) => Box::new(TracedCache::<_, K, V>::new(engine, provider)),
            None => Box::new(engine),
        };
        Ok(cache)
    }
}

impl<K, V> Default for CacheBuilder<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

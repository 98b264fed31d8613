//! Observability Decorator
//!
//! [`TracedCache`] forwards every call to the wrapped cache unchanged and
//! opens one span per call through an explicit [`TraceProvider`]. There is no
//! global fallback: pass [`NoopProvider`] to trace nothing.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::field::Empty;
use tracing::span::EnteredSpan;

use crate::error::Result;
use crate::traits::LoadableCache;

// == Span Attributes ==
/// Attribute value recorded on a call span.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

/// An open span for one cache call. Ends when dropped.
pub trait CallSpan {
    fn set_attribute(&mut self, key: &'static str, value: AttrValue);
}

/// Source of call spans.
pub trait TraceProvider: Send + Sync {
    fn start_span(&self, operation: &'static str) -> Box<dyn CallSpan>;
}

// == No-op Provider ==
/// Provider that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProvider;

struct NoopSpan;

impl CallSpan for NoopSpan {
    fn set_attribute(&mut self, _key: &'static str, _value: AttrValue) {}
}

impl TraceProvider for NoopProvider {
    fn start_span(&self, _operation: &'static str) -> Box<dyn CallSpan> {
        Box::new(NoopSpan)
    }
}

// == Tracing Provider ==
/// Provider that emits `tracing` spans named `loadable_cache`.
///
/// Every attribute the decorator can record is declared up front as an empty
/// field, so subscribers see a stable span shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProvider;

struct TracingSpan {
    span: EnteredSpan,
}

impl CallSpan for TracingSpan {
    fn set_attribute(&mut self, key: &'static str, value: AttrValue) {
        match value {
            AttrValue::Str(s) => self.span.record(key, s.as_str()),
            AttrValue::Int(i) => self.span.record(key, i),
            AttrValue::Bool(b) => self.span.record(key, b),
        };
    }
}

impl TraceProvider for TracingProvider {
    fn start_span(&self, operation: &'static str) -> Box<dyn CallSpan> {
        let span = tracing::info_span!(
            "loadable_cache",
            cache.operation = operation,
            cache.key = Empty,
            cache.key_hit = Empty,
            cache.key_size = Empty,
            cache.value_size = Empty,
            cache.error = Empty,
            cache.has_reload_success = Empty
        );
        Box::new(TracingSpan {
            span: span.entered(),
        })
    }
}

// == Traced Cache ==
/// Behavior-preserving wrapper that traces each call of the inner cache.
///
/// Records the key (Debug-rendered) for point operations, the result size for
/// `get_all` and `values`, the error of a failed `set`, and whether
/// `try_reload_now` applied a result.
pub struct TracedCache<C, K, V> {
    inner: C,
    provider: Arc<dyn TraceProvider>,
    _entries: PhantomData<fn(K) -> V>,
}

impl<C, K, V> TracedCache<C, K, V> {
    pub fn new(inner: C, provider: Arc<dyn TraceProvider>) -> Self {
        Self {
            inner,
            provider,
            _entries: PhantomData,
        }
    }

    /// The wrapped cache, for calls outside the traced contract such as stats.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<K, V, C> LoadableCache<K, V> for TracedCache<C, K, V>
where
    K: fmt::Debug,
    C: LoadableCache<K, V>,
{
    fn get(&self, key: &K) -> Option<V> {
        let mut span = self.provider.start_span("get");
        let value = self.inner.get(key);
        span.set_attribute("cache.key", AttrValue::Str(format!("{:?}", key)));
        span.set_attribute("cache.key_hit", AttrValue::Bool(value.is_some()));
        value
    }

    fn get_all(&self) -> HashMap<K, V> {
        let mut span = self.provider.start_span("get_all");
        let all = self.inner.get_all();
        // sizes only, never the entries themselves
        span.set_attribute("cache.key_size", AttrValue::Int(all.len() as i64));
        all
    }

    fn values(&self) -> Vec<V> {
        let mut span = self.provider.start_span("values");
        let values = self.inner.values();
        span.set_attribute("cache.value_size", AttrValue::Int(values.len() as i64));
        values
    }

    fn set(&self, key: K, value: V) -> Result<()> {
        let mut span = self.provider.start_span("set");
        span.set_attribute("cache.key", AttrValue::Str(format!("{:?}", key)));
        let result = self.inner.set(key, value);
        if let Err(err) = &result {
            span.set_attribute("cache.error", AttrValue::Str(err.to_string()));
        }
        result
    }

    fn purge(&self) {
        let _span = self.provider.start_span("purge");
        self.inner.purge();
    }

    fn try_reload_now(&self) -> bool {
        let mut span = self.provider.start_span("try_reload_now");
        let ok = self.inner.try_reload_now();
        span.set_attribute("cache.has_reload_success", AttrValue::Bool(ok));
        ok
    }

    fn stop(&self) {
        let _span = self.provider.start_span("stop");
        self.inner.stop();
    }

    fn restart(&self) {
        let _span = self.provider.start_span("restart");
        self.inner.restart();
    }
}

//! Refresh Cache - A bounded in-memory cache reloaded from a data source
//!
//! The engine holds at most `capacity` entries and replaces its whole
//! contents from a [`RefreshSource`] every expiration interval. Failed
//! reloads keep the previous data unless a retry threshold says otherwise.

pub mod api;
pub mod builder;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod refresh;
pub mod tasks;
pub mod traced;
pub mod traits;

pub use api::AppState;
pub use builder::CacheBuilder;
pub use cache::CacheStats;
pub use config::{CacheConfig, Config, FirstLoadPolicy};
pub use engine::{LifecycleState, RefreshableCache};
pub use error::{CacheError, RefreshError, Result};
pub use refresh::{FileSnapshotSource, RefreshSource};
pub use traced::{NoopProvider, TraceProvider, TracedCache, TracingProvider};
pub use traits::LoadableCache;

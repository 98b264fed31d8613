//! Response DTOs for the cache admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use crate::cache::CacheStats;
use crate::engine::LifecycleState;

/// Response body for GET /get/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: String,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for GET /all
#[derive(Debug, Clone, Serialize)]
pub struct AllResponse {
    /// Number of entries returned
    pub count: usize,
    /// Every entry in the store
    pub entries: HashMap<String, String>,
}

impl AllResponse {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self {
            count: entries.len(),
            entries,
        }
    }
}

/// Response body for GET /values
#[derive(Debug, Clone, Serialize)]
pub struct ValuesResponse {
    pub count: usize,
    pub values: Vec<String>,
}

impl ValuesResponse {
    pub fn new(values: Vec<String>) -> Self {
        Self {
            count: values.len(),
            values,
        }
    }
}

/// Response body for PUT /set
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set until the next reload", key),
            key,
        }
    }
}

/// Response body for DELETE /purge
#[derive(Debug, Clone, Serialize)]
pub struct PurgeResponse {
    pub message: String,
}

impl PurgeResponse {
    pub fn new() -> Self {
        Self {
            message: "Cache purged".to_string(),
        }
    }
}

impl Default for PurgeResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for POST /reload
#[derive(Debug, Clone, Serialize)]
pub struct ReloadResponse {
    /// Whether the refresh result was applied
    pub reloaded: bool,
}

/// Response body for POST /stop and POST /restart
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleResponse {
    pub state: LifecycleState,
}

/// Response body for GET /stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Period between scheduled reloads, in milliseconds
    pub expiration_ms: u64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics and the reload period
    pub fn new(stats: CacheStats, expiration: Duration) -> Self {
        let hit_rate = stats.hit_rate();
        Self {
            stats,
            hit_rate,
            expiration_ms: expiration.as_millis() as u64,
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

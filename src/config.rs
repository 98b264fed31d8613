//! Configuration Module
//!
//! Engine tunables and server settings, loadable from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::error::{CacheError, Result};

// == First Load Policy ==
/// What a build does when every first-load attempt has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstLoadPolicy {
    /// Return `CacheError::FirstLoadExhausted` from a blocking build
    FailFast,
    /// Start with an empty store and let the scheduler fill it later
    #[default]
    StartEmpty,
}

impl FromStr for FirstLoadPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "fail_fast" => Ok(Self::FailFast),
            "start-empty" | "start_empty" => Ok(Self::StartEmpty),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown first load policy '{}'",
                other
            ))),
        }
    }
}

// == Cache Config ==
/// Engine configuration.
///
/// Defaults: 10 second reload interval, 100 entries, non-blocking first load,
/// failures never flush data.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Period between scheduled reloads
    pub expiration: Duration,
    /// Maximum number of entries held
    pub capacity: usize,
    /// Wait for the first load before the build returns
    pub block_on_first_load: bool,
    /// Consecutive scheduled failures tolerated before a failure flushes the store (0 = never)
    pub retry_threshold: u32,
    /// Behavior when the first load exhausts its attempts
    pub on_first_load_exhausted: FirstLoadPolicy,
    /// Attempts made by the first load
    pub first_load_attempts: u32,
    /// Upper bound of the random delay between first-load attempts
    pub first_load_max_backoff: Duration,
}

impl CacheConfig {
    /// Loads the engine configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_EXPIRATION_SECS` - Reload interval in seconds (default: 10)
    /// - `CACHE_CAPACITY` - Maximum entries (default: 100)
    /// - `CACHE_BLOCK_FIRST_LOAD` - Block the build on the first load (default: false)
    /// - `CACHE_RETRY_THRESHOLD` - Failures before flushing (default: 0)
    /// - `CACHE_FIRST_LOAD_POLICY` - `start-empty` or `fail-fast` (default: start-empty)
    /// - `CACHE_FIRST_LOAD_ATTEMPTS` - First-load attempts (default: 3)
    /// - `CACHE_FIRST_LOAD_MAX_BACKOFF_MS` - Max jitter between attempts (default: 1000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            expiration: env_parse::<u64>("CACHE_EXPIRATION_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.expiration),
            capacity: env_parse("CACHE_CAPACITY").unwrap_or(defaults.capacity),
            block_on_first_load: env_flag("CACHE_BLOCK_FIRST_LOAD")
                .unwrap_or(defaults.block_on_first_load),
            retry_threshold: env_parse("CACHE_RETRY_THRESHOLD")
                .unwrap_or(defaults.retry_threshold),
            on_first_load_exhausted: env_parse("CACHE_FIRST_LOAD_POLICY")
                .unwrap_or(defaults.on_first_load_exhausted),
            first_load_attempts: env_parse("CACHE_FIRST_LOAD_ATTEMPTS")
                .unwrap_or(defaults.first_load_attempts),
            first_load_max_backoff: env_parse::<u64>("CACHE_FIRST_LOAD_MAX_BACKOFF_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.first_load_max_backoff),
        }
    }

    /// Rejects settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        if self.expiration.is_zero() {
            return Err(CacheError::InvalidConfig(
                "expiration interval must be non-zero".to_string(),
            ));
        }
        if self.first_load_attempts == 0 {
            return Err(CacheError::InvalidConfig(
                "first load needs at least one attempt".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expiration: Duration::from_secs(10),
            capacity: 100,
            block_on_first_load: false,
            retry_threshold: 0,
            on_first_load_exhausted: FirstLoadPolicy::StartEmpty,
            first_load_attempts: 3,
            first_load_max_backoff: Duration::from_secs(1),
        }
    }
}

// == Server Config ==
/// Settings for the HTTP binary.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// JSON snapshot file used as the refresh source
    pub snapshot_path: PathBuf,
    /// Engine settings
    pub cache: CacheConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SNAPSHOT_PATH` - Snapshot file to reload from (default: snapshot.json)
    /// - plus everything read by [`CacheConfig::from_env`]
    pub fn from_env() -> Self {
        Self {
            server_port: env_parse("SERVER_PORT").unwrap_or(3000),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("snapshot.json")),
            cache: CacheConfig::from_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            snapshot_path: PathBuf::from("snapshot.json"),
            cache: CacheConfig::default(),
        }
    }
}

/// Reads and parses `name`. A set but unparseable value is logged and ignored.
fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        warn!("Ignoring {}={:?}: not a valid value, using the default", name, raw);
    }
    parsed
}

/// Reads a boolean switch such as `1`, `yes`, `on` or `true`.
fn env_flag(name: &str) -> Option<bool> {
    let raw = env::var(name).ok()?;
    let parsed = parse_flag(&raw);
    if parsed.is_none() {
        warn!("Ignoring {}={:?}: expected true/false, using the default", name, raw);
    }
    parsed
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

//! Cache Statistics Module
//!
//! Point-in-time view of engine counters: lookups, evictions and reloads.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::LifecycleState;

// == Cache Stats ==
/// Snapshot of engine metrics.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Lookups that found a value
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Entries dropped to stay within capacity
    pub evictions: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
    /// Maximum number of entries
    pub capacity: usize,
    /// Refresh results applied to the store (scheduled, first load or manual)
    pub reloads: u64,
    /// Refresh attempts that produced no data
    pub failed_reloads: u64,
    /// Current run of failed scheduled loads
    pub consecutive_failures: u32,
    /// When a refresh result was last applied
    pub last_reload_at: Option<DateTime<Utc>>,
    /// Scheduler lifecycle
    pub state: LifecycleState,
}

impl CacheStats {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Reload Stats ==
/// Reload bookkeeping kept by the loader under its gate.
#[derive(Debug, Clone, Default)]
pub struct ReloadStats {
    pub reloads: u64,
    pub failed_reloads: u64,
    pub consecutive_failures: u32,
    pub last_reload_at: Option<DateTime<Utc>>,
}

impl ReloadStats {
    /// Records an applied refresh result and clears the failure run.
    pub fn record_success(&mut self) {
        self.reloads += 1;
        self.consecutive_failures = 0;
        self.last_reload_at = Some(Utc::now());
    }

    /// Records a failed attempt that does not count toward the flush threshold.
    pub fn record_failure(&mut self) {
        self.failed_reloads += 1;
    }

    /// Records a failed scheduled load and returns the new failure run length.
    pub fn record_scheduled_failure(&mut self) -> u32 {
        self.failed_reloads += 1;
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn stats(hits: u64, misses: u64) -> CacheStats {
        CacheStats {
            hits,
            misses,
            evictions: 0,
            total_entries: 0,
            capacity: 100,
            reloads: 0,
            failed_reloads: 0,
            consecutive_failures: 0,
            last_reload_at: None,
            state: LifecycleState::Running,
        }
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(stats(0, 0).hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        assert_eq!(stats(1, 1).hit_rate(), 0.5);
        assert_eq!(stats(3, 0).hit_rate(), 1.0);
    }

    #[test]
    fn test_reload_stats_success_resets_failure_run() {
        let mut reload = ReloadStats::default();
        assert_eq!(reload.record_scheduled_failure(), 1);
        assert_eq!(reload.record_scheduled_failure(), 2);

        reload.record_success();

        assert_eq!(reload.consecutive_failures, 0);
        assert_eq!(reload.reloads, 1);
        assert_eq!(reload.failed_reloads, 2);
        assert!(reload.last_reload_at.is_some());
    }

    #[test]
    fn test_reload_stats_unscheduled_failure_keeps_run() {
        let mut reload = ReloadStats::default();
        reload.record_scheduled_failure();
        reload.record_failure();

        assert_eq!(reload.consecutive_failures, 1);
        assert_eq!(reload.failed_reloads, 2);
    }

    #[test]
    fn test_stats_serialize() {
        let json = serde_json::to_string(&stats(1, 2)).unwrap();
        assert!(json.contains("\"hits\":1"));
        assert!(json.contains("\"state\":\"running\""));
    }
}

//! Localization metrics and observability.
//!
//! Counts lookups, keys that fell through to the raw key, and the startup
//! fallbacks that are otherwise swallowed (unscannable translation sources and
//! languages served from the built-in set).

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for one localization instance.
#[derive(Debug, Default)]
pub struct LocalizationMetrics {
    /// Number of `get` calls
    lookups: AtomicUsize,

    /// Number of `get` calls that echoed the key back
    missing_keys: AtomicUsize,

    /// Number of languages that fell back to the built-in set at load time
    fallback_tables: AtomicUsize,

    /// Number of times a translation source could not be scanned
    discovery_failures: AtomicUsize,
}

impl LocalizationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolution; `found` is false when the key was echoed back.
    pub fn record_lookup(&self, found: bool) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if !found {
            self.missing_keys.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a language served from the built-in set.
    pub fn record_fallback_table(&self) {
        self.fallback_tables.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a source that could not be scanned.
    pub fn record_discovery_failure(&self) {
        self.discovery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    pub fn missing_keys(&self) -> usize {
        self.missing_keys.load(Ordering::Relaxed)
    }

    pub fn fallback_tables(&self) -> usize {
        self.fallback_tables.load(Ordering::Relaxed)
    }

    pub fn discovery_failures(&self) -> usize {
        self.discovery_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let lookups = self.lookups();
        let missing = self.missing_keys();
        let hit_rate = if lookups > 0 {
            ((lookups - missing) as f64 / lookups as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            lookups,
            missing_keys: missing,
            hit_rate,
            fallback_tables: self.fallback_tables(),
            discovery_failures: self.discovery_failures(),
        }
    }
}

/// Snapshot of localization statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub lookups: usize,
    pub missing_keys: usize,

    /// Share of lookups that found a translation, as a percentage (0-100)
    pub hit_rate: f64,

    pub fallback_tables: usize,
    pub discovery_failures: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Counter Tests ====================

    #[test]
    fn test_record_lookup_found() {
        let metrics = LocalizationMetrics::new();
        metrics.record_lookup(true);
        assert_eq!(metrics.lookups(), 1);
        assert_eq!(metrics.missing_keys(), 0);
    }

    #[test]
    fn test_record_lookup_missing() {
        let metrics = LocalizationMetrics::new();
        metrics.record_lookup(false);
        metrics.record_lookup(false);
        assert_eq!(metrics.lookups(), 2);
        assert_eq!(metrics.missing_keys(), 2);
    }

    #[test]
    fn test_record_startup_fallbacks() {
        let metrics = LocalizationMetrics::new();
        metrics.record_fallback_table();
        metrics.record_discovery_failure();
        assert_eq!(metrics.fallback_tables(), 1);
        assert_eq!(metrics.discovery_failures(), 1);
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_empty() {
        let report = LocalizationMetrics::new().report();
        assert_eq!(report.lookups, 0);
        assert_eq!(report.missing_keys, 0);
        assert_eq!(report.hit_rate, 0.0);
    }

    #[test]
    fn test_report_hit_rate() {
        let metrics = LocalizationMetrics::new();

        // 3 found, 1 missing = 75% hit rate
        metrics.record_lookup(true);
        metrics.record_lookup(true);
        metrics.record_lookup(true);
        metrics.record_lookup(false);

        let report = metrics.report();
        assert_eq!(report.lookups, 4);
        assert_eq!(report.missing_keys, 1);
        assert_eq!(report.hit_rate, 75.0);
    }

    #[test]
    fn test_report_serializes() {
        let metrics = LocalizationMetrics::new();
        metrics.record_lookup(true);

        let json = serde_json::to_string(&metrics.report()).expect("Should serialize");
        assert!(json.contains("\"lookups\":1"));
        assert!(json.contains("\"hit_rate\":100.0"));
    }
}

//! Run counters shared across probe workers.
//!
//! All counters are atomic and monotonically increasing; a snapshot can be
//! taken at any time while the dispatcher is running. Elapsed time and
//! request rate are derived at snapshot time, never stored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

/// Shared, concurrency-safe run counters.
#[derive(Debug)]
pub struct StatsCollector {
    requests: AtomicU64,
    errors: AtomicU64,
    results: AtomicU64,
    start: Instant,
}

impl StatsCollector {
    /// Create a collector with the clock started now.
    pub fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            results: AtomicU64::new(0),
            start: Instant::now(),
        }
    }

    /// Record one issued request.
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one transport error.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one reportable result.
    pub fn record_result(&self) {
        self.results.fetch_add(1, Ordering::Relaxed);
    }

    /// Current transport error count.
    ///
    /// Used by the dispatcher for the error-threshold check after every
    /// completed probe; observes at least the most recently completed
    /// increment.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::SeqCst)
    }

    /// Current snapshot with derived elapsed time and rate.
    pub fn snapshot(&self) -> StatsSnapshot {
        let requests = self.requests.load(Ordering::SeqCst);
        let elapsed = self.start.elapsed().as_secs_f64();
        StatsSnapshot {
            requests,
            errors: self.errors.load(Ordering::SeqCst),
            results: self.results.load(Ordering::SeqCst),
            elapsed_secs: elapsed,
            requests_per_sec: if elapsed > 0.0 {
                requests as f64 / elapsed
            } else {
                0.0
            },
        }
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the run counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Requests issued (including calibration probes).
    pub requests: u64,
    /// Transport errors.
    pub errors: u64,
    /// Results the classifier marked reportable.
    pub results: u64,
    /// Seconds since the collector was created.
    pub elapsed_secs: f64,
    /// Derived request rate.
    pub requests_per_sec: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_collector_is_zeroed() {
        let stats = StatsCollector::new();
        let snap = stats.snapshot();
        assert_eq!(snap.requests, 0);
        assert_eq!(snap.errors, 0);
        assert_eq!(snap.results, 0);
    }

    #[test]
    fn test_counters_accumulate() {
        let stats = StatsCollector::new();
        stats.record_request();
        stats.record_request();
        stats.record_error();
        stats.record_result();

        let snap = stats.snapshot();
        assert_eq!(snap.requests, 2);
        assert_eq!(snap.errors, 1);
        assert_eq!(snap.results, 1);
    }

    #[test]
    fn test_errors_reads_latest_increment() {
        let stats = StatsCollector::new();
        for _ in 0..21 {
            stats.record_error();
        }
        assert_eq!(stats.errors(), 21);
    }

    #[test]
    fn test_rate_is_derived() {
        let stats = StatsCollector::new();
        for _ in 0..100 {
            stats.record_request();
        }
        let snap = stats.snapshot();
        assert!(snap.elapsed_secs >= 0.0);
        if snap.elapsed_secs > 0.0 {
            assert!((snap.requests_per_sec - 100.0 / snap.elapsed_secs).abs() < 1e-6);
        }
    }

    #[test]
    fn test_concurrent_increments() {
        use std::sync::Arc;

        let stats = Arc::new(StatsCollector::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let s = stats.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    s.record_request();
                    s.record_error();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        let snap = stats.snapshot();
        assert_eq!(snap.requests, 8000);
        assert_eq!(snap.errors, 8000);
    }

    #[test]
    fn test_snapshot_serializes() {
        let stats = StatsCollector::new();
        stats.record_request();
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["requests"], 1);
        assert_eq!(json["errors"], 0);
    }
}

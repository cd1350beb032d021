//! Delivery metrics for observability
//!
//! Counters for records handed to sinks, sink failures and panics. A
//! registry shares one instance with every logger it resolves; each
//! serialized sink keeps its own.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for sink delivery
///
/// # Example
///
/// ```
/// use rust_log_facade::DeliveryMetrics;
///
/// let metrics = DeliveryMetrics::new();
///
/// metrics.record_delivered();
/// metrics.record_failed();
///
/// assert_eq!(metrics.delivered(), 1);
/// assert_eq!(metrics.failed(), 1);
/// ```
#[derive(Debug)]
pub struct DeliveryMetrics {
    /// Records accepted by a sink without error
    delivered: AtomicU64,

    /// Records a sink rejected with an error
    failed: AtomicU64,

    /// Records whose sink panicked
    panicked: AtomicU64,

    /// Records placed on a serialized sink queue
    enqueued: AtomicU64,
}

impl DeliveryMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            panicked: AtomicU64::new(0),
            enqueued: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn panicked(&self) -> u64 {
        self.panicked.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    /// Record a successful delivery; returns the previous count
    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failed(&self) -> u64 {
        self.failed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_panicked(&self) -> u64 {
        self.panicked.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    /// Failed plus panicked deliveries
    pub fn total_failures(&self) -> u64 {
        self.failed() + self.panicked()
    }

    /// Failure rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been delivered yet.
    pub fn failure_rate(&self) -> f64 {
        let failures = self.total_failures() as f64;
        let total = self.delivered() as f64 + failures;
        if total == 0.0 {
            0.0
        } else {
            (failures / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.delivered.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.panicked.store(0, Ordering::Relaxed);
        self.enqueued.store(0, Ordering::Relaxed);
    }
}

impl Default for DeliveryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DeliveryMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            delivered: AtomicU64::new(self.delivered()),
            failed: AtomicU64::new(self.failed()),
            panicked: AtomicU64::new(self.panicked()),
            enqueued: AtomicU64::new(self.enqueued()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = DeliveryMetrics::new();
        assert_eq!(metrics.delivered(), 0);
        assert_eq!(metrics.failed(), 0);
        assert_eq!(metrics.panicked(), 0);
        assert_eq!(metrics.enqueued(), 0);
    }

    #[test]
    fn test_record_returns_previous() {
        let metrics = DeliveryMetrics::new();
        assert_eq!(metrics.record_failed(), 0);
        assert_eq!(metrics.record_failed(), 1);
        assert_eq!(metrics.failed(), 2);
    }

    #[test]
    fn test_failure_rate() {
        let metrics = DeliveryMetrics::new();
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_delivered();
        }
        for _ in 0..5 {
            metrics.record_failed();
        }
        for _ in 0..5 {
            metrics.record_panicked();
        }

        let rate = metrics.failure_rate();
        assert!((9.9..=10.1).contains(&rate), "Failure rate was {}", rate);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let metrics = DeliveryMetrics::new();
        metrics.record_delivered();

        let snapshot = metrics.clone();
        metrics.record_delivered();
        metrics.reset();

        assert_eq!(snapshot.delivered(), 1);
        assert_eq!(metrics.delivered(), 0);
    }
}

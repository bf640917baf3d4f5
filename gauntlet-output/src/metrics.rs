//! Per-sink delivery counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters for one sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    total_deliveries: AtomicU64,
    successful_deliveries: AtomicU64,
    failed_deliveries: AtomicU64,
    total_bytes_delivered: AtomicU64,
    total_delivery_time_ms: AtomicU64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful delivery
    pub fn record_success(&self, delivery_time: Duration, bytes: u64) {
        self.total_deliveries.fetch_add(1, Ordering::Relaxed);
        self.successful_deliveries.fetch_add(1, Ordering::Relaxed);
        self.total_bytes_delivered.fetch_add(bytes, Ordering::Relaxed);
        self.total_delivery_time_ms
            .fetch_add(delivery_time.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record a failed delivery
    pub fn record_failure(&self, delivery_time: Duration) {
        self.total_deliveries.fetch_add(1, Ordering::Relaxed);
        self.failed_deliveries.fetch_add(1, Ordering::Relaxed);
        self.total_delivery_time_ms
            .fetch_add(delivery_time.as_millis() as u64, Ordering::Relaxed);
    }

    /// Success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.total_count();
        if total == 0 {
            return 0.0;
        }
        (self.success_count() as f64 / total as f64) * 100.0
    }

    pub fn average_delivery_time(&self) -> Duration {
        let total = self.total_count();
        if total == 0 {
            return Duration::from_millis(0);
        }
        Duration::from_millis(self.total_delivery_time_ms.load(Ordering::Relaxed) / total)
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes_delivered.load(Ordering::Relaxed)
    }

    pub fn total_count(&self) -> u64 {
        self.total_deliveries.load(Ordering::Relaxed)
    }

    pub fn success_count(&self) -> u64 {
        self.successful_deliveries.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failed_deliveries.load(Ordering::Relaxed)
    }
}

//! Latency distribution statistics

use gauntlet_core::LatencyStats;

/// Nearest-rank percentile over an ascending slice; 0 when empty
pub fn percentile(sorted: &[u64], p: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = (p * sorted.len() as f64 / 100.0).ceil() as usize;
    let index = rank.saturating_sub(1).min(sorted.len() - 1);
    sorted[index]
}

/// Arithmetic mean; 0 when empty
pub fn mean(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

/// Summary statistics over unsorted latencies
pub fn latency_stats(latencies: impl IntoIterator<Item = u64>) -> LatencyStats {
    let mut sorted: Vec<u64> = latencies.into_iter().collect();
    if sorted.is_empty() {
        return LatencyStats::default();
    }
    sorted.sort_unstable();

    LatencyStats {
        mean: mean(&sorted),
        p50: percentile(&sorted, 50.0),
        p95: percentile(&sorted, 95.0),
        p99: percentile(&sorted, 99.0),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    }
}

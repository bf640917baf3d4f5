//! Breaking-point detection and degradation curve shape

use std::collections::BTreeMap;

use gauntlet_config::TestType;
use gauntlet_core::{BreakingMetric, BreakingPoint, DegradationPattern, StressRequestResult};

/// Failure rate above which a level counts as broken
pub const BREAKING_FAILURE_RATE: f64 = 0.5;

/// Jump into the breaking level that makes the curve a cliff
pub const CLIFF_DELTA: f64 = 0.3;

/// Failure rate observed at one load or input level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelFailureRate {
    pub level: u64,
    pub total: u64,
    pub failures: u64,
    pub failure_rate: f64,
}

/// Axis a test type is analysed along, if any
pub fn breaking_metric_for(test_type: TestType) -> Option<BreakingMetric> {
    match test_type {
        TestType::LoadRamp | TestType::RateLimitProbe => Some(BreakingMetric::Concurrency),
        TestType::ExtremeInput | TestType::ContextOverflow => Some(BreakingMetric::InputSize),
        _ => None,
    }
}

fn level_of(result: &StressRequestResult, metric: BreakingMetric) -> u64 {
    match metric {
        BreakingMetric::Concurrency => result.concurrency_level as u64,
        BreakingMetric::InputSize => result.input_size as u64,
    }
}

/// Group results by level, ascending
pub fn level_failure_rates(
    results: &[StressRequestResult],
    metric: BreakingMetric,
) -> Vec<LevelFailureRate> {
    let mut levels: BTreeMap<u64, (u64, u64)> = BTreeMap::new();
    for result in results {
        let entry = levels.entry(level_of(result, metric)).or_default();
        entry.0 += 1;
        if !result.is_success() {
            entry.1 += 1;
        }
    }

    levels
        .into_iter()
        .map(|(level, (total, failures))| LevelFailureRate {
            level,
            total,
            failures,
            failure_rate: failures as f64 / total as f64,
        })
        .collect()
}

/// First level whose failure rate exceeds one half
pub fn find_breaking_point(
    results: &[StressRequestResult],
    metric: BreakingMetric,
) -> Option<BreakingPoint> {
    breaking_point_from_levels(&level_failure_rates(results, metric), metric)
}

/// Breaking point over pre-computed, ascending level rates
fn breaking_point_from_levels(
    levels: &[LevelFailureRate],
    metric: BreakingMetric,
) -> Option<BreakingPoint> {
    let break_index = levels
        .iter()
        .position(|l| l.failure_rate > BREAKING_FAILURE_RATE)?;
    let first_failure_at = levels.iter().find(|l| l.failures > 0).map(|l| l.level);
    let rates: Vec<f64> = levels[..=break_index]
        .iter()
        .map(|l| l.failure_rate)
        .collect();

    Some(BreakingPoint {
        metric,
        threshold_value: levels[break_index].level,
        failure_rate_at_threshold: levels[break_index].failure_rate,
        first_failure_at,
        degradation_pattern: degradation_pattern(&rates),
    })
}

/// Shape of the failure-rate curve up to and including the breaking level
///
/// `rates` ends at the breaking level.
pub fn degradation_pattern(rates: &[f64]) -> DegradationPattern {
    let n = rates.len();
    if n <= 1 {
        return DegradationPattern::Immediate;
    }
    if rates[n - 1] - rates[n - 2] > CLIFF_DELTA {
        return DegradationPattern::Cliff;
    }
    if n > 2 && rates.windows(2).all(|w| w[1] >= w[0]) {
        return DegradationPattern::Gradual;
    }
    DegradationPattern::Oscillating
}

//! Recovery analysis and per-provider robustness roll-up

use std::collections::BTreeMap;

use gauntlet_config::TestType;
use gauntlet_core::{
    BreakingMetric, DegradationSeverity, FailureMode, ProviderRobustnessSummary, ScenarioResult,
    StressRequestResult,
};

use crate::analysis::level_failure_rates;

/// Recovery slower than this earns a warning
pub const SLOW_RECOVERY_MS: u64 = 5_000;

/// Average success rate below this earns a warning
pub const LOW_SUCCESS_RATE: f64 = 0.5;

/// How a provider came back after its first failure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryMetrics {
    /// First failure to the first later success; absent without both
    pub recovery_time_ms: Option<u64>,
    /// Success rate from the recovery point onward
    pub stability: f64,
}

/// Whether recovery is computed for a test type
pub fn tracks_recovery(test_type: TestType) -> bool {
    matches!(test_type, TestType::Spike | TestType::Soak)
}

/// Recovery time and stability over one scenario's results
///
/// A run without failures is fully stable; a run that never succeeded after
/// its first failure has stability 0.
pub fn analyze_recovery(results: &[StressRequestResult]) -> RecoveryMetrics {
    let mut ordered: Vec<&StressRequestResult> = results.iter().collect();
    ordered.sort_by_key(|r| r.started_at);

    let Some(first_failure) = ordered.iter().position(|r| !r.is_success()) else {
        return RecoveryMetrics {
            recovery_time_ms: None,
            stability: 1.0,
        };
    };

    let Some(offset) = ordered[first_failure..].iter().position(|r| r.is_success()) else {
        return RecoveryMetrics {
            recovery_time_ms: None,
            stability: 0.0,
        };
    };
    let recovered = first_failure + offset;

    let elapsed = ordered[recovered].started_at - ordered[first_failure].started_at;
    let tail = &ordered[recovered..];
    let successes = tail.iter().filter(|r| r.is_success()).count();

    RecoveryMetrics {
        recovery_time_ms: Some(elapsed.num_milliseconds().max(0) as u64),
        stability: successes as f64 / tail.len() as f64,
    }
}

/// Composite score in [0, 1]
///
/// Half average success, a quarter for holding up without any breaking
/// point and a quarter average recovery stability (full when no scenario
/// measured recovery).
pub fn robustness_score(
    average_success_rate: f64,
    any_breaking_point: bool,
    average_recovery_stability: Option<f64>,
) -> f64 {
    let no_break = if any_breaking_point { 0.0 } else { 1.0 };
    let stability = average_recovery_stability.unwrap_or(1.0);
    (0.5 * average_success_rate + 0.25 * no_break + 0.25 * stability).clamp(0.0, 1.0)
}

pub fn degradation_severity(average_success_rate: f64) -> DegradationSeverity {
    if average_success_rate < 0.5 {
        DegradationSeverity::Severe
    } else if average_success_rate < 0.7 {
        DegradationSeverity::Moderate
    } else if average_success_rate < 0.9 {
        DegradationSeverity::Mild
    } else {
        DegradationSeverity::None
    }
}

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Highest concurrency a load ramp sustained before breaking
fn sustained_concurrency(result: &ScenarioResult) -> Option<usize> {
    let levels = level_failure_rates(&result.requests, BreakingMetric::Concurrency);
    if levels.is_empty() {
        return None;
    }
    let breaking = result
        .breaking_points
        .iter()
        .find(|p| p.metric == BreakingMetric::Concurrency);

    let sustained = match breaking {
        Some(point) => levels
            .iter()
            .filter(|l| l.level < point.threshold_value)
            .map(|l| l.level)
            .max()
            .unwrap_or(0),
        None => levels.iter().map(|l| l.level).max().unwrap_or(0),
    };
    Some(sustained as usize)
}

/// Roll one provider's scenario results up into a summary
pub fn summarize_provider(
    provider: &str,
    model: &str,
    results: &[&ScenarioResult],
) -> ProviderRobustnessSummary {
    let measured: Vec<&ScenarioResult> = results
        .iter()
        .copied()
        .filter(|r| r.total_requests > 0)
        .collect();

    let average_success_rate = average(measured.iter().map(|r| r.success_rate)).unwrap_or(0.0);
    let average_recovery_stability = average(measured.iter().filter_map(|r| r.recovery_stability));
    let breaking_points_found: usize = results.iter().map(|r| r.breaking_points.len()).sum();

    let max_sustainable_concurrency = results
        .iter()
        .filter(|r| r.test_type == TestType::LoadRamp)
        .filter_map(|r| sustained_concurrency(r))
        .min();

    let mut histogram: BTreeMap<FailureMode, u64> = BTreeMap::new();
    for result in results {
        for (mode, count) in &result.failure_modes {
            *histogram.entry(*mode).or_default() += count;
        }
    }
    let most_common_failure_mode = histogram
        .iter()
        .filter(|(_, count)| **count > 0)
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(mode, _)| *mode);

    let mut warnings = Vec::new();
    for result in results {
        for point in &result.breaking_points {
            warnings.push(format!(
                "{}: breaking point at {} {} ({} degradation)",
                result.scenario_id,
                point.metric.as_str(),
                point.threshold_value,
                point.degradation_pattern.as_str()
            ));
        }
    }
    if let Some(&throttled) = histogram.get(&FailureMode::RateLimited) {
        if throttled > 0 {
            warnings.push(format!(
                "rate limiting observed on {} requests",
                throttled
            ));
        }
    }
    for result in results {
        if let Some(ms) = result.recovery_time_ms {
            if ms > SLOW_RECOVERY_MS {
                warnings.push(format!(
                    "{}: slow recovery after failures ({} ms)",
                    result.scenario_id, ms
                ));
            }
        }
    }
    if !measured.is_empty() && average_success_rate < LOW_SUCCESS_RATE {
        warnings.push(format!(
            "average success rate {:.1}% is below {:.0}%",
            average_success_rate * 100.0,
            LOW_SUCCESS_RATE * 100.0
        ));
    }
    for result in results.iter().filter(|r| !r.passed) {
        warnings.push(format!(
            "{}: did not meet its pass criteria",
            result.scenario_id
        ));
    }

    ProviderRobustnessSummary {
        provider: provider.to_string(),
        model: model.to_string(),
        scenarios_run: results.len(),
        robustness_score: robustness_score(
            average_success_rate,
            breaking_points_found > 0,
            average_recovery_stability,
        ),
        average_success_rate,
        average_recovery_stability,
        max_sustainable_concurrency,
        breaking_points_found,
        degradation_severity: degradation_severity(average_success_rate),
        most_common_failure_mode,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use gauntlet_core::{BreakingPoint, DegradationPattern, LatencyStats, RequestOutcome};
    use proptest::prelude::*;

    fn at(second: i64, success: bool) -> StressRequestResult {
        let started_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
            + Duration::seconds(second);
        let outcome = if success {
            RequestOutcome::Success {
                latency_ms: 20,
                time_to_first_token_ms: None,
                prompt_tokens: 1,
                completion_tokens: 1,
                cost_usd: 0.0,
                response_sample: None,
            }
        } else {
            RequestOutcome::Failure {
                failure_mode: FailureMode::RateLimited,
                message: "HTTP 429".to_string(),
                http_status: Some(429),
            }
        };
        StressRequestResult {
            request_id: format!("r{}", second),
            scenario_id: "spike".to_string(),
            concurrency_level: 1,
            input_size: 10,
            label: None,
            started_at,
            completed_at: started_at,
            outcome,
        }
    }

    fn scenario(
        scenario_id: &str,
        test_type: TestType,
        requests: Vec<StressRequestResult>,
    ) -> ScenarioResult {
        let total = requests.len() as u64;
        let successes = requests.iter().filter(|r| r.is_success()).count() as u64;
        let mut failure_modes = BTreeMap::new();
        for mode in requests.iter().filter_map(|r| r.failure_mode()) {
            *failure_modes.entry(mode).or_default() += 1;
        }
        let now = Utc::now();
        ScenarioResult {
            scenario_id: scenario_id.to_string(),
            test_type,
            provider: "mock".to_string(),
            model: "mock-model".to_string(),
            started_at: now,
            completed_at: now,
            duration_ms: 0,
            total_requests: total,
            successful_requests: successes,
            failed_requests: total - successes,
            success_rate: if total == 0 {
                0.0
            } else {
                successes as f64 / total as f64
            },
            failure_modes,
            latency: LatencyStats::default(),
            requests_per_second: 0.0,
            total_cost_usd: 0.0,
            breaking_points: Vec::new(),
            recovery_time_ms: None,
            recovery_stability: None,
            passed: true,
            stopped_by: None,
            requests,
        }
    }

    #[test]
    fn test_all_success_is_fully_stable() {
        let metrics = analyze_recovery(&[at(0, true), at(1, true), at(2, true)]);
        assert_eq!(metrics.stability, 1.0);
        assert_eq!(metrics.recovery_time_ms, None);
    }

    #[test]
    fn test_recovery_after_failures() {
        // out of order on purpose
        let results = vec![
            at(5, true),
            at(0, true),
            at(2, false),
            at(3, false),
            at(6, false),
            at(7, true),
        ];
        let metrics = analyze_recovery(&results);
        assert_eq!(metrics.recovery_time_ms, Some(3_000));
        // 5s ok, 6s failed, 7s ok
        assert!((metrics.stability - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_never_recovered() {
        let metrics = analyze_recovery(&[at(0, true), at(1, false), at(2, false)]);
        assert_eq!(metrics.recovery_time_ms, None);
        assert_eq!(metrics.stability, 0.0);
    }

    #[test]
    fn test_score_components() {
        assert_eq!(robustness_score(1.0, false, None), 1.0);
        assert_eq!(robustness_score(1.0, true, Some(1.0)), 0.75);
        assert_eq!(robustness_score(0.0, true, Some(0.0)), 0.0);
        assert!((robustness_score(0.5, false, Some(0.5)) - 0.625).abs() < 1e-9);
    }

    #[test]
    fn test_severity_thresholds() {
        assert_eq!(degradation_severity(0.49), DegradationSeverity::Severe);
        assert_eq!(degradation_severity(0.5), DegradationSeverity::Moderate);
        assert_eq!(degradation_severity(0.7), DegradationSeverity::Mild);
        assert_eq!(degradation_severity(0.9), DegradationSeverity::None);
    }

    #[test]
    fn test_summary_rollup() {
        let mut ramp = scenario(
            "ramp",
            TestType::LoadRamp,
            vec![at(0, true), at(1, true), at(2, false), at(3, false)],
        );
        ramp.requests[0].concurrency_level = 1;
        ramp.requests[1].concurrency_level = 6;
        ramp.requests[2].concurrency_level = 10;
        ramp.requests[3].concurrency_level = 10;
        ramp.breaking_points.push(BreakingPoint {
            metric: BreakingMetric::Concurrency,
            threshold_value: 10,
            failure_rate_at_threshold: 1.0,
            first_failure_at: Some(10),
            degradation_pattern: DegradationPattern::Cliff,
        });

        let mut spike = scenario("spike", TestType::Spike, vec![at(0, true), at(1, true)]);
        spike.recovery_stability = Some(1.0);
        spike.recovery_time_ms = Some(8_000);

        let empty = scenario("skipped", TestType::Soak, Vec::new());

        let summary = summarize_provider("mock", "mock-model", &[&ramp, &spike, &empty]);

        assert_eq!(summary.scenarios_run, 3);
        assert!((summary.average_success_rate - 0.75).abs() < 1e-9);
        assert_eq!(summary.average_recovery_stability, Some(1.0));
        assert_eq!(summary.max_sustainable_concurrency, Some(6));
        assert_eq!(summary.breaking_points_found, 1);
        assert_eq!(summary.degradation_severity, DegradationSeverity::Mild);
        assert_eq!(
            summary.most_common_failure_mode,
            Some(FailureMode::RateLimited)
        );
        assert!((summary.robustness_score - 0.625).abs() < 1e-9);
        assert!(summary
            .warnings
            .iter()
            .any(|w| w == "ramp: breaking point at concurrency 10 (cliff degradation)"));
        assert!(summary.warnings.iter().any(|w| w.contains("rate limiting")));
        assert!(summary.warnings.iter().any(|w| w.contains("slow recovery")));
    }

    #[test]
    fn test_unbroken_ramp_sustains_max_level() {
        let mut ramp = scenario("ramp", TestType::LoadRamp, vec![at(0, true), at(1, true)]);
        ramp.requests[1].concurrency_level = 8;
        let summary = summarize_provider("mock", "mock-model", &[&ramp]);
        assert_eq!(summary.max_sustainable_concurrency, Some(8));
        assert!(summary.warnings.is_empty());
        assert_eq!(summary.most_common_failure_mode, None);
    }

    #[test]
    fn test_no_ramp_no_concurrency_estimate() {
        let spike = scenario("spike", TestType::Spike, vec![at(0, false)]);
        let summary = summarize_provider("mock", "mock-model", &[&spike]);
        assert_eq!(summary.max_sustainable_concurrency, None);
        assert_eq!(summary.degradation_severity, DegradationSeverity::Severe);
        assert!(summary.warnings.iter().any(|w| w.contains("below 50%")));
    }

    proptest! {
        #[test]
        fn prop_score_monotone_in_success_rate(
            high in 0.0f64..=1.0,
            drop in 0.0f64..=1.0,
            broke in any::<bool>(),
            stability in proptest::option::of(0.0f64..=1.0),
        ) {
            let low = (high - drop).max(0.0);
            let upper = robustness_score(high, broke, stability);
            let lower = robustness_score(low, broke, stability);
            prop_assert!(lower <= upper);
            prop_assert!((0.0..=1.0).contains(&lower));
        }
    }
}

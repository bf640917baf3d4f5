//! Per-request and per-scenario results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::failure::{Constraint, FailureMode};
use gauntlet_config::TestType;

/// What happened to one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RequestOutcome {
    Success {
        latency_ms: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_to_first_token_ms: Option<u64>,
        prompt_tokens: u64,
        completion_tokens: u64,
        cost_usd: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response_sample: Option<String>,
    },
    Failure {
        failure_mode: FailureMode,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        http_status: Option<u16>,
    },
}

/// One executed request. Built once by the batch executor and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressRequestResult {
    pub request_id: String,
    pub scenario_id: String,
    /// Concurrency (or requests-per-second for rate probes) at which it ran
    pub concurrency_level: usize,
    /// Prompt size in characters
    pub input_size: usize,
    /// Schedule label such as `emoji` or `timeout=5000`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: RequestOutcome,
}

impl StressRequestResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RequestOutcome::Success { .. })
    }

    pub fn latency_ms(&self) -> Option<u64> {
        match self.outcome {
            RequestOutcome::Success { latency_ms, .. } => Some(latency_ms),
            RequestOutcome::Failure { .. } => None,
        }
    }

    pub fn failure_mode(&self) -> Option<FailureMode> {
        match self.outcome {
            RequestOutcome::Failure { failure_mode, .. } => Some(failure_mode),
            RequestOutcome::Success { .. } => None,
        }
    }

    pub fn cost_usd(&self) -> f64 {
        match self.outcome {
            RequestOutcome::Success { cost_usd, .. } => cost_usd,
            RequestOutcome::Failure { .. } => 0.0,
        }
    }
}

/// Latency distribution over successful requests, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatencyStats {
    pub mean: f64,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub min: u64,
    pub max: u64,
}

/// Axis along which a breaking point was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakingMetric {
    Concurrency,
    InputSize,
}

impl BreakingMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakingMetric::Concurrency => "concurrency",
            BreakingMetric::InputSize => "input_size",
        }
    }
}

/// Shape of the failure-rate curve leading to a break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationPattern {
    Gradual,
    Cliff,
    Oscillating,
    Immediate,
}

impl DegradationPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegradationPattern::Gradual => "gradual",
            DegradationPattern::Cliff => "cliff",
            DegradationPattern::Oscillating => "oscillating",
            DegradationPattern::Immediate => "immediate",
        }
    }
}

/// First level at which more than half of the requests failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakingPoint {
    pub metric: BreakingMetric,
    pub threshold_value: u64,
    pub failure_rate_at_threshold: f64,
    /// First level with any failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_failure_at: Option<u64>,
    pub degradation_pattern: DegradationPattern,
}

/// Aggregate for one (provider, scenario) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_id: String,
    pub test_type: TestType,
    pub provider: String,
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub success_rate: f64,
    pub failure_modes: BTreeMap<FailureMode, u64>,
    pub latency: LatencyStats,
    pub requests_per_second: f64,
    pub total_cost_usd: f64,
    pub breaking_points: Vec<BreakingPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_time_ms: Option<u64>,
    /// Only set for spike and soak scenarios
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_stability: Option<f64>,
    pub passed: bool,
    /// Budget constraint that cut the scenario short, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_by: Option<Constraint>,
    pub requests: Vec<StressRequestResult>,
}

impl ScenarioResult {
    /// Most frequent failure mode in this scenario
    pub fn dominant_failure_mode(&self) -> Option<FailureMode> {
        self.failure_modes
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(mode, _)| *mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn result(outcome: RequestOutcome) -> StressRequestResult {
        let now = Utc::now();
        StressRequestResult {
            request_id: "r-1".to_string(),
            scenario_id: "s".to_string(),
            concurrency_level: 4,
            input_size: 12,
            label: None,
            started_at: now,
            completed_at: now,
            outcome,
        }
    }

    #[test]
    fn test_outcome_is_flattened_into_result() {
        let failure = result(RequestOutcome::Failure {
            failure_mode: FailureMode::RateLimited,
            message: "429 Too Many Requests".to_string(),
            http_status: Some(429),
        });

        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["outcome"], "failure");
        assert_eq!(json["failure_mode"], "rate_limited");
        assert_eq!(json["http_status"], 429);

        let back: StressRequestResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, failure);
    }

    #[test]
    fn test_accessors() {
        let success = result(RequestOutcome::Success {
            latency_ms: 120,
            time_to_first_token_ms: Some(80),
            prompt_tokens: 10,
            completion_tokens: 5,
            cost_usd: 0.25,
            response_sample: None,
        });
        assert!(success.is_success());
        assert_eq!(success.latency_ms(), Some(120));
        assert_eq!(success.failure_mode(), None);
        assert_eq!(success.cost_usd(), 0.25);
    }
}

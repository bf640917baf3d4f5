//! Provider summaries and the final run report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::failure::{Constraint, FailureMode};
use crate::results::ScenarioResult;

/// How badly a provider degraded across its scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationSeverity {
    None,
    Mild,
    Moderate,
    Severe,
}

impl DegradationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegradationSeverity::None => "none",
            DegradationSeverity::Mild => "mild",
            DegradationSeverity::Moderate => "moderate",
            DegradationSeverity::Severe => "severe",
        }
    }
}

/// Per-provider roll-up across every scenario it ran
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRobustnessSummary {
    pub provider: String,
    pub model: String,
    pub scenarios_run: usize,
    /// Composite score in [0, 1]
    pub robustness_score: f64,
    pub average_success_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_recovery_stability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sustainable_concurrency: Option<usize>,
    pub breaking_points_found: usize,
    pub degradation_severity: DegradationSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub most_common_failure_mode: Option<FailureMode>,
    pub warnings: Vec<String>,
}

/// Everything a run produced, handed to the result sinks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressTestReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub total_duration_ms: u64,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub overall_success_rate: f64,
    pub total_cost_usd: f64,
    pub scenario_results: Vec<ScenarioResult>,
    pub provider_summaries: Vec<ProviderRobustnessSummary>,
    pub constraints_applied: Vec<Constraint>,
}

impl StressTestReport {
    /// Results for one provider, in execution order
    pub fn results_for<'a>(
        &'a self,
        provider: &'a str,
    ) -> impl Iterator<Item = &'a ScenarioResult> + 'a {
        self.scenario_results
            .iter()
            .filter(move |r| r.provider == provider)
    }

    /// Summary for one provider
    pub fn summary_for(&self, provider: &str) -> Option<&ProviderRobustnessSummary> {
        self.provider_summaries
            .iter()
            .find(|s| s.provider == provider)
    }

    pub fn constraint_fired(&self, constraint: Constraint) -> bool {
        self.constraints_applied.contains(&constraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(DegradationSeverity::None < DegradationSeverity::Mild);
        assert!(DegradationSeverity::Moderate < DegradationSeverity::Severe);
        assert_eq!(
            serde_json::to_string(&DegradationSeverity::Moderate).unwrap(),
            "\"moderate\""
        );
    }

    #[test]
    fn test_report_lookup_helpers() {
        let now = Utc::now();
        let report = StressTestReport {
            run_id: Uuid::new_v4(),
            started_at: now,
            completed_at: now,
            total_duration_ms: 0,
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            overall_success_rate: 0.0,
            total_cost_usd: 0.0,
            scenario_results: Vec::new(),
            provider_summaries: Vec::new(),
            constraints_applied: vec![Constraint::MaxRequestsExceeded],
        };

        assert!(report.constraint_fired(Constraint::MaxRequestsExceeded));
        assert!(!report.constraint_fired(Constraint::MaxCostExceeded));
        assert!(report.summary_for("openai").is_none());
        assert_eq!(report.results_for("openai").count(), 0);
    }
}

//! Report sink implementations

pub mod filesystem;
pub mod memory;
pub mod stdio;
pub mod webhook;

pub use filesystem::FilesystemSink;
pub use memory::MemorySink;
pub use stdio::StdioSink;
pub use webhook::WebhookSink;

use gauntlet_config::ReportFormat;
use gauntlet_core::StressTestReport;

use crate::errors::DeliveryError;

/// Serialize a report in the requested format
pub(crate) fn encode_report(
    report: &StressTestReport,
    format: ReportFormat,
) -> Result<Vec<u8>, DeliveryError> {
    match format {
        ReportFormat::Json => {
            serde_json::to_vec_pretty(report).map_err(|e| DeliveryError::Serialization {
                format: "json".to_string(),
                error: e.to_string(),
            })
        }
        ReportFormat::JsonCompact => {
            serde_json::to_vec(report).map_err(|e| DeliveryError::Serialization {
                format: "json_compact".to_string(),
                error: e.to_string(),
            })
        }
        ReportFormat::Yaml => serde_yaml::to_string(report)
            .map(|s| s.into_bytes())
            .map_err(|e| DeliveryError::Serialization {
                format: "yaml".to_string(),
                error: e.to_string(),
            }),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{TimeZone, Utc};
    use gauntlet_core::{
        DegradationSeverity, FailureMode, ProviderRobustnessSummary, StressTestReport,
    };

    pub fn sample_report() -> StressTestReport {
        let started = Utc.with_ymd_and_hms(2024, 1, 6, 14, 30, 0).unwrap();
        StressTestReport {
            run_id: uuid::Uuid::new_v4(),
            started_at: started,
            completed_at: started,
            total_duration_ms: 1_500,
            total_requests: 20,
            successful_requests: 15,
            failed_requests: 5,
            overall_success_rate: 0.75,
            total_cost_usd: 0.012,
            scenario_results: Vec::new(),
            provider_summaries: vec![ProviderRobustnessSummary {
                provider: "openai".to_string(),
                model: "gpt-4o-mini".to_string(),
                scenarios_run: 2,
                robustness_score: 0.62,
                average_success_rate: 0.75,
                average_recovery_stability: None,
                max_sustainable_concurrency: Some(6),
                breaking_points_found: 1,
                degradation_severity: DegradationSeverity::Mild,
                most_common_failure_mode: Some(FailureMode::RateLimited),
                warnings: vec!["Breaking point at concurrency 10".to_string()],
            }],
            constraints_applied: Vec::new(),
        }
    }
}

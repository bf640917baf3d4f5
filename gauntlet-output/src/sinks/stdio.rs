//! Standard output report sink

use async_trait::async_trait;
use gauntlet_config::{ReportFormat, StdioMode};
use gauntlet_core::StressTestReport;
use std::fmt::Write as _;
use std::time::Instant;
use tokio::io::AsyncWriteExt;

use crate::{
    errors::DeliveryError,
    sink::{DeliveryResult, ReportSink},
    sinks::encode_report,
};

/// Prints a human summary or the full JSON report to stdout
#[derive(Debug, Clone, Default)]
pub struct StdioSink {
    mode: StdioMode,
}

impl StdioSink {
    pub fn new(mode: StdioMode) -> Self {
        Self { mode }
    }

    /// Bytes this sink would print for a report
    pub fn render(&self, report: &StressTestReport) -> Result<Vec<u8>, DeliveryError> {
        match self.mode {
            StdioMode::Summary => Ok(summary(report).into_bytes()),
            StdioMode::Json => {
                let mut data = encode_report(report, ReportFormat::Json)?;
                data.push(b'\n');
                Ok(data)
            }
        }
    }
}

/// Multi-line plain text overview of a run
pub fn summary(report: &StressTestReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Stress run {}", report.run_id);
    let _ = writeln!(
        out,
        "  requests: {} ({} ok, {} failed, {:.1}% success) in {} ms, cost ${:.4}",
        report.total_requests,
        report.successful_requests,
        report.failed_requests,
        report.overall_success_rate * 100.0,
        report.total_duration_ms,
        report.total_cost_usd
    );

    if !report.constraints_applied.is_empty() {
        let names: Vec<&str> = report
            .constraints_applied
            .iter()
            .map(|c| c.as_str())
            .collect();
        let _ = writeln!(out, "  constraints: {}", names.join(", "));
    }

    for result in &report.scenario_results {
        let _ = writeln!(
            out,
            "  [{}] {} / {} ({}): {:.1}% success, p95 {} ms, {} breaking point(s)",
            if result.passed { "PASS" } else { "FAIL" },
            result.provider,
            result.scenario_id,
            result.test_type,
            result.success_rate * 100.0,
            result.latency.p95,
            result.breaking_points.len()
        );
    }

    for summary in &report.provider_summaries {
        let _ = writeln!(
            out,
            "  {} ({}): robustness {:.2}, severity {}",
            summary.provider,
            summary.model,
            summary.robustness_score,
            summary.degradation_severity.as_str()
        );
        for warning in &summary.warnings {
            let _ = writeln!(out, "    warning: {}", warning);
        }
    }

    out
}

#[async_trait]
impl ReportSink for StdioSink {
    async fn deliver(&self, report: &StressTestReport) -> Result<DeliveryResult, DeliveryError> {
        let start_time = Instant::now();
        let data = self.render(report)?;

        let mut stdout = tokio::io::stdout();
        let write = async {
            stdout.write_all(&data).await?;
            stdout.flush().await
        };
        write.await.map_err(|e| DeliveryError::Filesystem {
                path: "stdout".to_string(),
                operation: "write".to_string(),
                error: e.to_string(),
            })?;

        Ok(DeliveryResult::new(
            self.sink_type(),
            start_time.elapsed(),
            data.len() as u64,
        ))
    }

    fn sink_type(&self) -> &'static str {
        "stdio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::test_support::sample_report;

    #[test]
    fn test_summary_mentions_totals_and_providers() {
        let report = sample_report();
        let text = summary(&report);

        assert!(text.contains(&report.run_id.to_string()));
        assert!(text.contains("20 (15 ok, 5 failed, 75.0% success)"));
        assert!(text.contains("openai (gpt-4o-mini): robustness 0.62, severity mild"));
        assert!(text.contains("warning: Breaking point at concurrency 10"));
    }

    #[test]
    fn test_json_mode_renders_full_report() {
        let report = sample_report();
        let bytes = StdioSink::new(StdioMode::Json).render(&report).unwrap();
        let parsed: StressTestReport = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, report);
    }
}

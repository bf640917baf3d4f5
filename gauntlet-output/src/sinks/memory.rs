//! In-memory report sink

use async_trait::async_trait;
use gauntlet_core::StressTestReport;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    errors::DeliveryError,
    sink::{DeliveryResult, ReportSink},
};

/// Keeps every delivered report; clones share the same store
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    reports: Arc<Mutex<Vec<StressTestReport>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the reports delivered so far
    pub fn reports(&self) -> Vec<StressTestReport> {
        self.reports.lock().clone()
    }

    /// Most recent report
    pub fn last(&self) -> Option<StressTestReport> {
        self.reports.lock().last().cloned()
    }
}

#[async_trait]
impl ReportSink for MemorySink {
    async fn deliver(&self, report: &StressTestReport) -> Result<DeliveryResult, DeliveryError> {
        let start_time = Instant::now();
        self.reports.lock().push(report.clone());
        Ok(DeliveryResult::new(
            self.sink_type(),
            start_time.elapsed(),
            0,
        ))
    }

    fn sink_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::test_support::sample_report;

    #[tokio::test]
    async fn test_clones_share_storage() {
        let sink = MemorySink::new();
        let handle = sink.clone();
        let report = sample_report();

        sink.deliver(&report).await.unwrap();

        assert_eq!(handle.reports().len(), 1);
        assert_eq!(handle.last().map(|r| r.run_id), Some(report.run_id));
    }
}

//! Sink trait and delivery result

use async_trait::async_trait;
use gauntlet_core::StressTestReport;
use std::time::Duration;

use crate::errors::DeliveryError;

/// Outcome of one successful delivery
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryResult {
    pub sink_type: &'static str,
    pub delivery_time: Duration,
    pub size_bytes: u64,
    /// Where the report went, when that is meaningful (file path, URL)
    pub location: Option<String>,
}

impl DeliveryResult {
    pub fn new(sink_type: &'static str, delivery_time: Duration, size_bytes: u64) -> Self {
        Self {
            sink_type,
            delivery_time,
            size_bytes,
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// A destination for finished reports
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Deliver one report
    async fn deliver(&self, report: &StressTestReport) -> Result<DeliveryResult, DeliveryError>;

    /// Short identifier used in logs and metrics
    fn sink_type(&self) -> &'static str;
}

//! Fan-out of finished reports to every configured sink

use std::sync::Arc;
use std::time::{Duration, Instant};

use gauntlet_config::{OutputConfig, SinkConfig};
use gauntlet_core::StressTestReport;
use gauntlet_http::{EnvSecretResolver, SecretResolver};
use tracing::{debug, error, info};

use crate::{
    errors::DeliveryError,
    metrics::SinkMetrics,
    sink::{DeliveryResult, ReportSink},
    sinks::{FilesystemSink, StdioSink, WebhookSink},
    template::TemplateEngine,
};

struct RegisteredSink {
    sink: Arc<dyn ReportSink>,
    metrics: SinkMetrics,
}

/// Delivers each report to all sinks; failures are logged, never returned
#[derive(Default)]
pub struct SinkManager {
    sinks: Vec<RegisteredSink>,
}

impl std::fmt::Debug for SinkManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let types: Vec<&str> = self.sinks.iter().map(|s| s.sink.sink_type()).collect();
        f.debug_struct("SinkManager").field("sinks", &types).finish()
    }
}

impl SinkManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build sinks from configuration, resolving webhook tokens from the environment
    pub fn from_config(config: &OutputConfig) -> Result<Self, DeliveryError> {
        Self::from_config_with_secrets(config, Arc::new(EnvSecretResolver))
    }

    pub fn from_config_with_secrets(
        config: &OutputConfig,
        secrets: Arc<dyn SecretResolver>,
    ) -> Result<Self, DeliveryError> {
        let template_engine = TemplateEngine::new();
        let mut manager = Self::new();

        for sink_config in &config.sinks {
            let sink: Arc<dyn ReportSink> = match sink_config {
                SinkConfig::Filesystem {
                    path,
                    format,
                    create_dirs,
                    overwrite,
                } => Arc::new(FilesystemSink::new(
                    path.clone(),
                    *format,
                    *create_dirs,
                    *overwrite,
                    template_engine.clone(),
                )?),
                SinkConfig::Webhook {
                    url,
                    timeout_ms,
                    bearer_token_ref,
                } => Arc::new(WebhookSink::new(
                    url.clone(),
                    Duration::from_millis(*timeout_ms),
                    bearer_token_ref.clone(),
                    Arc::clone(&secrets),
                )?),
                SinkConfig::Stdio { mode } => Arc::new(StdioSink::new(*mode)),
            };
            manager.add_sink(sink);
        }

        Ok(manager)
    }

    pub fn add_sink(&mut self, sink: Arc<dyn ReportSink>) {
        info!("Added report sink: {}", sink.sink_type());
        self.sinks.push(RegisteredSink {
            sink,
            metrics: SinkMetrics::new(),
        });
    }

    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.add_sink(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Deliver a report to every sink concurrently
    pub async fn deliver_all(
        &self,
        report: &StressTestReport,
    ) -> Vec<Result<DeliveryResult, DeliveryError>> {
        let deliveries = self.sinks.iter().map(|registered| async move {
            let start_time = Instant::now();
            let sink_type = registered.sink.sink_type();
            debug!("Delivering report {} to {}", report.run_id, sink_type);

            let result = registered.sink.deliver(report).await;
            match &result {
                Ok(delivery) => {
                    registered
                        .metrics
                        .record_success(delivery.delivery_time, delivery.size_bytes);
                    info!(
                        "Delivered report {} to {} in {:?}",
                        report.run_id, sink_type, delivery.delivery_time
                    );
                }
                Err(e) => {
                    registered.metrics.record_failure(start_time.elapsed());
                    error!("Failed to deliver report {} to {}: {}", report.run_id, sink_type, e);
                }
            }
            result
        });

        futures::future::join_all(deliveries).await
    }

    /// Metrics for each sink, in registration order
    pub fn metrics(&self) -> impl Iterator<Item = (&'static str, &SinkMetrics)> {
        self.sinks
            .iter()
            .map(|registered| (registered.sink.sink_type(), &registered.metrics))
    }
}

//! Webhook report sink

use async_trait::async_trait;
use gauntlet_core::StressTestReport;
use gauntlet_http::SecretResolver;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{
    errors::DeliveryError,
    sink::{DeliveryResult, ReportSink},
};

/// POSTs the report as JSON; a single attempt per report
pub struct WebhookSink {
    url: String,
    timeout: Duration,
    bearer_token_ref: Option<String>,
    client: reqwest::Client,
    secrets: Arc<dyn SecretResolver>,
}

impl std::fmt::Debug for WebhookSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookSink")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .field("bearer_token_ref", &self.bearer_token_ref)
            .finish_non_exhaustive()
    }
}

impl WebhookSink {
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        bearer_token_ref: Option<String>,
        secrets: Arc<dyn SecretResolver>,
    ) -> Result<Self, DeliveryError> {
        let url = url.into();
        let client = Self::create_default_client().map_err(|e| DeliveryError::Network {
            url: url.clone(),
            error: e.to_string(),
        })?;

        Ok(Self {
            url,
            timeout,
            bearer_token_ref,
            client,
            secrets,
        })
    }

    fn create_default_client() -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .use_rustls_tls()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .user_agent("gauntlet-output/0.1")
            .build()
    }
}

#[async_trait]
impl ReportSink for WebhookSink {
    async fn deliver(&self, report: &StressTestReport) -> Result<DeliveryResult, DeliveryError> {
        let start_time = Instant::now();

        let payload = serde_json::to_vec(report).map_err(|e| DeliveryError::Serialization {
            format: "json".to_string(),
            error: e.to_string(),
        })?;
        let size_bytes = payload.len() as u64;

        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .body(payload);

        if let Some(ref reference) = self.bearer_token_ref {
            let token = self
                .secrets
                .resolve(reference)
                .map_err(|e| DeliveryError::Credentials(e.to_string()))?;
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| DeliveryError::Network {
            url: self.url.clone(),
            error: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let response_text = response.text().await.unwrap_or_default();
            return Err(DeliveryError::WebhookFailed {
                url: self.url.clone(),
                status: status.as_u16(),
                response: response_text,
            });
        }

        Ok(
            DeliveryResult::new(self.sink_type(), start_time.elapsed(), size_bytes)
                .with_location(self.url.clone()),
        )
    }

    fn sink_type(&self) -> &'static str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::test_support::sample_report;
    use gauntlet_http::StaticSecretResolver;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn secrets() -> Arc<dyn SecretResolver> {
        Arc::new(StaticSecretResolver::new().with_secret("HOOK_TOKEN", "hook-secret"))
    }

    #[tokio::test]
    async fn test_webhook_delivery() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/reports"))
            .and(header("content-type", "application/json"))
            .and(header("authorization", "Bearer hook-secret"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let sink = WebhookSink::new(
            format!("{}/reports", mock_server.uri()),
            Duration::from_secs(5),
            Some("HOOK_TOKEN".to_string()),
            secrets(),
        )
        .unwrap();

        let result = sink.deliver(&sample_report()).await.unwrap();
        assert_eq!(result.sink_type, "webhook");
        assert!(result.size_bytes > 0);

        let received = &mock_server.received_requests().await.unwrap()[0];
        let body: serde_json::Value = serde_json::from_slice(&received.body).unwrap();
        assert_eq!(body["total_requests"], 20);
    }

    #[tokio::test]
    async fn test_webhook_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let sink = WebhookSink::new(mock_server.uri(), Duration::from_secs(5), None, secrets())
            .unwrap();

        match sink.deliver(&sample_report()).await {
            Err(DeliveryError::WebhookFailed {
                status, response, ..
            }) => {
                assert_eq!(status, 503);
                assert_eq!(response, "unavailable");
            }
            other => panic!("Expected WebhookFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_sending() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let sink = WebhookSink::new(
            mock_server.uri(),
            Duration::from_secs(5),
            Some("UNKNOWN".to_string()),
            secrets(),
        )
        .unwrap();

        assert!(matches!(
            sink.deliver(&sample_report()).await,
            Err(DeliveryError::Credentials(_))
        ));
    }
}

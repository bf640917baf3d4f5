//! Provider client implementation

use std::sync::Arc;
use std::time::{Duration, Instant};

use gauntlet_config::{PriceTable, ProviderConfig};
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::HttpClientConfig;
use crate::errors::ProviderError;
use crate::secrets::{EnvSecretResolver, SecretResolver};
use crate::types::{
    ChatCompletionBody, ChatCompletionReply, ChatMessage, CompletionRequest, CompletionResponse,
};

/// Sends one prompt to one provider
///
/// Implementations own the hard per-call timeout and must not retry.
#[async_trait::async_trait]
pub trait ProviderClient: Send + Sync {
    async fn call(
        &self,
        provider: &ProviderConfig,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError>;
}

/// reqwest-backed client for OpenAI-compatible chat-completions endpoints
#[derive(Clone)]
pub struct HttpProviderClient {
    client: Client,
    prices: PriceTable,
    secrets: Arc<dyn SecretResolver>,
}

impl std::fmt::Debug for HttpProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProviderClient")
            .field("prices", &self.prices.len())
            .finish_non_exhaustive()
    }
}

impl HttpProviderClient {
    /// Create a client resolving keys from environment variables
    pub fn new(config: HttpClientConfig, prices: PriceTable) -> Result<Self, ProviderError> {
        Self::with_secrets(config, prices, Arc::new(EnvSecretResolver))
    }

    /// Create a client with a custom secret source
    pub fn with_secrets(
        config: HttpClientConfig,
        prices: PriceTable,
        secrets: Arc<dyn SecretResolver>,
    ) -> Result<Self, ProviderError> {
        debug!(
            "Creating provider client with {}s connect timeout",
            config.connect_timeout.as_secs()
        );

        let client = Client::builder()
            .use_rustls_tls()
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| ProviderError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            prices,
            secrets,
        })
    }

    async fn send(
        &self,
        provider: &ProviderConfig,
        request: &CompletionRequest,
        started: Instant,
    ) -> Result<CompletionResponse, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = request.system_prompt {
            messages.push(ChatMessage::system(system.clone()));
        }
        messages.push(ChatMessage::user(request.prompt.clone()));

        let body = ChatCompletionBody {
            model: &provider.model,
            messages,
            max_tokens: request.max_tokens,
        };

        let mut builder = self.client.post(provider.completions_url()).json(&body);

        if let Some(ref reference) = provider.api_key_ref {
            let key = self.secrets.resolve(reference)?;
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let time_to_first_token_ms = started.elapsed().as_millis() as u64;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let reply: ChatCompletionReply = serde_json::from_str(&text)
            .map_err(|e| ProviderError::InvalidResponse(format!("malformed JSON body: {}", e)))?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| {
                ProviderError::InvalidResponse("missing choices[0].message.content".to_string())
            })?;

        let usage = reply.usage.unwrap_or_default();
        let cost_usd =
            self.prices
                .cost_usd(&provider.model, usage.prompt_tokens, usage.completion_tokens);

        Ok(CompletionResponse {
            content,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            cost_usd,
            latency_ms: started.elapsed().as_millis() as u64,
            time_to_first_token_ms: Some(time_to_first_token_ms),
        })
    }
}

#[async_trait::async_trait]
impl ProviderClient for HttpProviderClient {
    async fn call(
        &self,
        provider: &ProviderConfig,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let timeout_ms = request.timeout_ms_override.unwrap_or(provider.timeout_ms);
        let started = Instant::now();

        debug!(
            provider = %provider.name,
            model = %provider.model,
            prompt_chars = request.prompt.chars().count(),
            timeout_ms,
            "Calling provider"
        );

        match tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.send(provider, request, started),
        )
        .await
        {
            Ok(result) => {
                if let Err(ref e) = result {
                    debug!(provider = %provider.name, error = %e, "Provider call failed");
                }
                result
            }
            Err(_) => {
                warn!(provider = %provider.name, timeout_ms, "Provider call timed out");
                Err(ProviderError::Timeout { timeout_ms })
            }
        }
    }
}

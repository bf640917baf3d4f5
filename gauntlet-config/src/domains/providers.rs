//! Provider endpoint configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, validate_url, Validatable};
use serde::{Deserialize, Serialize};

/// One provider/model pair under test
///
/// The API key is never stored here. `api_key_ref` names a secret that is
/// resolved at call time by the HTTP layer's secret resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name used in reports (e.g. `openai`)
    pub name: String,

    /// Model identifier sent in the request body and used for pricing
    pub model: String,

    /// Base URL; requests go to `{base_url}/v1/chat/completions`
    pub base_url: String,

    /// Hard per-request timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retry count configured for the provider. The engine records it in
    /// reports but never retries: a failed request is a data point.
    #[serde(default)]
    pub max_retries: u32,

    /// Reference to the API key in the external secret source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_ref: Option<String>,
}

impl ProviderConfig {
    /// Create a provider config with default timeout and no credentials
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            base_url: base_url.into(),
            timeout_ms: default_timeout_ms(),
            max_retries: 0,
            api_key_ref: None,
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the API key reference
    pub fn with_api_key_ref(mut self, reference: impl Into<String>) -> Self {
        self.api_key_ref = Some(reference.into());
        self
    }

    /// Chat completions endpoint for this provider
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl Validatable for ProviderConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.name, "name", self.domain_name())?;
        validate_required_string(&self.model, "model", self.domain_name())?;
        validate_url(&self.base_url, "base_url", self.domain_name())?;
        validate_positive(self.timeout_ms, "timeout_ms", self.domain_name())?;

        if let Some(ref reference) = self.api_key_ref {
            validate_required_string(reference, "api_key_ref", self.domain_name())?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "providers"
    }
}

fn default_timeout_ms() -> u64 {
    30_000
}

//! API key resolution
//!
//! Provider configs only carry a reference to their key. The key itself is
//! resolved right before each call and never stored by the engine.

use std::collections::HashMap;

use crate::errors::ProviderError;

/// Resolves an API key reference into a bearer token
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, reference: &str) -> Result<String, ProviderError>;
}

/// Reads keys from environment variables named by the reference
#[derive(Debug, Clone, Default)]
pub struct EnvSecretResolver;

impl SecretResolver for EnvSecretResolver {
    fn resolve(&self, reference: &str) -> Result<String, ProviderError> {
        match std::env::var(reference) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ProviderError::MissingCredentials(reference.to_string())),
        }
    }
}

/// Fixed map of references to keys, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct StaticSecretResolver {
    secrets: HashMap<String, String>,
}

impl StaticSecretResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, reference: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(reference.into(), value.into());
        self
    }
}

impl SecretResolver for StaticSecretResolver {
    fn resolve(&self, reference: &str) -> Result<String, ProviderError> {
        self.secrets
            .get(reference)
            .cloned()
            .ok_or_else(|| ProviderError::MissingCredentials(reference.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_resolver() {
        temp_env::with_var("GAUNTLET_TEST_KEY", Some("sk-test"), || {
            assert_eq!(EnvSecretResolver.resolve("GAUNTLET_TEST_KEY").unwrap(), "sk-test");
        });
        temp_env::with_var("GAUNTLET_EMPTY_KEY", Some("  "), || {
            assert!(EnvSecretResolver.resolve("GAUNTLET_EMPTY_KEY").is_err());
        });
    }

    #[test]
    fn test_static_resolver() {
        let resolver = StaticSecretResolver::new().with_secret("openai", "sk-123");
        assert_eq!(resolver.resolve("openai").unwrap(), "sk-123");
        assert_eq!(
            resolver.resolve("anthropic"),
            Err(ProviderError::MissingCredentials("anthropic".to_string()))
        );
    }
}

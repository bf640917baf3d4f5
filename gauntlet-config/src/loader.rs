//! Configuration loading and environment variable handling

use crate::domains::GauntletConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "GAUNTLET".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML or JSON file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<GauntletConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        debug!(path = %path.display(), json = is_json, "Loading configuration file");

        let config: GauntletConfig = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        self.finish(config)
    }

    /// Load configuration from a YAML string with environment overrides
    pub fn from_yaml_str(&self, content: &str) -> ConfigResult<GauntletConfig> {
        let config: GauntletConfig = serde_yaml::from_str(content)?;
        self.finish(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<GauntletConfig> {
        self.finish(GauntletConfig::default())
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<GauntletConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    fn finish(&self, mut config: GauntletConfig) -> ConfigResult<GauntletConfig> {
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut GauntletConfig) -> ConfigResult<()> {
        self.apply_execution_overrides(&mut config.execution)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Apply run budget overrides
    fn apply_execution_overrides(
        &self,
        config: &mut crate::domains::execution::ExecutionConfig,
    ) -> ConfigResult<()> {
        if let Some(value) = self.parse_env::<u64>("MAX_TOTAL_DURATION_MS")? {
            config.max_total_duration_ms = value;
        }

        if let Some(value) = self.parse_env::<u64>("MAX_TOTAL_REQUESTS")? {
            config.max_total_requests = value;
        }

        if let Some(value) = self.parse_env::<f64>("MAX_TOTAL_COST_USD")? {
            config.max_total_cost_usd = Some(value);
        }

        if let Some(value) = self.parse_env::<bool>("STOP_ON_CRITICAL_FAILURE")? {
            config.stop_on_critical_failure = value;
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    fn parse_env<T>(&self, name: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_env_var(name) {
            Ok(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::EnvError(format!("Invalid {}: {}", name, e))),
            Err(_) => Ok(None),
        }
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::logging::LogLevel;
    use crate::domains::scenarios::TestType;
    use std::io::Write;

    const SAMPLE: &str = r#"
execution:
  max_total_requests: 200
  stop_on_critical_failure: true
providers:
  - name: local
    model: llama3
    base_url: http://localhost:8000
    timeout_ms: 5000
scenarios:
  - scenario_id: ramp
    test_type: load_ramp
    max_concurrency: 10
  - scenario_id: junk
    test_type: malformed_request
"#;

    #[test]
    fn test_load_yaml_string() {
        let config = temp_env::with_vars_unset(
            ["TESTCFG_MAX_TOTAL_REQUESTS", "TESTCFG_LOG_LEVEL"],
            || ConfigLoader::with_prefix("TESTCFG").from_yaml_str(SAMPLE),
        )
        .unwrap();
        assert_eq!(config.execution.max_total_requests, 200);
        assert!(config.execution.stop_on_critical_failure);
        assert_eq!(config.providers[0].timeout_ms, 5000);
        assert_eq!(config.scenarios.len(), 2);
        assert_eq!(config.scenarios[1].test_type(), TestType::MalformedRequest);
    }

    #[test]
    fn test_env_overrides() {
        temp_env::with_vars(
            [
                ("ENVCFG_MAX_TOTAL_REQUESTS", Some("42")),
                ("ENVCFG_MAX_TOTAL_COST_USD", Some("2.5")),
                ("ENVCFG_LOG_LEVEL", Some("debug")),
            ],
            || {
                let config = ConfigLoader::with_prefix("ENVCFG").from_env().unwrap();
                assert_eq!(config.execution.max_total_requests, 42);
                assert_eq!(config.execution.max_total_cost_usd, Some(2.5));
                assert_eq!(config.logging.level, LogLevel::Debug);
            },
        );
    }

    #[test]
    fn test_invalid_env_override() {
        temp_env::with_var("BADCFG_MAX_TOTAL_REQUESTS", Some("lots"), || {
            let result = ConfigLoader::with_prefix("BADCFG").from_env();
            assert!(matches!(result, Err(ConfigError::EnvError(_))));
        });
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"execution": {{"max_total_requests": 7}}, "scenarios": [{{"scenario_id": "a", "test_type": "token_limit", "token_limits": [10, 20]}}]}}"#
        )
        .unwrap();

        let config = ConfigLoader::with_prefix("JSONCFG")
            .from_file(file.path())
            .unwrap();
        assert_eq!(config.execution.max_total_requests, 7);
        assert_eq!(config.scenarios[0].test_type(), TestType::TokenLimit);
    }

    #[test]
    fn test_validation_runs_after_load() {
        let result = ConfigLoader::with_prefix("VALCFG")
            .from_yaml_str("execution:\n  max_total_requests: 0\n");
        assert!(result.is_err());
    }
}

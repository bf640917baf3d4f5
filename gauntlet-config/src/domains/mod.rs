//! Domain-specific configuration modules

pub mod execution;
pub mod http;
pub mod logging;
pub mod output;
pub mod pricing;
pub mod providers;
pub mod scenarios;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Main gauntlet configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GauntletConfig {
    /// Global run budgets and sampling
    #[serde(default)]
    pub execution: execution::ExecutionConfig,

    /// Providers under test
    #[serde(default)]
    pub providers: Vec<providers::ProviderConfig>,

    /// Provider transport settings
    #[serde(default)]
    pub http: http::HttpConfig,

    /// Per-model token prices
    #[serde(default)]
    pub pricing: pricing::PriceTable,

    /// Stress scenarios, run against every provider in order
    #[serde(default)]
    pub scenarios: Vec<scenarios::Scenario>,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,

    /// Report sinks
    #[serde(default)]
    pub output: output::OutputConfig,
}

impl GauntletConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.execution.validate()?;
        self.http.validate()?;
        self.pricing.validate()?;
        self.logging.validate()?;
        self.output.validate()?;

        for provider in &self.providers {
            provider.validate()?;
        }

        let mut seen = HashSet::new();
        for scenario in &self.scenarios {
            scenario.validate()?;
            if !seen.insert(scenario.scenario_id.as_str()) {
                return Err(scenario.validation_error(format!(
                    "duplicate scenario_id '{}'",
                    scenario.scenario_id
                )));
            }
        }

        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = GauntletConfig {
            providers: vec![providers::ProviderConfig::new(
                "openai",
                "gpt-4o-mini",
                "https://api.openai.com",
            )
            .with_api_key_ref("OPENAI_API_KEY")],
            scenarios: vec![scenarios::Scenario::new(
                "load-ramp",
                scenarios::TestConfig::LoadRamp(scenarios::LoadRampConfig::default()),
            )],
            ..Default::default()
        };
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}

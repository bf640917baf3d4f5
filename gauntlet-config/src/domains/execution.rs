//! Run budget configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_range, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Global budgets and sampling policy for one stress run
///
/// Every budget is checked cooperatively before each unit of scheduled work
/// (batch, step or level); none of them preempts an in-flight request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Wall-clock budget for the whole run
    #[serde(default = "default_max_total_duration_ms")]
    pub max_total_duration_ms: u64,

    /// Maximum number of provider calls across the whole run
    #[serde(default = "default_max_total_requests")]
    pub max_total_requests: u64,

    /// Optional spend ceiling in USD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_cost_usd: Option<f64>,

    /// Halt the whole run once a scenario's success rate drops below 10%
    #[serde(default)]
    pub stop_on_critical_failure: bool,

    /// Attach a content excerpt to sampled successful results
    #[serde(default)]
    pub collect_response_samples: bool,

    /// Fraction of successful results to sample, 0..=1
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,
}

impl ExecutionConfig {
    /// Wall-clock budget as a [`Duration`]
    pub fn max_total_duration(&self) -> Duration {
        Duration::from_millis(self.max_total_duration_ms)
    }

    /// Set the request budget
    pub fn with_max_requests(mut self, max_total_requests: u64) -> Self {
        self.max_total_requests = max_total_requests;
        self
    }

    /// Set the duration budget
    pub fn with_max_duration_ms(mut self, max_total_duration_ms: u64) -> Self {
        self.max_total_duration_ms = max_total_duration_ms;
        self
    }

    /// Set the cost budget
    pub fn with_max_cost_usd(mut self, max_total_cost_usd: f64) -> Self {
        self.max_total_cost_usd = Some(max_total_cost_usd);
        self
    }

    /// Enable the critical failure stop
    pub fn with_stop_on_critical_failure(mut self, enabled: bool) -> Self {
        self.stop_on_critical_failure = enabled;
        self
    }

    /// Enable response sampling at the given rate
    pub fn with_response_samples(mut self, sample_rate: f64) -> Self {
        self.collect_response_samples = true;
        self.sample_rate = sample_rate;
        self
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_total_duration_ms: default_max_total_duration_ms(),
            max_total_requests: default_max_total_requests(),
            max_total_cost_usd: None,
            stop_on_critical_failure: false,
            collect_response_samples: false,
            sample_rate: default_sample_rate(),
        }
    }
}

impl Validatable for ExecutionConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(
            self.max_total_duration_ms,
            "max_total_duration_ms",
            self.domain_name(),
        )?;

        validate_positive(
            self.max_total_requests,
            "max_total_requests",
            self.domain_name(),
        )?;

        if let Some(cost) = self.max_total_cost_usd {
            if cost.is_nan() || cost < 0.0 {
                return Err(self.validation_error(format!(
                    "max_total_cost_usd must be non-negative, got {}",
                    cost
                )));
            }
        }

        validate_range(self.sample_rate, 0.0, 1.0, "sample_rate", self.domain_name())?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "execution"
    }
}

// Default value functions
fn default_max_total_duration_ms() -> u64 {
    30 * 60 * 1000 // 30 minutes
}

fn default_max_total_requests() -> u64 {
    10_000
}

fn default_sample_rate() -> f64 {
    0.1
}

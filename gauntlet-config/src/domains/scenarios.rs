//! Stress scenario definitions
//!
//! A scenario is one configured stress test. The test-type specific
//! parameters live in [`TestConfig`], a closed enum tagged by `test_type`,
//! so every executor is selected by an exhaustive match.

use crate::error::ConfigResult;
use crate::validation::{validate_non_empty, validate_positive, validate_range, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The ten stress test types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    LoadRamp,
    Spike,
    Soak,
    ExtremeInput,
    Adversarial,
    RateLimitProbe,
    TimeoutBoundary,
    TokenLimit,
    ContextOverflow,
    MalformedRequest,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::LoadRamp => "load_ramp",
            TestType::Spike => "spike",
            TestType::Soak => "soak",
            TestType::ExtremeInput => "extreme_input",
            TestType::Adversarial => "adversarial",
            TestType::RateLimitProbe => "rate_limit_probe",
            TestType::TimeoutBoundary => "timeout_boundary",
            TestType::TokenLimit => "token_limit",
            TestType::ContextOverflow => "context_overflow",
            TestType::MalformedRequest => "malformed_request",
        }
    }

    pub fn all() -> &'static [TestType] {
        &[
            TestType::LoadRamp,
            TestType::Spike,
            TestType::Soak,
            TestType::ExtremeInput,
            TestType::Adversarial,
            TestType::RateLimitProbe,
            TestType::TimeoutBoundary,
            TestType::TokenLimit,
            TestType::ContextOverflow,
            TestType::MalformedRequest,
        ]
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TestType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Invalid test type: {}", s))
    }
}

/// Character classes used to build oversized inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterType {
    Ascii,
    Unicode,
    Emoji,
    Special,
    Mixed,
}

impl CharacterType {
    pub fn all() -> Vec<CharacterType> {
        vec![
            CharacterType::Ascii,
            CharacterType::Unicode,
            CharacterType::Emoji,
            CharacterType::Special,
            CharacterType::Mixed,
        ]
    }
}

/// Adversarial payload categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    RepeatedTokens,
    NestedStructures,
    UnicodeBidi,
    PromptInjection,
    ControlCharacters,
    LongWords,
    Homoglyphs,
    ZeroWidth,
}

impl AttackType {
    pub fn all() -> Vec<AttackType> {
        vec![
            AttackType::RepeatedTokens,
            AttackType::NestedStructures,
            AttackType::UnicodeBidi,
            AttackType::PromptInjection,
            AttackType::ControlCharacters,
            AttackType::LongWords,
            AttackType::Homoglyphs,
            AttackType::ZeroWidth,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttackType::RepeatedTokens => "repeated_tokens",
            AttackType::NestedStructures => "nested_structures",
            AttackType::UnicodeBidi => "unicode_bidi",
            AttackType::PromptInjection => "prompt_injection",
            AttackType::ControlCharacters => "control_characters",
            AttackType::LongWords => "long_words",
            AttackType::Homoglyphs => "homoglyphs",
            AttackType::ZeroWidth => "zero_width",
        }
    }
}

/// Step concurrency up until the provider breaks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadRampConfig {
    pub initial_concurrency: usize,
    pub max_concurrency: usize,
    pub step_size: usize,
    pub requests_per_step: usize,
    /// Pause between steps
    pub step_delay_ms: u64,
}

impl Default for LoadRampConfig {
    fn default() -> Self {
        Self {
            initial_concurrency: 1,
            max_concurrency: 50,
            step_size: 5,
            requests_per_step: 10,
            step_delay_ms: 1000,
        }
    }
}

/// Baseline, burst, then fixed-window recovery observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeConfig {
    /// Requests issued before the burst; 0 skips the baseline phase
    pub baseline_requests: usize,
    pub baseline_concurrency: usize,
    pub spike_concurrency: usize,
    pub spike_duration_ms: u64,
    pub recovery_observation_ms: u64,
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            baseline_requests: 5,
            baseline_concurrency: 1,
            spike_concurrency: 50,
            spike_duration_ms: 10_000,
            recovery_observation_ms: 10_000,
        }
    }
}

/// Fixed concurrency sustained over a long window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoakConfig {
    pub concurrency: usize,
    pub duration_ms: u64,
    pub request_interval_ms: u64,
}

impl Default for SoakConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            duration_ms: 60_000,
            request_interval_ms: 1000,
        }
    }
}

/// Oversized inputs across character classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtremeInputConfig {
    /// Input sizes in characters
    pub input_sizes: Vec<usize>,
    pub character_types: Vec<CharacterType>,
}

impl Default for ExtremeInputConfig {
    fn default() -> Self {
        Self {
            input_sizes: vec![1_000, 10_000, 50_000, 100_000],
            character_types: CharacterType::all(),
        }
    }
}

/// Categorised hostile payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdversarialConfig {
    pub attack_types: Vec<AttackType>,
    pub samples_per_type: usize,
}

impl Default for AdversarialConfig {
    fn default() -> Self {
        Self {
            attack_types: AttackType::all(),
            samples_per_type: 3,
        }
    }
}

/// Increasing request rates until throttled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitProbeConfig {
    pub start_rps: u32,
    pub max_rps: u32,
    pub rps_step: u32,
    pub requests_per_level: usize,
    /// Stop at the first `rate_limited` failure
    pub detect_throttling: bool,
}

impl Default for RateLimitProbeConfig {
    fn default() -> Self {
        Self {
            start_rps: 1,
            max_rps: 20,
            rps_step: 2,
            requests_per_level: 10,
            detect_throttling: true,
        }
    }
}

/// Sweep of per-request timeouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutBoundaryConfig {
    pub timeouts_ms: Vec<u64>,
}

impl Default for TimeoutBoundaryConfig {
    fn default() -> Self {
        Self {
            timeouts_ms: vec![1_000, 5_000, 10_000, 30_000, 60_000],
        }
    }
}

/// Sweep of `max_tokens` values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenLimitConfig {
    pub token_limits: Vec<u32>,
}

impl Default for TokenLimitConfig {
    fn default() -> Self {
        Self {
            token_limits: vec![100, 500, 1_000, 2_000, 4_000, 8_000],
        }
    }
}

/// Sweep of prompt sizes until the context window overflows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextOverflowConfig {
    /// Approximate prompt sizes in tokens
    pub input_sizes: Vec<usize>,
}

impl Default for ContextOverflowConfig {
    fn default() -> Self {
        Self {
            input_sizes: vec![1_000, 4_000, 8_000, 16_000, 32_000, 64_000, 128_000],
        }
    }
}

/// Test-type specific parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "test_type", rename_all = "snake_case")]
pub enum TestConfig {
    LoadRamp(LoadRampConfig),
    Spike(SpikeConfig),
    Soak(SoakConfig),
    ExtremeInput(ExtremeInputConfig),
    Adversarial(AdversarialConfig),
    RateLimitProbe(RateLimitProbeConfig),
    TimeoutBoundary(TimeoutBoundaryConfig),
    TokenLimit(TokenLimitConfig),
    ContextOverflow(ContextOverflowConfig),
    MalformedRequest,
}

impl TestConfig {
    pub fn test_type(&self) -> TestType {
        match self {
            TestConfig::LoadRamp(_) => TestType::LoadRamp,
            TestConfig::Spike(_) => TestType::Spike,
            TestConfig::Soak(_) => TestType::Soak,
            TestConfig::ExtremeInput(_) => TestType::ExtremeInput,
            TestConfig::Adversarial(_) => TestType::Adversarial,
            TestConfig::RateLimitProbe(_) => TestType::RateLimitProbe,
            TestConfig::TimeoutBoundary(_) => TestType::TimeoutBoundary,
            TestConfig::TokenLimit(_) => TestType::TokenLimit,
            TestConfig::ContextOverflow(_) => TestType::ContextOverflow,
            TestConfig::MalformedRequest => TestType::MalformedRequest,
        }
    }
}

/// One configured stress test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub scenario_id: String,

    #[serde(flatten)]
    pub config: TestConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Pass threshold on p95 latency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_max_latency_ms: Option<u64>,

    /// Pass threshold on success rate, 0..=1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_min_success_rate: Option<f64>,
}

impl Scenario {
    pub fn new(scenario_id: impl Into<String>, config: TestConfig) -> Self {
        Self {
            scenario_id: scenario_id.into(),
            config,
            base_prompt: None,
            system_prompt: None,
            expected_max_latency_ms: None,
            expected_min_success_rate: None,
        }
    }

    pub fn test_type(&self) -> TestType {
        self.config.test_type()
    }

    pub fn with_base_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.base_prompt = Some(prompt.into());
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_expected_max_latency_ms(mut self, latency_ms: u64) -> Self {
        self.expected_max_latency_ms = Some(latency_ms);
        self
    }

    pub fn with_expected_min_success_rate(mut self, rate: f64) -> Self {
        self.expected_min_success_rate = Some(rate);
        self
    }
}

impl Validatable for Scenario {
    fn validate(&self) -> ConfigResult<()> {
        let domain = self.domain_name();

        if self.scenario_id.trim().is_empty() {
            return Err(self.validation_error("scenario_id cannot be empty"));
        }

        if let Some(rate) = self.expected_min_success_rate {
            validate_range(rate, 0.0, 1.0, "expected_min_success_rate", domain)?;
        }

        match &self.config {
            TestConfig::LoadRamp(c) => {
                validate_positive(c.initial_concurrency, "initial_concurrency", domain)?;
                validate_positive(c.step_size, "step_size", domain)?;
                validate_positive(c.requests_per_step, "requests_per_step", domain)?;
                if c.max_concurrency < c.initial_concurrency {
                    return Err(self.validation_error(format!(
                        "max_concurrency ({}) must be >= initial_concurrency ({})",
                        c.max_concurrency, c.initial_concurrency
                    )));
                }
            }
            TestConfig::Spike(c) => {
                validate_positive(c.spike_concurrency, "spike_concurrency", domain)?;
                validate_positive(c.spike_duration_ms, "spike_duration_ms", domain)?;
                if c.baseline_requests > 0 {
                    validate_positive(c.baseline_concurrency, "baseline_concurrency", domain)?;
                }
            }
            TestConfig::Soak(c) => {
                validate_positive(c.concurrency, "concurrency", domain)?;
                validate_positive(c.duration_ms, "duration_ms", domain)?;
                validate_positive(c.request_interval_ms, "request_interval_ms", domain)?;
            }
            TestConfig::ExtremeInput(c) => {
                validate_non_empty(&c.input_sizes, "input_sizes", domain)?;
                validate_non_empty(&c.character_types, "character_types", domain)?;
            }
            TestConfig::Adversarial(c) => {
                validate_non_empty(&c.attack_types, "attack_types", domain)?;
                validate_positive(c.samples_per_type, "samples_per_type", domain)?;
            }
            TestConfig::RateLimitProbe(c) => {
                validate_positive(c.start_rps, "start_rps", domain)?;
                validate_positive(c.rps_step, "rps_step", domain)?;
                validate_positive(c.requests_per_level, "requests_per_level", domain)?;
                if c.max_rps < c.start_rps {
                    return Err(self.validation_error(format!(
                        "max_rps ({}) must be >= start_rps ({})",
                        c.max_rps, c.start_rps
                    )));
                }
            }
            TestConfig::TimeoutBoundary(c) => {
                validate_non_empty(&c.timeouts_ms, "timeouts_ms", domain)?;
                if c.timeouts_ms.contains(&0) {
                    return Err(self.validation_error("timeouts_ms entries must be > 0"));
                }
            }
            TestConfig::TokenLimit(c) => {
                validate_non_empty(&c.token_limits, "token_limits", domain)?;
            }
            TestConfig::ContextOverflow(c) => {
                validate_non_empty(&c.input_sizes, "input_sizes", domain)?;
            }
            TestConfig::MalformedRequest => {}
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "scenarios"
    }
}

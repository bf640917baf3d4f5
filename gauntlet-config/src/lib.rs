//! Domain-driven configuration for the gauntlet stress engine
//!
//! Configuration is split by functional domain (run budgets, providers,
//! pricing, scenarios, logging and report output). Every domain validates
//! itself and the [`ConfigLoader`] layers `GAUNTLET_*` environment overrides
//! on top of a YAML or JSON file.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;

// Re-export domain configurations
pub use domains::{
    execution::ExecutionConfig,
    http::HttpConfig,
    logging::{LogFormat, LogLevel, LogTarget, LoggingConfig},
    output::{OutputConfig, ReportFormat, SinkConfig, StdioMode},
    pricing::{ModelPrice, PriceTable},
    providers::ProviderConfig,
    scenarios::{
        AdversarialConfig, AttackType, CharacterType, ContextOverflowConfig, ExtremeInputConfig,
        LoadRampConfig, RateLimitProbeConfig, Scenario, SoakConfig, SpikeConfig, TestConfig,
        TestType, TimeoutBoundaryConfig, TokenLimitConfig,
    },
    GauntletConfig,
};

//! Core data model for gauntlet
//!
//! Everything a stress run produces: per-request results, per-scenario
//! aggregates with breaking points and recovery metrics, per-provider
//! robustness summaries and the final report handed to result sinks.

pub mod error;
pub mod failure;
pub mod report;
pub mod results;

pub use error::{GauntletError, Result};
pub use failure::{Constraint, FailureMode};
pub use report::{DegradationSeverity, ProviderRobustnessSummary, StressTestReport};
pub use results::{
    BreakingMetric, BreakingPoint, DegradationPattern, LatencyStats, RequestOutcome,
    ScenarioResult, StressRequestResult,
};

// Scenario identity types come from the configuration domain
pub use gauntlet_config::TestType;

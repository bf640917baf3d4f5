//! Gauntlet stress execution engine
//!
//! Drives bounded concurrent request campaigns against chat-completions
//! providers, classifies every failure, finds the level at which a provider
//! breaks and rolls the results up into a [`StressTestReport`].
//!
//! The [`Orchestrator`] is the entry point. It walks providers × scenarios,
//! dispatches each scenario to its executor in [`scenarios`], which plans
//! requests and hands them to the batch runner in [`batch`]. Results flow
//! back through [`classifier`] and [`statistics`] and are augmented by
//! [`analysis`] and [`recovery`].
//!
//! [`StressTestReport`]: gauntlet_core::StressTestReport

pub mod analysis;
pub mod batch;
pub mod classifier;
pub mod orchestrator;
pub mod payloads;
pub mod recovery;
pub mod run_state;
pub mod scenarios;
pub mod statistics;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export main types
pub use analysis::{find_breaking_point, level_failure_rates, LevelFailureRate};
pub use batch::PlannedRequest;
pub use classifier::{classify, classify_error};
pub use orchestrator::Orchestrator;
pub use recovery::{analyze_recovery, robustness_score, summarize_provider, RecoveryMetrics};
pub use run_state::RunState;
pub use scenarios::{ScenarioContext, ScenarioRun};
pub use statistics::{latency_stats, percentile};

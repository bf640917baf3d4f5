//! Scenario type executors
//!
//! One executor per [`TestConfig`] variant. Each plans its own request
//! schedule and hands the requests to the [`ScenarioContext`], which owns the
//! batch runner, the budget checkpoint and the collected results.

pub mod adversarial;
pub mod extreme_input;
pub mod load_ramp;
pub mod malformed;
pub mod rate_limit;
pub mod soak;
pub mod spike;
pub mod sweeps;

use std::time::Duration;

use gauntlet_config::{ExecutionConfig, ProviderConfig, Scenario, TestConfig};
use gauntlet_core::{Constraint, FailureMode, StressRequestResult};
use gauntlet_http::ProviderClient;
use tracing::info;

use crate::batch::{BatchExecutor, BatchOutcome, PlannedRequest};
use crate::payloads::DEFAULT_PROMPT;
use crate::run_state::RunState;

/// Everything one executor produced
#[derive(Debug, Default)]
pub struct ScenarioRun {
    pub results: Vec<StressRequestResult>,
    pub stopped_by: Option<Constraint>,
}

/// Execution state for one (provider, scenario) pair
pub struct ScenarioContext<'a> {
    pub provider: &'a ProviderConfig,
    pub scenario: &'a Scenario,
    executor: BatchExecutor<'a>,
    execution: &'a ExecutionConfig,
    run_state: &'a RunState,
    run: ScenarioRun,
}

impl<'a> ScenarioContext<'a> {
    pub fn new(
        client: &'a dyn ProviderClient,
        provider: &'a ProviderConfig,
        scenario: &'a Scenario,
        execution: &'a ExecutionConfig,
        run_state: &'a RunState,
    ) -> Self {
        Self {
            provider,
            scenario,
            executor: BatchExecutor::new(client, provider, scenario, execution, run_state),
            execution,
            run_state,
            run: ScenarioRun::default(),
        }
    }

    /// The scenario's `base_prompt` or the default prompt
    pub fn base_prompt(&self) -> &'a str {
        self.scenario.base_prompt.as_deref().unwrap_or(DEFAULT_PROMPT)
    }

    /// Budget checkpoint run before each step, level or sweep value
    ///
    /// Returns `false` once a budget is exhausted or an earlier batch was cut
    /// short; the executor must then stop scheduling work.
    pub fn checkpoint(&mut self) -> bool {
        if self.run.stopped_by.is_some() {
            return false;
        }
        match self.run_state.check_budget(self.execution) {
            Some(constraint) => {
                info!(
                    provider = %self.provider.name,
                    scenario_id = %self.scenario.scenario_id,
                    %constraint,
                    "Budget exhausted, stopping scenario"
                );
                self.run.stopped_by = Some(constraint);
                false
            }
            None => true,
        }
    }

    /// Run requests with bounded concurrency; returns the new results
    pub async fn run_batched(
        &mut self,
        requests: Vec<PlannedRequest>,
        concurrency: usize,
    ) -> &[StressRequestResult] {
        let outcome = self.executor.execute(requests, concurrency, concurrency).await;
        self.absorb(outcome)
    }

    /// Run one request on its own, recorded at concurrency 1
    pub async fn run_single(&mut self, request: PlannedRequest) -> &[StressRequestResult] {
        self.run_batched(vec![request], 1).await
    }

    /// Run one paced level; `level` is recorded as the concurrency level
    pub async fn run_paced(
        &mut self,
        requests: Vec<PlannedRequest>,
        interval: Duration,
        level: usize,
    ) -> &[StressRequestResult] {
        let outcome = self.executor.execute_paced(requests, interval, level).await;
        self.absorb(outcome)
    }

    fn absorb(&mut self, outcome: BatchOutcome) -> &[StressRequestResult] {
        if self.run.stopped_by.is_none() {
            self.run.stopped_by = outcome.stopped_by;
        }
        let start = self.run.results.len();
        self.run.results.extend(outcome.results);
        &self.run.results[start..]
    }

    pub fn finish(self) -> ScenarioRun {
        self.run
    }
}

/// Success rate of a slice of results; 0 when empty
pub fn success_rate(results: &[StressRequestResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().filter(|r| r.is_success()).count() as f64 / results.len() as f64
}

pub fn any_failed_with(results: &[StressRequestResult], mode: FailureMode) -> bool {
    results.iter().any(|r| r.failure_mode() == Some(mode))
}

/// `count` copies of the same prompt
pub fn repeated(prompt: &str, count: usize, label: Option<&str>) -> Vec<PlannedRequest> {
    (0..count)
        .map(|_| {
            let request = PlannedRequest::new(prompt);
            match label {
                Some(label) => request.with_label(label),
                None => request,
            }
        })
        .collect()
}

/// `initial, initial + step, ...` with the last level clamped to `max`
pub fn stepped_levels(initial: usize, max: usize, step: usize) -> Vec<usize> {
    if initial >= max {
        return vec![initial];
    }
    let mut levels = Vec::new();
    let mut level = initial;
    while level < max {
        levels.push(level);
        level += step.max(1);
    }
    levels.push(max);
    levels
}

/// Dispatch a scenario to its executor
pub async fn execute(ctx: &mut ScenarioContext<'_>) {
    let scenario = ctx.scenario;
    match &scenario.config {
        TestConfig::LoadRamp(config) => load_ramp::run(ctx, config).await,
        TestConfig::Spike(config) => spike::run(ctx, config).await,
        TestConfig::Soak(config) => soak::run(ctx, config).await,
        TestConfig::ExtremeInput(config) => extreme_input::run(ctx, config).await,
        TestConfig::Adversarial(config) => adversarial::run(ctx, config).await,
        TestConfig::RateLimitProbe(config) => rate_limit::run(ctx, config).await,
        TestConfig::TimeoutBoundary(config) => sweeps::run_timeout_boundary(ctx, config).await,
        TestConfig::TokenLimit(config) => sweeps::run_token_limit(ctx, config).await,
        TestConfig::ContextOverflow(config) => sweeps::run_context_overflow(ctx, config).await,
        TestConfig::MalformedRequest => malformed::run(ctx).await,
    }
}

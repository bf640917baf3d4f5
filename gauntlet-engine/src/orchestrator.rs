//! Run orchestration across providers and scenarios

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use gauntlet_config::{ExecutionConfig, GauntletConfig, ProviderConfig, Scenario, Validatable};
use gauntlet_core::{
    Constraint, FailureMode, GauntletError, Result, ScenarioResult, StressTestReport,
};
use gauntlet_http::{HttpClientConfig, HttpProviderClient, ProviderClient};
use gauntlet_output::SinkManager;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::{breaking_metric_for, find_breaking_point};
use crate::recovery::{analyze_recovery, summarize_provider, tracks_recovery};
use crate::run_state::RunState;
use crate::scenarios::{self, ScenarioContext, ScenarioRun};
use crate::statistics::latency_stats;

/// Scenario success rate below which a critical stop fires
pub const CRITICAL_SUCCESS_RATE: f64 = 0.1;

/// Drives providers × scenarios under one set of run budgets
pub struct Orchestrator {
    client: Arc<dyn ProviderClient>,
    sinks: SinkManager,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("sinks", &self.sinks)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(client: Arc<dyn ProviderClient>) -> Self {
        Self {
            client,
            sinks: SinkManager::new(),
        }
    }

    /// Replace the report sinks
    pub fn with_sinks(mut self, sinks: SinkManager) -> Self {
        self.sinks = sinks;
        self
    }

    pub fn sinks(&self) -> &SinkManager {
        &self.sinks
    }

    /// HTTP client plus the configured report sinks
    pub fn from_config(config: &GauntletConfig) -> Result<Self> {
        let client = HttpProviderClient::new(
            HttpClientConfig::from(&config.http),
            config.pricing.clone(),
        )
        .map_err(|e| GauntletError::InvalidRun(format!("provider client: {}", e)))?;
        let sinks = SinkManager::from_config(&config.output)
            .map_err(|e| GauntletError::InvalidRun(format!("report sinks: {}", e)))?;

        Ok(Self::new(Arc::new(client)).with_sinks(sinks))
    }

    /// Run everything a loaded configuration describes
    pub async fn run_config(&self, config: &GauntletConfig) -> Result<StressTestReport> {
        self.run(&config.providers, &config.scenarios, &config.execution)
            .await
    }

    /// Synchronous entry point on a dedicated multi-thread runtime
    ///
    /// Called from inside a tokio runtime this returns
    /// [`GauntletError::Runtime`]; use [`Orchestrator::run`] there.
    pub fn run_blocking(
        &self,
        providers: &[ProviderConfig],
        scenarios: &[Scenario],
        execution: &ExecutionConfig,
    ) -> Result<StressTestReport> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(GauntletError::Runtime(
                "run_blocking called from within an async runtime".to_string(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| GauntletError::Runtime(e.to_string()))?;
        runtime.block_on(self.run(providers, scenarios, execution))
    }

    /// Run every scenario against every provider, in order
    ///
    /// Budgets are checked before each scenario. A scenario cut short by a
    /// budget, or a critical stop, ends the whole run; the report is still
    /// built from whatever completed and handed to the sinks.
    pub async fn run(
        &self,
        providers: &[ProviderConfig],
        scenarios: &[Scenario],
        execution: &ExecutionConfig,
    ) -> Result<StressTestReport> {
        validate_run(providers, scenarios, execution)?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let run_state = RunState::new();
        let mut scenario_results = Vec::new();

        info!(
            %run_id,
            providers = providers.len(),
            scenarios = scenarios.len(),
            max_total_requests = execution.max_total_requests,
            "Starting stress run"
        );

        'providers: for provider in providers {
            for scenario in scenarios {
                if let Some(constraint) = run_state.check_budget(execution) {
                    info!(%run_id, %constraint, "Run budget exhausted");
                    run_state.record_constraint(constraint);
                    break 'providers;
                }

                let result = self
                    .run_scenario(provider, scenario, execution, &run_state)
                    .await;

                let stopped_by = result.stopped_by;
                let critical = execution.stop_on_critical_failure
                    && result.total_requests > 0
                    && result.success_rate < CRITICAL_SUCCESS_RATE;
                scenario_results.push(result);

                if let Some(constraint) = stopped_by {
                    run_state.record_constraint(constraint);
                }
                if critical {
                    warn!(
                        %run_id,
                        provider = %provider.name,
                        scenario_id = %scenario.scenario_id,
                        "Critical failure, stopping run"
                    );
                    run_state.record_constraint(Constraint::CriticalFailureStop);
                }
                if stopped_by.is_some() || critical {
                    break 'providers;
                }
            }
        }

        let report = build_report(run_id, started_at, providers, scenario_results, &run_state);

        info!(
            %run_id,
            total_requests = report.total_requests,
            success_rate = report.overall_success_rate,
            total_cost_usd = report.total_cost_usd,
            duration_ms = report.total_duration_ms,
            "Stress run complete"
        );

        if !self.sinks.is_empty() {
            let failures = self
                .sinks
                .deliver_all(&report)
                .await
                .into_iter()
                .filter(|r| r.is_err())
                .count();
            if failures > 0 {
                warn!(%run_id, failures, "Some report sinks failed");
            }
        }

        Ok(report)
    }

    async fn run_scenario(
        &self,
        provider: &ProviderConfig,
        scenario: &Scenario,
        execution: &ExecutionConfig,
        run_state: &RunState,
    ) -> ScenarioResult {
        let started_at = Utc::now();
        let clock = tokio::time::Instant::now();

        info!(
            provider = %provider.name,
            scenario_id = %scenario.scenario_id,
            test_type = scenario.test_type().as_str(),
            "Starting scenario"
        );

        let mut ctx = ScenarioContext::new(
            self.client.as_ref(),
            provider,
            scenario,
            execution,
            run_state,
        );
        scenarios::execute(&mut ctx).await;
        let run = ctx.finish();

        let result = aggregate(
            provider,
            scenario,
            run,
            started_at,
            clock.elapsed().as_millis() as u64,
        );

        info!(
            provider = %provider.name,
            scenario_id = %scenario.scenario_id,
            requests = result.total_requests,
            success_rate = result.success_rate,
            breaking_points = result.breaking_points.len(),
            passed = result.passed,
            "Scenario complete"
        );

        result
    }
}

fn validate_run(
    providers: &[ProviderConfig],
    scenarios: &[Scenario],
    execution: &ExecutionConfig,
) -> Result<()> {
    if providers.is_empty() {
        return Err(GauntletError::InvalidRun("no providers configured".to_string()));
    }
    if scenarios.is_empty() {
        return Err(GauntletError::InvalidRun("no scenarios configured".to_string()));
    }

    execution.validate()?;
    // an unusable provider only fails its own requests
    for provider in providers {
        if let Err(e) = provider.validate() {
            warn!(
                provider = %provider.name,
                "Provider misconfigured, its requests will fail: {}",
                e
            );
        }
    }
    for scenario in scenarios {
        scenario.validate()?;
    }
    Ok(())
}

/// Build the immutable per-scenario aggregate
fn aggregate(
    provider: &ProviderConfig,
    scenario: &Scenario,
    run: ScenarioRun,
    started_at: DateTime<Utc>,
    duration_ms: u64,
) -> ScenarioResult {
    let requests = run.results;
    let test_type = scenario.test_type();

    let total_requests = requests.len() as u64;
    let successful_requests = requests.iter().filter(|r| r.is_success()).count() as u64;
    let failed_requests = total_requests - successful_requests;
    let success_rate = if total_requests == 0 {
        0.0
    } else {
        successful_requests as f64 / total_requests as f64
    };

    let mut failure_modes: BTreeMap<FailureMode, u64> = BTreeMap::new();
    for mode in requests.iter().filter_map(|r| r.failure_mode()) {
        *failure_modes.entry(mode).or_default() += 1;
    }

    let latency = latency_stats(requests.iter().filter_map(|r| r.latency_ms()));
    let requests_per_second = if duration_ms == 0 {
        0.0
    } else {
        total_requests as f64 * 1_000.0 / duration_ms as f64
    };
    let total_cost_usd = requests.iter().map(|r| r.cost_usd()).sum();

    let breaking_points = breaking_metric_for(test_type)
        .and_then(|metric| find_breaking_point(&requests, metric))
        .into_iter()
        .collect();

    let (recovery_time_ms, recovery_stability) = if tracks_recovery(test_type) {
        let metrics = analyze_recovery(&requests);
        (metrics.recovery_time_ms, Some(metrics.stability))
    } else {
        (None, None)
    };

    let passed = meets_expectations(scenario, success_rate, successful_requests, latency.p95);
    debug!(
        scenario_id = %scenario.scenario_id,
        ?failure_modes,
        p95 = latency.p95,
        "Aggregated scenario"
    );

    ScenarioResult {
        scenario_id: scenario.scenario_id.clone(),
        test_type,
        provider: provider.name.clone(),
        model: provider.model.clone(),
        started_at,
        completed_at: Utc::now(),
        duration_ms,
        total_requests,
        successful_requests,
        failed_requests,
        success_rate,
        failure_modes,
        latency,
        requests_per_second,
        total_cost_usd,
        breaking_points,
        recovery_time_ms,
        recovery_stability,
        passed,
        stopped_by: run.stopped_by,
        requests,
    }
}

/// Scenario thresholds; without any, one success is enough
fn meets_expectations(
    scenario: &Scenario,
    success_rate: f64,
    successful_requests: u64,
    p95_latency_ms: u64,
) -> bool {
    if scenario.expected_min_success_rate.is_none() && scenario.expected_max_latency_ms.is_none() {
        return successful_requests > 0;
    }
    let rate_ok = scenario
        .expected_min_success_rate
        .map_or(true, |min| success_rate >= min);
    // latency of nothing is not a pass
    let latency_ok = scenario
        .expected_max_latency_ms
        .map_or(true, |max| successful_requests > 0 && p95_latency_ms <= max);
    rate_ok && latency_ok
}

fn build_report(
    run_id: Uuid,
    started_at: DateTime<Utc>,
    providers: &[ProviderConfig],
    scenario_results: Vec<ScenarioResult>,
    run_state: &RunState,
) -> StressTestReport {
    let total_requests: u64 = scenario_results.iter().map(|r| r.total_requests).sum();
    let successful_requests: u64 = scenario_results.iter().map(|r| r.successful_requests).sum();
    let total_cost_usd = scenario_results.iter().map(|r| r.total_cost_usd).sum();

    let provider_summaries = providers
        .iter()
        .filter_map(|provider| {
            let results: Vec<&ScenarioResult> = scenario_results
                .iter()
                .filter(|r| r.provider == provider.name)
                .collect();
            (!results.is_empty())
                .then(|| summarize_provider(&provider.name, &provider.model, &results))
        })
        .collect();

    StressTestReport {
        run_id,
        started_at,
        completed_at: Utc::now(),
        total_duration_ms: run_state.elapsed().as_millis() as u64,
        total_requests,
        successful_requests,
        failed_requests: total_requests - successful_requests,
        overall_success_rate: if total_requests == 0 {
            0.0
        } else {
            successful_requests as f64 / total_requests as f64
        },
        total_cost_usd,
        scenario_results,
        provider_summaries,
        constraints_applied: run_state.constraints(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ok_response, overloaded, ScriptedProvider};
    use gauntlet_config::{LoadRampConfig, SoakConfig, TestConfig};
    use gauntlet_core::{BreakingMetric, DegradationPattern};
    use gauntlet_output::MemorySink;
    use std::collections::BTreeSet;

    fn provider(name: &str) -> ProviderConfig {
        ProviderConfig::new(name, "mock-model", "http://localhost:1")
    }

    fn ramp(requests_per_step: usize) -> Scenario {
        Scenario::new(
            "ramp",
            TestConfig::LoadRamp(LoadRampConfig {
                initial_concurrency: 1,
                max_concurrency: 10,
                step_size: 5,
                requests_per_step,
                step_delay_ms: 0,
            }),
        )
    }

    fn orchestrator(client: ScriptedProvider) -> (Orchestrator, Arc<ScriptedProvider>) {
        let client = Arc::new(client);
        (Orchestrator::new(client.clone()), client)
    }

    #[tokio::test]
    async fn test_ramp_breaks_where_the_provider_collapses() {
        // third step onwards fails
        let (orchestrator, _) = orchestrator(ScriptedProvider::new(|call| {
            if call.call_index >= 8 {
                Err(overloaded())
            } else {
                Ok(ok_response("ok"))
            }
        }));

        let report = orchestrator
            .run(&[provider("mock")], &[ramp(4)], &ExecutionConfig::default())
            .await
            .unwrap();

        let result = &report.scenario_results[0];
        let levels: BTreeSet<usize> = result.requests.iter().map(|r| r.concurrency_level).collect();
        assert_eq!(levels, BTreeSet::from([1, 6, 10]));
        assert_eq!(result.total_requests, 12);
        assert_eq!(result.failure_modes.get(&FailureMode::ServerError), Some(&4));

        assert_eq!(result.breaking_points.len(), 1);
        let point = &result.breaking_points[0];
        assert_eq!(point.metric, BreakingMetric::Concurrency);
        assert_eq!(point.threshold_value, 10);
        assert_eq!(point.degradation_pattern, DegradationPattern::Cliff);

        let summary = report.summary_for("mock").unwrap();
        assert_eq!(summary.max_sustainable_concurrency, Some(6));
        assert_eq!(summary.breaking_points_found, 1);
        assert_eq!(summary.most_common_failure_mode, Some(FailureMode::ServerError));
    }

    #[tokio::test]
    async fn test_ramp_breaks_on_concurrency() {
        let (orchestrator, client) = orchestrator(ScriptedProvider::new(|call| {
            if call.concurrency >= 10 {
                Err(overloaded())
            } else {
                Ok(ok_response("ok"))
            }
        }));

        let report = orchestrator
            .run(&[provider("mock")], &[ramp(10)], &ExecutionConfig::default())
            .await
            .unwrap();

        let result = &report.scenario_results[0];
        assert_eq!(result.total_requests, 30);
        assert_eq!(result.failed_requests, 10);
        assert_eq!(result.breaking_points[0].threshold_value, 10);
        assert_eq!(client.peak_concurrency(), 10);
    }

    #[tokio::test]
    async fn test_request_budget_holds_across_scenarios() {
        let (orchestrator, client) = orchestrator(ScriptedProvider::always_ok());
        let execution = ExecutionConfig::default().with_max_requests(7);
        let junk = Scenario::new("junk", TestConfig::MalformedRequest);

        let report = orchestrator
            .run(&[provider("mock")], &[ramp(4), junk], &execution)
            .await
            .unwrap();

        assert!(report.total_requests <= 7);
        assert_eq!(client.calls(), report.total_requests);
        assert_eq!(report.scenario_results.len(), 1);
        assert_eq!(
            report.scenario_results[0].stopped_by,
            Some(Constraint::MaxRequestsExceeded)
        );
        assert!(report.constraint_fired(Constraint::MaxRequestsExceeded));
    }

    #[tokio::test]
    async fn test_cost_budget_stops_the_run() {
        let (orchestrator, client) = orchestrator(ScriptedProvider::new(|_| {
            let mut response = ok_response("ok");
            response.cost_usd = 0.5;
            Ok(response)
        }));
        let execution = ExecutionConfig::default().with_max_cost_usd(1.0);
        let first = Scenario::new("first", TestConfig::MalformedRequest);
        let second = Scenario::new("second", TestConfig::MalformedRequest);

        let report = orchestrator
            .run(&[provider("mock")], &[first, second], &execution)
            .await
            .unwrap();

        assert_eq!(client.calls(), 2);
        assert_eq!(report.total_requests, 2);
        assert!((report.total_cost_usd - 1.0).abs() < 1e-9);
        assert_eq!(report.scenario_results.len(), 1);
        assert_eq!(
            report.scenario_results[0].stopped_by,
            Some(Constraint::MaxCostExceeded)
        );
        assert!(report.constraint_fired(Constraint::MaxCostExceeded));
        assert!(report.results_for("mock").all(|r| r.scenario_id != "second"));
    }

    #[tokio::test]
    async fn test_misconfigured_provider_does_not_abort_the_run() {
        let (orchestrator, client) = orchestrator(ScriptedProvider::always_ok());
        let broken = ProviderConfig::new("broken", "mock-model", "api.example.com");
        let junk = Scenario::new("junk", TestConfig::MalformedRequest);

        let report = orchestrator
            .run(&[provider("good"), broken], &[junk], &ExecutionConfig::default())
            .await
            .unwrap();

        assert_eq!(report.scenario_results.len(), 2);
        assert_eq!(client.calls(), 6);

        let good = report.results_for("good").next().unwrap();
        assert_eq!(good.successful_requests, 6);

        let broken = report.results_for("broken").next().unwrap();
        assert_eq!(broken.total_requests, 6);
        assert_eq!(broken.failed_requests, 6);
        assert_eq!(broken.failure_modes.get(&FailureMode::Unknown), Some(&6));
        assert_eq!(report.provider_summaries.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_issues_six_requests() {
        let (orchestrator, _) = orchestrator(ScriptedProvider::new(|_| Err(overloaded())));
        let junk = Scenario::new("junk", TestConfig::MalformedRequest);

        let report = orchestrator
            .run(&[provider("mock")], &[junk], &ExecutionConfig::default())
            .await
            .unwrap();

        assert_eq!(report.total_requests, 6);
        assert_eq!(report.failed_requests, 6);
        assert!(!report.scenario_results[0].passed);
        assert!(report.constraints_applied.is_empty());
    }

    #[tokio::test]
    async fn test_critical_failure_stops_the_run() {
        let (orchestrator, _) = orchestrator(ScriptedProvider::new(|_| Err(overloaded())));
        let execution = ExecutionConfig::default().with_stop_on_critical_failure(true);
        let junk = Scenario::new("junk", TestConfig::MalformedRequest);

        let report = orchestrator
            .run(
                &[provider("first"), provider("second")],
                &[junk, ramp(2)],
                &execution,
            )
            .await
            .unwrap();

        assert_eq!(report.scenario_results.len(), 1);
        assert_eq!(report.constraints_applied, vec![Constraint::CriticalFailureStop]);
        assert_eq!(report.provider_summaries.len(), 1);
        assert!(report.summary_for("second").is_none());
    }

    #[tokio::test]
    async fn test_every_provider_runs_every_scenario() {
        let (orchestrator, client) = orchestrator(ScriptedProvider::always_ok());
        let junk = Scenario::new("junk", TestConfig::MalformedRequest);

        let report = orchestrator
            .run(
                &[provider("a"), provider("b")],
                &[junk, ramp(2)],
                &ExecutionConfig::default(),
            )
            .await
            .unwrap();

        assert_eq!(report.scenario_results.len(), 4);
        assert_eq!(report.provider_summaries.len(), 2);
        assert_eq!(report.results_for("b").count(), 2);
        assert_eq!(client.calls(), report.total_requests);
        assert_eq!(report.overall_success_rate, 1.0);
        assert_eq!(report.summary_for("a").unwrap().robustness_score, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_only_for_sustained_load() {
        let (orchestrator, _) = orchestrator(
            ScriptedProvider::always_ok().with_latency(std::time::Duration::from_millis(10)),
        );
        let soak = Scenario::new(
            "soak",
            TestConfig::Soak(SoakConfig {
                concurrency: 2,
                duration_ms: 2_000,
                request_interval_ms: 1_000,
            }),
        );
        let junk = Scenario::new("junk", TestConfig::MalformedRequest);

        let report = orchestrator
            .run(&[provider("mock")], &[soak, junk], &ExecutionConfig::default())
            .await
            .unwrap();

        let soak = &report.scenario_results[0];
        assert_eq!(soak.recovery_stability, Some(1.0));
        assert_eq!(soak.recovery_time_ms, None);
        assert!(soak.requests_per_second > 0.0);
        assert_eq!(report.scenario_results[1].recovery_stability, None);
    }

    #[tokio::test]
    async fn test_thresholds_decide_pass() {
        let (orchestrator, _) = orchestrator(ScriptedProvider::new(|call| {
            if call.call_index % 2 == 0 {
                Ok(ok_response("ok"))
            } else {
                Err(overloaded())
            }
        }));
        let lenient = Scenario::new("lenient", TestConfig::MalformedRequest)
            .with_expected_min_success_rate(0.5)
            .with_expected_max_latency_ms(100);
        let strict = Scenario::new("strict", TestConfig::MalformedRequest)
            .with_expected_min_success_rate(0.9);

        let report = orchestrator
            .run(&[provider("mock")], &[lenient, strict], &ExecutionConfig::default())
            .await
            .unwrap();

        assert!(report.scenario_results[0].passed);
        assert!(!report.scenario_results[1].passed);
        let warnings = &report.summary_for("mock").unwrap().warnings;
        assert!(warnings.iter().any(|w| w.starts_with("strict:")));
    }

    #[tokio::test]
    async fn test_report_reaches_sinks() {
        let sink = Arc::new(MemorySink::new());
        let client = Arc::new(ScriptedProvider::always_ok());
        let orchestrator =
            Orchestrator::new(client).with_sinks(SinkManager::new().with_sink(sink.clone()));
        let junk = Scenario::new("junk", TestConfig::MalformedRequest);

        let report = orchestrator
            .run(&[provider("mock")], &[junk], &ExecutionConfig::default())
            .await
            .unwrap();

        assert_eq!(sink.reports().len(), 1);
        assert_eq!(sink.last().unwrap().run_id, report.run_id);
    }

    #[tokio::test]
    async fn test_empty_run_is_rejected() {
        let (orchestrator, _) = orchestrator(ScriptedProvider::always_ok());

        let no_providers = orchestrator
            .run(&[], &[ramp(1)], &ExecutionConfig::default())
            .await;
        assert!(matches!(no_providers, Err(GauntletError::InvalidRun(_))));

        let no_scenarios = orchestrator
            .run(&[provider("mock")], &[], &ExecutionConfig::default())
            .await;
        assert!(matches!(no_scenarios, Err(GauntletError::InvalidRun(_))));
    }

    #[test]
    fn test_run_blocking() {
        let client = Arc::new(ScriptedProvider::always_ok());
        let orchestrator = Orchestrator::new(client);
        let junk = Scenario::new("junk", TestConfig::MalformedRequest);

        let report = orchestrator
            .run_blocking(&[provider("mock")], &[junk], &ExecutionConfig::default())
            .unwrap();

        assert_eq!(report.total_requests, 6);
        assert_eq!(report.successful_requests, 6);
    }

    #[tokio::test]
    async fn test_run_blocking_inside_a_runtime_is_an_error() {
        let (orchestrator, client) = orchestrator(ScriptedProvider::always_ok());
        let junk = Scenario::new("junk", TestConfig::MalformedRequest);

        let result =
            orchestrator.run_blocking(&[provider("mock")], &[junk], &ExecutionConfig::default());

        assert!(matches!(result, Err(GauntletError::Runtime(_))));
        assert_eq!(client.calls(), 0);
    }
}

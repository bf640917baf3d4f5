//! Baseline, burst, then fixed-window recovery observation

use std::time::Duration;

use gauntlet_config::SpikeConfig;
use tokio::time::Instant;
use tracing::debug;

use super::{repeated, ScenarioContext};
use crate::batch::PlannedRequest;

/// Pace of the recovery observation phase
pub const RECOVERY_INTERVAL: Duration = Duration::from_millis(1_000);

pub async fn run(ctx: &mut ScenarioContext<'_>, config: &SpikeConfig) {
    let prompt = ctx.base_prompt();

    if config.baseline_requests > 0 && ctx.checkpoint() {
        ctx.run_batched(
            repeated(prompt, config.baseline_requests, Some("baseline")),
            config.baseline_concurrency,
        )
        .await;
    }

    let spike_window = Duration::from_millis(config.spike_duration_ms);
    let spike_started = Instant::now();
    let mut bursts = 0u32;
    while spike_started.elapsed() < spike_window && ctx.checkpoint() {
        ctx.run_batched(
            repeated(prompt, config.spike_concurrency, Some("spike")),
            config.spike_concurrency,
        )
        .await;
        bursts += 1;
    }
    debug!(
        scenario_id = %ctx.scenario.scenario_id,
        bursts,
        "Spike phase complete"
    );

    // fixed window at ~1 req/s, whether or not the provider has recovered
    let window = Duration::from_millis(config.recovery_observation_ms);
    let recovery_started = Instant::now();
    let mut ticks = 0u32;
    while recovery_started.elapsed() < window && ctx.checkpoint() {
        ctx.run_single(PlannedRequest::new(prompt).with_label("recovery"))
            .await;
        ticks += 1;

        let next = recovery_started + RECOVERY_INTERVAL.saturating_mul(ticks);
        if next >= recovery_started + window {
            break;
        }
        tokio::time::sleep_until(next).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::test_support::run_scenario;
    use crate::testing::{ok_response, overloaded, ScriptedProvider};
    use gauntlet_config::{ExecutionConfig, Scenario, TestConfig};
    use gauntlet_core::Constraint;

    fn spike(baseline_requests: usize) -> Scenario {
        Scenario::new(
            "spike",
            TestConfig::Spike(SpikeConfig {
                baseline_requests,
                baseline_concurrency: 1,
                spike_concurrency: 5,
                spike_duration_ms: 300,
                recovery_observation_ms: 3_000,
            }),
        )
    }

    fn count(run: &crate::ScenarioRun, label: &str) -> usize {
        run.results
            .iter()
            .filter(|r| r.label.as_deref() == Some(label))
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_phases() {
        let client = ScriptedProvider::always_ok().with_latency(Duration::from_millis(100));
        let run = run_scenario(&client, &spike(2), &ExecutionConfig::default()).await;

        assert_eq!(count(&run, "baseline"), 2);
        // three 100ms bursts fit in the 300ms window
        assert_eq!(count(&run, "spike"), 15);
        // one request per second over a three second window
        assert_eq!(count(&run, "recovery"), 3);
        assert!(run
            .results
            .iter()
            .filter(|r| r.label.as_deref() == Some("spike"))
            .all(|r| r.concurrency_level == 5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_baseline_skips_phase() {
        let client = ScriptedProvider::always_ok().with_latency(Duration::from_millis(100));
        let run = run_scenario(&client, &spike(0), &ExecutionConfig::default()).await;
        assert_eq!(count(&run, "baseline"), 0);
        assert!(count(&run, "spike") > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_window_is_fixed_even_when_failing() {
        let client = ScriptedProvider::new(|call| {
            if call.concurrency > 1 {
                Err(overloaded())
            } else {
                Ok(ok_response("ok"))
            }
        })
        .with_latency(Duration::from_millis(100));
        let run = run_scenario(&client, &spike(0), &ExecutionConfig::default()).await;

        assert_eq!(count(&run, "recovery"), 3);
        assert!(run
            .results
            .iter()
            .filter(|r| r.label.as_deref() == Some("recovery"))
            .all(|r| r.is_success()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_budget_ends_burst() {
        let client = ScriptedProvider::always_ok().with_latency(Duration::from_millis(10));
        let execution = ExecutionConfig::default().with_max_requests(12);
        let run = run_scenario(&client, &spike(0), &execution).await;

        assert_eq!(run.results.len(), 12);
        assert_eq!(run.stopped_by, Some(Constraint::MaxRequestsExceeded));
        assert_eq!(count(&run, "recovery"), 0);
    }
}

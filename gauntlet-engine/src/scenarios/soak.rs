//! Sustained fixed-concurrency load

use std::time::Duration;

use gauntlet_config::SoakConfig;
use tokio::time::Instant;
use tracing::debug;

use super::{repeated, ScenarioContext};

pub async fn run(ctx: &mut ScenarioContext<'_>, config: &SoakConfig) {
    let prompt = ctx.base_prompt();
    let interval = Duration::from_millis(config.request_interval_ms);
    let window = Duration::from_millis(config.duration_ms);
    let started = Instant::now();
    let mut batches = 0u32;

    while started.elapsed() < window && ctx.checkpoint() {
        ctx.run_batched(repeated(prompt, config.concurrency, None), config.concurrency)
            .await;
        batches += 1;

        let next = started + interval.saturating_mul(batches);
        if next >= started + window {
            break;
        }
        tokio::time::sleep_until(next).await;
    }

    debug!(
        scenario_id = %ctx.scenario.scenario_id,
        batches,
        "Soak complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::test_support::run_scenario;
    use crate::testing::ScriptedProvider;
    use gauntlet_config::{ExecutionConfig, Scenario, TestConfig};
    use gauntlet_core::Constraint;

    fn soak(duration_ms: u64) -> Scenario {
        Scenario::new(
            "soak",
            TestConfig::Soak(SoakConfig {
                concurrency: 3,
                duration_ms,
                request_interval_ms: 1_000,
            }),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_batch_per_interval() {
        let client = ScriptedProvider::always_ok().with_latency(Duration::from_millis(50));
        let run = run_scenario(&client, &soak(5_000), &ExecutionConfig::default()).await;

        assert_eq!(run.results.len(), 15);
        assert_eq!(client.peak_concurrency(), 3);
        assert!(run.results.iter().all(|r| r.concurrency_level == 3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_budget_stops_soak() {
        let client = ScriptedProvider::always_ok().with_latency(Duration::from_millis(50));
        let execution = ExecutionConfig::default().with_max_duration_ms(2_500);
        let run = run_scenario(&client, &soak(60_000), &execution).await;

        assert_eq!(run.results.len(), 9);
        assert_eq!(run.stopped_by, Some(Constraint::MaxDurationExceeded));
    }
}

//! Concurrency ramp

use std::time::Duration;

use gauntlet_config::LoadRampConfig;
use tracing::{debug, info};

use super::{repeated, stepped_levels, success_rate, ScenarioContext};

/// Success rate below which the ramp stops climbing
pub const RAMP_STOP_SUCCESS_RATE: f64 = 0.1;

pub async fn run(ctx: &mut ScenarioContext<'_>, config: &LoadRampConfig) {
    let prompt = ctx.base_prompt();
    let levels = stepped_levels(
        config.initial_concurrency,
        config.max_concurrency,
        config.step_size,
    );

    for (step, &concurrency) in levels.iter().enumerate() {
        if step > 0 && config.step_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.step_delay_ms)).await;
        }
        if !ctx.checkpoint() {
            break;
        }

        let results = ctx
            .run_batched(repeated(prompt, config.requests_per_step, None), concurrency)
            .await;
        let rate = success_rate(results);

        debug!(
            scenario_id = %ctx.scenario.scenario_id,
            concurrency,
            success_rate = rate,
            "Ramp step complete"
        );

        if rate < RAMP_STOP_SUCCESS_RATE {
            info!(
                scenario_id = %ctx.scenario.scenario_id,
                concurrency,
                "Success rate collapsed, ending ramp"
            );
            break;
        }
    }
}

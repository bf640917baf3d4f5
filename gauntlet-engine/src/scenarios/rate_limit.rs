//! Requests-per-second probe

use std::time::Duration;

use gauntlet_config::RateLimitProbeConfig;
use gauntlet_core::FailureMode;
use tracing::{debug, info};

use super::{any_failed_with, repeated, stepped_levels, success_rate, ScenarioContext};

pub async fn run(ctx: &mut ScenarioContext<'_>, config: &RateLimitProbeConfig) {
    let prompt = ctx.base_prompt();
    let levels = stepped_levels(
        config.start_rps as usize,
        config.max_rps as usize,
        config.rps_step as usize,
    );

    for rps in levels {
        if !ctx.checkpoint() {
            break;
        }

        let interval = Duration::from_millis(1_000 / rps.max(1) as u64);
        let results = ctx
            .run_paced(repeated(prompt, config.requests_per_level, None), interval, rps)
            .await;
        let throttled = any_failed_with(results, FailureMode::RateLimited);
        let rate = success_rate(results);

        debug!(
            scenario_id = %ctx.scenario.scenario_id,
            rps,
            success_rate = rate,
            throttled,
            "Rate level complete"
        );

        if config.detect_throttling && throttled {
            info!(
                provider = %ctx.provider.name,
                rps,
                "Throttling detected, ending probe"
            );
            break;
        }
    }
}

//! Single-request sweeps over timeouts, `max_tokens` and prompt sizes

use gauntlet_config::{ContextOverflowConfig, TimeoutBoundaryConfig, TokenLimitConfig};
use gauntlet_core::FailureMode;
use tracing::info;

use super::{any_failed_with, ScenarioContext};
use crate::batch::PlannedRequest;
use crate::payloads::{context_filler, CHARS_PER_TOKEN, LONG_OUTPUT_PROMPT};

pub async fn run_timeout_boundary(ctx: &mut ScenarioContext<'_>, config: &TimeoutBoundaryConfig) {
    let prompt = ctx.base_prompt();
    for &timeout_ms in &config.timeouts_ms {
        if !ctx.checkpoint() {
            return;
        }
        let request = PlannedRequest::new(prompt)
            .with_timeout_ms(timeout_ms)
            .with_label(format!("timeout_ms={}", timeout_ms));
        ctx.run_single(request).await;
    }
}

pub async fn run_token_limit(ctx: &mut ScenarioContext<'_>, config: &TokenLimitConfig) {
    let scenario = ctx.scenario;
    let prompt = scenario.base_prompt.as_deref().unwrap_or(LONG_OUTPUT_PROMPT);
    for &max_tokens in &config.token_limits {
        if !ctx.checkpoint() {
            return;
        }
        let request = PlannedRequest::new(prompt)
            .with_max_tokens(max_tokens)
            .with_label(format!("max_tokens={}", max_tokens));
        ctx.run_single(request).await;
    }
}

pub async fn run_context_overflow(ctx: &mut ScenarioContext<'_>, config: &ContextOverflowConfig) {
    let instruction = ctx.base_prompt();
    for &tokens in &config.input_sizes {
        if !ctx.checkpoint() {
            return;
        }
        let request = PlannedRequest::new(context_filler(instruction, tokens))
            .with_input_size(tokens * CHARS_PER_TOKEN)
            .with_label(format!("tokens={}", tokens));

        let results = ctx.run_single(request).await;
        if any_failed_with(results, FailureMode::ContextExceeded) {
            info!(
                provider = %ctx.provider.name,
                tokens,
                "Context window exceeded, ending sweep"
            );
            return;
        }
    }
}

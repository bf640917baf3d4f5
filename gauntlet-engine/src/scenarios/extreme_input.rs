//! Oversized inputs across character classes

use gauntlet_config::ExtremeInputConfig;

use super::ScenarioContext;
use crate::batch::PlannedRequest;
use crate::payloads::{character_label, character_payload};

pub async fn run(ctx: &mut ScenarioContext<'_>, config: &ExtremeInputConfig) {
    for &size in &config.input_sizes {
        for &kind in &config.character_types {
            if !ctx.checkpoint() {
                return;
            }
            let request = PlannedRequest::new(character_payload(kind, size))
                .with_input_size(size)
                .with_label(character_label(kind));
            ctx.run_single(request).await;
        }
    }
}

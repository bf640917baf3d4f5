//! Fixed set of edge-case payloads

use super::ScenarioContext;
use crate::batch::PlannedRequest;
use crate::payloads::malformed_payloads;

pub async fn run(ctx: &mut ScenarioContext<'_>) {
    for (label, payload) in malformed_payloads() {
        if !ctx.checkpoint() {
            return;
        }
        ctx.run_single(PlannedRequest::new(payload).with_label(label))
            .await;
    }
}

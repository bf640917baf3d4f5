//! Categorised hostile payloads

use gauntlet_config::AdversarialConfig;

use super::ScenarioContext;
use crate::batch::PlannedRequest;
use crate::payloads::adversarial_payload;

pub async fn run(ctx: &mut ScenarioContext<'_>, config: &AdversarialConfig) {
    for &attack in &config.attack_types {
        for sample in 0..config.samples_per_type {
            if !ctx.checkpoint() {
                return;
            }
            let request = PlannedRequest::new(adversarial_payload(attack, sample))
                .with_label(format!("{}#{}", attack.as_str(), sample + 1));
            ctx.run_single(request).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::test_support::run_scenario;
    use crate::testing::{ok_response, ScriptedProvider};
    use gauntlet_config::{AttackType, ExecutionConfig, Scenario, TestConfig};
    use gauntlet_core::FailureMode;
    use gauntlet_http::ProviderError;

    #[tokio::test]
    async fn test_every_category_and_sample() {
        let scenario = Scenario::new(
            "adversarial",
            TestConfig::Adversarial(AdversarialConfig {
                attack_types: vec![AttackType::PromptInjection, AttackType::ZeroWidth],
                samples_per_type: 2,
            }),
        );
        let client = ScriptedProvider::new(|call| {
            if call.request.prompt.contains("Ignore all previous instructions") {
                Err(ProviderError::Http {
                    status: 400,
                    body: "Request blocked by content policy".to_string(),
                })
            } else {
                Ok(ok_response("ok"))
            }
        });

        let run = run_scenario(&client, &scenario, &ExecutionConfig::default()).await;

        let labels: Vec<&str> = run
            .results
            .iter()
            .filter_map(|r| r.label.as_deref())
            .collect();
        assert_eq!(
            labels,
            vec![
                "prompt_injection#1",
                "prompt_injection#2",
                "zero_width#1",
                "zero_width#2"
            ]
        );
        assert_eq!(
            run.results[0].failure_mode(),
            Some(FailureMode::ContentFiltered)
        );
        assert!(run.results[1].is_success());
    }
}

//! Bounded fan-out/fan-in request execution
//!
//! Requests run in batches of at most `concurrency`; each batch is awaited
//! in full before the next starts, so no more than `concurrency` calls are
//! ever in flight. Failures are turned into result data here and never
//! propagate further.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use gauntlet_config::{ExecutionConfig, ProviderConfig, Scenario, Validatable};
use gauntlet_core::{Constraint, RequestOutcome, StressRequestResult};
use gauntlet_http::{CompletionRequest, ProviderClient, ProviderError};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::classifier::classify_error;
use crate::run_state::RunState;

/// Characters kept from a sampled response
pub const RESPONSE_SAMPLE_CHARS: usize = 200;

/// One request an executor wants sent
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRequest {
    pub prompt: String,
    /// Size recorded on the result; defaults to the prompt length in chars
    pub input_size: usize,
    pub label: Option<String>,
    pub max_tokens: Option<u32>,
    pub timeout_ms: Option<u64>,
}

impl PlannedRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        Self {
            input_size: prompt.chars().count(),
            prompt,
            label: None,
            max_tokens: None,
            timeout_ms: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_input_size(mut self, input_size: usize) -> Self {
        self.input_size = input_size;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// What a batch run produced
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<StressRequestResult>,
    /// Budget that cut the run short
    pub stopped_by: Option<Constraint>,
}

/// Sends planned requests for one (provider, scenario) pair
pub struct BatchExecutor<'a> {
    client: &'a dyn ProviderClient,
    provider: &'a ProviderConfig,
    scenario: &'a Scenario,
    execution: &'a ExecutionConfig,
    run_state: &'a RunState,
    /// Set when the provider config is unusable; every request then fails
    /// with it instead of reaching the client
    rejected: Option<String>,
}

impl<'a> BatchExecutor<'a> {
    pub fn new(
        client: &'a dyn ProviderClient,
        provider: &'a ProviderConfig,
        scenario: &'a Scenario,
        execution: &'a ExecutionConfig,
        run_state: &'a RunState,
    ) -> Self {
        Self {
            client,
            provider,
            scenario,
            execution,
            run_state,
            rejected: provider.validate().err().map(|e| e.to_string()),
        }
    }

    /// Run requests in batches of `min(concurrency, remaining)`
    ///
    /// The budget is checked and the request counter reserved before every
    /// batch; a batch is shrunk to whatever request budget is left.
    pub async fn execute(
        &self,
        requests: Vec<PlannedRequest>,
        concurrency: usize,
        level: usize,
    ) -> BatchOutcome {
        let concurrency = concurrency.max(1);
        let mut outcome = BatchOutcome::default();
        let mut pending: VecDeque<PlannedRequest> = requests.into();

        while !pending.is_empty() {
            let granted = match self.admit(concurrency.min(pending.len())) {
                Ok(granted) => granted,
                Err(constraint) => {
                    outcome.stopped_by = Some(constraint);
                    break;
                }
            };

            let batch: Vec<PlannedRequest> = pending.drain(..granted).collect();
            trace!(
                scenario_id = %self.scenario.scenario_id,
                batch_size = batch.len(),
                level,
                "Dispatching batch"
            );

            let calls = batch
                .into_iter()
                .map(|request| self.execute_one(request, level));
            outcome.results.extend(join_all(calls).await);
        }

        outcome
    }

    /// Run one level of requests, starting one every `interval`
    ///
    /// All of the level's requests are reserved up front and the level is
    /// awaited as a whole.
    pub async fn execute_paced(
        &self,
        requests: Vec<PlannedRequest>,
        interval: Duration,
        level: usize,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        let granted = match self.admit(requests.len()) {
            Ok(granted) => granted,
            Err(constraint) => {
                outcome.stopped_by = Some(constraint);
                return outcome;
            }
        };

        let calls = requests
            .into_iter()
            .take(granted)
            .enumerate()
            .map(|(index, request)| async move {
                let offset = interval.saturating_mul(index as u32);
                if !offset.is_zero() {
                    tokio::time::sleep(offset).await;
                }
                self.execute_one(request, level).await
            });
        outcome.results = join_all(calls).await;

        outcome
    }

    /// Budget check plus counter reservation for up to `wanted` requests
    fn admit(&self, wanted: usize) -> Result<usize, Constraint> {
        if let Some(constraint) = self.run_state.check_budget(self.execution) {
            return Err(constraint);
        }
        match self
            .run_state
            .reserve(wanted as u64, self.execution.max_total_requests)
        {
            0 => Err(Constraint::MaxRequestsExceeded),
            granted => Ok(granted as usize),
        }
    }

    async fn execute_one(&self, planned: PlannedRequest, level: usize) -> StressRequestResult {
        let request_id = Uuid::new_v4();
        let started_at = Utc::now();

        let mut request = CompletionRequest::new(planned.prompt)
            .with_system_prompt(self.scenario.system_prompt.clone());
        if let Some(max_tokens) = planned.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(timeout_ms) = planned.timeout_ms {
            request = request.with_timeout_ms(timeout_ms);
        }

        let reply = match self.rejected {
            Some(ref reason) => Err(ProviderError::Configuration(reason.clone())),
            None => self.client.call(self.provider, &request).await,
        };

        let outcome = match reply {
            Ok(response) => {
                self.run_state.add_cost(response.cost_usd);
                let response_sample: Option<String> = self
                    .should_sample(&request_id)
                    .then(|| response.content.chars().take(RESPONSE_SAMPLE_CHARS).collect());
                RequestOutcome::Success {
                    latency_ms: response.latency_ms,
                    time_to_first_token_ms: response.time_to_first_token_ms,
                    prompt_tokens: response.prompt_tokens,
                    completion_tokens: response.completion_tokens,
                    cost_usd: response.cost_usd,
                    response_sample,
                }
            }
            Err(error) => {
                let failure_mode = classify_error(&error);
                debug!(
                    provider = %self.provider.name,
                    scenario_id = %self.scenario.scenario_id,
                    %failure_mode,
                    "Request failed: {}",
                    error
                );
                RequestOutcome::Failure {
                    failure_mode,
                    message: error.to_string(),
                    http_status: error.status(),
                }
            }
        };

        StressRequestResult {
            request_id: request_id.to_string(),
            scenario_id: self.scenario.scenario_id.clone(),
            concurrency_level: level,
            input_size: planned.input_size,
            label: planned.label,
            started_at,
            completed_at: Utc::now(),
            outcome,
        }
    }

    /// Deterministic per-request draw against `sample_rate`
    fn should_sample(&self, request_id: &Uuid) -> bool {
        if !self.execution.collect_response_samples {
            return false;
        }
        let (seed, _) = request_id.as_u64_pair();
        fastrand::Rng::with_seed(seed).f64() < self.execution.sample_rate
    }
}

//! Scripted provider test double
//!
//! Answers every call from a closure, so executors and the orchestrator can
//! be driven deterministically without a network. The closure sees how many
//! calls were in flight together with the current one.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use gauntlet_config::ProviderConfig;
use gauntlet_http::{CompletionRequest, CompletionResponse, ProviderClient, ProviderError};
use parking_lot::Mutex;

/// What the script sees for one call
#[derive(Debug)]
pub struct CallContext<'a> {
    pub request: &'a CompletionRequest,
    /// Zero-based position of this call across the provider's lifetime
    pub call_index: u64,
    /// Peak number of calls in flight alongside this one
    pub concurrency: usize,
}

type Script = dyn Fn(&CallContext<'_>) -> Result<CompletionResponse, ProviderError> + Send + Sync;

pub struct ScriptedProvider {
    script: Box<Script>,
    latency: Duration,
    calls: AtomicU64,
    in_flight: AtomicUsize,
    group_peak: AtomicUsize,
    max_peak: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(
        script: impl Fn(&CallContext<'_>) -> Result<CompletionResponse, ProviderError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            latency: Duration::ZERO,
            calls: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            group_peak: AtomicUsize::new(0),
            max_peak: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every call succeeds
    pub fn always_ok() -> Self {
        Self::new(|_| Ok(ok_response("ok")))
    }

    /// Simulated service time per call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous calls ever seen
    pub fn peak_concurrency(&self) -> usize {
        self.max_peak.load(Ordering::SeqCst)
    }

    /// Every request received, in arrival order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }
}

impl std::fmt::Debug for ScriptedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedProvider")
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ProviderClient for ScriptedProvider {
    async fn call(
        &self,
        _provider: &ProviderConfig,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.group_peak.fetch_max(in_flight, Ordering::SeqCst);
        self.max_peak.fetch_max(in_flight, Ordering::SeqCst);
        let call_index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        // let every call of the same fan-out register before any answers
        tokio::task::yield_now().await;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let context = CallContext {
            request,
            call_index,
            concurrency: self.group_peak.load(Ordering::SeqCst),
        };
        let mut result = (self.script)(&context);
        if let Ok(ref mut response) = result {
            response.latency_ms = response.latency_ms.max(self.latency.as_millis() as u64);
        }

        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.group_peak.store(0, Ordering::SeqCst);
        }
        result
    }
}

/// Successful response with fixed usage
pub fn ok_response(content: impl Into<String>) -> CompletionResponse {
    CompletionResponse {
        content: content.into(),
        prompt_tokens: 10,
        completion_tokens: 5,
        cost_usd: 0.0,
        latency_ms: 1,
        time_to_first_token_ms: Some(1),
    }
}

/// 429 failure as a provider would send it
pub fn rate_limited() -> ProviderError {
    ProviderError::Http {
        status: 429,
        body: "Rate limit exceeded".to_string(),
    }
}

/// 503 failure as a provider would send it
pub fn overloaded() -> ProviderError {
    ProviderError::Http {
        status: 503,
        body: "The server is overloaded".to_string(),
    }
}

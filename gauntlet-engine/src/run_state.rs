//! Shared run counters and the budget guard

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use gauntlet_config::ExecutionConfig;
use gauntlet_core::Constraint;
use parking_lot::Mutex;
use tokio::time::Instant;

/// Running totals for one stress run
///
/// Owned by the orchestrator and borrowed by every executor. Request
/// completions inside a batch update it concurrently, so the request count
/// is atomic and the cost and constraint list sit behind locks.
#[derive(Debug)]
pub struct RunState {
    started: Instant,
    requests_issued: AtomicU64,
    cost_usd: Mutex<f64>,
    constraints: Mutex<Vec<Constraint>>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            requests_issued: AtomicU64::new(0),
            cost_usd: Mutex::new(0.0),
            constraints: Mutex::new(Vec::new()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn requests_issued(&self) -> u64 {
        self.requests_issued.load(Ordering::SeqCst)
    }

    pub fn total_cost_usd(&self) -> f64 {
        *self.cost_usd.lock()
    }

    pub fn add_cost(&self, cost_usd: f64) {
        if cost_usd > 0.0 {
            *self.cost_usd.lock() += cost_usd;
        }
    }

    /// Reserve up to `wanted` requests without passing `max_total`
    ///
    /// Returns how many were granted; 0 once the budget is spent.
    pub fn reserve(&self, wanted: u64, max_total: u64) -> u64 {
        match self
            .requests_issued
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |issued| {
                if issued >= max_total || wanted == 0 {
                    None
                } else {
                    Some(issued + wanted.min(max_total - issued))
                }
            }) {
            Ok(previous) => wanted.min(max_total - previous),
            Err(_) => 0,
        }
    }

    /// Record a constraint once, keeping first-fired order
    pub fn record_constraint(&self, constraint: Constraint) {
        let mut constraints = self.constraints.lock();
        if !constraints.contains(&constraint) {
            constraints.push(constraint);
        }
    }

    pub fn constraints(&self) -> Vec<Constraint> {
        self.constraints.lock().clone()
    }

    /// First exhausted budget, checked before every unit of scheduled work
    pub fn check_budget(&self, config: &ExecutionConfig) -> Option<Constraint> {
        if self.elapsed() >= config.max_total_duration() {
            return Some(Constraint::MaxDurationExceeded);
        }
        if self.requests_issued() >= config.max_total_requests {
            return Some(Constraint::MaxRequestsExceeded);
        }
        if let Some(max_cost) = config.max_total_cost_usd {
            if self.total_cost_usd() >= max_cost {
                return Some(Constraint::MaxCostExceeded);
            }
        }
        None
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

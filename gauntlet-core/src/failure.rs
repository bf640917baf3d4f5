//! Failure and constraint taxonomies

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed taxonomy of per-request failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    Timeout,
    RateLimited,
    ContextExceeded,
    AuthenticationError,
    ServerError,
    ConnectionError,
    ContentFiltered,
    InvalidResponse,
    Unknown,
}

impl FailureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureMode::Timeout => "timeout",
            FailureMode::RateLimited => "rate_limited",
            FailureMode::ContextExceeded => "context_exceeded",
            FailureMode::AuthenticationError => "authentication_error",
            FailureMode::ServerError => "server_error",
            FailureMode::ConnectionError => "connection_error",
            FailureMode::ContentFiltered => "content_filtered",
            FailureMode::InvalidResponse => "invalid_response",
            FailureMode::Unknown => "unknown",
        }
    }

    pub fn all() -> &'static [FailureMode] {
        &[
            FailureMode::Timeout,
            FailureMode::RateLimited,
            FailureMode::ContextExceeded,
            FailureMode::AuthenticationError,
            FailureMode::ServerError,
            FailureMode::ConnectionError,
            FailureMode::ContentFiltered,
            FailureMode::InvalidResponse,
            FailureMode::Unknown,
        ]
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Named budget or stop condition that fired during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    MaxDurationExceeded,
    MaxRequestsExceeded,
    MaxCostExceeded,
    CriticalFailureStop,
}

impl Constraint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Constraint::MaxDurationExceeded => "max_duration_exceeded",
            Constraint::MaxRequestsExceeded => "max_requests_exceeded",
            Constraint::MaxCostExceeded => "max_cost_exceeded",
            Constraint::CriticalFailureStop => "critical_failure_stop",
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

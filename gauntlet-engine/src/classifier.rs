//! Failure classification
//!
//! Maps a failed provider call onto the closed [`FailureMode`] taxonomy.
//! Rules are evaluated in a fixed order and the first match wins, so a
//! message that mentions both a timeout and a rate limit is a timeout.

use gauntlet_core::FailureMode;
use gauntlet_http::ProviderError;

const TIMEOUT_WORDS: &[&str] = &["timeout", "timed out", "abort"];
const RATE_LIMIT_WORDS: &[&str] = &["rate limit", "rate_limit", "too many requests"];
const CONTEXT_WORDS: &[&str] = &["context", "token"];
const NETWORK_WORDS: &[&str] = &[
    "network",
    "connect",
    "connection",
    "dns",
    "socket",
    "econnrefused",
    "econnreset",
];
const SAFETY_WORDS: &[&str] = &[
    "safety",
    "filter",
    "content policy",
    "moderation",
    "blocked",
];
const INVALID_WORDS: &[&str] = &["invalid", "malformed", "parse"];

/// Classify a typed provider error
pub fn classify_error(error: &ProviderError) -> FailureMode {
    match error {
        ProviderError::Timeout { .. } => FailureMode::Timeout,
        ProviderError::MissingCredentials(_) => FailureMode::AuthenticationError,
        ProviderError::Configuration(_) => FailureMode::Unknown,
        other => classify(&other.to_string(), other.status()),
    }
}

/// Classify an error message and optional HTTP status
pub fn classify(message: &str, status: Option<u16>) -> FailureMode {
    let message = message.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| message.contains(w));

    if mentions(TIMEOUT_WORDS) {
        FailureMode::Timeout
    } else if status == Some(429) || mentions(RATE_LIMIT_WORDS) {
        FailureMode::RateLimited
    } else if status == Some(400) && mentions(CONTEXT_WORDS) {
        FailureMode::ContextExceeded
    } else if matches!(status, Some(401) | Some(403)) {
        FailureMode::AuthenticationError
    } else if status.is_some_and(|s| s >= 500) {
        FailureMode::ServerError
    } else if mentions(NETWORK_WORDS) {
        FailureMode::ConnectionError
    } else if mentions(SAFETY_WORDS) {
        FailureMode::ContentFiltered
    } else if mentions(INVALID_WORDS) {
        FailureMode::InvalidResponse
    } else {
        FailureMode::Unknown
    }
}

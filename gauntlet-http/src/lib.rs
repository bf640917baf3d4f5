//! Provider call abstraction for gauntlet
//!
//! Sends one prompt to one chat-completions provider, enforces the hard
//! per-call timeout and reports latency, token usage and cost, or a typed
//! [`ProviderError`]. Nothing here retries.

pub mod client;
pub mod config;
pub mod errors;
pub mod secrets;
pub mod types;

// Re-export main types for convenience
pub use client::{HttpProviderClient, ProviderClient};
pub use config::HttpClientConfig;
pub use errors::ProviderError;
pub use secrets::{EnvSecretResolver, SecretResolver, StaticSecretResolver};
pub use types::{ChatMessage, CompletionRequest, CompletionResponse};

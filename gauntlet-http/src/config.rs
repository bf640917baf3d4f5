//! HTTP client configuration

use gauntlet_config::HttpConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transport settings shared by every provider call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// TCP connect timeout
    pub connect_timeout: Duration,

    /// Maximum idle connections kept per host
    pub pool_max_idle_per_host: usize,

    /// User agent string
    pub user_agent: String,

    /// Whether to verify SSL certificates
    pub verify_ssl: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 64,
            user_agent: "gauntlet/0.1".to_string(),
            verify_ssl: true,
        }
    }
}

impl From<&HttpConfig> for HttpClientConfig {
    fn from(config: &HttpConfig) -> Self {
        Self {
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            pool_max_idle_per_host: config.pool_max_idle_per_host,
            user_agent: config.user_agent.clone(),
            verify_ssl: config.verify_ssl,
        }
    }
}

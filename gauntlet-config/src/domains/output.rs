//! Report sink configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, validate_url, Validatable};
use serde::{Deserialize, Serialize};

/// Where finished stress reports are delivered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Sinks receiving every report; delivery failures never fail a run
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Serialisation format for file sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Json,
    JsonCompact,
    Yaml,
}

/// What the stdio sink prints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StdioMode {
    #[default]
    Summary,
    Json,
}

/// One report sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkConfig {
    Filesystem {
        /// Handlebars template, e.g. `reports/{{run_id}}.json`
        path: String,
        #[serde(default)]
        format: ReportFormat,
        #[serde(default = "default_create_dirs")]
        create_dirs: bool,
        #[serde(default)]
        overwrite: bool,
    },
    Webhook {
        url: String,
        #[serde(default = "default_webhook_timeout_ms")]
        timeout_ms: u64,
        /// Secret reference for a bearer token
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bearer_token_ref: Option<String>,
    },
    Stdio {
        #[serde(default)]
        mode: StdioMode,
    },
}

impl Validatable for OutputConfig {
    fn validate(&self) -> ConfigResult<()> {
        for sink in &self.sinks {
            sink.validate()?;
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "output"
    }
}

impl Validatable for SinkConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self {
            SinkConfig::Filesystem { path, .. } => {
                validate_required_string(path, "path", self.domain_name())?;
                if path.contains('\0') {
                    return Err(self.validation_error("path contains null bytes"));
                }
            }
            SinkConfig::Webhook {
                url, timeout_ms, ..
            } => {
                validate_url(url, "url", self.domain_name())?;
                validate_positive(*timeout_ms, "timeout_ms", self.domain_name())?;
            }
            SinkConfig::Stdio { .. } => {}
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "output.sinks"
    }
}

fn default_webhook_timeout_ms() -> u64 {
    30_000
}

fn default_create_dirs() -> bool {
    true
}

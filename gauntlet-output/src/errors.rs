//! Delivery error types

/// Why a report could not be delivered to a sink
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Failed to render template '{template}': {error}")]
    TemplateRender { template: String, error: String },

    #[error("Filesystem {operation} failed for '{path}': {error}")]
    Filesystem {
        path: String,
        operation: String,
        error: String,
    },

    #[error("File already exists and overwrite is disabled: {path}")]
    FileExists { path: String },

    #[error("Failed to serialize report as {format}: {error}")]
    Serialization { format: String, error: String },

    #[error("Network error delivering to {url}: {error}")]
    Network { url: String, error: String },

    #[error("Webhook {url} answered HTTP {status}: {response}")]
    WebhookFailed {
        url: String,
        status: u16,
        response: String,
    },

    #[error("Credentials unavailable: {0}")]
    Credentials(String),

    #[error("Invalid sink configuration: {0}")]
    InvalidSink(String),
}

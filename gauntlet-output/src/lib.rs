//! # Gauntlet Output
//!
//! Delivers finished [`StressTestReport`]s to result sinks.
//!
//! ## Features
//!
//! - **Multiple Sinks**: filesystem, webhook, stdio and in-memory collection
//! - **Template Engine**: Handlebars paths such as `reports/{{run_id}}.json`
//! - **Format Support**: pretty JSON, compact JSON and YAML
//! - **Best Effort**: a failing sink is logged and never fails the run
//!
//! ## Example
//!
//! ```rust,no_run
//! use gauntlet_config::{OutputConfig, ReportFormat, SinkConfig};
//! use gauntlet_output::SinkManager;
//!
//! let config = OutputConfig {
//!     sinks: vec![SinkConfig::Filesystem {
//!         path: "reports/{{run_id}}.json".to_string(),
//!         format: ReportFormat::Json,
//!         create_dirs: true,
//!         overwrite: false,
//!     }],
//! };
//! let manager = SinkManager::from_config(&config).unwrap();
//! assert_eq!(manager.len(), 1);
//! ```
//!
//! [`StressTestReport`]: gauntlet_core::StressTestReport

pub mod errors;
pub mod manager;
pub mod metrics;
pub mod sink;
pub mod sinks;
pub mod template;

pub use errors::DeliveryError;
pub use manager::SinkManager;
pub use metrics::SinkMetrics;
pub use sink::{DeliveryResult, ReportSink};
pub use sinks::{FilesystemSink, MemorySink, StdioSink, WebhookSink};
pub use template::TemplateEngine;

//! Structured logging initialisation for gauntlet
//!
//! Every crate logs through `tracing`; this crate installs the global
//! subscriber described by a [`gauntlet_config::LoggingConfig`].

pub mod init;

pub use init::{init_logging_from_config, init_simple_tracing, LoggingGuard};

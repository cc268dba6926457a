//! dbaudit core - external analysis tool orchestration.
//!
//! Runs a database code-analysis tool as a child process:
//! - encodes an [`AnalysisConfig`] into the tool's argument vector
//! - stages embedded tool content inside a private temporary workspace
//! - drains and classifies stdout/stderr concurrently into an [`Outcome`]
//! - harvests `<report>.<ext>` files into the caller's destination
//! - removes the workspace on every exit path
//!
//! The tool itself, the configuration surface that produces an
//! [`AnalysisConfig`], and the interpretation of generated reports all
//! live outside this crate.

pub mod args;
pub mod config;
pub mod error;
pub mod harvest;
pub mod outcome;
pub mod runner;
pub mod stream;
pub mod telemetry;
pub mod workspace;

// Re-export key types
pub use config::{
    AnalysisConfig, DbObject, FailConditions, ObjectFolder, ReportConfig, RuleSet,
};
pub use error::{AnalysisError, Result};
pub use harvest::harvest_reports;
pub use outcome::Outcome;
pub use runner::Runner;
pub use stream::{BufferSink, LogSink, TracingSink, LOG_PREFIX_ERR, LOG_PREFIX_OUT};
pub use telemetry::init_tracing;
pub use workspace::{Tool, Workspace};

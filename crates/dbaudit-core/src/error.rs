//! Error types for analysis invocations.

use thiserror::Error;

/// Setup failures that abort an invocation before the tool has run.
///
/// Everything that happens after a successful spawn is reported through
/// the invocation's [`Outcome`](crate::outcome::Outcome) instead.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("failed to prepare analysis workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("failed to launch analysis tool: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Result type for analysis invocations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

//! Severity-ranked invocation outcomes and line classification.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Outcome of an invocation or of a single output stream, ordered by
/// increasing severity.
///
/// `Aborted` is set by the orchestrator when its wait is interrupted;
/// stream content never produces it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[default]
    Success,
    Unstable,
    Failure,
    Aborted,
}

impl Outcome {
    /// Combine two outcomes, keeping the more severe one.
    pub fn combine(self, other: Outcome) -> Outcome {
        self.max(other)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::Unstable => write!(f, "unstable"),
            Outcome::Failure => write!(f, "failure"),
            Outcome::Aborted => write!(f, "aborted"),
        }
    }
}

static FAILURE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bERROR\b").expect("valid failure marker"));

static UNSTABLE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bWARNING\b").expect("valid unstable marker"));

/// Classify one output line against the recognized severity markers.
///
/// Returns `None` for lines that carry no marker; such lines never change
/// a stream's outcome.
pub fn classify_line(line: &str) -> Option<Outcome> {
    if FAILURE_MARKER.is_match(line) {
        Some(Outcome::Failure)
    } else if UNSTABLE_MARKER.is_match(line) {
        Some(Outcome::Unstable)
    } else {
        None
    }
}

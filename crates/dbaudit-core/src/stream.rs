//! Output-stream draining and classification.
//!
//! Each child stream gets one concurrent classifier task. The task
//! forwards every line to the caller's [`LogSink`] as it arrives and folds
//! recognized severity markers into a single [`Outcome`] for the stream.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{info, warn};

use crate::outcome::{classify_line, Outcome};

/// Prefix for lines originating on the tool's standard output.
pub const LOG_PREFIX_OUT: &str = "[code-analysis] ";

/// Prefix for lines originating on the tool's standard error.
pub const LOG_PREFIX_ERR: &str = "[code-analysis:err] ";

/// Append-only line writer the runner forwards tool output into.
///
/// The sink is owned by the caller. The core prepends the fixed origin
/// prefix and nothing else; lines are forwarded live, never batched.
pub trait LogSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Default sink: emits every line as a tracing `INFO` event.
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write_line(&self, line: &str) {
        info!("{line}");
    }
}

/// In-memory sink recording every forwarded line.
///
/// Used by the test suites and by embedders that capture tool output
/// instead of streaming it.
#[derive(Default)]
pub struct BufferSink {
    lines: Mutex<Vec<String>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl LogSink for BufferSink {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line.to_string());
    }
}

/// Drain one output stream to end-of-stream.
///
/// Forwards every line to `sink` with the stream's origin `prefix` and
/// returns the most severe outcome any line matched. The outcome only ever
/// upgrades; unrecognized lines leave it alone. A read error ends the
/// stream and the outcome computed so far stands.
pub async fn classify_stream<R>(reader: R, sink: Arc<dyn LogSink>, prefix: &str) -> Outcome
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut outcome = Outcome::Success;

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                sink.write_line(&format!("{prefix}{line}"));
                if let Some(marked) = classify_line(&line) {
                    outcome = outcome.combine(marked);
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "error reading analysis output stream");
                break;
            }
        }
    }

    outcome
}

//! Process orchestration for one analysis invocation.
//!
//! Spawns the tool with the encoded argument vector, drains both output
//! streams concurrently while waiting for exit, and funnels everything
//! that happens after the spawn into a single [`Outcome`]. Only setup
//! failures (workspace, spawn) surface as errors.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::AsyncRead;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::args::encode_args;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::harvest::harvest_reports;
use crate::outcome::Outcome;
use crate::stream::{classify_stream, LogSink, LOG_PREFIX_ERR, LOG_PREFIX_OUT};
use crate::workspace::{Tool, Workspace};

/// Runs analysis invocations against a fixed tool, forwarding output to a
/// caller-owned sink.
pub struct Runner {
    tool: Tool,
    sink: Arc<dyn LogSink>,
}

impl Runner {
    pub fn new(tool: Tool, sink: Arc<dyn LogSink>) -> Self {
        Self { tool, sink }
    }

    /// Run one invocation to completion.
    pub async fn run(&self, config: &AnalysisConfig) -> Result<Outcome> {
        self.run_with_interrupt(config, CancellationToken::new())
            .await
    }

    /// Run one invocation, abandoning the wait when `interrupt` fires.
    ///
    /// Interruption yields [`Outcome::Aborted`] without killing the child;
    /// the process and its pipes are released asynchronously by the OS
    /// rather than synchronously here. Reports are harvested and the
    /// workspace removed on every path that reaches the spawn.
    pub async fn run_with_interrupt(
        &self,
        config: &AnalysisConfig,
        interrupt: CancellationToken,
    ) -> Result<Outcome> {
        let workspace = Workspace::acquire(&self.tool)?;
        let args = encode_args(config, workspace.dir());

        self.sink
            .write_line(&format!("{LOG_PREFIX_OUT}Preparing analysis..."));
        info!(
            program = %workspace.program().display(),
            rule_set = config.rule_set,
            objects = config.objects.len(),
            folders = config.folders.len(),
            "launching analysis tool"
        );

        let mut child = Command::new(workspace.program())
            .args(workspace.program_args())
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(false)
            .spawn()
            .map_err(AnalysisError::Spawn)?;

        // Both classifiers must be draining before the wait starts, or a
        // full pipe buffer can stall the child indefinitely.
        let out_task = self.spawn_classifier(child.stdout.take(), LOG_PREFIX_OUT);
        let err_task = self.spawn_classifier(child.stderr.take(), LOG_PREFIX_ERR);

        let outcome = tokio::select! {
            status = child.wait() => self.settle(status, out_task, err_task).await,
            _ = interrupt.cancelled() => {
                self.sink
                    .write_line(&format!("{LOG_PREFIX_ERR}Analysis interrupted"));
                warn!("analysis wait interrupted; child left to exit on its own");
                Outcome::Aborted
            }
        };

        self.sink
            .write_line(&format!("{LOG_PREFIX_OUT}Analysis completed"));

        if !config.report.folder.is_empty() {
            let copied = harvest_reports(
                workspace.dir(),
                &config.report.name,
                Path::new(&config.report.folder),
            );
            info!(copied, "report harvest finished");
        }

        Ok(outcome)
    }

    fn spawn_classifier<R>(&self, reader: Option<R>, prefix: &'static str) -> JoinHandle<Outcome>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            match reader {
                Some(reader) => classify_stream(reader, sink, prefix).await,
                None => Outcome::Success,
            }
        })
    }

    async fn settle(
        &self,
        status: std::io::Result<std::process::ExitStatus>,
        out_task: JoinHandle<Outcome>,
        err_task: JoinHandle<Outcome>,
    ) -> Outcome {
        let status = match status {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "failed waiting for analysis tool");
                return Outcome::Failure;
            }
        };

        let stdout = join_outcome(out_task, "stdout").await;
        let stderr = join_outcome(err_task, "stderr").await;
        let mut outcome = stdout.combine(stderr);

        // Outcome is marker-driven; a non-zero exit with clean streams
        // still counts as a failure.
        if !status.success() && outcome == Outcome::Success {
            outcome = Outcome::Failure;
        }

        info!(code = ?status.code(), %outcome, "analysis tool exited");
        outcome
    }
}

async fn join_outcome(task: JoinHandle<Outcome>, stream: &str) -> Outcome {
    match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(stream, error = %e, "stream classifier task failed");
            Outcome::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::stream::BufferSink;
    use std::path::PathBuf;
    use std::time::Duration;

    fn script_runner(contents: &str) -> (Runner, Arc<BufferSink>) {
        let sink = Arc::new(BufferSink::new());
        let tool = Tool::EmbeddedScript {
            interpreter: "sh".to_string(),
            file_ext: "sh".to_string(),
            contents: contents.to_string(),
        };
        (Runner::new(tool, Arc::clone(&sink) as Arc<dyn LogSink>), sink)
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            connection: "scott/tiger@db".to_string(),
            ..AnalysisConfig::default()
        }
    }

    #[tokio::test]
    async fn clean_run_is_success() {
        let (runner, sink) = script_runner("echo analyzing\necho done\n");
        let outcome = runner.run(&config()).await.unwrap();

        assert_eq!(outcome, Outcome::Success);
        let lines = sink.lines();
        assert!(lines.contains(&format!("{LOG_PREFIX_OUT}analyzing")));
        assert!(lines.contains(&format!("{LOG_PREFIX_OUT}Analysis completed")));
    }

    #[tokio::test]
    async fn binary_tool_receives_encoded_args() {
        let sink = Arc::new(BufferSink::new());
        let runner = Runner::new(
            Tool::Binary(PathBuf::from("echo")),
            Arc::clone(&sink) as Arc<dyn LogSink>,
        );

        let outcome = runner.run(&config()).await.unwrap();

        assert_eq!(outcome, Outcome::Success);
        let echoed = sink
            .lines()
            .into_iter()
            .find(|l| l.contains("-ruleSet"))
            .expect("echoed argument vector");
        assert!(echoed.contains("-connection"));
        assert!(echoed.contains("-reportFolder"));
    }

    #[tokio::test]
    async fn warning_on_stdout_is_unstable() {
        let (runner, _) = script_runner("echo start\necho 'WARNING: rule X violated'\necho done\n");
        assert_eq!(runner.run(&config()).await.unwrap(), Outcome::Unstable);
    }

    #[tokio::test]
    async fn error_on_stderr_beats_clean_stdout() {
        let (runner, sink) = script_runner("echo all good\necho 'ERROR: connection refused' 1>&2\n");
        assert_eq!(runner.run(&config()).await.unwrap(), Outcome::Failure);
        assert!(sink
            .lines()
            .contains(&format!("{LOG_PREFIX_ERR}ERROR: connection refused")));
    }

    #[tokio::test]
    async fn nonzero_exit_with_clean_streams_is_failure() {
        let (runner, _) = script_runner("echo quiet exit\nexit 3\n");
        assert_eq!(runner.run(&config()).await.unwrap(), Outcome::Failure);
    }

    #[tokio::test]
    async fn nonzero_exit_does_not_downgrade_markers() {
        let (runner, _) = script_runner("echo 'WARNING: threshold close'\nexit 1\n");
        // Unstable from the marker survives; the exit fold only applies
        // to otherwise-clean runs.
        assert_eq!(runner.run(&config()).await.unwrap(), Outcome::Unstable);
    }

    #[tokio::test]
    async fn interrupt_aborts_and_cleans_up() {
        let (runner, sink) = script_runner("echo \"WORKDIR:$(dirname \"$0\")\"\nsleep 10\n");

        let interrupt = CancellationToken::new();
        let trigger = interrupt.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let outcome = runner
            .run_with_interrupt(&config(), interrupt)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Aborted);

        let workdir = sink
            .lines()
            .into_iter()
            .find_map(|l| {
                l.strip_prefix(LOG_PREFIX_OUT)
                    .and_then(|l| l.strip_prefix("WORKDIR:"))
                    .map(str::to_string)
            })
            .expect("script reported its workspace");
        assert!(
            !Path::new(&workdir).exists(),
            "workspace must be removed even on abort"
        );
    }

    #[tokio::test]
    async fn spawn_failure_fails_fast() {
        let sink = Arc::new(BufferSink::new());
        let runner = Runner::new(
            Tool::Binary(PathBuf::from("/no/such/analyzer-binary")),
            sink as Arc<dyn LogSink>,
        );

        let err = runner.run(&config()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Spawn(_)));
    }

    #[tokio::test]
    async fn reports_are_harvested_on_failure_too() {
        let dest = tempfile::tempdir().unwrap();
        let (runner, _) = script_runner(
            "dir=$(dirname \"$0\")\necho 'report' > \"$dir/audit.html\"\necho 'ERROR: rule engine crashed' 1>&2\n",
        );

        let cfg = AnalysisConfig {
            report: ReportConfig {
                name: "audit".to_string(),
                folder: dest.path().to_string_lossy().into_owned(),
                html: true,
                ..ReportConfig::default()
            },
            ..config()
        };

        assert_eq!(runner.run(&cfg).await.unwrap(), Outcome::Failure);
        assert!(dest.path().join("audit.html").is_file());
    }
}

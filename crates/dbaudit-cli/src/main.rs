//! dbaudit - database code-analysis runner.
//!
//! Loads an analysis configuration from JSON, expands environment-variable
//! placeholders, runs one invocation of the analysis tool, and maps the
//! outcome onto the process exit code.
//!
//! ## Commands
//!
//! - `run`: execute one analysis invocation
//! - `rule-sets`: list the built-in rule-set presets

mod expand;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};

use dbaudit_core::{
    init_tracing, AnalysisConfig, Outcome, RuleSet, Runner, Tool, TracingSink,
};

#[derive(Parser)]
#[command(name = "dbaudit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Database code-analysis runner", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one analysis invocation
    Run {
        /// Path to the analysis configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Installed analysis tool executable
        #[arg(long, conflicts_with = "script")]
        tool: Option<PathBuf>,

        /// Analysis script, staged into the private workspace and run
        /// through --interpreter
        #[arg(long)]
        script: Option<PathBuf>,

        /// Interpreter for --script
        #[arg(long, default_value = "powershell")]
        interpreter: String,

        /// Override the report destination folder from the configuration
        #[arg(long)]
        dest: Option<PathBuf>,
    },

    /// List the built-in rule-set presets
    RuleSets,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Run {
            config,
            tool,
            script,
            interpreter,
            dest,
        } => cmd_run(config, tool, script, interpreter, dest).await,
        Commands::RuleSets => {
            cmd_rule_sets();
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn cmd_run(
    config_path: PathBuf,
    tool: Option<PathBuf>,
    script: Option<PathBuf>,
    interpreter: String,
    dest: Option<PathBuf>,
) -> Result<ExitCode> {
    let raw = fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let mut config: AnalysisConfig =
        serde_json::from_str(&raw).context("invalid analysis configuration")?;

    expand::expand_config(&mut config);

    if let Some(dest) = dest {
        config.report.folder = dest.to_string_lossy().into_owned();
    }

    let tool = select_tool(tool, script, interpreter)?;

    // Ctrl-C interrupts the wait; the run settles as Aborted.
    let interrupt = CancellationToken::new();
    let trigger = interrupt.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let runner = Runner::new(tool, Arc::new(TracingSink));
    let outcome = runner
        .run_with_interrupt(&config, interrupt)
        .await
        .context("analysis invocation failed")?;

    info!(%outcome, "analysis finished");
    Ok(ExitCode::from(exit_code(outcome)))
}

fn select_tool(
    tool: Option<PathBuf>,
    script: Option<PathBuf>,
    interpreter: String,
) -> Result<Tool> {
    match (tool, script) {
        (Some(path), None) => Ok(Tool::Binary(path)),
        (None, Some(path)) => {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let file_ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("ps1")
                .to_string();
            Ok(Tool::EmbeddedScript {
                interpreter,
                file_ext,
                contents,
            })
        }
        _ => anyhow::bail!("exactly one of --tool or --script is required"),
    }
}

fn cmd_rule_sets() {
    println!("Available rule sets:");
    for rule_set in RuleSet::ALL {
        println!("  {:>2}  {}", rule_set.code(), rule_set.label());
    }
}

fn exit_code(outcome: Outcome) -> u8 {
    match outcome {
        Outcome::Success => 0,
        Outcome::Failure => 1,
        Outcome::Unstable => 2,
        Outcome::Aborted => 3,
    }
}

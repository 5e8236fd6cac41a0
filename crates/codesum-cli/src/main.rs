//! codesum CLI
//!
//! Summarises the classes, functions, enums, structs, macros and includes of
//! C-family sources in a git working tree into an append-only CSV report.

mod progress;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use codesum_core::{Config, Pipeline, RunOutcome};
use codesum_indexer::ChangeScope;
use progress::BarProgress;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "codesum")]
#[command(about = "Index C/C++ sources of a git repository into a CSV report")]
#[command(version)]
struct Cli {
    /// Working tree to index
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Report file (default: "code documentation/parsed_data.csv" under the root)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of files parsed concurrently
    #[arg(short, long)]
    workers: Option<usize>,

    /// Config file to use instead of the usual lookup
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// What counts as a changed file
    #[arg(long, value_enum)]
    scope: Option<ScopeArg>,

    /// Treat untracked files as changed
    #[arg(long)]
    include_untracked: bool,

    /// Do not re-parse changed files on the run that creates the report
    #[arg(long)]
    skip_changes_on_first_run: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    /// Staged and unstaged changes since the last commit
    SinceHead,
    /// Changes not yet staged
    Unstaged,
}

impl From<ScopeArg> for ChangeScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::SinceHead => ChangeScope::SinceHead,
            ScopeArg::Unstaged => ChangeScope::Unstaged,
        }
    }
}

impl Cli {
    /// Flags win over config values.
    fn apply(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            config.report_path = output.clone();
        }
        if let Some(workers) = self.workers {
            config.worker_count = workers;
        }
        if let Some(scope) = self.scope {
            config.scope = scope.into();
        }
        if self.include_untracked {
            config.include_untracked = true;
        }
        if self.skip_changes_on_first_run {
            config.skip_changes_on_first_run = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config decides the log level, so anything it logs goes to a fixed
    // warn-level subscriber
    let mut config = {
        let bootstrap = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("warn"))
            .with_writer(std::io::stderr)
            .with_target(false)
            .finish();
        tracing::subscriber::with_default(bootstrap, || load_config(&cli))?
    };
    cli.apply(&mut config);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!(root = ?cli.root, config = ?config, "Resolved configuration");

    let mut pipeline = Pipeline::new(&cli.root, config);
    if !cli.no_progress {
        pipeline = pipeline.with_progress(Arc::new(BarProgress::new()));
    }

    let summary = pipeline
        .run()
        .await
        .with_context(|| format!("Failed to index {}", cli.root.display()))?;

    let outcome = summary.outcome();
    println!("{}", outcome);

    if outcome == RunOutcome::Completed {
        let failures = summary.failures();
        if !failures.is_empty() {
            println!("----- {} file(s) could not be parsed:", failures.len());
            for name in failures {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(Config::load(&cli.root)),
    }
}

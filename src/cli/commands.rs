//! CLI command definitions for pipeforge.
//!
//! One command, `run`, drives the whole pipeline: load the YAML
//! configuration, apply dotted-path overrides, select the requested
//! steps, and execute them in canonical order through MLflow.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use crate::config::Config;
use crate::execution::MlflowLauncher;
use crate::pipeline::{PipelineOrchestrator, RunContext, UnknownStepPolicy};

/// Default configuration file path.
const DEFAULT_CONFIG: &str = "config.yaml";

/// ML pipeline driver.
#[derive(Parser)]
#[command(name = "pipeforge")]
#[command(about = "Drive the ML pipeline: download, preprocess, validate, split, train, evaluate")]
#[command(version)]
#[command(
    long_about = "pipeforge executes the declared pipeline steps as MLflow jobs in canonical order.\n\nEach step reads and writes named artifacts in the tracking store; steps can be re-run individually against artifacts from earlier runs.\n\nExample usage:\n  pipeforge run --steps download,preprocess --set data.test_size=0.3"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Execute the selected pipeline steps in canonical order.
    Run(RunArgs),
}

/// Arguments for `pipeforge run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the pipeline configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG, env = "PIPEFORGE_CONFIG")]
    pub config: PathBuf,

    /// Directory containing one MLflow project per step.
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Steps to execute (comma-separated). Shorthand for
    /// --set main.execute_steps=...
    #[arg(short, long)]
    pub steps: Option<String>,

    /// Configuration override as a dotted key=value pair
    /// (e.g. --set data.test_size=0.3). May be repeated.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Ignore unknown step names in the request instead of rejecting
    /// the run.
    #[arg(long)]
    pub lenient_steps: bool,

    /// Print the run summary as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Parses command-line arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Parses arguments and runs the CLI.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Runs the CLI with already-parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run_pipeline(args).await,
    }
}

async fn run_pipeline(args: RunArgs) -> anyhow::Result<()> {
    let mut overrides = args.overrides.clone();
    if let Some(steps) = &args.steps {
        overrides.push(format!("main.execute_steps={}", steps));
    }

    let config = Config::load(&args.config, &overrides)?;

    let policy = if args.lenient_steps {
        UnknownStepPolicy::Lenient
    } else {
        UnknownStepPolicy::Strict
    };

    let context = RunContext::new(config, args.root.clone());
    let orchestrator = PipelineOrchestrator::new(context, Arc::new(MlflowLauncher::new()))
        .with_unknown_step_policy(policy);

    let summary = orchestrator.run().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!(
            run_id = %summary.run_id,
            executed = summary.executed.len(),
            "Run finished"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args_defaults() {
        let cli = Cli::parse_from(["pipeforge", "run"]);
        let Commands::Run(args) = cli.command;
        assert_eq!(args.config, PathBuf::from("config.yaml"));
        assert_eq!(args.root, PathBuf::from("."));
        assert!(args.steps.is_none());
        assert!(args.overrides.is_empty());
        assert!(!args.lenient_steps);
    }

    #[test]
    fn test_run_args_collect_repeated_overrides() {
        let cli = Cli::parse_from([
            "pipeforge",
            "run",
            "--set",
            "data.test_size=0.5",
            "--set",
            "main.random_seed=7",
            "--steps",
            "download,preprocess",
        ]);
        let Commands::Run(args) = cli.command;
        assert_eq!(
            args.overrides,
            vec!["data.test_size=0.5", "main.random_seed=7"]
        );
        assert_eq!(args.steps.as_deref(), Some("download,preprocess"));
    }

    #[test]
    fn test_global_log_level_flag() {
        let cli = Cli::parse_from(["pipeforge", "run", "--log-level", "debug"]);
        assert_eq!(cli.log_level, "debug");
    }
}

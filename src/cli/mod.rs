//! Command-line interface for pipeforge.
//!
//! Provides the `run` command that loads configuration, applies
//! overrides, and drives the pipeline orchestrator.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli};

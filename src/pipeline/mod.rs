//! Pipeline orchestration.
//!
//! This module owns the only real control flow in the crate:
//!
//! - **Step** (`step`): the fixed step set and its canonical execution
//!   order, plus selection of the requested subset
//! - **Params** (`params`): the typed parameter contract each step's
//!   external job is invoked with
//! - **Orchestrator** (`orchestrator`): sequential, fail-fast execution
//!   of the selected steps through a [`crate::execution::JobLauncher`]
//!
//! # Pipeline Flow
//!
//! 1. The requested steps (delimited string or explicit list) are
//!    resolved once into the canonical-ordered subsequence
//! 2. For each selected step, its parameter mapping is built from the
//!    run context: configuration literals, `name:latest` artifact
//!    references, and the materialized model config where the step
//!    consumes a file
//! 3. The step's job is launched and awaited; a failure stops the run,
//!    and artifacts registered by earlier steps stay valid in the store
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pipeforge::config::Config;
//! use pipeforge::execution::MlflowLauncher;
//! use pipeforge::pipeline::{PipelineOrchestrator, RunContext};
//!
//! let config = Config::load("config.yaml".as_ref(), &[])?;
//! let context = RunContext::new(config, "./pipeline");
//! let orchestrator = PipelineOrchestrator::new(context, Arc::new(MlflowLauncher::new()));
//!
//! let summary = orchestrator.run().await?;
//! println!("executed {} steps", summary.executed.len());
//! ```

pub mod orchestrator;
pub mod params;
pub mod step;

// Re-export main types for convenience
pub use orchestrator::{PipelineError, PipelineOrchestrator, RunContext, RunSummary};
pub use params::{
    CheckDataParams, DownloadParams, EvaluateParams, PreprocessParams, RandomForestParams,
    SegregateParams, StepParams,
};
pub use step::{select_steps, SelectError, Step, UnknownStepPolicy};

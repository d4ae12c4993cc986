//! Sequential pipeline orchestration with fail-fast semantics.
//!
//! The orchestrator owns the canonical step sequence. For each selected
//! step, in order, it builds the step's parameter mapping (artifact
//! references, configuration literals, and the materialized model
//! config where required), launches the step's external job, and blocks
//! until the job terminates. The first failure stops the run; artifacts
//! already produced by earlier steps stay valid in the store.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::materialize::{self, MaterializeError};
use crate::config::{Config, ConfigError};
use crate::execution::{JobInvocation, JobLauncher, LaunchError, ENTRY_POINT};
use crate::store::{artifacts, ArtifactRef};

use super::params::{
    CheckDataParams, DownloadParams, EvaluateParams, PreprocessParams, RandomForestParams,
    SegregateParams, StepParams,
};
use super::step::{select_steps, SelectError, Step, UnknownStepPolicy};

/// Errors that can abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error (missing or malformed field).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Requested step set could not be resolved.
    #[error("Configuration error: {0}")]
    Selection(#[from] SelectError),

    /// Materializing the model configuration failed.
    #[error("Materialization error: {0}")]
    Materialize(#[from] MaterializeError),

    /// A step's external job failed; later steps were not attempted.
    #[error("Step '{step}' failed at position {position}: {source}")]
    StepFailed {
        step: Step,
        position: usize,
        #[source]
        source: LaunchError,
    },
}

impl PipelineError {
    /// The failing step and its position in the executed sequence, when
    /// the run got as far as launching jobs.
    pub fn failed_step(&self) -> Option<(Step, usize)> {
        match self {
            PipelineError::StepFailed { step, position, .. } => Some((*step, *position)),
            _ => None,
        }
    }
}

/// Shared, read-only context for one pipeline run.
///
/// Built once before any step executes; every job observes the same
/// values. Grouping identifiers travel with the context instead of
/// process-wide environment state.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Grouping identifier for the whole run.
    pub project_name: String,
    /// Sub-grouping identifier for the whole run.
    pub run_group: String,
    /// Directory containing one step project per declared step.
    pub root: PathBuf,
    /// Full configuration tree.
    pub config: Config,
}

impl RunContext {
    /// Builds the context from validated configuration and the pipeline
    /// root directory.
    pub fn new(config: Config, root: impl Into<PathBuf>) -> Self {
        Self {
            project_name: config.main.project_name.clone(),
            run_group: config.main.experiment_name.clone(),
            root: root.into(),
            config,
        }
    }
}

/// Summary of a completed run. The run itself persists nothing; its
/// effects are the artifacts the step jobs registered in the store.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Identifier for this invocation.
    pub run_id: Uuid,
    /// Steps executed, in canonical order.
    pub executed: Vec<Step>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the last step finished.
    pub finished_at: DateTime<Utc>,
}

/// Drives the selected steps through their external jobs, one at a time.
pub struct PipelineOrchestrator {
    context: RunContext,
    launcher: Arc<dyn JobLauncher>,
    policy: UnknownStepPolicy,
}

impl PipelineOrchestrator {
    /// Creates an orchestrator with the default (strict) unknown-step
    /// policy.
    pub fn new(context: RunContext, launcher: Arc<dyn JobLauncher>) -> Self {
        Self {
            context,
            launcher,
            policy: UnknownStepPolicy::default(),
        }
    }

    /// Sets how unrecognized step names in the request are treated.
    pub fn with_unknown_step_policy(mut self, policy: UnknownStepPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The run context every step observes.
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Executes the run: resolve the selection once, then invoke each
    /// step's job in canonical order, stopping at the first failure.
    ///
    /// An empty selection is a valid run that completes without
    /// launching any job.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::StepFailed` naming the step, its position
    /// and the cause when a job fails; configuration and materialization
    /// problems surface before the affected job is launched.
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        let steps = select_steps(&self.context.config.main.execute_steps, self.policy)?;

        info!(
            run_id = %run_id,
            project = %self.context.project_name,
            group = %self.context.run_group,
            selected = steps.len(),
            "Pipeline run starting"
        );

        for (position, step) in steps.iter().copied().enumerate() {
            let params = self.build_params(step)?;
            let invocation = JobInvocation {
                step_dir: self.context.root.join(step.name()),
                entry_point: ENTRY_POINT.to_string(),
                params: params
                    .to_args()
                    .into_iter()
                    .map(|(key, value)| (key.to_string(), value))
                    .collect(),
                project_name: self.context.project_name.clone(),
                run_group: self.context.run_group.clone(),
            };

            info!(step = %step, position, "Launching step job");
            self.launcher
                .launch(&invocation)
                .await
                .map_err(|source| PipelineError::StepFailed {
                    step,
                    position,
                    source,
                })?;
            info!(step = %step, position, "Step completed");
        }

        let summary = RunSummary {
            run_id,
            executed: steps,
            started_at,
            finished_at: Utc::now(),
        };
        info!(run_id = %run_id, executed = summary.executed.len(), "Pipeline run completed");
        Ok(summary)
    }

    /// Builds the typed parameter set for one step.
    ///
    /// Input references always use `latest`: whether the upstream
    /// artifact exists is the store's decision at job time, which is
    /// what allows running a step without its producer in the same
    /// invocation.
    fn build_params(&self, step: Step) -> Result<StepParams, PipelineError> {
        let config = &self.context.config;

        let params = match step {
            Step::Download => StepParams::Download(DownloadParams {
                file_url: config.data.file_url.clone(),
                artifact_name: artifacts::RAW_DATA_NAME.to_string(),
                artifact_type: artifacts::RAW_DATA_TYPE.to_string(),
                artifact_description: artifacts::RAW_DATA_DESCRIPTION.to_string(),
            }),
            Step::Preprocess => StepParams::Preprocess(PreprocessParams {
                input_artifact: ArtifactRef::latest(artifacts::RAW_DATA_NAME),
                artifact_name: artifacts::PREPROCESSED_NAME.to_string(),
                artifact_type: artifacts::PREPROCESSED_TYPE.to_string(),
                artifact_description: artifacts::PREPROCESSED_DESCRIPTION.to_string(),
            }),
            Step::CheckData => StepParams::CheckData(CheckDataParams {
                reference_artifact: config.data.reference_dataset.clone(),
                sample_artifact: ArtifactRef::latest(artifacts::PREPROCESSED_NAME),
                ks_alpha: config.data.ks_alpha,
            }),
            Step::Segregate => StepParams::Segregate(SegregateParams {
                input_artifact: ArtifactRef::latest(artifacts::PREPROCESSED_NAME),
                artifact_root: artifacts::SPLIT_ROOT.to_string(),
                artifact_type: artifacts::SPLIT_TYPE.to_string(),
                test_size: config.data.test_size,
                random_state: config.main.random_seed,
                stratify: config.data.stratify.clone(),
            }),
            Step::RandomForest => {
                let model_config = materialize::write_model_config(
                    &self.context.root,
                    &config.random_forest_pipeline,
                )?;
                StepParams::RandomForest(RandomForestParams {
                    train_data: ArtifactRef::latest(artifacts::TRAIN_DATA_NAME),
                    model_config,
                    export_artifact: config.export_artifact()?.to_string(),
                    random_seed: config.train_random_state()?,
                    val_size: config.data.val_size,
                    stratify: config.data.stratify.clone(),
                })
            }
            Step::Evaluate => StepParams::Evaluate(EvaluateParams {
                model_export: ArtifactRef::latest(config.export_artifact()?),
                test_data: ArtifactRef::latest(artifacts::TEST_DATA_NAME),
            }),
        };

        Ok(params)
    }
}

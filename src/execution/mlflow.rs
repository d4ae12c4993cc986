//! MLflow-backed job launcher.
//!
//! Runs each step as `mlflow run <step_dir> -e main -P key=value ...`,
//! one blocking process at a time. The run's grouping identifiers are
//! injected into the child process environment only; the orchestrator's
//! own environment is never touched.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{JobInvocation, JobLauncher, LaunchError};

/// Environment variable the external jobs read for the store project.
const PROJECT_ENV: &str = "WANDB_PROJECT";
/// Environment variable the external jobs read for the run group.
const RUN_GROUP_ENV: &str = "WANDB_RUN_GROUP";

/// Launches steps with the `mlflow` CLI.
#[derive(Debug, Clone, Default)]
pub struct MlflowLauncher {
    /// Override for the mlflow binary, for installs outside PATH.
    program: Option<PathBuf>,
}

impl MlflowLauncher {
    /// Launcher using `mlflow` from PATH.
    pub fn new() -> Self {
        Self::default()
    }

    /// Launcher using an explicit mlflow binary.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }

    fn program(&self) -> PathBuf {
        self.program
            .clone()
            .unwrap_or_else(|| PathBuf::from("mlflow"))
    }
}

#[async_trait]
impl JobLauncher for MlflowLauncher {
    async fn launch(&self, invocation: &JobInvocation) -> Result<(), LaunchError> {
        let program = self.program();
        let mut command = Command::new(&program);
        command
            .arg("run")
            .arg(&invocation.step_dir)
            .arg("-e")
            .arg(&invocation.entry_point)
            .env(PROJECT_ENV, &invocation.project_name)
            .env(RUN_GROUP_ENV, &invocation.run_group)
            .stdin(Stdio::null());

        for (key, value) in &invocation.params {
            command.arg("-P").arg(format!("{}={}", key, value));
        }

        debug!(
            step_dir = %invocation.step_dir.display(),
            params = invocation.params.len(),
            "Spawning mlflow run"
        );

        // Job stdout/stderr stream straight through to the operator.
        let status = command.status().await.map_err(|source| LaunchError::Spawn {
            command: program.display().to_string(),
            source,
        })?;

        if !status.success() {
            return Err(LaunchError::JobFailed { status });
        }

        info!(step_dir = %invocation.step_dir.display(), "Job completed");
        Ok(())
    }
}

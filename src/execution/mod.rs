//! External job execution.
//!
//! Steps are opaque MLflow projects invoked as isolated OS processes.
//! The orchestrator talks to them through the `JobLauncher` seam so
//! tests can substitute a recording implementation; the real launcher
//! lives in [`mlflow`].

mod mlflow;

pub use mlflow::MlflowLauncher;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Entry point every step project exposes.
pub const ENTRY_POINT: &str = "main";

/// Errors that can occur while launching an external job.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The job process could not be spawned at all.
    #[error("Failed to spawn job process '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The job ran and terminated abnormally. Covers both nonzero exit
    /// codes and signal termination; artifact-resolution failures inside
    /// the job surface here too.
    #[error("Job exited with {status}")]
    JobFailed { status: std::process::ExitStatus },

    /// Failure injected by a test launcher.
    #[error("Job failed: {0}")]
    Synthetic(String),
}

/// One external job invocation.
///
/// Everything a job observes is in here: the step project to run, its
/// entry point, the parameter mapping, and the run-wide grouping
/// identifiers. Jobs never see orchestrator process state beyond this.
#[derive(Debug, Clone)]
pub struct JobInvocation {
    /// Directory of the step's project under the pipeline root.
    pub step_dir: PathBuf,
    /// Entry point within the project.
    pub entry_point: String,
    /// Ordered `key=value` parameters.
    pub params: Vec<(String, String)>,
    /// Grouping identifier for the whole run.
    pub project_name: String,
    /// Sub-grouping identifier for the whole run.
    pub run_group: String,
}

/// Seam between the orchestrator and the external job system.
///
/// `launch` blocks until the job terminates; returning `Ok(())` means
/// the job completed successfully and any artifacts it declared are now
/// registered in the store.
#[async_trait]
pub trait JobLauncher: Send + Sync {
    async fn launch(&self, invocation: &JobInvocation) -> Result<(), LaunchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_error_display() {
        let err = LaunchError::Synthetic("boom".to_string());
        assert!(err.to_string().contains("boom"));

        let err = LaunchError::Spawn {
            command: "mlflow".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("mlflow"));
    }
}

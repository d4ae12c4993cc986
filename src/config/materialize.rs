//! Materializes a configuration subtree to a file.
//!
//! The training step consumes its hyperparameters as a config file path
//! rather than discrete parameters, so the orchestrator serializes the
//! `random_forest_pipeline` subtree to YAML at a fixed location before
//! launching that step. Mapping key order and sequence order survive the
//! round trip, and re-materializing an unchanged subtree produces
//! byte-identical output.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// File name of the materialized training configuration.
pub const MODEL_CONFIG_FILE: &str = "random_forest_config.yml";

/// Errors that can occur while materializing configuration.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// Subtree could not be serialized.
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File could not be written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serializes `subtree` as YAML to `dir/random_forest_config.yml`,
/// replacing any existing content, and returns the absolute path.
pub fn write_model_config(
    dir: &Path,
    subtree: &serde_yaml::Value,
) -> Result<PathBuf, MaterializeError> {
    let yaml = serde_yaml::to_string(subtree)?;
    let path = dir.join(MODEL_CONFIG_FILE);
    fs::write(&path, yaml)?;
    Ok(fs::canonicalize(&path)?)
}

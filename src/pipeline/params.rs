//! Step parameter contracts.
//!
//! Each step's external job takes a fixed set of named parameters. The
//! structs here carry those parameters with real types; they lower to
//! the ordered `key=value` list the launcher passes on the command line.

use std::path::PathBuf;

use serde::Serialize;

use crate::store::ArtifactRef;

use super::step::Step;

/// Parameters for the download step.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadParams {
    /// Source location of the raw data.
    pub file_url: String,
    /// Name under which the raw data is registered.
    pub artifact_name: String,
    /// Store-side artifact type.
    pub artifact_type: String,
    /// Description attached to the artifact.
    pub artifact_description: String,
}

/// Parameters for the preprocess step.
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessParams {
    /// Raw data reference, resolved by the store at job time.
    pub input_artifact: ArtifactRef,
    /// Name under which the cleaned data is registered.
    pub artifact_name: String,
    /// Store-side artifact type.
    pub artifact_type: String,
    /// Description attached to the artifact.
    pub artifact_description: String,
}

/// Parameters for the data validation step.
#[derive(Debug, Clone, Serialize)]
pub struct CheckDataParams {
    /// Reference dataset the sample is compared against. Taken verbatim
    /// from configuration; may already carry a version suffix.
    pub reference_artifact: String,
    /// Freshly preprocessed sample under test.
    pub sample_artifact: ArtifactRef,
    /// Significance threshold for the KS tests.
    pub ks_alpha: f64,
}

/// Parameters for the segregation step.
#[derive(Debug, Clone, Serialize)]
pub struct SegregateParams {
    /// Preprocessed data to split.
    pub input_artifact: ArtifactRef,
    /// Root name the split artifacts are derived from.
    pub artifact_root: String,
    /// Store-side artifact type of the splits.
    pub artifact_type: String,
    /// Fraction held out as the test split.
    pub test_size: f64,
    /// Seed for the split.
    pub random_state: u64,
    /// Stratification column.
    pub stratify: String,
}

/// Parameters for the training step.
#[derive(Debug, Clone, Serialize)]
pub struct RandomForestParams {
    /// Training split reference.
    pub train_data: ArtifactRef,
    /// Path to the materialized hyperparameter file.
    pub model_config: PathBuf,
    /// Name under which the trained model is exported.
    pub export_artifact: String,
    /// Seed for model training.
    pub random_seed: u64,
    /// Fraction of the training data held out for validation.
    pub val_size: f64,
    /// Stratification column.
    pub stratify: String,
}

/// Parameters for the evaluation step.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluateParams {
    /// Exported model reference.
    pub model_export: ArtifactRef,
    /// Held-out test split reference.
    pub test_data: ArtifactRef,
}

/// Parameters for one step invocation, tagged by step.
#[derive(Debug, Clone, Serialize)]
pub enum StepParams {
    Download(DownloadParams),
    Preprocess(PreprocessParams),
    CheckData(CheckDataParams),
    Segregate(SegregateParams),
    RandomForest(RandomForestParams),
    Evaluate(EvaluateParams),
}

impl StepParams {
    /// The step these parameters belong to.
    pub fn step(&self) -> Step {
        match self {
            StepParams::Download(_) => Step::Download,
            StepParams::Preprocess(_) => Step::Preprocess,
            StepParams::CheckData(_) => Step::CheckData,
            StepParams::Segregate(_) => Step::Segregate,
            StepParams::RandomForest(_) => Step::RandomForest,
            StepParams::Evaluate(_) => Step::Evaluate,
        }
    }

    /// Lowers the parameters to the ordered `(key, value)` pairs passed
    /// to the external job as `-P key=value` arguments.
    pub fn to_args(&self) -> Vec<(&'static str, String)> {
        match self {
            StepParams::Download(p) => vec![
                ("file_url", p.file_url.clone()),
                ("artifact_name", p.artifact_name.clone()),
                ("artifact_type", p.artifact_type.clone()),
                ("artifact_description", p.artifact_description.clone()),
            ],
            StepParams::Preprocess(p) => vec![
                ("input_artifact", p.input_artifact.to_string()),
                ("artifact_name", p.artifact_name.clone()),
                ("artifact_type", p.artifact_type.clone()),
                ("artifact_description", p.artifact_description.clone()),
            ],
            StepParams::CheckData(p) => vec![
                ("reference_artifact", p.reference_artifact.clone()),
                ("sample_artifact", p.sample_artifact.to_string()),
                ("ks_alpha", p.ks_alpha.to_string()),
            ],
            StepParams::Segregate(p) => vec![
                ("input_artifact", p.input_artifact.to_string()),
                ("artifact_root", p.artifact_root.clone()),
                ("artifact_type", p.artifact_type.clone()),
                ("test_size", p.test_size.to_string()),
                ("random_state", p.random_state.to_string()),
                ("stratify", p.stratify.clone()),
            ],
            StepParams::RandomForest(p) => vec![
                ("train_data", p.train_data.to_string()),
                ("model_config", p.model_config.display().to_string()),
                ("export_artifact", p.export_artifact.clone()),
                ("random_seed", p.random_seed.to_string()),
                ("val_size", p.val_size.to_string()),
                ("stratify", p.stratify.clone()),
            ],
            StepParams::Evaluate(p) => vec![
                ("model_export", p.model_export.to_string()),
                ("test_data", p.test_data.to_string()),
            ],
        }
    }
}

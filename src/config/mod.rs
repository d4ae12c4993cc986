//! Pipeline configuration: schema, loading and command-line overrides.
//!
//! Every field the orchestrator reads is enumerated here and validated
//! once at load time. The configuration is read from a YAML file, then
//! dotted-path `key=value` overrides are applied to the raw tree before
//! it is deserialized into the schema, so overrides and file content go
//! through the same validation.

pub mod materialize;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid YAML or does not match the schema.
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// An override is not of the form `key=value`.
    #[error("Invalid override '{0}': expected dotted key=value (e.g. data.test_size=0.3)")]
    InvalidOverride(String),

    /// An override path walks through a node that is not a mapping.
    #[error("Override path '{0}' does not address a mapping")]
    OverridePath(String),

    /// A field the orchestrator requires is absent.
    #[error("Missing required config field: {0}")]
    MissingField(String),

    /// A field is present but its value is out of range.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// YAML error outside file parsing (e.g. re-deserializing the tree).
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Run-wide settings.
    pub main: MainConfig,
    /// Data source and split settings consumed by individual steps.
    pub data: DataConfig,
    /// Hyperparameter subtree for the training step. Kept as an
    /// order-preserving YAML value and materialized to a file verbatim;
    /// the orchestrator only reads `export_artifact` and
    /// `random_forest.random_state` out of it.
    pub random_forest_pipeline: serde_yaml::Value,
}

/// Run-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainConfig {
    /// Grouping identifier for the whole run in the tracking store.
    pub project_name: String,
    /// Sub-grouping identifier (all runs under one experiment).
    pub experiment_name: String,
    /// Requested steps, as a comma-delimited string or an explicit list.
    pub execute_steps: ExecuteSteps,
    /// Seed passed to steps that need determinism.
    pub random_seed: u64,
}

/// Data source and split settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Source location for the download step.
    pub file_url: String,
    /// Reference artifact the validation step compares against.
    pub reference_dataset: String,
    /// Significance threshold for the validation step's KS tests.
    pub ks_alpha: f64,
    /// Fraction of data held out as the test split.
    pub test_size: f64,
    /// Fraction of the training data held out for validation.
    pub val_size: f64,
    /// Stratification column, passed through to split and train steps.
    pub stratify: String,
}

/// Requested steps: either a comma-delimited string (the command-line
/// form) or an explicit ordered list (the config-file form). Both forms
/// resolve to the same canonical execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExecuteSteps {
    /// `"download,preprocess"`
    Delimited(String),
    /// `[download, preprocess]`
    List(Vec<String>),
}

impl ExecuteSteps {
    /// Tokenizes the request into trimmed, non-empty step name tokens.
    /// Duplicate and ordering semantics are handled by step selection,
    /// not here.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            ExecuteSteps::Delimited(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(String::from)
                .collect(),
            ExecuteSteps::List(names) => names
                .iter()
                .map(|name| name.trim())
                .filter(|token| !token.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

impl Config {
    /// Loads configuration from a YAML file, applying dotted-path
    /// `key=value` overrides to the raw tree before deserialization.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed, an
    /// override is malformed, or validation fails.
    pub fn load(path: &Path, overrides: &[String]) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let mut tree: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        for spec in overrides {
            apply_override(&mut tree, spec)?;
        }

        let config: Config = serde_yaml::from_value(tree)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates field values. Called once at load time; steps never
    /// re-validate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.main.project_name.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "main.project_name cannot be empty".to_string(),
            ));
        }

        if self.main.experiment_name.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "main.experiment_name cannot be empty".to_string(),
            ));
        }

        if self.data.file_url.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "data.file_url cannot be empty".to_string(),
            ));
        }

        if self.data.reference_dataset.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "data.reference_dataset cannot be empty".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.data.ks_alpha) {
            return Err(ConfigError::ValidationFailed(
                "data.ks_alpha must be between 0.0 and 1.0".to_string(),
            ));
        }

        if !(0.0..1.0).contains(&self.data.test_size) || self.data.test_size == 0.0 {
            return Err(ConfigError::ValidationFailed(
                "data.test_size must be strictly between 0.0 and 1.0".to_string(),
            ));
        }

        if !(0.0..1.0).contains(&self.data.val_size) || self.data.val_size == 0.0 {
            return Err(ConfigError::ValidationFailed(
                "data.val_size must be strictly between 0.0 and 1.0".to_string(),
            ));
        }

        if self.data.stratify.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "data.stratify cannot be empty".to_string(),
            ));
        }

        if !self.random_forest_pipeline.is_mapping() {
            return Err(ConfigError::ValidationFailed(
                "random_forest_pipeline must be a mapping".to_string(),
            ));
        }

        Ok(())
    }

    /// Name under which the training step exports its model artifact.
    pub fn export_artifact(&self) -> Result<&str, ConfigError> {
        self.random_forest_pipeline
            .get("export_artifact")
            .and_then(serde_yaml::Value::as_str)
            .ok_or_else(|| {
                ConfigError::MissingField("random_forest_pipeline.export_artifact".to_string())
            })
    }

    /// Seed for the training step. The training step owns its seed inside
    /// the hyperparameter subtree; `main.random_seed` only feeds the
    /// segregation step.
    pub fn train_random_state(&self) -> Result<u64, ConfigError> {
        self.random_forest_pipeline
            .get("random_forest")
            .and_then(|subtree| subtree.get("random_state"))
            .and_then(serde_yaml::Value::as_u64)
            .ok_or_else(|| {
                ConfigError::MissingField(
                    "random_forest_pipeline.random_forest.random_state".to_string(),
                )
            })
    }
}

/// Applies one `dotted.path=value` override to the raw YAML tree.
/// Intermediate mappings are created as needed; the value is parsed as
/// YAML so numbers and booleans keep their type.
fn apply_override(tree: &mut serde_yaml::Value, spec: &str) -> Result<(), ConfigError> {
    let (path, raw_value) = spec
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidOverride(spec.to_string()))?;
    if path.is_empty() {
        return Err(ConfigError::InvalidOverride(spec.to_string()));
    }

    let value: serde_yaml::Value = serde_yaml::from_str(raw_value)
        .unwrap_or_else(|_| serde_yaml::Value::String(raw_value.to_string()));

    let (parents, last) = match path.rsplit_once('.') {
        Some((parents, last)) => (parents.split('.').collect::<Vec<_>>(), last),
        None => (Vec::new(), path),
    };
    if last.is_empty() || parents.iter().any(|segment| segment.is_empty()) {
        return Err(ConfigError::InvalidOverride(spec.to_string()));
    }

    let mut node = tree;
    for segment in parents {
        let mapping = node
            .as_mapping_mut()
            .ok_or_else(|| ConfigError::OverridePath(path.to_string()))?;
        let key = serde_yaml::Value::String(segment.to_string());
        if !mapping.contains_key(&key) {
            mapping.insert(
                key.clone(),
                serde_yaml::Value::Mapping(serde_yaml::Mapping::new()),
            );
        }
        node = mapping
            .get_mut(&key)
            .ok_or_else(|| ConfigError::OverridePath(path.to_string()))?;
    }

    let mapping = node
        .as_mapping_mut()
        .ok_or_else(|| ConfigError::OverridePath(path.to_string()))?;
    mapping.insert(serde_yaml::Value::String(last.to_string()), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_YAML: &str = r#"
main:
  project_name: genre_classification
  experiment_name: dev
  execute_steps: download,preprocess
  random_seed: 42
data:
  file_url: "https://example.com/genres.parquet"
  reference_dataset: "genre_classification_prod/preprocessed_data.csv:latest"
  ks_alpha: 0.05
  test_size: 0.3
  val_size: 0.3
  stratify: genre
random_forest_pipeline:
  export_artifact: model_export
  random_forest:
    n_estimators: 100
    random_state: 42
"#;

    fn parse_config(overrides: &[&str]) -> Result<Config, ConfigError> {
        let mut tree: serde_yaml::Value = serde_yaml::from_str(CONFIG_YAML).unwrap();
        for spec in overrides {
            apply_override(&mut tree, spec)?;
        }
        let config: Config = serde_yaml::from_value(tree)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_parse_delimited_steps() {
        let config = parse_config(&[]).unwrap();
        assert_eq!(
            config.main.execute_steps.tokens(),
            vec!["download", "preprocess"]
        );
    }

    #[test]
    fn test_parse_list_steps() {
        let config =
            parse_config(&["main.execute_steps=[segregate, random_forest]"]).unwrap();
        assert_eq!(
            config.main.execute_steps.tokens(),
            vec!["segregate", "random_forest"]
        );
    }

    #[test]
    fn test_tokens_trim_and_drop_empties() {
        let steps = ExecuteSteps::Delimited(" download , ,preprocess,".to_string());
        assert_eq!(steps.tokens(), vec!["download", "preprocess"]);

        let steps = ExecuteSteps::List(vec![" check_data ".to_string(), String::new()]);
        assert_eq!(steps.tokens(), vec!["check_data"]);
    }

    #[test]
    fn test_empty_request_yields_no_tokens() {
        assert!(ExecuteSteps::Delimited(String::new()).tokens().is_empty());
        assert!(ExecuteSteps::List(Vec::new()).tokens().is_empty());
    }

    #[test]
    fn test_override_keeps_scalar_types() {
        let config = parse_config(&["data.test_size=0.5", "main.random_seed=7"]).unwrap();
        assert!((config.data.test_size - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.main.random_seed, 7);
    }

    #[test]
    fn test_override_creates_missing_path() {
        let mut tree: serde_yaml::Value = serde_yaml::from_str(CONFIG_YAML).unwrap();
        apply_override(&mut tree, "random_forest_pipeline.tfidf.max_features=10").unwrap();
        assert_eq!(
            tree["random_forest_pipeline"]["tfidf"]["max_features"],
            serde_yaml::Value::Number(10.into())
        );
    }

    #[test]
    fn test_override_rejects_missing_equals() {
        let mut tree: serde_yaml::Value = serde_yaml::from_str(CONFIG_YAML).unwrap();
        let result = apply_override(&mut tree, "data.test_size");
        assert!(matches!(result, Err(ConfigError::InvalidOverride(_))));
    }

    #[test]
    fn test_override_rejects_scalar_parent() {
        let mut tree: serde_yaml::Value = serde_yaml::from_str(CONFIG_YAML).unwrap();
        let result = apply_override(&mut tree, "main.project_name.inner=x");
        assert!(matches!(result, Err(ConfigError::OverridePath(_))));
    }

    #[test]
    fn test_validation_rejects_out_of_range_test_size() {
        let result = parse_config(&["data.test_size=1.5"]);
        assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn test_validation_rejects_empty_project_name() {
        let result = parse_config(&["main.project_name=\"\""]);
        assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn test_export_artifact_accessor() {
        let config = parse_config(&[]).unwrap();
        assert_eq!(config.export_artifact().unwrap(), "model_export");
    }

    #[test]
    fn test_train_random_state_accessor() {
        let config = parse_config(&[]).unwrap();
        assert_eq!(config.train_random_state().unwrap(), 42);
    }

    #[test]
    fn test_missing_export_artifact_is_an_error() {
        let mut config = parse_config(&[]).unwrap();
        config.random_forest_pipeline = serde_yaml::from_str("random_forest: {}").unwrap();
        assert!(matches!(
            config.export_artifact(),
            Err(ConfigError::MissingField(_))
        ));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let result = Config::load(Path::new("/nonexistent/config.yaml"), &[]);
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}

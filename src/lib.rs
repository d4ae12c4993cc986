//! pipeforge: sequential ML pipeline driver.
//!
//! Drives a multi-stage data/model pipeline — download, preprocess,
//! check_data, segregate, random_forest, evaluate — where each step is
//! an opaque MLflow job reading and writing named, versioned artifacts
//! in an external tracking store. The crate owns step selection,
//! canonical ordering, artifact reference construction, model-config
//! materialization, and sequential fail-fast execution; everything else
//! is the steps' business.

// Core modules
pub mod cli;
pub mod config;
pub mod execution;
pub mod pipeline;
pub mod store;

// Re-export commonly used error types
pub use config::materialize::MaterializeError;
pub use config::ConfigError;
pub use execution::LaunchError;
pub use pipeline::{PipelineError, SelectError};

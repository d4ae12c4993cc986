//! Pipeline step set, canonical ordering and step selection.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ExecuteSteps;

/// A declared pipeline step.
///
/// The variant order is the canonical execution order: selection always
/// restricts this order, never the order steps were requested in. Steps
/// are compiled into the pipeline; none are created or removed at run
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Fetch the raw dataset and register it in the store.
    Download,
    /// Clean the raw dataset into the preprocessed artifact.
    Preprocess,
    /// Statistically validate the preprocessed data against a reference.
    CheckData,
    /// Split the preprocessed data into train and test artifacts.
    Segregate,
    /// Train the model and export it to the store.
    RandomForest,
    /// Evaluate the exported model on the held-out test split.
    Evaluate,
}

impl Step {
    /// Every declared step, in canonical execution order.
    pub const ALL: [Step; 6] = [
        Step::Download,
        Step::Preprocess,
        Step::CheckData,
        Step::Segregate,
        Step::RandomForest,
        Step::Evaluate,
    ];

    /// Stable step name; also the step's project directory under the
    /// pipeline root.
    pub fn name(self) -> &'static str {
        match self {
            Step::Download => "download",
            Step::Preprocess => "preprocess",
            Step::CheckData => "check_data",
            Step::Segregate => "segregate",
            Step::RandomForest => "random_forest",
            Step::Evaluate => "evaluate",
        }
    }

    /// Position in the canonical sequence.
    pub fn position(self) -> usize {
        self as usize
    }

    /// Parses a trimmed request token into a step.
    pub fn from_name(name: &str) -> Option<Step> {
        match name {
            "download" => Some(Step::Download),
            "preprocess" => Some(Step::Preprocess),
            "check_data" => Some(Step::CheckData),
            "segregate" => Some(Step::Segregate),
            "random_forest" => Some(Step::RandomForest),
            "evaluate" => Some(Step::Evaluate),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How to treat request tokens that do not name a declared step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownStepPolicy {
    /// Reject the whole request, naming the bad token.
    #[default]
    Strict,
    /// Drop the token with a warning. Matches the historical behavior
    /// where unknown names were simply never executed.
    Lenient,
}

/// Errors that can occur while resolving the requested step set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    /// A request token does not name a declared step.
    #[error(
        "Unknown step '{0}' in execute_steps (expected one of: download, preprocess, \
         check_data, segregate, random_forest, evaluate)"
    )]
    UnknownStep(String),
}

/// Resolves the requested step set to the canonical-ordered subsequence.
///
/// Duplicates collapse to one occurrence and request order is ignored.
/// An empty request selects nothing, which is a valid run that executes
/// zero steps.
pub fn select_steps(
    request: &ExecuteSteps,
    policy: UnknownStepPolicy,
) -> Result<Vec<Step>, SelectError> {
    let mut requested = [false; Step::ALL.len()];

    for token in request.tokens() {
        match Step::from_name(&token) {
            Some(step) => requested[step.position()] = true,
            None => match policy {
                UnknownStepPolicy::Strict => return Err(SelectError::UnknownStep(token)),
                UnknownStepPolicy::Lenient => {
                    tracing::warn!(step = %token, "Ignoring unknown step in request");
                }
            },
        }
    }

    Ok(Step::ALL
        .into_iter()
        .filter(|step| requested[step.position()])
        .collect())
}

//! Artifact references into the external tracking store.
//!
//! The orchestrator never reads or writes the store itself. It only
//! constructs `name:version` reference strings; step jobs resolve them
//! against the store when they run. The `latest` sentinel means "most
//! recent artifact with this name, from any run", which is what lets a
//! step execute standalone against the output of a previous invocation.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Version tag of an artifact reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArtifactVersion {
    /// Most recent artifact with this name, irrespective of producing run.
    Latest,
    /// A concrete, store-assigned version tag (e.g. `v3`).
    Tag(String),
}

impl fmt::Display for ArtifactVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactVersion::Latest => write!(f, "latest"),
            ArtifactVersion::Tag(tag) => write!(f, "{}", tag),
        }
    }
}

/// Reference to a named, versioned artifact in the external store.
///
/// Construction is pure string building and cannot fail; whether the
/// artifact exists is only decided by the store, inside the step job
/// that resolves the reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactRef {
    /// Artifact name, fixed by the pipeline definition.
    pub name: String,
    /// Version tag, `latest` for every declared step input.
    pub version: ArtifactVersion,
}

impl ArtifactRef {
    /// Reference to the most recent artifact with this name.
    pub fn latest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: ArtifactVersion::Latest,
        }
    }

    /// Reference pinned to a concrete version tag.
    pub fn tagged(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: ArtifactVersion::Tag(tag.into()),
        }
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

/// Error parsing an artifact reference string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid artifact reference '{0}': expected 'name:version'")]
pub struct ParseArtifactRefError(String);

impl FromStr for ArtifactRef {
    type Err = ParseArtifactRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The version is everything after the last colon, so artifact
        // names containing colons keep working.
        let (name, version) = s
            .rsplit_once(':')
            .ok_or_else(|| ParseArtifactRefError(s.to_string()))?;
        if name.is_empty() || version.is_empty() {
            return Err(ParseArtifactRefError(s.to_string()));
        }
        let version = if version == "latest" {
            ArtifactVersion::Latest
        } else {
            ArtifactVersion::Tag(version.to_string())
        };
        Ok(Self {
            name: name.to_string(),
            version,
        })
    }
}

impl Serialize for ArtifactRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ArtifactRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Artifact names, types and descriptions fixed by the pipeline
/// definition. Output names are deterministic and never derived from run
/// parameters.
pub mod artifacts {
    /// Raw dataset registered by the download step.
    pub const RAW_DATA_NAME: &str = "raw_data.parquet";
    /// Store-side type of the raw dataset.
    pub const RAW_DATA_TYPE: &str = "raw_data";
    /// Description attached to the raw dataset.
    pub const RAW_DATA_DESCRIPTION: &str = "Data as downloaded";

    /// Cleaned dataset registered by the preprocess step.
    pub const PREPROCESSED_NAME: &str = "preprocessed_data.csv";
    /// Store-side type of the cleaned dataset.
    pub const PREPROCESSED_TYPE: &str = "preprocessed_data";
    /// Description attached to the cleaned dataset.
    pub const PREPROCESSED_DESCRIPTION: &str = "Data preprocessed";

    /// Root name the segregate step derives its split artifacts from.
    pub const SPLIT_ROOT: &str = "sample";
    /// Store-side type of the split datasets.
    pub const SPLIT_TYPE: &str = "split_data";
    /// Training split produced by the segregate step.
    pub const TRAIN_DATA_NAME: &str = "sample_train.csv";
    /// Held-out test split produced by the segregate step.
    pub const TEST_DATA_NAME: &str = "sample_test.csv";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_reference_display() {
        let reference = ArtifactRef::latest(artifacts::RAW_DATA_NAME);
        assert_eq!(reference.to_string(), "raw_data.parquet:latest");
    }

    #[test]
    fn test_tagged_reference_display() {
        let reference = ArtifactRef::tagged("model_export", "v12");
        assert_eq!(reference.to_string(), "model_export:v12");
    }

    #[test]
    fn test_parse_latest() {
        let reference: ArtifactRef = "preprocessed_data.csv:latest".parse().unwrap();
        assert_eq!(reference.name, "preprocessed_data.csv");
        assert_eq!(reference.version, ArtifactVersion::Latest);
    }

    #[test]
    fn test_parse_keeps_colons_in_name() {
        let reference: ArtifactRef = "team:project/data.csv:v2".parse().unwrap();
        assert_eq!(reference.name, "team:project/data.csv");
        assert_eq!(reference.version, ArtifactVersion::Tag("v2".to_string()));
    }

    #[test]
    fn test_parse_rejects_missing_version() {
        assert!("just_a_name".parse::<ArtifactRef>().is_err());
        assert!(":latest".parse::<ArtifactRef>().is_err());
        assert!("name:".parse::<ArtifactRef>().is_err());
    }

    #[test]
    fn test_serde_round_trip_as_string() {
        let reference = ArtifactRef::latest("sample_train.csv");
        let json = serde_json::to_string(&reference).unwrap();
        assert_eq!(json, "\"sample_train.csv:latest\"");

        let parsed: ArtifactRef = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, reference);
    }

    #[test]
    fn test_fixed_artifact_names() {
        assert_eq!(artifacts::RAW_DATA_NAME, "raw_data.parquet");
        assert_eq!(artifacts::PREPROCESSED_NAME, "preprocessed_data.csv");
        assert_eq!(artifacts::TRAIN_DATA_NAME, "sample_train.csv");
        assert_eq!(artifacts::TEST_DATA_NAME, "sample_test.csv");
        assert_eq!(artifacts::SPLIT_ROOT, "sample");
    }
}

//! Searchable entity kinds.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

/// Identifier shared by every persistent entity.
pub type EntityId = u64;

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Kind of a searchable domain entity.
///
/// This is the result-type universe of the search engine: every bucket of a
/// search response is keyed by one of these, and requesting anything else is
/// a caller error.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Platform,
    Publication,
    Sequence,
    Probe,
    Dataset,
    DatasetCollection,
    Gene,
    GeneSet,
    PhenotypeAnnotation,
}

impl EntityType {
    /// Every supported entity kind, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Platform,
        Self::Publication,
        Self::Sequence,
        Self::Probe,
        Self::Dataset,
        Self::DatasetCollection,
        Self::Gene,
        Self::GeneSet,
        Self::PhenotypeAnnotation,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::Publication => "publication",
            Self::Sequence => "sequence",
            Self::Probe => "probe",
            Self::Dataset => "dataset",
            Self::DatasetCollection => "dataset_collection",
            Self::Gene => "gene",
            Self::GeneSet => "gene_set",
            Self::PhenotypeAnnotation => "phenotype_annotation",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown entity type: {s}")))
    }
}

// ---------------------------------------------------------------------------
// AnnotationLevel
// ---------------------------------------------------------------------------

/// Where an ontology annotation was found relative to the annotated dataset.
///
/// A dataset can be tagged directly, or through one of its samples or one of
/// the factor values of its experimental design.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationLevel {
    Dataset,
    Sample,
    FactorValue,
}

impl AnnotationLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dataset => "dataset",
            Self::Sample => "sample",
            Self::FactorValue => "factor_value",
        }
    }

    /// Human-readable name used in highlight text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dataset => "Dataset",
            Self::Sample => "Sample",
            Self::FactorValue => "FactorValue",
        }
    }
}

impl fmt::Display for AnnotationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

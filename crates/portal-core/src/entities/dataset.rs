use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::entity_kind;
use super::taxon::Taxon;
use crate::enums::EntityId;

/// An expression dataset (experiment).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Dataset {
    pub id: EntityId,
    /// Accession-like short name, e.g. `GSE1234`.
    pub short_name: String,
    pub name: String,
    #[serde(default)]
    pub taxon: Option<Taxon>,
}

entity_kind!(Dataset, Dataset);

/// A named group of datasets.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DatasetCollection {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub taxon: Option<Taxon>,
}

entity_kind!(DatasetCollection, DatasetCollection);

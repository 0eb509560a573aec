use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::entity_kind;
use crate::enums::EntityId;

/// A microarray or sequencing platform (array design).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Platform {
    pub id: EntityId,
    /// Accession-like short name, e.g. `GPL96`.
    pub short_name: String,
    pub name: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub alternate_names: Vec<String>,
}

entity_kind!(Platform, Platform);

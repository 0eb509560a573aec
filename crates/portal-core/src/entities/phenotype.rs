use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::entity_kind;
use crate::enums::EntityId;

/// A phenotype term associated with genes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PhenotypeAnnotation {
    pub id: EntityId,
    pub value: String,
    #[serde(default)]
    pub value_uri: Option<String>,
}

entity_kind!(PhenotypeAnnotation, PhenotypeAnnotation);

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::entity_kind;
use crate::enums::EntityId;

/// A bibliographic reference.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Publication {
    pub id: EntityId,
    pub title: String,
    /// `PubMed` accession, if known.
    #[serde(default)]
    pub accession: Option<String>,
}

entity_kind!(Publication, Publication);

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::entity_kind;
use super::taxon::Taxon;
use crate::enums::EntityId;

/// A gene.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Gene {
    pub id: EntityId,
    pub official_symbol: String,
    #[serde(default)]
    pub ncbi_gene_id: Option<u32>,
    #[serde(default)]
    pub taxon: Option<Taxon>,
}

entity_kind!(Gene, Gene);

/// A named group of genes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GeneSet {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub taxon: Option<Taxon>,
}

entity_kind!(GeneSet, GeneSet);

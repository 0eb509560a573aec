use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{
    Dataset, DatasetCollection, Gene, GeneSet, Identifiable, PhenotypeAnnotation, Platform, Probe,
    Publication, Sequence, Taxon,
};
use crate::enums::{EntityId, EntityType};

/// Any searchable entity, tagged by its kind.
///
/// Search backends produce mixed streams (e.g. probes together with genes);
/// this closed variant lets them travel through one collection without
/// run-time type tests.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entity {
    Platform(Platform),
    Publication(Publication),
    Sequence(Sequence),
    Probe(Probe),
    Dataset(Dataset),
    DatasetCollection(DatasetCollection),
    Gene(Gene),
    GeneSet(GeneSet),
    PhenotypeAnnotation(PhenotypeAnnotation),
}

impl Entity {
    /// Display label: short name for accessioned entities, symbol for genes.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Platform(p) => &p.short_name,
            Self::Publication(p) => &p.title,
            Self::Sequence(s) => &s.name,
            Self::Probe(p) => &p.name,
            Self::Dataset(d) => &d.short_name,
            Self::DatasetCollection(c) => &c.name,
            Self::Gene(g) => &g.official_symbol,
            Self::GeneSet(s) => &s.name,
            Self::PhenotypeAnnotation(p) => &p.value,
        }
    }

    /// The taxon this entity belongs to, for kinds that carry one.
    #[must_use]
    pub const fn taxon(&self) -> Option<&Taxon> {
        match self {
            Self::Dataset(d) => d.taxon.as_ref(),
            Self::DatasetCollection(c) => c.taxon.as_ref(),
            Self::Gene(g) => g.taxon.as_ref(),
            Self::GeneSet(s) => s.taxon.as_ref(),
            Self::Platform(_)
            | Self::Publication(_)
            | Self::Sequence(_)
            | Self::Probe(_)
            | Self::PhenotypeAnnotation(_) => None,
        }
    }
}

impl Identifiable for Entity {
    fn id(&self) -> EntityId {
        match self {
            Self::Platform(e) => e.id,
            Self::Publication(e) => e.id,
            Self::Sequence(e) => e.id,
            Self::Probe(e) => e.id,
            Self::Dataset(e) => e.id,
            Self::DatasetCollection(e) => e.id,
            Self::Gene(e) => e.id,
            Self::GeneSet(e) => e.id,
            Self::PhenotypeAnnotation(e) => e.id,
        }
    }

    fn entity_type(&self) -> EntityType {
        match self {
            Self::Platform(_) => EntityType::Platform,
            Self::Publication(_) => EntityType::Publication,
            Self::Sequence(_) => EntityType::Sequence,
            Self::Probe(_) => EntityType::Probe,
            Self::Dataset(_) => EntityType::Dataset,
            Self::DatasetCollection(_) => EntityType::DatasetCollection,
            Self::Gene(_) => EntityType::Gene,
            Self::GeneSet(_) => EntityType::GeneSet,
            Self::PhenotypeAnnotation(_) => EntityType::PhenotypeAnnotation,
        }
    }
}

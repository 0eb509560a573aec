use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use portal_core::entities::{
    Dataset, DatasetCollection, Entity, Gene, GeneSet, PhenotypeAnnotation, Platform, Probe,
    Publication, Sequence, Taxon,
};
use portal_core::enums::{EntityId, EntityType};

use crate::catalog::{
    AccessPolicy, BlacklistCatalog, BlacklistedEntity, DatasetCatalog, GeneCatalog,
    NamedSetCatalog, PlatformCatalog, TaxonCatalog,
};
use crate::error::{OntologyError, SourceError};
use crate::materialize::EntityLoader;

/// Entity records and relations held in memory.
///
/// Deserializes from JSON, so fixtures can live in files:
///
/// ```
/// use portal_search::memory::MemoryStore;
///
/// let store = MemoryStore::from_json(r#"{
///     "taxa": [{ "id": 1, "scientific_name": "Homo sapiens", "common_name": "human" }],
///     "genes": [{ "id": 10, "official_symbol": "CDK2", "ncbi_gene_id": 1017 }]
/// }"#).unwrap();
/// assert_eq!(store.genes[0].official_symbol, "CDK2");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStore {
    pub taxa: Vec<Taxon>,
    pub platforms: Vec<Platform>,
    pub publications: Vec<Publication>,
    pub sequences: Vec<Sequence>,
    pub probes: Vec<Probe>,
    pub datasets: Vec<Dataset>,
    pub dataset_collections: Vec<DatasetCollection>,
    pub genes: Vec<Gene>,
    pub gene_sets: Vec<GeneSet>,
    pub phenotypes: Vec<PhenotypeAnnotation>,
    /// Platform id to the ids of datasets run on it.
    pub platform_datasets: BTreeMap<EntityId, Vec<EntityId>>,
    /// Probe id to the ids of genes it targets.
    pub probe_genes: BTreeMap<EntityId, Vec<EntityId>>,
    /// Sequence id to the ids of genes it maps to.
    pub sequence_genes: BTreeMap<EntityId, Vec<EntityId>>,
    /// GO group name to member gene ids.
    pub go_groups: BTreeMap<String, Vec<EntityId>>,
    /// Phenotype URI to candidate gene ids.
    pub phenotype_genes: BTreeMap<String, Vec<EntityId>>,
    pub blacklist: Vec<BlacklistedEntity>,
    /// Entities the current caller may not read.
    pub hidden: Vec<(EntityType, EntityId)>,
    pub admin: bool,
}

impl MemoryStore {
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed fixtures.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up any entity by type and id, ignoring visibility.
    #[must_use]
    pub fn entity(&self, entity_type: EntityType, id: EntityId) -> Option<Entity> {
        fn find<T: Clone + Into<Entity>>(
            items: &[T],
            id: EntityId,
            id_of: impl Fn(&T) -> EntityId,
        ) -> Option<Entity> {
            items.iter().find(|e| id_of(e) == id).cloned().map(Into::into)
        }

        match entity_type {
            EntityType::Platform => find(&self.platforms, id, |e| e.id),
            EntityType::Publication => find(&self.publications, id, |e| e.id),
            EntityType::Sequence => find(&self.sequences, id, |e| e.id),
            EntityType::Probe => find(&self.probes, id, |e| e.id),
            EntityType::Dataset => find(&self.datasets, id, |e| e.id),
            EntityType::DatasetCollection => find(&self.dataset_collections, id, |e| e.id),
            EntityType::Gene => find(&self.genes, id, |e| e.id),
            EntityType::GeneSet => find(&self.gene_sets, id, |e| e.id),
            EntityType::PhenotypeAnnotation => find(&self.phenotypes, id, |e| e.id),
        }
    }

    pub(crate) fn genes_by_id(&self, ids: &[EntityId]) -> Vec<Gene> {
        self.genes
            .iter()
            .filter(|g| ids.contains(&g.id))
            .cloned()
            .collect()
    }

    fn is_hidden(&self, entity_type: EntityType, id: EntityId) -> bool {
        self.hidden.contains(&(entity_type, id))
    }
}

pub(crate) fn same_name(candidate: &str, query: &str) -> bool {
    candidate.trim().eq_ignore_ascii_case(query.trim())
}

pub(crate) fn in_taxon(entity_taxon: Option<&Taxon>, taxon: Option<&Taxon>) -> bool {
    match (entity_taxon, taxon) {
        (Some(own), Some(wanted)) => own.id == wanted.id,
        _ => true,
    }
}

impl PlatformCatalog for MemoryStore {
    fn find_by_short_name(&self, short_name: &str) -> Result<Option<Platform>, SourceError> {
        Ok(self
            .platforms
            .iter()
            .find(|p| same_name(&p.short_name, short_name))
            .cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Vec<Platform>, SourceError> {
        Ok(self
            .platforms
            .iter()
            .filter(|p| same_name(&p.name, name))
            .cloned()
            .collect())
    }

    fn find_by_alternate_name(&self, name: &str) -> Result<Vec<Platform>, SourceError> {
        Ok(self
            .platforms
            .iter()
            .filter(|p| p.alternate_names.iter().any(|a| same_name(a, name)))
            .cloned()
            .collect())
    }

    fn find_by_manufacturer(&self, manufacturer: &str) -> Result<Vec<Platform>, SourceError> {
        Ok(self
            .platforms
            .iter()
            .filter(|p| {
                p.manufacturer
                    .as_deref()
                    .is_some_and(|m| same_name(m, manufacturer))
            })
            .cloned()
            .collect())
    }

    fn datasets_for(&self, platform: &Platform) -> Result<Vec<Dataset>, SourceError> {
        let ids = self
            .platform_datasets
            .get(&platform.id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(self
            .datasets
            .iter()
            .filter(|d| ids.contains(&d.id))
            .cloned()
            .collect())
    }
}

impl GeneCatalog for MemoryStore {
    fn find_by_ncbi_id(&self, ncbi_id: u32) -> Result<Option<Gene>, SourceError> {
        Ok(self
            .genes
            .iter()
            .find(|g| g.ncbi_gene_id == Some(ncbi_id))
            .cloned())
    }

    fn go_group_genes(
        &self,
        query: &str,
        taxon: Option<&Taxon>,
    ) -> Result<Vec<Gene>, OntologyError> {
        let query = query.to_lowercase();
        let ids: Vec<EntityId> = self
            .go_groups
            .iter()
            .filter(|(name, _)| name.to_lowercase().contains(&query))
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        Ok(self
            .genes_by_id(&ids)
            .into_iter()
            .filter(|g| in_taxon(g.taxon.as_ref(), taxon))
            .collect())
    }

    fn find_phenotypes(&self, query: &str) -> Result<Vec<PhenotypeAnnotation>, OntologyError> {
        let query = query.to_lowercase();
        Ok(self
            .phenotypes
            .iter()
            .filter(|p| p.value.to_lowercase().contains(&query))
            .cloned()
            .collect())
    }

    fn candidate_genes(
        &self,
        phenotype_uris: &[String],
        taxon: Option<&Taxon>,
    ) -> Result<Vec<Gene>, SourceError> {
        let ids: Vec<EntityId> = phenotype_uris
            .iter()
            .filter_map(|uri| self.phenotype_genes.get(uri))
            .flatten()
            .copied()
            .collect();
        Ok(self
            .genes_by_id(&ids)
            .into_iter()
            .filter(|g| in_taxon(g.taxon.as_ref(), taxon))
            .collect())
    }
}

impl DatasetCatalog for MemoryStore {
    fn find_by_taxon(&self, taxon: &Taxon) -> Result<Vec<Dataset>, SourceError> {
        Ok(self
            .datasets
            .iter()
            .filter(|d| d.taxon.as_ref().is_some_and(|t| t.id == taxon.id))
            .cloned()
            .collect())
    }
}

impl NamedSetCatalog for MemoryStore {
    fn gene_sets_by_name(
        &self,
        name: &str,
        taxon: Option<&Taxon>,
    ) -> Result<Vec<GeneSet>, SourceError> {
        Ok(self
            .gene_sets
            .iter()
            .filter(|s| same_name(&s.name, name) && in_taxon(s.taxon.as_ref(), taxon))
            .cloned()
            .collect())
    }

    fn dataset_collections_by_name(
        &self,
        name: &str,
    ) -> Result<Vec<DatasetCollection>, SourceError> {
        Ok(self
            .dataset_collections
            .iter()
            .filter(|c| same_name(&c.name, name))
            .cloned()
            .collect())
    }
}

impl BlacklistCatalog for MemoryStore {
    fn find_by_accession(&self, accession: &str) -> Result<Option<BlacklistedEntity>, SourceError> {
        Ok(self
            .blacklist
            .iter()
            .find(|b| same_name(&b.accession, accession))
            .cloned())
    }
}

impl TaxonCatalog for MemoryStore {
    fn load_all(&self) -> Result<Vec<Taxon>, SourceError> {
        Ok(self.taxa.clone())
    }

    fn load(&self, id: EntityId) -> Result<Option<Taxon>, SourceError> {
        Ok(self.taxa.iter().find(|t| t.id == id).cloned())
    }
}

impl EntityLoader for MemoryStore {
    fn load(&self, entity_type: EntityType, ids: &[EntityId]) -> Result<Vec<Entity>, SourceError> {
        Ok(ids
            .iter()
            .filter(|id| !self.is_hidden(entity_type, **id))
            .filter_map(|id| self.entity(entity_type, *id))
            .collect())
    }
}

impl AccessPolicy for MemoryStore {
    fn is_admin(&self) -> bool {
        self.admin
    }
}

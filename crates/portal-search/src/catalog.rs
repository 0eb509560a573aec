//! Exact-lookup collaborators used by the per-type search stages.
//!
//! These are the narrow entity-service capabilities the dispatcher needs
//! besides the [`SearchSource`](crate::source::SearchSource) backends: name
//! and accession lookups, relations between entities, and the caller's
//! privileges.

use serde::{Deserialize, Serialize};

use portal_core::entities::{
    Dataset, DatasetCollection, Gene, GeneSet, PhenotypeAnnotation, Platform, Taxon,
};
use portal_core::enums::{EntityId, EntityType};

use crate::error::{OntologyError, SourceError};

pub trait PlatformCatalog: Send + Sync {
    /// # Errors
    ///
    /// Returns [`SourceError`] when the lookup fails.
    fn find_by_short_name(&self, short_name: &str) -> Result<Option<Platform>, SourceError>;

    /// # Errors
    ///
    /// Returns [`SourceError`] when the lookup fails.
    fn find_by_name(&self, name: &str) -> Result<Vec<Platform>, SourceError>;

    /// # Errors
    ///
    /// Returns [`SourceError`] when the lookup fails.
    fn find_by_alternate_name(&self, name: &str) -> Result<Vec<Platform>, SourceError>;

    /// # Errors
    ///
    /// Returns [`SourceError`] when the lookup fails.
    fn find_by_manufacturer(&self, manufacturer: &str) -> Result<Vec<Platform>, SourceError>;

    /// Datasets run on `platform`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the lookup fails.
    fn datasets_for(&self, platform: &Platform) -> Result<Vec<Dataset>, SourceError>;
}

pub trait GeneCatalog: Send + Sync {
    /// # Errors
    ///
    /// Returns [`SourceError`] when the lookup fails.
    fn find_by_ncbi_id(&self, ncbi_id: u32) -> Result<Option<Gene>, SourceError>;

    /// Genes in the Gene Ontology groups matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`OntologyError`] when the GO lookup fails.
    fn go_group_genes(&self, query: &str, taxon: Option<&Taxon>)
    -> Result<Vec<Gene>, OntologyError>;

    /// Phenotype annotations whose value matches `query`.
    ///
    /// # Errors
    ///
    /// Returns [`OntologyError`] when the phenotype ontology lookup fails.
    fn find_phenotypes(&self, query: &str) -> Result<Vec<PhenotypeAnnotation>, OntologyError>;

    /// Candidate genes linked to any of the phenotype URIs.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the lookup fails.
    fn candidate_genes(
        &self,
        phenotype_uris: &[String],
        taxon: Option<&Taxon>,
    ) -> Result<Vec<Gene>, SourceError>;
}

pub trait DatasetCatalog: Send + Sync {
    /// # Errors
    ///
    /// Returns [`SourceError`] when the lookup fails.
    fn find_by_taxon(&self, taxon: &Taxon) -> Result<Vec<Dataset>, SourceError>;
}

/// Curated groups looked up by name.
pub trait NamedSetCatalog: Send + Sync {
    /// # Errors
    ///
    /// Returns [`SourceError`] when the lookup fails.
    fn gene_sets_by_name(
        &self,
        name: &str,
        taxon: Option<&Taxon>,
    ) -> Result<Vec<GeneSet>, SourceError>;

    /// # Errors
    ///
    /// Returns [`SourceError`] when the lookup fails.
    fn dataset_collections_by_name(
        &self,
        name: &str,
    ) -> Result<Vec<DatasetCollection>, SourceError>;
}

/// An accession that must not be loaded into the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistedEntity {
    pub id: EntityId,
    pub accession: String,
    pub entity_type: EntityType,
}

pub trait BlacklistCatalog: Send + Sync {
    /// # Errors
    ///
    /// Returns [`SourceError`] when the lookup fails.
    fn find_by_accession(&self, accession: &str) -> Result<Option<BlacklistedEntity>, SourceError>;
}

pub trait TaxonCatalog: Send + Sync {
    /// # Errors
    ///
    /// Returns [`SourceError`] when the lookup fails.
    fn load_all(&self) -> Result<Vec<Taxon>, SourceError>;

    /// # Errors
    ///
    /// Returns [`SourceError`] when the lookup fails.
    fn load(&self, id: EntityId) -> Result<Option<Taxon>, SourceError>;
}

/// Privileges of the current caller.
pub trait AccessPolicy: Send + Sync {
    fn is_admin(&self) -> bool;
}

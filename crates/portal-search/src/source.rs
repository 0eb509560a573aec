//! Backend search protocol.
//!
//! A [`SearchSource`] is one searchable store: the relational database
//! (exact name and accession matches) or the full-text index (fuzzy
//! matches). Each entity type has its own method returning typed results.
//! Every method defaults to "no results", so a backend implements only the
//! types it can serve.

use portal_core::entities::{
    Dataset, DatasetCollection, Entity, Gene, GeneSet, PhenotypeAnnotation, Platform, Probe,
    Publication, Sequence,
};

use crate::error::SourceError;
use crate::result::SearchResult;
use crate::settings::SearchSettings;

/// Results of one backend call.
pub type SourceResult<T> = Result<Vec<SearchResult<T>>, SourceError>;

pub trait SearchSource: Send + Sync {
    /// Short backend name used in logs and errors.
    fn name(&self) -> &str;

    fn search_platform(&self, _settings: &SearchSettings) -> SourceResult<Platform> {
        Ok(Vec::new())
    }

    fn search_publication(&self, _settings: &SearchSettings) -> SourceResult<Publication> {
        Ok(Vec::new())
    }

    fn search_dataset_collection(
        &self,
        _settings: &SearchSettings,
    ) -> SourceResult<DatasetCollection> {
        Ok(Vec::new())
    }

    fn search_sequence(&self, _settings: &SearchSettings) -> SourceResult<Sequence> {
        Ok(Vec::new())
    }

    /// Sequences matching the query, together with the genes they map to.
    ///
    /// `previous_genes` carries gene results the caller already computed for
    /// the same settings; a backend that would otherwise search genes again
    /// should reuse them.
    fn search_sequence_and_gene(
        &self,
        settings: &SearchSettings,
        _previous_genes: Option<&[SearchResult<Gene>]>,
    ) -> SourceResult<Entity> {
        Ok(self
            .search_sequence(settings)?
            .into_iter()
            .map(SearchResult::into_entity)
            .collect())
    }

    fn search_probe(&self, _settings: &SearchSettings) -> SourceResult<Probe> {
        Ok(Vec::new())
    }

    /// Probes matching the query, together with the genes they target.
    fn search_probe_and_gene(&self, settings: &SearchSettings) -> SourceResult<Entity> {
        Ok(self
            .search_probe(settings)?
            .into_iter()
            .map(SearchResult::into_entity)
            .collect())
    }

    fn search_dataset(&self, _settings: &SearchSettings) -> SourceResult<Dataset> {
        Ok(Vec::new())
    }

    fn search_gene(&self, _settings: &SearchSettings) -> SourceResult<Gene> {
        Ok(Vec::new())
    }

    fn search_gene_set(&self, _settings: &SearchSettings) -> SourceResult<GeneSet> {
        Ok(Vec::new())
    }

    fn search_phenotype(&self, _settings: &SearchSettings) -> SourceResult<PhenotypeAnnotation> {
        Ok(Vec::new())
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};

use portal_core::entities::{
    Dataset, DatasetCollection, Entity, Gene, GeneSet, Identifiable, PhenotypeAnnotation,
    Platform, Probe, Publication, Sequence,
};
use portal_core::enums::EntityType;

use super::store::{MemoryStore, in_taxon, same_name};
use crate::error::SourceError;
use crate::rank::ResultAccumulator;
use crate::result::SearchResult;
use crate::settings::SearchSettings;
use crate::source::{SearchSource, SourceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchMode {
    /// Case-insensitive equality, score 1.0.
    Exact,
    /// Case-insensitive substring, scored by how much of the field matched.
    Substring,
}

/// A [`SearchSource`] over a [`MemoryStore`].
///
/// [`MemorySource::database`] behaves like an exact-match relational
/// backend; [`MemorySource::index`] like a fuzzy full-text index. Calls are
/// counted per method so tests can check which backends a search touched.
#[derive(Debug)]
pub struct MemorySource {
    name: String,
    store: Arc<MemoryStore>,
    mode: MatchMode,
    failing: BTreeSet<EntityType>,
    calls: Mutex<BTreeMap<&'static str, usize>>,
}

impl MemorySource {
    #[must_use]
    pub fn database(store: Arc<MemoryStore>) -> Self {
        Self::with_mode("database", store, MatchMode::Exact)
    }

    #[must_use]
    pub fn index(store: Arc<MemoryStore>) -> Self {
        Self::with_mode("index", store, MatchMode::Substring)
    }

    fn with_mode(name: &str, store: Arc<MemoryStore>, mode: MatchMode) -> Self {
        Self {
            name: name.to_string(),
            store,
            mode,
            failing: BTreeSet::new(),
            calls: Mutex::new(BTreeMap::new()),
        }
    }

    /// Make every search for `entity_type` fail.
    #[must_use]
    pub fn failing_for(mut self, entity_type: EntityType) -> Self {
        self.failing.insert(entity_type);
        self
    }

    /// How often `method` (e.g. `"search_gene"`) was called.
    #[must_use]
    pub fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    fn enter(&self, method: &'static str, entity_type: EntityType) -> Result<(), SourceError> {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(method)
            .or_default() += 1;
        if self.failing.contains(&entity_type) {
            return Err(SourceError::backend(&self.name, format!("{method} unavailable")));
        }
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn score(&self, query: &str, fields: &[&str]) -> Option<f64> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        fields
            .iter()
            .filter_map(|field| match self.mode {
                MatchMode::Exact => same_name(field, &query).then_some(1.0),
                MatchMode::Substring => {
                    let field = field.to_lowercase();
                    field
                        .contains(&query)
                        .then(|| (query.len() as f64 / field.len() as f64).min(1.0))
                }
            })
            .max_by(f64::total_cmp)
    }

    fn matched<T: Identifiable + Clone>(
        &self,
        settings: &SearchSettings,
        items: &[T],
        fields: impl Fn(&T) -> Vec<&str>,
        keep: impl Fn(&T) -> bool,
    ) -> Vec<SearchResult<T>> {
        let mut results: Vec<SearchResult<T>> = items
            .iter()
            .filter(|item| keep(item))
            .filter_map(|item| {
                let score = self.score(settings.query(), &fields(item))?;
                let mut result = SearchResult::with_score(item.clone(), score);
                if settings.do_highlighting() {
                    result.set_highlighted_text(Some(format!("{} match", self.name)));
                }
                Some(result)
            })
            .collect();
        results.sort_by(SearchResult::by_score);
        results
    }
}

impl SearchSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn search_platform(&self, settings: &SearchSettings) -> SourceResult<Platform> {
        self.enter("search_platform", EntityType::Platform)?;
        Ok(self.matched(
            settings,
            &self.store.platforms,
            |p| vec![p.short_name.as_str(), p.name.as_str()],
            |_| true,
        ))
    }

    fn search_publication(&self, settings: &SearchSettings) -> SourceResult<Publication> {
        self.enter("search_publication", EntityType::Publication)?;
        Ok(self.matched(
            settings,
            &self.store.publications,
            |p| {
                let mut fields = vec![p.title.as_str()];
                fields.extend(p.accession.as_deref());
                fields
            },
            |_| true,
        ))
    }

    fn search_dataset_collection(
        &self,
        settings: &SearchSettings,
    ) -> SourceResult<DatasetCollection> {
        self.enter("search_dataset_collection", EntityType::DatasetCollection)?;
        Ok(self.matched(
            settings,
            &self.store.dataset_collections,
            |c| vec![c.name.as_str()],
            |c| in_taxon(c.taxon.as_ref(), settings.taxon()),
        ))
    }

    fn search_sequence(&self, settings: &SearchSettings) -> SourceResult<Sequence> {
        self.enter("search_sequence", EntityType::Sequence)?;
        Ok(self.matched(
            settings,
            &self.store.sequences,
            |s| vec![s.name.as_str()],
            |_| true,
        ))
    }

    fn search_sequence_and_gene(
        &self,
        settings: &SearchSettings,
        previous_genes: Option<&[SearchResult<Gene>]>,
    ) -> SourceResult<Entity> {
        self.enter("search_sequence_and_gene", EntityType::Sequence)?;
        let sequences = self.search_sequence(settings)?;
        let genes = match previous_genes {
            Some(genes) => genes.to_vec(),
            None => self.search_gene(settings)?,
        };

        let mut results: ResultAccumulator = ResultAccumulator::new();
        for sequence in &sequences {
            let mapped = self
                .store
                .sequence_genes
                .get(&sequence.result_id())
                .map(|ids| self.store.genes_by_id(ids))
                .unwrap_or_default();
            results.extend(
                mapped
                    .into_iter()
                    .map(|g| SearchResult::with_score(g, sequence.score()).into_entity()),
            );
        }
        results.extend(sequences.into_iter().map(SearchResult::into_entity));
        results.extend(genes.into_iter().map(SearchResult::into_entity));
        Ok(results.into_vec())
    }

    fn search_probe(&self, settings: &SearchSettings) -> SourceResult<Probe> {
        self.enter("search_probe", EntityType::Probe)?;
        let constraint = settings.platform_constraint().map(|p| p.id);
        Ok(self.matched(
            settings,
            &self.store.probes,
            |p| vec![p.name.as_str()],
            |p| {
                constraint.is_none_or(|id| p.platform.as_ref().is_some_and(|pl| pl.id == id))
            },
        ))
    }

    fn search_probe_and_gene(&self, settings: &SearchSettings) -> SourceResult<Entity> {
        self.enter("search_probe_and_gene", EntityType::Probe)?;
        let probes = self.search_probe(settings)?;

        let mut results: ResultAccumulator = ResultAccumulator::new();
        for probe in &probes {
            let targets = self
                .store
                .probe_genes
                .get(&probe.result_id())
                .map(|ids| self.store.genes_by_id(ids))
                .unwrap_or_default();
            results.extend(
                targets
                    .into_iter()
                    .filter(|g| in_taxon(g.taxon.as_ref(), settings.taxon()))
                    .map(|g| SearchResult::with_score(g, probe.score()).into_entity()),
            );
        }
        results.extend(probes.into_iter().map(SearchResult::into_entity));
        Ok(results.into_vec())
    }

    fn search_dataset(&self, settings: &SearchSettings) -> SourceResult<Dataset> {
        self.enter("search_dataset", EntityType::Dataset)?;
        let mode = self.mode;
        Ok(self.matched(
            settings,
            &self.store.datasets,
            |d| match mode {
                MatchMode::Exact => vec![d.short_name.as_str()],
                MatchMode::Substring => vec![d.short_name.as_str(), d.name.as_str()],
            },
            |d| in_taxon(d.taxon.as_ref(), settings.taxon()),
        ))
    }

    fn search_gene(&self, settings: &SearchSettings) -> SourceResult<Gene> {
        self.enter("search_gene", EntityType::Gene)?;
        Ok(self.matched(
            settings,
            &self.store.genes,
            |g| vec![g.official_symbol.as_str()],
            |g| in_taxon(g.taxon.as_ref(), settings.taxon()),
        ))
    }

    fn search_gene_set(&self, settings: &SearchSettings) -> SourceResult<GeneSet> {
        self.enter("search_gene_set", EntityType::GeneSet)?;
        Ok(self.matched(
            settings,
            &self.store.gene_sets,
            |s| vec![s.name.as_str()],
            |s| in_taxon(s.taxon.as_ref(), settings.taxon()),
        ))
    }

    fn search_phenotype(&self, settings: &SearchSettings) -> SourceResult<PhenotypeAnnotation> {
        self.enter("search_phenotype", EntityType::PhenotypeAnnotation)?;
        Ok(self.matched(
            settings,
            &self.store.phenotypes,
            |p| vec![p.value.as_str()],
            |_| true,
        ))
    }
}

//! The search engine.
//!
//! [`SearchService`] takes a [`SearchSettings`] and returns results grouped
//! by entity type. A query is answered along one of two paths:
//!
//! - **term path**: the query is an ontology term URI. Datasets annotated
//!   with the term (or, for a gene URI, the gene and its datasets) are
//!   returned directly. Types the URI did not answer fall through to the
//!   general path; admins always get both.
//! - **general path**: the query is free text. Each requested type is
//!   gathered by its own stage from the database, the full-text index, and
//!   the ontology annotations, in a fixed order.
//!
//! Both paths end with the same merge-rank-limit step and the
//! materialization gate.

mod stages;
mod uri;

use std::collections::BTreeSet;
use std::sync::Arc;

use portal_config::{PortalConfig, SearchConfig};
use portal_core::entities::{EntityKind, Gene, Taxon};
use portal_core::enums::{EntityId, EntityType};
use portal_core::value_object::ValueObject;

use crate::cache::ChildTermCache;
use crate::catalog::{
    AccessPolicy, BlacklistCatalog, DatasetCatalog, GeneCatalog, NamedSetCatalog, PlatformCatalog,
    TaxonCatalog,
};
use crate::characteristic::{CharacteristicSearch, CharacteristicService};
use crate::convert::{ValueObjectConverter, ValueObjectRegistry};
use crate::error::{SearchError, SourceError};
use crate::materialize::{self, EntityLoader};
use crate::ontology::OntologyService;
use crate::rank::{ResultAccumulator, SearchResultMap, sorted_limited_results};
use crate::result::SearchResult;
use crate::settings::SearchSettings;
use crate::source::SearchSource;
use crate::taxon::{TaxonLookup, strip_short_terms};
use crate::timing::StageTimer;

/// Everything the engine talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub ontology: Arc<dyn OntologyService>,
    pub annotations: Arc<dyn CharacteristicService>,
    /// Exact-match backend.
    pub database: Arc<dyn SearchSource>,
    /// Full-text backend.
    pub index: Arc<dyn SearchSource>,
    pub genes: Arc<dyn GeneCatalog>,
    pub platforms: Arc<dyn PlatformCatalog>,
    pub datasets: Arc<dyn DatasetCatalog>,
    pub named_sets: Arc<dyn NamedSetCatalog>,
    pub blacklist: Arc<dyn BlacklistCatalog>,
    pub taxa: Arc<dyn TaxonCatalog>,
    pub loader: Arc<dyn EntityLoader>,
    pub access: Arc<dyn AccessPolicy>,
}

pub struct SearchServiceBuilder {
    collaborators: Collaborators,
    config: PortalConfig,
    converters: ValueObjectRegistry,
    result_types: BTreeSet<EntityType>,
}

impl SearchServiceBuilder {
    #[must_use]
    pub fn config(mut self, config: PortalConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the value-object converter for one entity type.
    #[must_use]
    pub fn converter(
        mut self,
        entity_type: EntityType,
        converter: Arc<dyn ValueObjectConverter>,
    ) -> Self {
        self.converters.register(entity_type, converter);
        self
    }

    /// Restrict the entity types the engine will serve.
    #[must_use]
    pub fn result_types(mut self, types: impl IntoIterator<Item = EntityType>) -> Self {
        self.result_types = types.into_iter().collect();
        self
    }

    /// Initialize the engine.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for an out-of-range search config,
    /// [`SearchError::CacheInit`] when the child-term cache cannot be
    /// created, and [`SearchError::TaxonTable`] when the taxa cannot be loaded.
    pub fn build(self) -> Result<SearchService, SearchError> {
        let Self {
            collaborators,
            config,
            converters,
            result_types,
        } = self;

        config.search.validate()?;

        let child_terms = Arc::new(ChildTermCache::new(
            Arc::clone(&collaborators.ontology),
            &config.cache,
        )?);
        let characteristics = CharacteristicSearch::new(
            Arc::clone(&collaborators.ontology),
            Arc::clone(&collaborators.annotations),
            Arc::clone(&child_terms),
            config.search.individual_batch_size,
            config.search.link_root.clone(),
        );

        let taxa = TaxonLookup::new(
            collaborators
                .taxa
                .load_all()
                .map_err(SearchError::TaxonTable)?,
        );

        tracing::info!(
            result_types = result_types.len(),
            taxon_names = taxa.len(),
            database = collaborators.database.name(),
            index = collaborators.index.name(),
            "search service initialized"
        );

        Ok(SearchService {
            config: config.search,
            collaborators,
            characteristics,
            child_terms,
            taxa,
            converters,
            supported: result_types,
        })
    }
}

pub struct SearchService {
    config: SearchConfig,
    collaborators: Collaborators,
    characteristics: CharacteristicSearch,
    child_terms: Arc<ChildTermCache>,
    taxa: TaxonLookup,
    converters: ValueObjectRegistry,
    supported: BTreeSet<EntityType>,
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("config", &self.config)
            .field("database", &self.collaborators.database.name())
            .field("index", &self.collaborators.index.name())
            .field("child_terms", &self.child_terms)
            .field("supported", &self.supported)
            .finish_non_exhaustive()
    }
}

impl SearchService {
    /// Start building an engine over `collaborators` with default
    /// configuration, every entity type, and the default converters.
    #[must_use]
    pub fn builder(collaborators: Collaborators) -> SearchServiceBuilder {
        SearchServiceBuilder {
            collaborators,
            config: PortalConfig::default(),
            converters: ValueObjectRegistry::with_defaults(),
            result_types: EntityType::ALL.into_iter().collect(),
        }
    }

    /// Release cached ontology data.
    pub fn shutdown(&self) {
        self.child_terms.invalidate_all();
        tracing::info!("search service shut down");
    }

    #[must_use]
    pub const fn supported_result_types(&self) -> &BTreeSet<EntityType> {
        &self.supported
    }

    #[must_use]
    pub const fn child_terms(&self) -> &Arc<ChildTermCache> {
        &self.child_terms
    }

    /// Search with the object-filling choice carried by `settings`.
    ///
    /// # Errors
    ///
    /// See [`Self::search_with`].
    pub fn search(&self, settings: &SearchSettings) -> Result<SearchResultMap, SearchError> {
        self.search_with(settings, settings.fill_objects(), false)
    }

    /// Search tuned for interactive use: the gene stage stops at the first
    /// database hit.
    ///
    /// # Errors
    ///
    /// See [`Self::search_with`].
    pub fn speed_search(&self, settings: &SearchSettings) -> Result<SearchResultMap, SearchError> {
        self.search_with(settings, true, true)
    }

    /// Run a search.
    ///
    /// The returned map has a bucket for every supported type, each sorted by
    /// descending score and capped at `settings.max_results()`. With
    /// `fill_objects` every result carries its object; otherwise none does.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::UnsupportedResultType`] if the settings ask for
    /// a type this engine does not serve, ontology failures, and malformed
    /// annotation queries. Failures of individual backends are logged and
    /// skipped.
    pub fn search_with(
        &self,
        settings: &SearchSettings,
        fill_objects: bool,
        web_speed_search: bool,
    ) -> Result<SearchResultMap, SearchError> {
        let unsupported: Vec<EntityType> = settings
            .result_types()
            .iter()
            .copied()
            .filter(|t| !self.supported.contains(t))
            .collect();
        if !unsupported.is_empty() {
            return Err(SearchError::UnsupportedResultType(unsupported));
        }

        let timer = StageTimer::start(self.config.slow_stage_ms);
        let settings = self.taxa.process_settings(settings);

        let raw = if settings.is_term_query() {
            self.term_query_search(&settings, web_speed_search)?
        } else {
            self.general_search(&settings, web_speed_search)?
        };

        let mut results = sorted_limited_results(
            raw.into_vec(),
            self.supported.iter().copied(),
            settings.max_results(),
        );
        if fill_objects {
            materialize::fill(
                &mut results,
                self.collaborators.loader.as_ref(),
                settings.taxon(),
            );
        } else {
            materialize::strip(&mut results);
        }

        let total: usize = results.values().map(Vec::len).sum();
        if total > 0 {
            tracing::info!(
                query = %settings,
                total,
                elapsed_ms = timer.elapsed_ms(),
                "search completed"
            );
        }
        Ok(results)
    }

    /// Search a single entity type and return its typed bucket.
    ///
    /// # Errors
    ///
    /// See [`Self::search`].
    pub fn search_type<T: EntityKind>(
        &self,
        settings: &SearchSettings,
    ) -> Result<Vec<SearchResult<T>>, SearchError> {
        let narrowed = settings.with_result_types([T::ENTITY_TYPE]);
        let mut results = self.search(&narrowed)?;
        Ok(results
            .remove(&T::ENTITY_TYPE)
            .unwrap_or_default()
            .into_iter()
            .filter_map(SearchResult::downcast::<T>)
            .collect())
    }

    /// Ids of datasets matching `query`, without loading them.
    ///
    /// A query shorter than the configured minimum yields nothing. A blank
    /// query with a taxon yields every dataset of that taxon.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Source`] if the taxon or its datasets cannot be
    /// loaded, and any error of [`Self::search_with`].
    pub fn search_dataset_ids(
        &self,
        query: &str,
        taxon_id: Option<EntityId>,
    ) -> Result<BTreeSet<EntityId>, SearchError> {
        let taxon: Option<Taxon> = match taxon_id {
            Some(id) => self
                .collaborators
                .taxa
                .load(id)
                .map_err(|e| SearchError::backend(EntityType::Dataset, e))?,
            None => None,
        };

        let query = query.trim();
        if query.is_empty() {
            let Some(taxon) = taxon else {
                return Ok(BTreeSet::new());
            };
            let datasets = self
                .collaborators
                .datasets
                .find_by_taxon(&taxon)
                .map_err(|e| SearchError::backend(EntityType::Dataset, e))?;
            return Ok(datasets.into_iter().map(|d| d.id).collect());
        }

        if query.chars().count() < self.config.min_dataset_query_len {
            tracing::debug!(query, "dataset id search query too short");
            return Ok(BTreeSet::new());
        }

        let settings = SearchSettings::dataset_search_in_taxon(query, taxon)
            .with_max_results(self.config.max_results_per_type);
        let mut results = self.search_with(&settings, false, false)?;
        Ok(results
            .remove(&EntityType::Dataset)
            .unwrap_or_default()
            .iter()
            .map(SearchResult::result_id)
            .collect())
    }

    /// Convert one result to its value-object form.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::UnsupportedConversion`] when the result class
    /// has no registered converter.
    pub fn load_value_object(
        &self,
        result: &SearchResult,
    ) -> Result<SearchResult<ValueObject>, SearchError> {
        self.converters.convert(result)
    }

    /// Convert results to value objects, keeping their order.
    ///
    /// # Errors
    ///
    /// Fails on the first result without a registered converter.
    pub fn load_value_objects(
        &self,
        results: &[SearchResult],
    ) -> Result<Vec<SearchResult<ValueObject>>, SearchError> {
        results.iter().map(|r| self.converters.convert(r)).collect()
    }

    fn term_query_search(
        &self,
        settings: &SearchSettings,
        web_speed_search: bool,
    ) -> Result<ResultAccumulator, SearchError> {
        let mut raw = self.uri_search(settings)?;

        let answered: BTreeSet<EntityType> = raw.iter().map(SearchResult::result_class).collect();
        let remaining: Vec<EntityType> = if self.collaborators.access.is_admin() {
            settings.result_types().iter().copied().collect()
        } else {
            settings
                .result_types()
                .iter()
                .copied()
                .filter(|t| !answered.contains(t))
                .collect()
        };

        if !remaining.is_empty() {
            tracing::debug!(query = settings.query(), ?remaining, "term query falls back to general search");
            raw.extend(self.general_search(&settings.with_result_types(remaining), web_speed_search)?);
        }
        Ok(raw)
    }

    fn general_search(
        &self,
        settings: &SearchSettings,
        web_speed_search: bool,
    ) -> Result<ResultAccumulator, SearchError> {
        let mut raw = ResultAccumulator::new();

        let genes = if settings.has_result_type(EntityType::Gene) {
            let genes = self.gene_search(settings, web_speed_search)?;
            raw.extend(genes.iter().cloned().map(SearchResult::into_entity));
            Some(genes)
        } else {
            None
        };

        let stripped = strip_short_terms(settings.query(), self.config.min_term_len);
        if stripped.is_empty() {
            tracing::debug!(query = settings.raw_query(), "query is blank after stripping short terms");
            return Ok(ResultAccumulator::new());
        }

        // The dataset stage wants genes searched in exact mode on the same query.
        let exact = web_speed_search && stripped == settings.query();
        let genes = genes.as_deref().map(|results| GeneHits { results, exact });
        let settings = settings.with_query(stripped);

        self.accrete_others(&mut raw, &settings, genes)?;
        Ok(raw)
    }
}

/// Gene-stage results handed to later stages.
#[derive(Debug, Clone, Copy)]
struct GeneHits<'a> {
    results: &'a [SearchResult<Gene>],
    /// Searched with `return_on_db_hit`.
    exact: bool,
}

/// Unwrap a backend outcome, logging and skipping a failure.
fn tolerate<T: Default>(entity_type: EntityType, outcome: Result<T, SourceError>) -> T {
    outcome.unwrap_or_else(|error| {
        tracing::warn!(%entity_type, %error, "backend search failed, continuing without it");
        T::default()
    })
}

/// Like [`tolerate`] for engine errors: backend failures are skipped, any
/// other error propagates.
fn tolerate_partial<T: Default>(
    entity_type: EntityType,
    outcome: Result<T, SearchError>,
) -> Result<T, SearchError> {
    match outcome {
        Ok(value) => Ok(value),
        Err(error) if error.is_partial() => {
            tracing::warn!(%entity_type, %error, "backend search failed, continuing without it");
            Ok(T::default())
        }
        Err(error) => Err(error),
    }
}

//! Query descriptor for a search.
//!
//! [`SearchSettings`] is immutable once built. Every stage that needs a
//! variation (narrower result types, a derived query, a detected taxon)
//! derives a copy through one of the `with_*` methods.

use std::collections::BTreeSet;
use std::fmt;

use portal_core::entities::{Platform, Taxon};
use portal_core::enums::EntityType;

/// Prefix of a query that names an ontology term by URI.
pub const TERM_URI_PREFIX: &str = "http://";

/// Per-type result cap when the caller does not choose one.
pub const DEFAULT_MAX_RESULTS: usize = 5000;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    query: String,
    result_types: BTreeSet<EntityType>,
    taxon: Option<Taxon>,
    platform_constraint: Option<Platform>,
    use_characteristics: bool,
    use_database: bool,
    use_go: bool,
    use_indices: bool,
    fill_objects: bool,
    quick_search: bool,
    do_highlighting: bool,
    max_results: usize,
}

impl SearchSettings {
    #[must_use]
    pub fn builder() -> SearchSettingsBuilder {
        SearchSettingsBuilder::default()
    }

    /// Dataset search for `query`.
    #[must_use]
    pub fn dataset_search(query: impl Into<String>) -> Self {
        Self::builder()
            .query(query)
            .result_type(EntityType::Dataset)
            .build()
    }

    /// Dataset search for `query`, restricted to `taxon` when given.
    #[must_use]
    pub fn dataset_search_in_taxon(query: impl Into<String>, taxon: Option<Taxon>) -> Self {
        Self::builder()
            .query(query)
            .result_type(EntityType::Dataset)
            .maybe_taxon(taxon)
            .build()
    }

    #[must_use]
    pub fn gene_search(query: impl Into<String>, taxon: Option<Taxon>) -> Self {
        Self::builder()
            .query(query)
            .result_type(EntityType::Gene)
            .maybe_taxon(taxon)
            .build()
    }

    #[must_use]
    pub fn platform_search(query: impl Into<String>) -> Self {
        Self::builder()
            .query(query)
            .result_type(EntityType::Platform)
            .build()
    }

    #[must_use]
    pub fn publication_search(query: impl Into<String>) -> Self {
        Self::builder()
            .query(query)
            .result_type(EntityType::Publication)
            .build()
    }

    /// Probe search, optionally constrained to one platform.
    #[must_use]
    pub fn probe_search(query: impl Into<String>, platform: Option<Platform>) -> Self {
        let mut builder = Self::builder().query(query).result_type(EntityType::Probe);
        if let Some(platform) = platform {
            builder = builder.platform_constraint(platform);
        }
        builder.build()
    }

    /// The query with surrounding whitespace removed.
    #[must_use]
    pub fn query(&self) -> &str {
        self.query.trim()
    }

    /// The query exactly as the caller supplied it.
    #[must_use]
    pub fn raw_query(&self) -> &str {
        &self.query
    }

    /// Whether the query names an ontology term by URI.
    #[must_use]
    pub fn is_term_query(&self) -> bool {
        self.query().starts_with(TERM_URI_PREFIX)
    }

    #[must_use]
    pub const fn result_types(&self) -> &BTreeSet<EntityType> {
        &self.result_types
    }

    #[must_use]
    pub fn has_result_type(&self, entity_type: EntityType) -> bool {
        self.result_types.contains(&entity_type)
    }

    #[must_use]
    pub const fn taxon(&self) -> Option<&Taxon> {
        self.taxon.as_ref()
    }

    #[must_use]
    pub const fn platform_constraint(&self) -> Option<&Platform> {
        self.platform_constraint.as_ref()
    }

    #[must_use]
    pub const fn use_characteristics(&self) -> bool {
        self.use_characteristics
    }

    #[must_use]
    pub const fn use_database(&self) -> bool {
        self.use_database
    }

    #[must_use]
    pub const fn use_go(&self) -> bool {
        self.use_go
    }

    #[must_use]
    pub const fn use_indices(&self) -> bool {
        self.use_indices
    }

    #[must_use]
    pub const fn fill_objects(&self) -> bool {
        self.fill_objects
    }

    #[must_use]
    pub const fn quick_search(&self) -> bool {
        self.quick_search
    }

    #[must_use]
    pub const fn do_highlighting(&self) -> bool {
        self.do_highlighting
    }

    /// Per-type cap on returned results.
    #[must_use]
    pub const fn max_results(&self) -> usize {
        self.max_results
    }

    /// Copy of these settings asking for `result_types` only.
    #[must_use]
    pub fn with_result_types(&self, result_types: impl IntoIterator<Item = EntityType>) -> Self {
        Self {
            result_types: result_types.into_iter().collect(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_query(&self, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_taxon(&self, taxon: Option<Taxon>) -> Self {
        Self {
            taxon,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_max_results(&self, max_results: usize) -> Self {
        Self {
            max_results,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_fill_objects(&self, fill_objects: bool) -> Self {
        Self {
            fill_objects,
            ..self.clone()
        }
    }
}

impl fmt::Display for SearchSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.query())?;
        if let Some(taxon) = &self.taxon {
            write!(f, " taxon={}", taxon.id)?;
        }
        if let Some(platform) = &self.platform_constraint {
            write!(f, " platform={}", platform.short_name)?;
        }
        let types: Vec<&str> = self.result_types.iter().map(|t| t.as_str()).collect();
        write!(f, " in [{}]", types.join(", "))
    }
}

/// Builder for [`SearchSettings`]. All backends are switched on by default.
#[derive(Debug, Clone)]
pub struct SearchSettingsBuilder {
    settings: SearchSettings,
}

impl Default for SearchSettingsBuilder {
    fn default() -> Self {
        Self {
            settings: SearchSettings {
                query: String::new(),
                result_types: BTreeSet::new(),
                taxon: None,
                platform_constraint: None,
                use_characteristics: true,
                use_database: true,
                use_go: true,
                use_indices: true,
                fill_objects: true,
                quick_search: false,
                do_highlighting: false,
                max_results: DEFAULT_MAX_RESULTS,
            },
        }
    }
}

impl SearchSettingsBuilder {
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.settings.query = query.into();
        self
    }

    #[must_use]
    pub fn result_type(mut self, entity_type: EntityType) -> Self {
        self.settings.result_types.insert(entity_type);
        self
    }

    #[must_use]
    pub fn result_types(mut self, types: impl IntoIterator<Item = EntityType>) -> Self {
        self.settings.result_types.extend(types);
        self
    }

    #[must_use]
    pub fn taxon(self, taxon: Taxon) -> Self {
        self.maybe_taxon(Some(taxon))
    }

    #[must_use]
    pub fn maybe_taxon(mut self, taxon: Option<Taxon>) -> Self {
        self.settings.taxon = taxon;
        self
    }

    #[must_use]
    pub fn platform_constraint(mut self, platform: Platform) -> Self {
        self.settings.platform_constraint = Some(platform);
        self
    }

    #[must_use]
    pub const fn use_characteristics(mut self, on: bool) -> Self {
        self.settings.use_characteristics = on;
        self
    }

    #[must_use]
    pub const fn use_database(mut self, on: bool) -> Self {
        self.settings.use_database = on;
        self
    }

    #[must_use]
    pub const fn use_go(mut self, on: bool) -> Self {
        self.settings.use_go = on;
        self
    }

    #[must_use]
    pub const fn use_indices(mut self, on: bool) -> Self {
        self.settings.use_indices = on;
        self
    }

    #[must_use]
    pub const fn fill_objects(mut self, on: bool) -> Self {
        self.settings.fill_objects = on;
        self
    }

    #[must_use]
    pub const fn quick_search(mut self, on: bool) -> Self {
        self.settings.quick_search = on;
        self
    }

    #[must_use]
    pub const fn do_highlighting(mut self, on: bool) -> Self {
        self.settings.do_highlighting = on;
        self
    }

    #[must_use]
    pub const fn max_results(mut self, max_results: usize) -> Self {
        self.settings.max_results = max_results;
        self
    }

    #[must_use]
    pub fn build(self) -> SearchSettings {
        self.settings
    }
}

//! Search error types for portal-search.

use portal_core::enums::EntityType;
use portal_core::errors::CoreError;

/// Errors raised at the ontology collaborator boundary.
///
/// Whatever the ontology backend throws internally is folded into one of
/// these before it reaches the engine.
#[derive(Debug, thiserror::Error)]
pub enum OntologyError {
    /// A term or individual lookup failed.
    #[error("ontology search for '{query}' failed: {reason}")]
    Search { query: String, reason: String },

    /// The ontology backend is not reachable or not loaded.
    #[error("ontology service unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a single search backend or catalog.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{source_name} backend failed: {reason}")]
    Backend {
        source_name: String,
        reason: String,
    },
}

impl SourceError {
    pub fn backend(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Backend {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors from search operations across the ontology, database, and index backends.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The caller asked for result types the engine does not serve.
    #[error("unsupported result types: {0:?}")]
    UnsupportedResultType(Vec<EntityType>),

    /// A query clause could not be interpreted.
    #[error("malformed query clause '{clause}': {reason}")]
    MalformedQuery { clause: String, reason: String },

    /// Error from the ontology collaborator.
    #[error("ontology error: {0}")]
    Ontology(#[from] OntologyError),

    /// A backend failed while gathering results of one entity type.
    #[error("{entity_type} search failed: {source}")]
    Source {
        entity_type: EntityType,
        #[source]
        source: SourceError,
    },

    /// The child-term cache could not be created.
    #[error("child-term cache initialization failed: {0}")]
    CacheInit(String),

    /// The engine configuration is out of range.
    #[error("invalid configuration: {0}")]
    Config(#[from] portal_config::ConfigError),

    /// The taxon table could not be loaded at startup.
    #[error("taxon table could not be loaded: {0}")]
    TaxonTable(#[source] SourceError),

    /// No value-object converter is registered for the entity type.
    #[error("no value object conversion registered for {0}")]
    UnsupportedConversion(EntityType),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SearchError {
    pub(crate) const fn backend(entity_type: EntityType, source: SourceError) -> Self {
        Self::Source {
            entity_type,
            source,
        }
    }

    /// Whether the error is a backend failure the dispatcher may log and skip.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self, Self::Source { .. })
    }
}

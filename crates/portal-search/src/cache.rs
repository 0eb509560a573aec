//! Child-term cache backed by moka.
//!
//! Ontology child lookups are slow and the same broad terms (brain, neuron,
//! cell) show up in most annotation searches, so direct children are cached
//! per term URI. Entries expire after a fixed time-to-live or when idle.
//!
//! Lookups of the same URI by concurrent searches are coalesced into a single
//! ontology call. Failed lookups are logged and are never cached.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::sync::Cache;
use portal_config::ChildCacheConfig;

use crate::error::SearchError;
use crate::ontology::{OntologyService, OntologyTerm};

/// Lookup counters for the child-term cache.
#[derive(Debug, Default)]
pub struct CacheStats {
    lookups: AtomicU64,
    loads: AtomicU64,
    failures: AtomicU64,
}

impl CacheStats {
    fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Lookups answered without calling the ontology.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.lookups().saturating_sub(self.misses())
    }

    /// Lookups that had to call the ontology.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

/// Direct children of ontology terms, keyed by term URI.
pub struct ChildTermCache {
    inner: Cache<String, Arc<Vec<OntologyTerm>>>,
    ontology: Arc<dyn OntologyService>,
    stats: CacheStats,
}

impl std::fmt::Debug for ChildTermCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildTermCache")
            .field("entries", &self.inner.entry_count())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl ChildTermCache {
    /// Create the cache from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::CacheInit`] if the configuration is invalid.
    pub fn new(
        ontology: Arc<dyn OntologyService>,
        config: &ChildCacheConfig,
    ) -> Result<Self, SearchError> {
        config
            .validate()
            .map_err(|e| SearchError::CacheInit(e.to_string()))?;

        let cache = Self::with_expiry(
            ontology,
            config.capacity,
            config.time_to_live(),
            config.time_to_idle(),
        );
        tracing::info!(
            capacity = config.capacity,
            ttl_secs = config.time_to_live_secs,
            tti_secs = config.time_to_idle_secs,
            "child-term cache initialized"
        );
        Ok(cache)
    }

    /// Create the cache with explicit expiry durations.
    pub fn with_expiry(
        ontology: Arc<dyn OntologyService>,
        capacity: u64,
        time_to_live: Duration,
        time_to_idle: Duration,
    ) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(time_to_live)
            .time_to_idle(time_to_idle)
            .build();
        Self {
            inner,
            ontology,
            stats: CacheStats::default(),
        }
    }

    /// Direct children of `term`.
    ///
    /// A term without a URI has no cacheable children and yields an empty
    /// list. An ontology failure is logged and also yields an empty list;
    /// the failure is not cached, so the next lookup retries.
    pub fn children(&self, term: &OntologyTerm) -> Arc<Vec<OntologyTerm>> {
        let Some(uri) = term.usable_uri() else {
            tracing::warn!(label = %term.label, "term has no URI, cannot look up children");
            return Arc::new(Vec::new());
        };

        self.stats.record_lookup();
        let loaded = self.inner.try_get_with(uri.to_string(), || {
            self.stats.record_load();
            tracing::trace!(uri, "child-term cache MISS");
            self.ontology.children(term, true).map(Arc::new)
        });

        match loaded {
            Ok(children) => children,
            Err(error) => {
                self.stats.record_failure();
                tracing::warn!(uri, %error, "failed to fetch child terms");
                Arc::new(Vec::new())
            }
        }
    }

    /// Drop every cached entry.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
        tracing::debug!("child-term cache invalidated");
    }

    /// Approximate number of cached terms.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    #[must_use]
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

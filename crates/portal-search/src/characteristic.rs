//! Dataset search through ontology annotations ("characteristics").
//!
//! A query is resolved against the ontology, and datasets annotated with any
//! matching individual, term, or descendant term are returned. The query
//! language is a flat disjunction of conjunctions:
//!
//! ```text
//! hippocampus AND neuron OR cortex
//! ```
//!
//! is evaluated as `(hippocampus ∩ neuron) ∪ cortex`. Operators are
//! case-sensitive and must be surrounded by single spaces; there are no
//! parentheses.
//!
//! Descendant terms are visited breadth-first through the [`ChildTermCache`].
//! Each term URI is expanded at most once per term search, which bounds the
//! walk even when the ontology graph contains cycles.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use portal_core::entities::{Dataset, Taxon};
use portal_core::enums::{AnnotationLevel, EntityId, EntityType};

use crate::cache::ChildTermCache;
use crate::error::{SearchError, SourceError};
use crate::ontology::{OntologyService, OntologyTerm};
use crate::rank::ResultAccumulator;
use crate::result::SearchResult;
use crate::settings::TERM_URI_PREFIX;

const OR: &str = " OR ";
const AND: &str = " AND ";

/// Annotated entities grouped by the level the annotation was found at and
/// then by annotation URI.
pub type AnnotationHits = BTreeMap<AnnotationLevel, BTreeMap<String, BTreeSet<EntityId>>>;

/// Lookup of datasets by the ontology URIs they are annotated with.
pub trait CharacteristicService: Send + Sync {
    /// Datasets annotated with any of `uris`, optionally restricted to
    /// `taxon`. A `limit` of zero means no limit.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the annotation store cannot be queried.
    fn find_entities_by_uris(
        &self,
        uris: &[String],
        taxon: Option<&Taxon>,
        limit: usize,
    ) -> Result<AnnotationHits, SourceError>;
}

/// Dataset results from an annotation search, in discovery order.
pub type DatasetHits = ResultAccumulator<Dataset>;

/// Annotation-driven dataset search.
pub struct CharacteristicSearch {
    ontology: Arc<dyn OntologyService>,
    annotations: Arc<dyn CharacteristicService>,
    child_terms: Arc<ChildTermCache>,
    batch_size: usize,
    link_root: String,
}

impl CharacteristicSearch {
    pub fn new(
        ontology: Arc<dyn OntologyService>,
        annotations: Arc<dyn CharacteristicService>,
        child_terms: Arc<ChildTermCache>,
        batch_size: usize,
        link_root: impl Into<String>,
    ) -> Self {
        Self {
            ontology,
            annotations,
            child_terms,
            batch_size: batch_size.max(1),
            link_root: link_root.into(),
        }
    }

    /// Evaluate a full `OR`/`AND` query.
    ///
    /// Once a disjunct pushes the result count past `limit`, the remaining
    /// disjuncts are skipped. A `limit` of zero means no limit.
    ///
    /// # Errors
    ///
    /// Propagates ontology failures, and annotation-store failures as
    /// [`SearchError::Source`].
    pub fn search(
        &self,
        query: &str,
        taxon: Option<&Taxon>,
        limit: usize,
    ) -> Result<DatasetHits, SearchError> {
        let mut results = DatasetHits::new();

        for clause in query.split(OR) {
            let clause_hits = self.search_with_children(clause, taxon, limit)?;
            if !clause_hits.is_empty() {
                tracing::info!(clause = clause.trim(), hits = clause_hits.len(), "characteristic clause matched");
            }
            results.extend(clause_hits);

            if over_limit(results.len(), limit) {
                break;
            }
        }

        tracing::debug!(query, hits = results.len(), "characteristic search done");
        Ok(results)
    }

    /// Evaluate one conjunction (`a AND b AND ...`).
    ///
    /// The first non-blank term seeds the result set and every later term
    /// intersects it, so a term without matches empties the clause.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MalformedQuery`] for a clause with no terms, and
    /// propagates failures of the underlying term searches.
    pub fn search_with_children(
        &self,
        clause: &str,
        taxon: Option<&Taxon>,
        limit: usize,
    ) -> Result<DatasetHits, SearchError> {
        let mut combined: Option<DatasetHits> = None;

        for term in clause.split(AND).map(str::trim).filter(|t| !t.is_empty()) {
            let term_hits = self.search_term(term, taxon, limit)?;
            match combined.as_mut() {
                None => combined = Some(term_hits),
                Some(acc) => acc.intersect(&term_hits),
            }
            if combined.as_ref().is_some_and(ResultAccumulator::is_empty) {
                break;
            }
        }

        combined.ok_or_else(|| SearchError::MalformedQuery {
            clause: clause.to_string(),
            reason: "no search terms".to_string(),
        })
    }

    /// Datasets annotated with a single term, its matching individuals, or
    /// any descendant of a matching term.
    ///
    /// # Errors
    ///
    /// Propagates ontology failures, and annotation-store failures as
    /// [`SearchError::Source`].
    pub fn search_term(
        &self,
        query: &str,
        taxon: Option<&Taxon>,
        limit: usize,
    ) -> Result<DatasetHits, SearchError> {
        let mut results = DatasetHits::new();
        let mut labels: HashMap<String, String> = HashMap::new();

        let individuals = self.ontology.find_individuals(query)?;
        tracing::debug!(query, individuals = individuals.len(), "individuals matched");
        for batch in individuals.chunks(self.batch_size) {
            let uris: Vec<String> = batch
                .iter()
                .filter_map(|i| {
                    let uri = i.usable_uri()?;
                    labels.insert(uri.to_string(), i.label.clone());
                    Some(uri.to_string())
                })
                .collect();
            self.collect_annotated(&uris, &labels, &mut results, taxon, limit)?;
            if over_limit(results.len(), limit) {
                return Ok(results);
            }
        }

        let mut terms = self.ontology.find_terms(query)?;
        if query.starts_with(TERM_URI_PREFIX)
            && let Some(exact) = self.ontology.get_term(query)?
            && !terms.contains(&exact)
        {
            terms.insert(0, exact);
        }
        tracing::debug!(query, terms = terms.len(), "terms matched");

        let mut seen: HashSet<String> = HashSet::new();
        for term in &terms {
            let Some(uri) = term.usable_uri() else {
                continue;
            };
            if !seen.insert(uri.to_string()) {
                continue;
            }
            labels.insert(uri.to_string(), term.label.clone());

            self.collect_annotated(&[uri.to_string()], &labels, &mut results, taxon, limit)?;
            if over_limit(results.len(), limit) {
                break;
            }

            self.annotated_to_children(term, &mut seen, &mut labels, &mut results, taxon, limit)?;
            if over_limit(results.len(), limit) {
                break;
            }
        }

        Ok(results)
    }

    /// Add datasets annotated with `uris` to `results` with a score of 1.0
    /// and a highlight linking the matched term.
    ///
    /// `labels` supplies display labels; a URI without one is shown as is.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Source`] when the annotation store fails.
    pub fn collect_annotated(
        &self,
        uris: &[String],
        labels: &HashMap<String, String>,
        results: &mut DatasetHits,
        taxon: Option<&Taxon>,
        limit: usize,
    ) -> Result<(), SearchError> {
        if uris.is_empty() {
            return Ok(());
        }

        let hits = self
            .annotations
            .find_entities_by_uris(uris, taxon, limit)
            .map_err(|e| SearchError::backend(EntityType::Dataset, e))?;

        for (level, by_uri) in &hits {
            for (uri, ids) in by_uri {
                let label = labels.get(uri).map_or(uri.as_str(), String::as_str);
                let text = self.highlight(uri, label, *level);
                for id in ids {
                    results.insert(SearchResult::provisional(
                        EntityType::Dataset,
                        *id,
                        1.0,
                        Some(text.clone()),
                    ));
                    if over_limit(results.len(), limit) {
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    /// Breadth-first walk below `root`, collecting datasets annotated with
    /// each newly seen descendant.
    ///
    /// A child whose URI is already in `seen` is neither queried nor
    /// expanded again.
    fn annotated_to_children(
        &self,
        root: &OntologyTerm,
        seen: &mut HashSet<String>,
        labels: &mut HashMap<String, String>,
        results: &mut DatasetHits,
        taxon: Option<&Taxon>,
        limit: usize,
    ) -> Result<(), SearchError> {
        let mut queue = VecDeque::from([root.clone()]);

        while let Some(term) = queue.pop_front() {
            let children = self.child_terms.children(&term);

            let mut fresh = Vec::new();
            for child in children.iter() {
                let Some(uri) = child.usable_uri() else {
                    continue;
                };
                if seen.insert(uri.to_string()) {
                    labels.insert(uri.to_string(), child.label.clone());
                    fresh.push(child.clone());
                }
            }
            if fresh.is_empty() {
                continue;
            }

            let uris: Vec<String> = fresh
                .iter()
                .filter_map(|c| c.usable_uri().map(str::to_string))
                .collect();
            tracing::trace!(parent = %term.label, children = uris.len(), "querying child terms");
            self.collect_annotated(&uris, labels, results, taxon, limit)?;
            if over_limit(results.len(), limit) {
                return Ok(());
            }

            queue.extend(fresh);
        }
        Ok(())
    }

    fn highlight(&self, uri: &str, label: &str, level: AnnotationLevel) -> String {
        let mut text = format!(
            "Tagged term: <a href=\"{}/searcher.html?query={uri}\">{label}</a> ",
            self.link_root
        );
        // The double space before "via" is deliberate; clients match this exact text.
        if level != AnnotationLevel::Dataset {
            text.push_str(" via ");
            text.push_str(level.label());
        }
        text
    }
}

const fn over_limit(count: usize, limit: usize) -> bool {
    limit > 0 && count >= limit
}

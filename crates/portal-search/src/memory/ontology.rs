use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use portal_core::entities::Taxon;
use portal_core::enums::{AnnotationLevel, EntityId};

use crate::characteristic::{AnnotationHits, CharacteristicService};
use crate::error::{OntologyError, SourceError};
use crate::ontology::{OntologyIndividual, OntologyService, OntologyTerm};

/// Ontology held in memory. Terms match a query by URI or by a
/// case-insensitive label substring.
#[derive(Debug, Default)]
pub struct MemoryOntology {
    terms: Vec<OntologyTerm>,
    children: HashMap<String, Vec<String>>,
    individuals: Vec<OntologyIndividual>,
    unavailable: bool,
    children_calls: AtomicUsize,
}

impl MemoryOntology {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term with the URIs of its direct children.
    #[must_use]
    pub fn with_term(mut self, uri: &str, label: &str, children: &[&str]) -> Self {
        self.terms.push(OntologyTerm::new(uri, label));
        self.children.insert(
            uri.to_string(),
            children.iter().map(|c| (*c).to_string()).collect(),
        );
        self
    }

    #[must_use]
    pub fn with_individual(mut self, uri: &str, label: &str) -> Self {
        self.individuals.push(OntologyIndividual {
            uri: Some(uri.to_string()),
            label: label.to_string(),
        });
        self
    }

    /// Make every lookup fail as if the ontologies were not loaded.
    #[must_use]
    pub const fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Number of child lookups served so far.
    #[must_use]
    pub fn children_calls(&self) -> usize {
        self.children_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), OntologyError> {
        if self.unavailable {
            return Err(OntologyError::Unavailable("ontologies not loaded".into()));
        }
        Ok(())
    }

    fn term(&self, uri: &str) -> OntologyTerm {
        self.terms
            .iter()
            .find(|t| t.uri.as_deref() == Some(uri))
            .cloned()
            .unwrap_or_else(|| OntologyTerm::new(uri, uri))
    }

    fn direct_children(&self, uri: &str) -> Vec<OntologyTerm> {
        self.children
            .get(uri)
            .map(|uris| uris.iter().map(|c| self.term(c)).collect())
            .unwrap_or_default()
    }
}

fn matches(query: &str, uri: Option<&str>, label: &str) -> bool {
    let query = query.trim();
    uri == Some(query) || label.to_lowercase().contains(&query.to_lowercase())
}

impl OntologyService for MemoryOntology {
    fn find_individuals(&self, query: &str) -> Result<Vec<OntologyIndividual>, OntologyError> {
        self.check()?;
        Ok(self
            .individuals
            .iter()
            .filter(|i| matches(query, i.uri.as_deref(), &i.label))
            .cloned()
            .collect())
    }

    fn find_terms(&self, query: &str) -> Result<Vec<OntologyTerm>, OntologyError> {
        self.check()?;
        Ok(self
            .terms
            .iter()
            .filter(|t| matches(query, t.uri.as_deref(), &t.label))
            .cloned()
            .collect())
    }

    fn get_term(&self, uri: &str) -> Result<Option<OntologyTerm>, OntologyError> {
        self.check()?;
        Ok(self
            .terms
            .iter()
            .find(|t| t.uri.as_deref() == Some(uri))
            .cloned())
    }

    fn children(
        &self,
        term: &OntologyTerm,
        direct: bool,
    ) -> Result<Vec<OntologyTerm>, OntologyError> {
        self.children_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let Some(uri) = term.usable_uri() else {
            return Ok(Vec::new());
        };
        if direct {
            return Ok(self.direct_children(uri));
        }

        let mut seen = HashSet::from([uri.to_string()]);
        let mut queue = VecDeque::from([uri.to_string()]);
        let mut all = Vec::new();
        while let Some(next) = queue.pop_front() {
            for child in self.direct_children(&next) {
                if let Some(child_uri) = child.usable_uri()
                    && seen.insert(child_uri.to_string())
                {
                    queue.push_back(child_uri.to_string());
                    all.push(child);
                }
            }
        }
        Ok(all)
    }
}

/// Dataset annotations held in memory.
#[derive(Debug, Default)]
pub struct MemoryAnnotations {
    entries: Vec<(EntityId, String, AnnotationLevel)>,
    dataset_taxa: HashMap<EntityId, EntityId>,
    failing: bool,
}

impl MemoryAnnotations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `dataset` is annotated with `uri` at `level`.
    #[must_use]
    pub fn annotate(mut self, dataset: EntityId, uri: &str, level: AnnotationLevel) -> Self {
        self.entries.push((dataset, uri.to_string(), level));
        self
    }

    /// Record the taxon of `dataset` for taxon-restricted lookups.
    #[must_use]
    pub fn in_taxon(mut self, dataset: EntityId, taxon: EntityId) -> Self {
        self.dataset_taxa.insert(dataset, taxon);
        self
    }

    #[must_use]
    pub const fn failing(mut self) -> Self {
        self.failing = true;
        self
    }
}

impl CharacteristicService for MemoryAnnotations {
    fn find_entities_by_uris(
        &self,
        uris: &[String],
        taxon: Option<&Taxon>,
        limit: usize,
    ) -> Result<AnnotationHits, SourceError> {
        if self.failing {
            return Err(SourceError::backend("annotations", "annotation store offline"));
        }

        let mut hits = AnnotationHits::new();
        let mut found: HashSet<EntityId> = HashSet::new();
        for (dataset, uri, level) in &self.entries {
            if !uris.contains(uri) {
                continue;
            }
            if let Some(taxon) = taxon
                && self
                    .dataset_taxa
                    .get(dataset)
                    .is_some_and(|t| *t != taxon.id)
            {
                continue;
            }
            if limit > 0 && found.len() >= limit && !found.contains(dataset) {
                continue;
            }
            found.insert(*dataset);
            hits.entry(*level)
                .or_default()
                .entry(uri.clone())
                .or_default()
                .insert(*dataset);
        }
        Ok(hits)
    }
}

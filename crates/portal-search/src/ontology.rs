//! Ontology collaborator boundary.
//!
//! The engine only needs four capabilities of an ontology service: free-text
//! lookup of individuals and terms, term resolution by URI, and child terms.
//! Implementations translate their own failures into [`OntologyError`].

use serde::{Deserialize, Serialize};

use crate::error::OntologyError;

/// A class in a loaded ontology.
///
/// Some ontologies contain anonymous classes, so the URI is optional; the
/// engine skips terms without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OntologyTerm {
    pub uri: Option<String>,
    pub label: String,
}

impl OntologyTerm {
    pub fn new(uri: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            label: label.into(),
        }
    }

    /// The URI, if present and not blank.
    #[must_use]
    pub fn usable_uri(&self) -> Option<&str> {
        self.uri.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// A named instance in a loaded ontology.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OntologyIndividual {
    pub uri: Option<String>,
    pub label: String,
}

impl OntologyIndividual {
    #[must_use]
    pub fn usable_uri(&self) -> Option<&str> {
        self.uri.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// Read access to the loaded ontologies.
pub trait OntologyService: Send + Sync {
    /// Individuals whose label or URI matches `query`.
    ///
    /// # Errors
    ///
    /// Returns [`OntologyError`] when the lookup fails.
    fn find_individuals(&self, query: &str) -> Result<Vec<OntologyIndividual>, OntologyError>;

    /// Terms whose label or URI matches `query`.
    ///
    /// # Errors
    ///
    /// Returns [`OntologyError`] when the lookup fails.
    fn find_terms(&self, query: &str) -> Result<Vec<OntologyTerm>, OntologyError>;

    /// Resolve a term by its URI.
    ///
    /// # Errors
    ///
    /// Returns [`OntologyError`] when the lookup fails.
    fn get_term(&self, uri: &str) -> Result<Option<OntologyTerm>, OntologyError>;

    /// Children of `term`; only the immediate ones when `direct` is set.
    ///
    /// # Errors
    ///
    /// Returns [`OntologyError`] when the lookup fails.
    fn children(&self, term: &OntologyTerm, direct: bool)
    -> Result<Vec<OntologyTerm>, OntologyError>;
}

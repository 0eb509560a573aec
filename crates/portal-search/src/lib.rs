//! # portal-search
//!
//! Search aggregation for the biomedical data portal.
//!
//! A [`SearchService`] takes one free-text or ontology-URI query and fans it
//! out to every backend that can answer it:
//! - Exact-match database lookups and a fuzzy full-text index ([`source::SearchSource`])
//! - Ontology-driven dataset search that expands terms to their descendants
//!   ([`characteristic::CharacteristicSearch`], cached by [`cache::ChildTermCache`])
//! - Domain catalogs for platforms, genes, named sets, and blacklisted accessions
//!
//! Results are deduplicated, ranked, capped per entity type, and then either
//! hydrated through the security-aware loader or stripped to identity and
//! score.
//!
//! # Usage
//!
//! ```
//! use portal_search::memory::{MemoryAnnotations, MemoryOntology, MemoryPortal, MemoryStore};
//! use portal_search::{SearchService, SearchSettings};
//! use portal_core::enums::EntityType;
//!
//! let store = MemoryStore::from_json(r#"{
//!     "genes": [{ "id": 10, "official_symbol": "CDK2", "ncbi_gene_id": 1017 }]
//! }"#).unwrap();
//! let portal = MemoryPortal::new(store, MemoryOntology::new(), MemoryAnnotations::new());
//! let service = SearchService::builder(portal.collaborators()).build().unwrap();
//!
//! let results = service.search(&SearchSettings::gene_search("CDK2", None)).unwrap();
//! assert_eq!(results[&EntityType::Gene].len(), 1);
//! ```

pub mod cache;
pub mod catalog;
pub mod characteristic;
pub mod convert;
pub mod error;
pub mod materialize;
pub mod memory;
pub mod ontology;
pub mod rank;
pub mod result;
pub mod service;
pub mod settings;
pub mod source;
pub mod taxon;
pub mod timing;

pub use error::{OntologyError, SearchError, SourceError};
pub use rank::SearchResultMap;
pub use result::SearchResult;
pub use service::{Collaborators, SearchService, SearchServiceBuilder};
pub use settings::SearchSettings;

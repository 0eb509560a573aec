//! In-memory collaborators.
//!
//! Every trait the engine depends on has an implementation here, backed by
//! plain vectors and maps. They serve as test fixtures and as a reference
//! for real adapters.

mod ontology;
mod source;
mod store;

use std::sync::Arc;

pub use ontology::{MemoryAnnotations, MemoryOntology};
pub use source::MemorySource;
pub use store::MemoryStore;

use crate::service::Collaborators;

/// A complete set of in-memory collaborators sharing one store.
#[derive(Debug, Clone)]
pub struct MemoryPortal {
    pub store: Arc<MemoryStore>,
    pub ontology: Arc<MemoryOntology>,
    pub annotations: Arc<MemoryAnnotations>,
    pub database: Arc<MemorySource>,
    pub index: Arc<MemorySource>,
}

impl MemoryPortal {
    #[must_use]
    pub fn new(store: MemoryStore, ontology: MemoryOntology, annotations: MemoryAnnotations) -> Self {
        let store = Arc::new(store);
        Self {
            database: Arc::new(MemorySource::database(Arc::clone(&store))),
            index: Arc::new(MemorySource::index(Arc::clone(&store))),
            ontology: Arc::new(ontology),
            annotations: Arc::new(annotations),
            store,
        }
    }

    /// Collaborators for [`SearchService::builder`](crate::service::SearchService::builder).
    #[must_use]
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            ontology: self.ontology.clone(),
            annotations: self.annotations.clone(),
            database: self.database.clone(),
            index: self.index.clone(),
            genes: self.store.clone(),
            platforms: self.store.clone(),
            datasets: self.store.clone(),
            named_sets: self.store.clone(),
            blacklist: self.store.clone(),
            taxa: self.store.clone(),
            loader: self.store.clone(),
            access: self.store.clone(),
        }
    }
}

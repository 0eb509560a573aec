//! Materialization gate: hydrate or strip result payloads before they leave
//! the engine.
//!
//! Filling goes through the [`EntityLoader`], which only returns entities the
//! caller is allowed to read. Provisional results it does not return are
//! dropped, so a result never reaches a caller who could not load its object.

use std::collections::HashMap;

use portal_core::entities::{Entity, Identifiable, Taxon};
use portal_core::enums::{EntityId, EntityType};

use crate::error::SourceError;
use crate::rank::SearchResultMap;

/// Security-filtered bulk entity loading.
pub trait EntityLoader: Send + Sync {
    /// Load the entities of `entity_type` with the given ids. Ids the caller
    /// may not read, or that do not exist, are silently absent.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the store cannot be read.
    fn load(&self, entity_type: EntityType, ids: &[EntityId]) -> Result<Vec<Entity>, SourceError>;
}

/// Hydrate every provisional result, then drop results outside `taxon`.
///
/// Results of entities that carry no taxon are kept. When the loader fails
/// for a type, the provisional results of that type are dropped.
pub fn fill(results: &mut SearchResultMap, loader: &dyn EntityLoader, taxon: Option<&Taxon>) {
    for (entity_type, bucket) in results.iter_mut() {
        let ids: Vec<EntityId> = bucket
            .iter()
            .filter(|r| r.is_provisional())
            .map(|r| r.result_id())
            .collect();

        if !ids.is_empty() {
            let mut loaded: HashMap<EntityId, Entity> = match loader.load(*entity_type, &ids) {
                Ok(entities) => entities.into_iter().map(|e| (e.id(), e)).collect(),
                Err(error) => {
                    tracing::warn!(%entity_type, %error, "loading result objects failed");
                    HashMap::new()
                }
            };

            let before = bucket.len();
            bucket.retain_mut(|result| {
                if !result.is_provisional() {
                    return true;
                }
                loaded
                    .remove(&result.result_id())
                    .is_some_and(|entity| result.set_result_object(entity).is_ok())
            });
            if bucket.len() < before {
                tracing::debug!(
                    %entity_type,
                    dropped = before - bucket.len(),
                    "results removed by the entity loader"
                );
            }
        }

        if let Some(taxon) = taxon {
            bucket.retain(|r| r.taxon_id().is_none_or(|id| id == taxon.id));
        }
    }
}

/// Remove every payload, keeping identity, score, and highlight.
pub fn strip(results: &mut SearchResultMap) {
    for result in results.values_mut().flatten() {
        result.clear_result_object();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::SearchResult;
    use portal_core::entities::Dataset;
    use pretty_assertions::assert_eq;

    fn human() -> Taxon {
        Taxon {
            id: 1,
            scientific_name: Some("Homo sapiens".into()),
            common_name: Some("human".into()),
        }
    }

    fn dataset(id: EntityId, taxon: Option<Taxon>) -> Dataset {
        Dataset {
            id,
            short_name: format!("GSE{id}"),
            name: String::new(),
            taxon,
        }
    }

    /// Loads datasets 1..=3; dataset 3 is mouse, dataset 2 is hidden.
    struct Loader;

    impl EntityLoader for Loader {
        fn load(&self, _: EntityType, ids: &[EntityId]) -> Result<Vec<Entity>, SourceError> {
            let mouse = Taxon {
                id: 2,
                scientific_name: Some("Mus musculus".into()),
                common_name: Some("mouse".into()),
            };
            Ok(ids
                .iter()
                .filter_map(|id| match id {
                    1 => Some(dataset(1, Some(human())).into()),
                    3 => Some(dataset(3, Some(mouse.clone())).into()),
                    _ => None,
                })
                .collect())
        }
    }

    struct BrokenLoader;

    impl EntityLoader for BrokenLoader {
        fn load(&self, _: EntityType, _: &[EntityId]) -> Result<Vec<Entity>, SourceError> {
            Err(SourceError::backend("database", "timeout"))
        }
    }

    fn provisional_map(ids: &[EntityId]) -> SearchResultMap {
        let bucket = ids
            .iter()
            .map(|id| SearchResult::provisional(EntityType::Dataset, *id, 1.0, None))
            .collect();
        SearchResultMap::from([(EntityType::Dataset, bucket)])
    }

    fn ids(map: &SearchResultMap) -> Vec<EntityId> {
        map[&EntityType::Dataset]
            .iter()
            .map(SearchResult::result_id)
            .collect()
    }

    #[test]
    fn fill_hydrates_and_drops_unreadable() {
        let mut map = provisional_map(&[1, 2, 3]);
        fill(&mut map, &Loader, None);
        assert_eq!(ids(&map), vec![1, 3]);
        assert!(map[&EntityType::Dataset].iter().all(|r| !r.is_provisional()));
    }

    #[test]
    fn fill_applies_taxon_filter() {
        let mut map = provisional_map(&[1, 3]);
        map.get_mut(&EntityType::Dataset)
            .unwrap()
            .push(SearchResult::with_score(dataset(9, None), 0.5).into_entity());

        fill(&mut map, &Loader, Some(&human()));
        assert_eq!(ids(&map), vec![1, 9]);
    }

    #[test]
    fn loader_failure_drops_provisional_results() {
        let mut map = provisional_map(&[1]);
        fill(&mut map, &BrokenLoader, None);
        assert!(map[&EntityType::Dataset].is_empty());
    }

    #[test]
    fn strip_keeps_identity_and_score() {
        let mut map = SearchResultMap::from([(
            EntityType::Dataset,
            vec![SearchResult::with_highlight(dataset(4, None), 0.7, "brain").into_entity()],
        )]);
        strip(&mut map);

        let result = &map[&EntityType::Dataset][0];
        assert!(result.is_provisional());
        assert_eq!(result.result_id(), 4);
        assert_eq!(result.score(), 0.7);
        assert_eq!(result.highlighted_text(), Some("brain"));
    }
}

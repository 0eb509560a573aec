//! Conversion of search results into value objects for rendering.

use std::collections::HashMap;
use std::sync::Arc;

use portal_core::entities::Entity;
use portal_core::enums::EntityType;
use portal_core::value_object::ValueObject;

use crate::error::SearchError;
use crate::result::SearchResult;

/// Turns a loaded entity into its value object.
pub trait ValueObjectConverter: Send + Sync {
    fn convert(&self, entity: &Entity) -> ValueObject;
}

impl<F> ValueObjectConverter for F
where
    F: Fn(&Entity) -> ValueObject + Send + Sync,
{
    fn convert(&self, entity: &Entity) -> ValueObject {
        self(entity)
    }
}

/// Converters keyed by the result class they accept.
#[derive(Clone, Default)]
pub struct ValueObjectRegistry {
    converters: HashMap<EntityType, Arc<dyn ValueObjectConverter>>,
}

impl std::fmt::Debug for ValueObjectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.converters.keys().collect();
        types.sort();
        f.debug_struct("ValueObjectRegistry")
            .field("types", &types)
            .finish()
    }
}

impl ValueObjectRegistry {
    /// Registry with the default projection for every searchable type
    /// except publications, which have no value object form.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        for entity_type in EntityType::ALL {
            if entity_type != EntityType::Publication {
                registry.register(entity_type, Arc::new(ValueObject::from_entity));
            }
        }
        registry
    }

    pub fn register(&mut self, entity_type: EntityType, converter: Arc<dyn ValueObjectConverter>) {
        self.converters.insert(entity_type, converter);
    }

    #[must_use]
    pub fn supports(&self, entity_type: EntityType) -> bool {
        self.converters.contains_key(&entity_type)
    }

    /// Convert one result, keeping its class, score, and highlight.
    /// A provisional result converts to a provisional result.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::UnsupportedConversion`] when no converter is
    /// registered for the result class.
    pub fn convert(&self, result: &SearchResult) -> Result<SearchResult<ValueObject>, SearchError> {
        let converter = self
            .converters
            .get(&result.result_class())
            .ok_or(SearchError::UnsupportedConversion(result.result_class()))?;

        let highlight = result.highlighted_text().map(str::to_string);
        Ok(match result.result_object() {
            Some(entity) => SearchResult::transformed(
                result.result_class(),
                converter.convert(entity),
                result.score(),
                highlight,
            ),
            None => SearchResult::provisional(
                result.result_class(),
                result.result_id(),
                result.score(),
                highlight,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::entities::{Gene, Publication};
    use pretty_assertions::assert_eq;

    #[test]
    fn converts_with_default_projection() {
        let registry = ValueObjectRegistry::with_defaults();
        let gene = Gene {
            id: 3,
            official_symbol: "CDK2".into(),
            ncbi_gene_id: Some(1017),
            taxon: None,
        };
        let result = SearchResult::with_highlight(gene, 0.9, "symbol").into_entity();

        let vo = registry.convert(&result).unwrap();
        assert_eq!(vo.result_class(), EntityType::Gene);
        assert_eq!(vo.result_id(), 3);
        assert_eq!(vo.score(), 0.9);
        assert_eq!(vo.highlighted_text(), Some("symbol"));
        assert_eq!(vo.result_object().unwrap().label, "CDK2");
    }

    #[test]
    fn provisional_stays_provisional() {
        let registry = ValueObjectRegistry::with_defaults();
        let result = SearchResult::<Entity>::provisional(EntityType::Dataset, 8, 1.0, None);
        assert!(registry.convert(&result).unwrap().is_provisional());
    }

    #[test]
    fn unregistered_type_is_rejected() {
        let registry = ValueObjectRegistry::with_defaults();
        let paper = Publication {
            id: 1,
            title: "Gene expression in the hippocampus".into(),
            accession: Some("PMID:123".into()),
        };
        let err = registry
            .convert(&SearchResult::from_object(paper).into_entity())
            .unwrap_err();
        assert!(matches!(
            err,
            SearchError::UnsupportedConversion(EntityType::Publication)
        ));
    }

    #[test]
    fn custom_converter_overrides_default() {
        let mut registry = ValueObjectRegistry::with_defaults();
        registry.register(
            EntityType::Gene,
            Arc::new(|entity: &Entity| {
                let mut vo = ValueObject::from_entity(entity);
                vo.label = vo.label.to_lowercase();
                vo
            }),
        );
        let gene = Gene {
            id: 3,
            official_symbol: "CDK2".into(),
            ncbi_gene_id: None,
            taxon: None,
        };
        let vo = registry
            .convert(&SearchResult::from_object(gene).into_entity())
            .unwrap();
        assert_eq!(vo.result_object().unwrap().label, "cdk2");
    }
}

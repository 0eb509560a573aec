//! Value objects handed to callers that render search results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Entity, Identifiable};
use crate::enums::{EntityId, EntityType};

/// Flat, serializable projection of an entity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ValueObject {
    pub id: EntityId,
    pub entity_type: EntityType,
    pub label: String,
    pub taxon_id: Option<EntityId>,
}

impl ValueObject {
    /// Default projection of an entity.
    #[must_use]
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            id: entity.id(),
            entity_type: entity.entity_type(),
            label: entity.label().to_string(),
            taxon_id: entity.taxon().map(|t| t.id),
        }
    }
}

impl Identifiable for ValueObject {
    fn id(&self) -> EntityId {
        self.id
    }

    fn entity_type(&self) -> EntityType {
        self.entity_type
    }
}

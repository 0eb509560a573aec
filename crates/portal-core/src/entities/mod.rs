//! Entity structs for every searchable portal domain object.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip
//! and schema validation. The search engine only needs the identity of an entity
//! plus the handful of fields it matches on or filters by, so these are
//! deliberately narrow projections of the persisted records.

mod dataset;
mod entity;
mod gene;
mod phenotype;
mod platform;
mod publication;
mod sequence;
mod taxon;

pub use dataset::{Dataset, DatasetCollection};
pub use entity::Entity;
pub use gene::{Gene, GeneSet};
pub use phenotype::PhenotypeAnnotation;
pub use platform::Platform;
pub use publication::Publication;
pub use sequence::{Probe, Sequence};
pub use taxon::Taxon;

use crate::enums::{EntityId, EntityType};
use crate::errors::CoreError;

/// Anything with a stable identifier and a declared entity kind.
pub trait Identifiable {
    fn id(&self) -> EntityId;

    fn entity_type(&self) -> EntityType;
}

/// A concrete searchable entity struct, convertible to and from [`Entity`].
pub trait EntityKind:
    Identifiable + Clone + Into<Entity> + TryFrom<Entity, Error = CoreError>
{
    const ENTITY_TYPE: EntityType;
}

/// Implements [`Identifiable`], [`EntityKind`] and the [`Entity`] conversions
/// for an entity struct with an `id` field.
macro_rules! entity_kind {
    ($ty:ident, $variant:ident) => {
        impl $crate::entities::Identifiable for $ty {
            fn id(&self) -> $crate::enums::EntityId {
                self.id
            }

            fn entity_type(&self) -> $crate::enums::EntityType {
                $crate::enums::EntityType::$variant
            }
        }

        impl $crate::entities::EntityKind for $ty {
            const ENTITY_TYPE: $crate::enums::EntityType = $crate::enums::EntityType::$variant;
        }

        impl From<$ty> for $crate::entities::Entity {
            fn from(value: $ty) -> Self {
                Self::$variant(value)
            }
        }

        impl TryFrom<$crate::entities::Entity> for $ty {
            type Error = $crate::errors::CoreError;

            fn try_from(value: $crate::entities::Entity) -> Result<Self, Self::Error> {
                match value {
                    $crate::entities::Entity::$variant(inner) => Ok(inner),
                    other => Err($crate::errors::CoreError::WrongKind {
                        expected: $crate::enums::EntityType::$variant,
                        actual: $crate::entities::Identifiable::entity_type(&other),
                    }),
                }
            }
        }
    };
}

pub(crate) use entity_kind;

//! Cross-cutting error types for the portal crates.
//!
//! Domain-specific errors (e.g., `SearchError`, `ConfigError`) are defined in
//! their respective crates.

use thiserror::Error;

use crate::enums::{EntityId, EntityType};

/// Errors that can be raised by any portal crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: EntityType, id: EntityId },

    /// An object was attached to a search result that refers to another entity.
    #[error("Result object {entity_type} {actual} does not match result id {expected}")]
    IdMismatch {
        entity_type: EntityType,
        expected: EntityId,
        actual: EntityId,
    },

    /// An entity could not be converted to the requested kind.
    #[error("Expected a {expected} entity, got {actual}")]
    WrongKind {
        expected: EntityType,
        actual: EntityType,
    },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

//! A single ranked search hit.
//!
//! A [`SearchResult`] is identified by its declared class and id. The object
//! itself is optional: backends that only know identifiers (ontology
//! annotations, blacklist lookups) produce *provisional* results that the
//! materialization gate hydrates later.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use portal_core::entities::{Entity, EntityKind, Identifiable};
use portal_core::enums::{EntityId, EntityType};
use portal_core::errors::CoreError;

/// A search hit of declared class `result_class`, optionally carrying the
/// matched object.
///
/// Equality and hashing consider only `(result_class, result_id)`; score,
/// highlight, and payload do not take part.
#[derive(Debug, Clone)]
pub struct SearchResult<T = Entity> {
    result_class: EntityType,
    result_id: EntityId,
    result_object: Option<T>,
    score: f64,
    highlighted_text: Option<String>,
}

impl<T: Identifiable> SearchResult<T> {
    /// Result for `object` with a score of zero and no highlight.
    pub fn from_object(object: T) -> Self {
        Self::with_score(object, 0.0)
    }

    pub fn with_score(object: T, score: f64) -> Self {
        Self {
            result_class: object.entity_type(),
            result_id: object.id(),
            result_object: Some(object),
            score,
            highlighted_text: None,
        }
    }

    pub fn with_highlight(object: T, score: f64, text: impl Into<String>) -> Self {
        let mut result = Self::with_score(object, score);
        result.highlighted_text = Some(text.into());
        result
    }

    /// Result whose declared class differs from the object's own kind, as
    /// produced by value-object conversion.
    pub fn transformed(
        result_class: EntityType,
        object: T,
        score: f64,
        highlighted_text: Option<String>,
    ) -> Self {
        Self {
            result_class,
            result_id: object.id(),
            result_object: Some(object),
            score,
            highlighted_text,
        }
    }

    /// Attach the matched object.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IdMismatch`] if the object's id is not the
    /// result id.
    pub fn set_result_object(&mut self, object: T) -> Result<(), CoreError> {
        if object.id() != self.result_id {
            return Err(CoreError::IdMismatch {
                entity_type: self.result_class,
                expected: self.result_id,
                actual: object.id(),
            });
        }
        self.result_object = Some(object);
        Ok(())
    }
}

impl<T> SearchResult<T> {
    /// Identifier-only result, filled in later by the materialization gate.
    #[must_use]
    pub fn provisional(
        result_class: EntityType,
        result_id: EntityId,
        score: f64,
        highlighted_text: Option<String>,
    ) -> Self {
        Self {
            result_class,
            result_id,
            result_object: None,
            score,
            highlighted_text,
        }
    }

    #[must_use]
    pub const fn result_class(&self) -> EntityType {
        self.result_class
    }

    #[must_use]
    pub const fn result_id(&self) -> EntityId {
        self.result_id
    }

    /// The `(result_class, result_id)` identity of this result.
    #[must_use]
    pub const fn key(&self) -> (EntityType, EntityId) {
        (self.result_class, self.result_id)
    }

    #[must_use]
    pub const fn result_object(&self) -> Option<&T> {
        self.result_object.as_ref()
    }

    #[must_use]
    pub const fn is_provisional(&self) -> bool {
        self.result_object.is_none()
    }

    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    #[must_use]
    pub fn highlighted_text(&self) -> Option<&str> {
        self.highlighted_text.as_deref()
    }

    pub fn set_highlighted_text(&mut self, text: Option<String>) {
        self.highlighted_text = text;
    }

    /// Append another highlight, comma-separated. Blank text is ignored.
    pub fn append_highlight(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        match &mut self.highlighted_text {
            Some(existing) if !existing.is_empty() => {
                existing.push(',');
                existing.push_str(text);
            }
            slot => *slot = Some(text.to_string()),
        }
    }

    /// Drop the payload, keeping identity, score, and highlight.
    pub fn clear_result_object(&mut self) {
        self.result_object = None;
    }

    /// Descending-score comparator for stable sorts.
    #[must_use]
    pub fn by_score(a: &Self, b: &Self) -> Ordering {
        b.score.total_cmp(&a.score)
    }

    pub fn map_object<U>(self, f: impl FnOnce(T) -> U) -> SearchResult<U> {
        SearchResult {
            result_class: self.result_class,
            result_id: self.result_id,
            result_object: self.result_object.map(f),
            score: self.score,
            highlighted_text: self.highlighted_text,
        }
    }
}

impl<T: Into<Entity>> SearchResult<T> {
    /// Erase the object type so results of different kinds can be merged.
    pub fn into_entity(self) -> SearchResult<Entity> {
        self.map_object(Into::into)
    }
}

impl SearchResult<Entity> {
    /// Recover a typed result, or `None` when the declared class is not `T`.
    #[must_use]
    pub fn downcast<T: EntityKind>(self) -> Option<SearchResult<T>> {
        if self.result_class != T::ENTITY_TYPE {
            return None;
        }
        let object = match self.result_object {
            Some(entity) => Some(T::try_from(entity).ok()?),
            None => None,
        };
        Some(SearchResult {
            result_class: self.result_class,
            result_id: self.result_id,
            result_object: object,
            score: self.score,
            highlighted_text: self.highlighted_text,
        })
    }

    /// The taxon of the carried entity, if any.
    #[must_use]
    pub fn taxon_id(&self) -> Option<EntityId> {
        self.result_object
            .as_ref()
            .and_then(Entity::taxon)
            .map(|t| t.id)
    }
}

impl<T> PartialEq for SearchResult<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for SearchResult<T> {}

impl<T> Hash for SearchResult<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl<T> fmt::Display for SearchResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[ID={}] matched in: {}",
            self.result_class,
            self.result_id,
            self.highlighted_text
                .as_deref()
                .map_or_else(|| "(?)".to_string(), |h| format!("'{h}'"))
        )
    }
}

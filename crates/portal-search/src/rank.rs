//! Result accumulation, ranking, and per-type limiting.

use std::collections::{BTreeMap, HashMap, HashSet};

use portal_core::entities::Entity;
use portal_core::enums::{EntityId, EntityType};

use crate::result::SearchResult;

/// Search results grouped by entity type, each bucket sorted by descending score.
pub type SearchResultMap = BTreeMap<EntityType, Vec<SearchResult>>;

type ResultKey = (EntityType, EntityId);

/// Insertion-ordered set of results keyed by `(result_class, result_id)`.
///
/// The first result inserted for a key wins; later duplicates are dropped
/// together with their scores and highlights.
#[derive(Debug, Clone)]
pub struct ResultAccumulator<T = Entity> {
    items: Vec<SearchResult<T>>,
    keys: HashSet<ResultKey>,
}

impl<T> Default for ResultAccumulator<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            keys: HashSet::new(),
        }
    }
}

impl<T> ResultAccumulator<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a result unless one with the same identity is already present.
    /// Returns whether it was added.
    pub fn insert(&mut self, result: SearchResult<T>) -> bool {
        if !self.keys.insert(result.key()) {
            return false;
        }
        self.items.push(result);
        true
    }

    #[must_use]
    pub fn contains(&self, key: (EntityType, EntityId)) -> bool {
        self.keys.contains(&key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchResult<T>> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, SearchResult<T>> {
        self.items.iter_mut()
    }

    /// Keep only results accepted by `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&SearchResult<T>) -> bool) {
        self.items.retain(|r| keep(r));
        self.keys = self.items.iter().map(SearchResult::key).collect();
    }

    /// Keep only results also present in `other`, appending `other`'s
    /// highlight to each survivor.
    pub fn intersect(&mut self, other: &Self) {
        let highlights: HashMap<ResultKey, Option<&str>> = other
            .iter()
            .map(|r| (r.key(), r.highlighted_text()))
            .collect();
        self.retain(|r| highlights.contains_key(&r.key()));
        for result in &mut self.items {
            if let Some(Some(text)) = highlights.get(&result.key()) {
                result.append_highlight(text);
            }
        }
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<SearchResult<T>> {
        self.items
    }
}

impl<T: Into<Entity>> ResultAccumulator<T> {
    /// Erase the object type of every result.
    pub fn into_entities(self) -> ResultAccumulator<Entity> {
        let items: Vec<_> = self.items.into_iter().map(SearchResult::into_entity).collect();
        ResultAccumulator {
            items,
            keys: self.keys,
        }
    }
}

impl<T> Extend<SearchResult<T>> for ResultAccumulator<T> {
    fn extend<I: IntoIterator<Item = SearchResult<T>>>(&mut self, iter: I) {
        for result in iter {
            self.insert(result);
        }
    }
}

impl<T> FromIterator<SearchResult<T>> for ResultAccumulator<T> {
    fn from_iter<I: IntoIterator<Item = SearchResult<T>>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}

impl<T> IntoIterator for ResultAccumulator<T> {
    type Item = SearchResult<T>;
    type IntoIter = std::vec::IntoIter<SearchResult<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ResultAccumulator<T> {
    type Item = &'a SearchResult<T>;
    type IntoIter = std::slice::Iter<'a, SearchResult<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Sort `results` by descending score and bucket them by entity type,
/// keeping at most `max_per_type` per bucket.
///
/// Every type in `universe` gets a bucket, empty if nothing matched. Results
/// of types outside `universe` are dropped. The sort is stable, so results
/// with equal scores keep their accumulation order.
#[must_use]
pub fn sorted_limited_results(
    mut results: Vec<SearchResult>,
    universe: impl IntoIterator<Item = EntityType>,
    max_per_type: usize,
) -> SearchResultMap {
    let mut buckets: SearchResultMap = universe.into_iter().map(|t| (t, Vec::new())).collect();

    results.sort_by(SearchResult::by_score);

    for result in results {
        if let Some(bucket) = buckets.get_mut(&result.result_class())
            && bucket.len() < max_per_type
        {
            bucket.push(result);
        }
    }
    buckets
}

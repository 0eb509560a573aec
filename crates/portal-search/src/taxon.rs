//! Query preprocessing: taxon detection and short-term stripping.

use std::collections::HashMap;

use portal_core::entities::Taxon;

use crate::settings::SearchSettings;

/// Lookup of taxa by lower-cased name, built once at startup.
///
/// Full scientific and common names are always present. Single words of
/// multi-word names ("musculus", "sapiens") are added only when no full name
/// or earlier word already claims them.
#[derive(Debug, Clone, Default)]
pub struct TaxonLookup {
    by_name: HashMap<String, Taxon>,
    phrases: Vec<Vec<String>>,
}

impl TaxonLookup {
    pub fn new(taxa: impl IntoIterator<Item = Taxon>) -> Self {
        let taxa: Vec<Taxon> = taxa.into_iter().collect();
        let mut by_name = HashMap::new();
        let mut phrases = Vec::new();

        for taxon in &taxa {
            for name in taxon.names() {
                let words: Vec<String> = name
                    .to_lowercase()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect();
                if words.is_empty() {
                    continue;
                }
                let key = words.join(" ");
                if words.len() > 1 {
                    phrases.push(words);
                }
                by_name.entry(key).or_insert_with(|| taxon.clone());
            }
        }

        for taxon in &taxa {
            for name in taxon.names() {
                let lowered = name.to_lowercase();
                let words: Vec<&str> = lowered.split_whitespace().collect();
                if words.len() < 2 {
                    continue;
                }
                for word in words {
                    by_name
                        .entry(word.to_string())
                        .or_insert_with(|| taxon.clone());
                }
            }
        }

        phrases.sort_by_key(|p| std::cmp::Reverse(p.len()));
        phrases.dedup();

        tracing::debug!(names = by_name.len(), taxa = taxa.len(), "taxon lookup built");
        Self { by_name, phrases }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// The taxon known by `name`, ignoring case.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Taxon> {
        let key = name.split_whitespace().collect::<Vec<_>>().join(" ");
        self.by_name.get(&key.to_lowercase())
    }

    /// Find a taxon named in `query`.
    ///
    /// Returns the taxon and the query with the taxon name removed. When the
    /// taxon name is the whole query it is kept, so the search still has
    /// something to match.
    #[must_use]
    pub fn detect(&self, query: &str) -> Option<(Taxon, String)> {
        let tokens: Vec<&str> = query.split_whitespace().collect();
        let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();

        let mut matched: Option<(usize, usize)> = None;
        for phrase in &self.phrases {
            if let Some(start) = lowered
                .windows(phrase.len())
                .position(|window| window == phrase.as_slice())
            {
                matched = Some((start, phrase.len()));
                break;
            }
        }
        if matched.is_none() {
            matched = lowered
                .iter()
                .position(|t| self.by_name.contains_key(t))
                .map(|start| (start, 1));
        }

        let (start, len) = matched?;
        let name = lowered[start..start + len].join(" ");
        let taxon = self.by_name.get(&name)?.clone();

        let remaining: Vec<&str> = tokens
            .iter()
            .enumerate()
            .filter(|(i, _)| *i < start || *i >= start + len)
            .map(|(_, t)| *t)
            .collect();
        let query = if remaining.is_empty() {
            tokens.join(" ")
        } else {
            remaining.join(" ")
        };
        Some((taxon, query))
    }

    /// Settings with the taxon filled in from the query, unless the caller
    /// already chose one.
    #[must_use]
    pub fn process_settings(&self, settings: &SearchSettings) -> SearchSettings {
        if settings.taxon().is_some() || settings.is_term_query() {
            return settings.clone();
        }
        match self.detect(settings.query()) {
            Some((taxon, query)) => {
                tracing::debug!(taxon = taxon.id, query = %query, "taxon detected in query");
                settings.with_taxon(Some(taxon)).with_query(query)
            }
            None => settings.clone(),
        }
    }
}

/// Drop whitespace-separated tokens shorter than `min_len` characters.
#[must_use]
pub fn strip_short_terms(query: &str, min_len: usize) -> String {
    query
        .split_whitespace()
        .filter(|t| t.chars().count() >= min_len)
        .collect::<Vec<_>>()
        .join(" ")
}

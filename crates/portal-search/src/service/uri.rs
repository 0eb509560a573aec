//! Term path: queries that are ontology term URIs.

use std::collections::HashMap;

use portal_core::enums::EntityType;

use super::{SearchService, tolerate, tolerate_partial};
use crate::characteristic::DatasetHits;
use crate::error::SearchError;
use crate::rank::ResultAccumulator;
use crate::result::SearchResult;
use crate::settings::SearchSettings;
use crate::timing::StageTimer;

impl SearchService {
    /// Results for a URI query. Non-URI queries yield nothing.
    ///
    /// A gene URI resolves to the gene and the datasets annotated with the
    /// URI. Any other URI is looked up as an ontology term, including its
    /// descendants.
    pub(super) fn uri_search(
        &self,
        settings: &SearchSettings,
    ) -> Result<ResultAccumulator, SearchError> {
        let mut raw = ResultAccumulator::new();
        if !settings.is_term_query() {
            return Ok(raw);
        }

        let uri = settings.query();
        let marker = self.config.gene_uri_marker.to_lowercase();
        if uri.to_lowercase().contains(&marker) {
            self.gene_uri_search(uri, settings, &mut raw)?;
            return Ok(raw);
        }

        if settings.has_result_type(EntityType::Dataset) {
            let timer = StageTimer::start(self.config.slow_stage_ms);
            let hits = tolerate_partial(
                EntityType::Dataset,
                self.characteristics
                    .search_term(uri, settings.taxon(), settings.max_results()),
            )?;
            timer.report("term annotations", hits.len());
            raw.extend(hits.into_entities());
        }
        Ok(raw)
    }

    fn gene_uri_search(
        &self,
        uri: &str,
        settings: &SearchSettings,
        raw: &mut ResultAccumulator,
    ) -> Result<(), SearchError> {
        let Some(ncbi_id) = uri
            .rsplit('/')
            .next()
            .and_then(|id| id.trim().parse::<u32>().ok())
        else {
            tracing::warn!(uri, "gene URI does not end in an NCBI id");
            return Ok(());
        };

        let Some(gene) = tolerate(
            EntityType::Gene,
            self.collaborators.genes.find_by_ncbi_id(ncbi_id),
        ) else {
            tracing::debug!(ncbi_id, "no gene for NCBI id");
            return Ok(());
        };

        if settings.has_result_type(EntityType::Dataset) {
            let labels = HashMap::from([(uri.to_string(), gene.official_symbol.clone())]);
            let mut hits = DatasetHits::new();
            tolerate_partial(
                EntityType::Dataset,
                self.characteristics.collect_annotated(
                    &[uri.to_string()],
                    &labels,
                    &mut hits,
                    settings.taxon(),
                    settings.max_results(),
                ),
            )?;
            raw.extend(hits.into_entities());
        }

        if settings.has_result_type(EntityType::Gene) {
            raw.insert(SearchResult::with_score(gene, 1.0).into_entity());
        }
        Ok(())
    }
}

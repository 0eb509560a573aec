//! General path: one stage per entity type.
//!
//! Stages run in a fixed order because some feed later ones: probe hits
//! are handed to the platform stage, and gene hits to the sequence and
//! dataset stages, so no search runs twice.

use portal_core::entities::{Dataset, Gene, Platform, Probe};
use portal_core::enums::EntityType;

use super::{GeneHits, SearchService, tolerate, tolerate_partial};
use crate::characteristic::DatasetHits;
use crate::error::SearchError;
use crate::rank::ResultAccumulator;
use crate::result::SearchResult;
use crate::settings::SearchSettings;
use crate::timing::StageTimer;

const BLACKLISTED: &str = "Blacklisted accessions are not loaded";
const FROM_GO_GROUP: &str = "From GO group";
const ALTERNATE_MATCH_SCORE: f64 = 0.9;

impl SearchService {
    /// Gather every requested type except genes, which the caller already
    /// searched before short terms were stripped and hands over as `genes`.
    pub(super) fn accrete_others(
        &self,
        raw: &mut ResultAccumulator,
        settings: &SearchSettings,
        genes: Option<GeneHits<'_>>,
    ) -> Result<(), SearchError> {
        if settings.has_result_type(EntityType::Dataset) {
            let exact_genes = genes.filter(|g| g.exact).map(|g| g.results);
            let datasets = self.dataset_search(settings, exact_genes)?;
            raw.extend(datasets.into_entities());
        }

        let probes = if settings.has_result_type(EntityType::Probe) {
            let probes = self.probe_search(settings);
            raw.extend(probes.iter().cloned().map(SearchResult::into_entity));
            Some(probes)
        } else {
            None
        };

        if settings.has_result_type(EntityType::Platform) {
            let platforms = self.platform_search(settings, probes.as_deref());
            raw.extend(platforms.into_iter().map(SearchResult::into_entity));
        }

        if settings.has_result_type(EntityType::Sequence) {
            raw.extend(self.sequence_search(settings, genes.map(|g| g.results)));
        }

        if settings.has_result_type(EntityType::Gene) && settings.use_go() {
            let go_genes = self.go_gene_search(settings)?;
            raw.extend(go_genes.into_iter().map(SearchResult::into_entity));
        }

        if settings.has_result_type(EntityType::Publication) {
            let timer = StageTimer::start(self.config.slow_backend_ms);
            let publications = tolerate(
                EntityType::Publication,
                self.collaborators.index.search_publication(settings),
            );
            timer.report("publication", publications.len());
            raw.extend(publications.into_iter().map(SearchResult::into_entity));
        }

        if settings.has_result_type(EntityType::GeneSet) {
            self.gene_set_search(raw, settings);
        }

        if settings.has_result_type(EntityType::DatasetCollection) {
            self.dataset_collection_search(raw, settings);
        }

        if settings.has_result_type(EntityType::PhenotypeAnnotation) {
            let timer = StageTimer::start(self.config.slow_backend_ms);
            let phenotypes = tolerate(
                EntityType::PhenotypeAnnotation,
                self.collaborators.database.search_phenotype(settings),
            );
            timer.report("phenotype", phenotypes.len());
            raw.extend(phenotypes.into_iter().map(SearchResult::into_entity));
        }

        Ok(())
    }

    /// Datasets, from the cheapest source to the most expensive.
    ///
    /// 1. Exact database match; a hit ends the stage for non-admin callers.
    /// 2. A blacklisted accession ends the stage with a provisional result.
    /// 3. Datasets annotated with genes whose symbol matches the query.
    /// 4. Ontology annotations.
    /// 5. Full-text index, while under the cap.
    /// 6. If still empty, datasets run on matching platforms.
    ///
    /// `genes` are reused for step 3 when the caller already searched them
    /// with `return_on_db_hit`.
    fn dataset_search(
        &self,
        settings: &SearchSettings,
        genes: Option<&[SearchResult<Gene>]>,
    ) -> Result<DatasetHits, SearchError> {
        let total = StageTimer::start(self.config.slow_stage_ms);
        let query = settings.query();
        let mut results = DatasetHits::new();
        tracing::debug!(query, "starting dataset search");

        if settings.use_database() {
            let timer = StageTimer::start(self.config.slow_backend_ms);
            results.extend(tolerate(
                EntityType::Dataset,
                self.collaborators.database.search_dataset(settings),
            ));
            timer.report("dataset database", results.len());

            if !results.is_empty() && !self.collaborators.access.is_admin() {
                return Ok(results);
            }

            if let Some(blacklisted) = tolerate(
                EntityType::Dataset,
                self.collaborators.blacklist.find_by_accession(query),
            ) {
                results.insert(SearchResult::provisional(
                    EntityType::Dataset,
                    blacklisted.id,
                    1.0,
                    Some(BLACKLISTED.to_string()),
                ));
                return Ok(results);
            }
        }

        let timer = StageTimer::start(self.config.slow_backend_ms);
        let searched;
        let genes = if let Some(genes) = genes {
            genes
        } else {
            searched = self.gene_search(settings, true)?;
            searched.as_slice()
        };
        for gene_hit in genes {
            let Some(ncbi_id) = gene_hit.result_object().and_then(|g| g.ncbi_gene_id) else {
                continue;
            };
            let gene_uri = format!("{}{ncbi_id}", self.config.gene_uri_prefix);
            let derived = SearchSettings::dataset_search_in_taxon(gene_uri, settings.taxon().cloned())
                .with_max_results(settings.max_results());
            let annotated = self.uri_search(&derived)?;
            results.extend(annotated.into_iter().filter_map(SearchResult::downcast::<Dataset>));
        }
        timer.report("dataset via genes", results.len());

        if settings.use_characteristics() {
            let timer = StageTimer::start(self.config.slow_backend_ms);
            let hits = tolerate_partial(
                EntityType::Dataset,
                self.characteristics
                    .search(query, settings.taxon(), settings.max_results()),
            )?;
            timer.report("dataset characteristics", hits.len());
            results.extend(hits);
        }

        if settings.use_indices() && results.len() < settings.max_results() {
            let timer = StageTimer::start(self.config.slow_backend_ms);
            let indexed = tolerate(
                EntityType::Dataset,
                self.collaborators.index.search_dataset(settings),
            );
            timer.report("dataset index", indexed.len());
            results.extend(indexed);
        }

        if results.is_empty() {
            let timer = StageTimer::start(self.config.slow_backend_ms);
            for platform_hit in self.platform_search(settings, None) {
                let Some(platform) = platform_hit.result_object() else {
                    continue;
                };
                let highlight = format!("{} - {}", platform.short_name, platform.name);
                let datasets = tolerate(
                    EntityType::Dataset,
                    self.collaborators.platforms.datasets_for(platform),
                );
                results.extend(
                    datasets
                        .into_iter()
                        .map(|d| SearchResult::with_highlight(d, 1.0, highlight.clone())),
                );
            }
            timer.report("dataset via platforms", results.len());
        }

        total.report("dataset", results.len());
        Ok(results)
    }

    /// Genes.
    ///
    /// With `return_on_db_hit` an exact database match ends the stage.
    /// Otherwise the index is consulted too, then the genes of matching
    /// probes, then genes linked to matching phenotypes.
    pub(super) fn gene_search(
        &self,
        settings: &SearchSettings,
        return_on_db_hit: bool,
    ) -> Result<Vec<SearchResult<Gene>>, SearchError> {
        let timer = StageTimer::start(self.config.slow_backend_ms);

        let database = tolerate(
            EntityType::Gene,
            self.collaborators.database.search_gene(settings),
        );
        if return_on_db_hit && !database.is_empty() {
            return Ok(database);
        }

        let mut genes: ResultAccumulator<Gene> = database.into_iter().collect();
        genes.extend(tolerate(
            EntityType::Gene,
            self.collaborators.index.search_gene(settings),
        ));

        if genes.is_empty() {
            let probe_and_gene = tolerate(
                EntityType::Gene,
                self.collaborators.database.search_probe_and_gene(settings),
            );
            genes.extend(
                probe_and_gene
                    .into_iter()
                    .filter_map(SearchResult::downcast::<Gene>),
            );
        }

        if genes.is_empty() {
            for phenotype in self.collaborators.genes.find_phenotypes(settings.query())? {
                let Some(uri) = phenotype.value_uri.as_deref() else {
                    continue;
                };
                let candidates = tolerate(
                    EntityType::Gene,
                    self.collaborators
                        .genes
                        .candidate_genes(&[uri.to_string()], settings.taxon()),
                );
                if !candidates.is_empty() {
                    tracing::debug!(phenotype = %phenotype.value, genes = candidates.len(), "phenotype-linked genes");
                }
                let highlight = format!("{} ({uri})", phenotype.value);
                genes.extend(
                    candidates
                        .into_iter()
                        .map(|g| SearchResult::with_highlight(g, 1.0, highlight.clone())),
                );
                if genes.len() > self.config.phenotype_gene_limit {
                    break;
                }
            }
        }

        timer.report("gene", genes.len());
        Ok(genes.into_vec())
    }

    /// Probes from the database; genes of the combined search are dropped.
    fn probe_search(&self, settings: &SearchSettings) -> Vec<SearchResult<Probe>> {
        let timer = StageTimer::start(self.config.slow_backend_ms);
        let probes: Vec<_> = tolerate(
            EntityType::Probe,
            self.collaborators.database.search_probe_and_gene(settings),
        )
        .into_iter()
        .filter_map(SearchResult::downcast::<Probe>)
        .collect();
        timer.report("probe", probes.len());
        probes
    }

    /// Platforms.
    ///
    /// An exact short name or name match ends the stage for non-admin
    /// callers, as does a blacklisted accession. Otherwise alternate names,
    /// manufacturers, both backends, and the platforms of matching probes
    /// contribute. `probes` are reused when the caller already has them.
    fn platform_search(
        &self,
        settings: &SearchSettings,
        probes: Option<&[SearchResult<Probe>]>,
    ) -> Vec<SearchResult<Platform>> {
        let timer = StageTimer::start(self.config.slow_backend_ms);
        let query = settings.query();
        let catalog = &self.collaborators.platforms;
        let admin = self.collaborators.access.is_admin();
        let mut results = ResultAccumulator::<Platform>::new();

        if let Some(platform) = tolerate(EntityType::Platform, catalog.find_by_short_name(query)) {
            results.insert(SearchResult::with_score(platform, 1.0));
            if !admin {
                return results.into_vec();
            }
        }

        let by_name = tolerate(EntityType::Platform, catalog.find_by_name(query));
        if !by_name.is_empty() {
            results.extend(by_name.into_iter().map(|p| SearchResult::with_score(p, 1.0)));
            if !admin {
                return results.into_vec();
            }
        }

        if let Some(blacklisted) = tolerate(
            EntityType::Platform,
            self.collaborators.blacklist.find_by_accession(query),
        ) {
            results.insert(SearchResult::provisional(
                EntityType::Platform,
                blacklisted.id,
                1.0,
                Some(BLACKLISTED.to_string()),
            ));
            return results.into_vec();
        }

        results.extend(
            tolerate(EntityType::Platform, catalog.find_by_alternate_name(query))
                .into_iter()
                .map(|p| SearchResult::with_score(p, ALTERNATE_MATCH_SCORE)),
        );
        results.extend(
            tolerate(EntityType::Platform, catalog.find_by_manufacturer(query))
                .into_iter()
                .map(|p| SearchResult::with_score(p, ALTERNATE_MATCH_SCORE)),
        );

        results.extend(tolerate(
            EntityType::Platform,
            self.collaborators.index.search_platform(settings),
        ));
        results.extend(tolerate(
            EntityType::Platform,
            self.collaborators.database.search_platform(settings),
        ));

        let searched;
        let probes = if let Some(probes) = probes {
            probes
        } else {
            searched = tolerate(
                EntityType::Probe,
                self.collaborators.index.search_probe_and_gene(settings),
            )
            .into_iter()
            .filter_map(SearchResult::downcast::<Probe>)
            .collect::<Vec<_>>();
            searched.as_slice()
        };
        for probe in probes {
            if let Some(platform) = probe.result_object().and_then(|p| p.platform.clone()) {
                results.insert(SearchResult::with_score(platform, probe.score()));
            }
        }

        timer.report("platform", results.len());
        results.into_vec()
    }

    /// Sequences and their genes from both backends, reusing `genes`.
    fn sequence_search(
        &self,
        settings: &SearchSettings,
        genes: Option<&[SearchResult<Gene>]>,
    ) -> ResultAccumulator {
        let timer = StageTimer::start(self.config.slow_backend_ms);
        let mut results = ResultAccumulator::new();
        for source in [&self.collaborators.index, &self.collaborators.database] {
            results.extend(
                tolerate(
                    EntityType::Sequence,
                    source.search_sequence_and_gene(settings, genes),
                )
                .into_iter()
                .filter(|r| {
                    matches!(r.result_class(), EntityType::Sequence | EntityType::Gene)
                }),
            );
        }
        timer.report("sequence", results.len());
        results
    }

    fn go_gene_search(
        &self,
        settings: &SearchSettings,
    ) -> Result<Vec<SearchResult<Gene>>, SearchError> {
        let timer = StageTimer::start(self.config.slow_backend_ms);
        let genes: Vec<_> = self
            .collaborators
            .genes
            .go_group_genes(settings.query(), settings.taxon())?
            .into_iter()
            .map(|g| SearchResult::with_highlight(g, 1.0, FROM_GO_GROUP))
            .collect();
        timer.report("GO genes", genes.len());
        Ok(genes)
    }

    fn gene_set_search(&self, raw: &mut ResultAccumulator, settings: &SearchSettings) {
        let timer = StageTimer::start(self.config.slow_backend_ms);
        let before = raw.len();
        let by_name = tolerate(
            EntityType::GeneSet,
            self.collaborators
                .named_sets
                .gene_sets_by_name(settings.query(), settings.taxon()),
        );
        raw.extend(
            by_name
                .into_iter()
                .map(|s| SearchResult::with_score(s, 1.0).into_entity()),
        );
        raw.extend(
            tolerate(
                EntityType::GeneSet,
                self.collaborators.index.search_gene_set(settings),
            )
            .into_iter()
            .map(SearchResult::into_entity),
        );
        timer.report("gene set", raw.len() - before);
    }

    fn dataset_collection_search(&self, raw: &mut ResultAccumulator, settings: &SearchSettings) {
        let timer = StageTimer::start(self.config.slow_backend_ms);
        let before = raw.len();
        let by_name = tolerate(
            EntityType::DatasetCollection,
            self.collaborators
                .named_sets
                .dataset_collections_by_name(settings.query()),
        );
        raw.extend(
            by_name
                .into_iter()
                .map(|c| SearchResult::with_score(c, 1.0).into_entity()),
        );
        raw.extend(
            tolerate(
                EntityType::DatasetCollection,
                self.collaborators.index.search_dataset_collection(settings),
            )
            .into_iter()
            .map(SearchResult::into_entity),
        );
        timer.report("dataset collection", raw.len() - before);
    }
}

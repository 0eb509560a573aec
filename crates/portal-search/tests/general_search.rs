//! General-path integration tests over the in-memory portal.
//!
//! - Ontology-driven dataset search (AND/OR, descendants, taxon detection)
//! - Per-type stages and their short-circuits
//! - Result reuse between stages
//! - Partial failures

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use common::*;
use portal_core::enums::EntityType;
use portal_search::memory::{MemoryAnnotations, MemoryOntology, MemoryPortal, MemorySource};
use portal_search::{SearchError, SearchService, SearchSettings};

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

#[test]
fn and_query_intersects_terms_including_descendants() {
    let portal = portal();
    let results = service(&portal)
        .search(&SearchSettings::dataset_search("hippocampus AND neuron"))
        .unwrap();

    // Dataset 2 is tagged with the dentate gyrus, a child of the hippocampus.
    // Dataset 3 is only tagged with neuron.
    assert_eq!(id_set(&results, EntityType::Dataset), BTreeSet::from([1, 2]));
}

#[test]
fn and_query_merges_highlights_of_both_terms() {
    let portal = portal();
    let results = service(&portal)
        .search(&SearchSettings::dataset_search("hippocampus AND neuron"))
        .unwrap();

    let first = results[&EntityType::Dataset]
        .iter()
        .find(|r| r.result_id() == 1)
        .unwrap();
    let highlight = first.highlighted_text().unwrap();
    assert!(highlight.contains(">hippocampus</a>"));
    assert!(highlight.contains(">neuron</a>"));
    assert!(highlight.contains("via Sample"));
}

#[test]
fn or_query_unions_clauses() {
    let portal = portal();
    let results = service(&portal)
        .search(&SearchSettings::dataset_search("hippocampus OR neuron"))
        .unwrap();

    assert_eq!(
        id_set(&results, EntityType::Dataset),
        BTreeSet::from([1, 2, 3])
    );
}

#[test]
fn taxon_named_in_query_restricts_results() {
    let portal = portal();
    let results = service(&portal)
        .search(&SearchSettings::dataset_search("mouse neuron"))
        .unwrap();

    assert_eq!(ids(&results, EntityType::Dataset), vec![3]);
}

#[test]
fn explicit_taxon_wins_over_query_words() {
    let portal = portal();
    let human = portal.store.taxa[0].clone();
    let settings = SearchSettings::dataset_search_in_taxon("neuron", Some(human));
    let results = service(&portal).search(&settings).unwrap();

    assert_eq!(id_set(&results, EntityType::Dataset), BTreeSet::from([1, 2]));
}

#[test]
fn exact_dataset_hit_skips_other_backends() {
    let portal = portal();
    let results = service(&portal)
        .search(&SearchSettings::dataset_search("GSE100"))
        .unwrap();

    assert_eq!(ids(&results, EntityType::Dataset), vec![1]);
    assert_eq!(portal.index.calls("search_dataset"), 0);
}

#[test]
fn admin_sees_past_exact_dataset_hit() {
    let mut store = store();
    store.admin = true;
    let portal = MemoryPortal::new(store, ontology(), annotations());
    let results = service(&portal)
        .search(&SearchSettings::dataset_search("GSE100"))
        .unwrap();

    assert_eq!(ids(&results, EntityType::Dataset), vec![1]);
    assert_eq!(portal.index.calls("search_dataset"), 1);
}

#[test]
fn blacklisted_accession_yields_marker_result() {
    let portal = portal();
    let settings = SearchSettings::dataset_search("GSE999").with_fill_objects(false);
    let results = service(&portal).search(&settings).unwrap();

    let bucket = &results[&EntityType::Dataset];
    assert_eq!(bucket.len(), 1);
    assert_eq!(bucket[0].result_id(), 42);
    assert_eq!(
        bucket[0].highlighted_text(),
        Some("Blacklisted accessions are not loaded")
    );
}

#[test]
fn datasets_found_through_gene_symbol() {
    let portal = portal();
    let results = service(&portal)
        .search(&SearchSettings::dataset_search("CDK2"))
        .unwrap();

    let bucket = &results[&EntityType::Dataset];
    assert_eq!(bucket.len(), 1);
    assert_eq!(bucket[0].result_id(), 4);
    assert!(bucket[0].highlighted_text().unwrap().contains(">CDK2</a>"));
}

#[test]
fn datasets_fall_back_to_matching_platforms() {
    let portal = portal();
    let results = service(&portal)
        .search(&SearchSettings::dataset_search("GPL570"))
        .unwrap();

    let bucket = &results[&EntityType::Dataset];
    assert_eq!(bucket.len(), 1);
    assert_eq!(bucket[0].result_id(), 4);
    assert_eq!(
        bucket[0].highlighted_text(),
        Some("GPL570 - Affymetrix HG-U133 Plus 2")
    );
}

// ---------------------------------------------------------------------------
// Genes
// ---------------------------------------------------------------------------

#[test]
fn gene_search_unions_database_and_index() {
    let portal = portal();
    let results = service(&portal)
        .search(&SearchSettings::gene_search("CDK2", None))
        .unwrap();

    assert_eq!(ids(&results, EntityType::Gene), vec![10]);
    assert_eq!(portal.database.calls("search_gene"), 1);
    assert_eq!(portal.index.calls("search_gene"), 1);
}

#[test]
fn speed_search_stops_at_database_gene_hit() {
    let portal = portal();
    let results = service(&portal)
        .speed_search(&SearchSettings::gene_search("CDK2", None))
        .unwrap();

    assert_eq!(ids(&results, EntityType::Gene), vec![10]);
    assert_eq!(portal.index.calls("search_gene"), 0);
}

#[test]
fn phenotype_links_candidate_genes() {
    let portal = portal();
    let results = service(&portal)
        .search(&SearchSettings::gene_search("seizures", None))
        .unwrap();

    let bucket = &results[&EntityType::Gene];
    assert_eq!(bucket.len(), 1);
    assert_eq!(bucket[0].result_id(), 11);
    assert_eq!(
        bucket[0].highlighted_text(),
        Some(format!("seizures ({SEIZURE})").as_str())
    );
}

#[test]
fn go_group_members_join_gene_results() {
    let portal = portal();
    let results = service(&portal)
        .search(&SearchSettings::gene_search("cell cycle", None))
        .unwrap();

    let bucket = &results[&EntityType::Gene];
    assert_eq!(bucket.len(), 1);
    assert_eq!(bucket[0].result_id(), 10);
    assert_eq!(bucket[0].highlighted_text(), Some("From GO group"));
}

#[test]
fn sequence_stage_reuses_gene_results() {
    let portal = portal();
    let settings = SearchSettings::builder()
        .query("NM_001798")
        .result_types([EntityType::Gene, EntityType::Sequence])
        .build();
    let results = service(&portal).search(&settings).unwrap();

    assert_eq!(ids(&results, EntityType::Sequence), vec![600]);
    assert_eq!(ids(&results, EntityType::Gene), vec![10]);
    // Only the gene stage itself searched genes.
    assert_eq!(portal.database.calls("search_gene"), 1);
    assert_eq!(portal.index.calls("search_gene"), 1);
}

#[test]
fn dataset_stage_reuses_speed_search_genes() {
    let portal = portal();
    let settings = SearchSettings::builder()
        .query("seizures")
        .result_types([EntityType::Gene, EntityType::Dataset])
        .build();
    let results = service(&portal).speed_search(&settings).unwrap();

    assert_eq!(ids(&results, EntityType::Gene), vec![11]);
    assert_eq!(portal.database.calls("search_gene"), 1);
    assert_eq!(portal.index.calls("search_gene"), 1);
    assert_eq!(portal.database.calls("search_probe_and_gene"), 1);
}

#[test]
fn dataset_stage_searches_genes_itself_when_not_requested() {
    let portal = portal();
    let results = service(&portal)
        .speed_search(&SearchSettings::dataset_search("CDK2"))
        .unwrap();

    assert_eq!(ids(&results, EntityType::Dataset), vec![4]);
    assert_eq!(portal.database.calls("search_gene"), 1);
}

// ---------------------------------------------------------------------------
// Platforms and probes
// ---------------------------------------------------------------------------

#[test]
fn exact_platform_short_name_ends_stage() {
    let portal = portal();
    let results = service(&portal)
        .search(&SearchSettings::platform_search("GPL570"))
        .unwrap();

    let bucket = &results[&EntityType::Platform];
    assert_eq!(bucket.len(), 1);
    assert_eq!(bucket[0].result_id(), 100);
    assert!((bucket[0].score() - 1.0).abs() < f64::EPSILON);
    assert_eq!(portal.index.calls("search_platform"), 0);
}

#[test]
fn manufacturer_matches_score_below_exact() {
    let portal = portal();
    let results = service(&portal)
        .search(&SearchSettings::platform_search("Affymetrix"))
        .unwrap();

    let bucket = &results[&EntityType::Platform];
    assert_eq!(id_set(&results, EntityType::Platform), BTreeSet::from([100, 101]));
    // The index matched both too; the earlier catalog score is kept.
    assert!(bucket.iter().all(|r| (r.score() - 0.9).abs() < f64::EPSILON));
}

#[test]
fn platform_stage_reuses_probe_results() {
    let portal = portal();
    let settings = SearchSettings::builder()
        .query("204252_at")
        .result_types([EntityType::Probe, EntityType::Platform])
        .build();
    let results = service(&portal).search(&settings).unwrap();

    assert_eq!(ids(&results, EntityType::Probe), vec![500]);
    assert_eq!(ids(&results, EntityType::Platform), vec![100]);
    assert_eq!(portal.database.calls("search_probe_and_gene"), 1);
    assert_eq!(portal.index.calls("search_probe_and_gene"), 0);
}

#[test]
fn probe_search_honors_platform_constraint() {
    let portal = portal();
    let other = portal.store.platforms[1].clone();
    let settings = SearchSettings::probe_search("204252_at", Some(other));
    let results = service(&portal).search(&settings).unwrap();

    assert!(ids(&results, EntityType::Probe).is_empty());
}

// ---------------------------------------------------------------------------
// Named sets and publications
// ---------------------------------------------------------------------------

#[test]
fn named_sets_match_by_name() {
    let portal = portal();
    let settings = SearchSettings::builder()
        .query("brain atlas")
        .result_types([EntityType::DatasetCollection, EntityType::GeneSet])
        .build();
    let results = service(&portal).search(&settings).unwrap();

    assert_eq!(ids(&results, EntityType::DatasetCollection), vec![800]);
    assert!(ids(&results, EntityType::GeneSet).is_empty());
}

#[test]
fn publications_come_from_the_index() {
    let portal = portal();
    let results = service(&portal)
        .search(&SearchSettings::publication_search("neurogenesis"))
        .unwrap();

    assert_eq!(ids(&results, EntityType::Publication), vec![900]);
    assert_eq!(portal.database.calls("search_publication"), 0);
}

// ---------------------------------------------------------------------------
// Ranking and buckets
// ---------------------------------------------------------------------------

#[test]
fn every_supported_type_gets_a_sorted_capped_bucket() {
    let portal = portal();
    let settings = SearchSettings::builder()
        .query("neuron")
        .result_types(EntityType::ALL)
        .max_results(2)
        .build();
    let results = service(&portal).search(&settings).unwrap();

    assert_eq!(
        results.keys().copied().collect::<Vec<_>>(),
        EntityType::ALL.to_vec()
    );
    for bucket in results.values() {
        assert!(bucket.len() <= 2);
        assert!(bucket.windows(2).all(|w| w[0].score() >= w[1].score()));
        let keys: BTreeSet<_> = bucket.iter().map(|r| r.key()).collect();
        assert_eq!(keys.len(), bucket.len());
    }
    assert_eq!(results[&EntityType::Dataset].len(), 2);
}

#[test]
fn query_of_only_short_terms_is_empty() {
    let portal = portal();
    let results = service(&portal)
        .search(&SearchSettings::dataset_search("a b"))
        .unwrap();

    assert!(results.values().all(Vec::is_empty));
}

#[test]
fn unsupported_result_type_is_rejected() {
    let portal = portal();
    let service = SearchService::builder(portal.collaborators())
        .result_types([EntityType::Dataset])
        .build()
        .unwrap();

    let err = service
        .search(&SearchSettings::gene_search("CDK2", None))
        .unwrap_err();
    assert!(matches!(err, SearchError::UnsupportedResultType(ref types) if types == &vec![EntityType::Gene]));

    let results = service
        .search(&SearchSettings::dataset_search("GSE100"))
        .unwrap();
    assert_eq!(results.keys().copied().collect::<Vec<_>>(), vec![EntityType::Dataset]);
}

#[test]
fn typed_search_returns_one_bucket() {
    let portal = portal();
    let genes = service(&portal)
        .search_type::<portal_core::entities::Gene>(&SearchSettings::gene_search("CDK2", None))
        .unwrap();

    assert_eq!(genes.len(), 1);
    assert_eq!(genes[0].result_object().unwrap().ncbi_gene_id, Some(1017));
}

// ---------------------------------------------------------------------------
// Materialization
// ---------------------------------------------------------------------------

#[test]
fn stripped_results_carry_no_objects() {
    let portal = portal();
    let settings = SearchSettings::dataset_search("neuron").with_fill_objects(false);
    let results = service(&portal).search(&settings).unwrap();

    let bucket = &results[&EntityType::Dataset];
    assert!(!bucket.is_empty());
    assert!(bucket.iter().all(|r| r.result_object().is_none()));
}

#[test]
fn filled_results_drop_entities_the_loader_hides() {
    let mut store = store();
    store.hidden.push((EntityType::Dataset, 2));
    let portal = MemoryPortal::new(store, ontology(), annotations());
    let service = service(&portal);

    let filled = service
        .search(&SearchSettings::dataset_search("neuron"))
        .unwrap();
    assert_eq!(id_set(&filled, EntityType::Dataset), BTreeSet::from([1, 3]));
    assert!(filled[&EntityType::Dataset]
        .iter()
        .all(|r| r.result_object().is_some()));

    let stripped = service
        .search(&SearchSettings::dataset_search("neuron").with_fill_objects(false))
        .unwrap();
    assert_eq!(
        id_set(&stripped, EntityType::Dataset),
        BTreeSet::from([1, 2, 3])
    );
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn ontology_failure_aborts_search() {
    let portal = MemoryPortal::new(store(), MemoryOntology::new().unavailable(), annotations());
    let err = service(&portal)
        .search(&SearchSettings::dataset_search("hippocampus"))
        .unwrap_err();

    assert!(matches!(err, SearchError::Ontology(_)));
}

#[test]
fn annotation_store_failure_keeps_other_backends() {
    let portal = MemoryPortal::new(store(), ontology(), MemoryAnnotations::new().failing());
    let results = service(&portal)
        .search(&SearchSettings::dataset_search("neuron"))
        .unwrap();

    // Only the index matched, on dataset names.
    assert_eq!(id_set(&results, EntityType::Dataset), BTreeSet::from([1, 2]));
}

#[test]
fn failing_backend_is_skipped() {
    let portal = portal();
    let mut collaborators = portal.collaborators();
    collaborators.database = Arc::new(
        MemorySource::database(Arc::clone(&portal.store)).failing_for(EntityType::Dataset),
    );
    let service = SearchService::builder(collaborators).build().unwrap();

    let results = service
        .search(&SearchSettings::dataset_search("hippocampus"))
        .unwrap();
    assert_eq!(id_set(&results, EntityType::Dataset), BTreeSet::from([1, 2]));
}

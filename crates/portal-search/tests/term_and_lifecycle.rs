//! Term-URI queries, id-only dataset search, value objects, and the
//! service lifecycle.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use common::*;
use portal_config::PortalConfig;
use portal_core::enums::{AnnotationLevel, EntityType};
use portal_core::value_object::ValueObject;
use portal_search::memory::{MemoryAnnotations, MemoryOntology, MemoryPortal};
use portal_search::{SearchError, SearchService, SearchSettings};

// ---------------------------------------------------------------------------
// Term queries
// ---------------------------------------------------------------------------

#[test]
fn gene_uri_resolves_gene_and_annotated_datasets() {
    let portal = portal();
    let settings = SearchSettings::builder()
        .query(CDK2_URI)
        .result_types([EntityType::Gene, EntityType::Dataset])
        .build();
    let results = service(&portal).search(&settings).unwrap();

    let genes = &results[&EntityType::Gene];
    assert_eq!(genes.len(), 1);
    assert_eq!(genes[0].result_id(), 10);
    assert!((genes[0].score() - 1.0).abs() < f64::EPSILON);
    assert_eq!(ids(&results, EntityType::Dataset), vec![4]);
    // Both types were answered by the term path.
    assert_eq!(portal.database.calls("search_gene"), 0);
}

#[test]
fn ontology_term_uri_includes_descendants() {
    let portal = portal();
    let results = service(&portal)
        .search(&SearchSettings::dataset_search(HIPPOCAMPUS))
        .unwrap();

    assert_eq!(id_set(&results, EntityType::Dataset), BTreeSet::from([1, 2]));
}

#[test]
fn term_query_falls_back_for_unanswered_types() {
    let portal = portal();
    let settings = SearchSettings::builder()
        .query(HIPPOCAMPUS)
        .result_types([EntityType::Dataset, EntityType::Gene])
        .build();
    let results = service(&portal).search(&settings).unwrap();

    assert_eq!(id_set(&results, EntityType::Dataset), BTreeSet::from([1, 2]));
    assert!(ids(&results, EntityType::Gene).is_empty());
    assert_eq!(portal.database.calls("search_gene"), 1);
}

#[test]
fn cyclic_ontology_terminates() {
    let a = "http://example.org/onto/A";
    let b = "http://example.org/onto/B";
    let ontology = MemoryOntology::new()
        .with_term(a, "alpha", &[b])
        .with_term(b, "beta", &[a]);
    let annotations = MemoryAnnotations::new().annotate(3, b, AnnotationLevel::Dataset);
    let portal = MemoryPortal::new(store(), ontology, annotations);

    let results = service(&portal)
        .search(&SearchSettings::dataset_search("alpha"))
        .unwrap();

    assert_eq!(ids(&results, EntityType::Dataset), vec![3]);
    assert_eq!(portal.ontology.children_calls(), 2);
}

#[test]
fn child_terms_are_cached_across_searches() {
    let portal = portal();
    let service = service(&portal);
    let settings = SearchSettings::dataset_search("hippocampus");

    let first = service.search(&settings).unwrap();
    let calls = portal.ontology.children_calls();
    let second = service.search(&settings).unwrap();

    assert!(calls > 0);
    assert_eq!(portal.ontology.children_calls(), calls);
    assert_eq!(
        id_set(&first, EntityType::Dataset),
        id_set(&second, EntityType::Dataset)
    );
    assert!(service.child_terms().stats().hits() > 0);
}

// ---------------------------------------------------------------------------
// Dataset ids
// ---------------------------------------------------------------------------

#[test]
fn dataset_ids_for_query() {
    let portal = portal();
    let ids = service(&portal)
        .search_dataset_ids("hippocampus", None)
        .unwrap();

    assert_eq!(ids, BTreeSet::from([1, 2]));
}

#[test]
fn dataset_ids_for_short_query_are_empty() {
    let portal = portal();
    let ids = service(&portal).search_dataset_ids("ab", Some(HUMAN)).unwrap();

    assert!(ids.is_empty());
}

#[test]
fn dataset_ids_for_blank_query_list_the_taxon() {
    let portal = portal();
    let service = service(&portal);

    assert_eq!(
        service.search_dataset_ids("  ", Some(HUMAN)).unwrap(),
        BTreeSet::from([1, 2, 4])
    );
    assert!(service.search_dataset_ids("", None).unwrap().is_empty());
}

#[test]
fn dataset_ids_respect_taxon() {
    let portal = portal();
    let ids = service(&portal)
        .search_dataset_ids("neuron", Some(MOUSE))
        .unwrap();

    assert_eq!(ids, BTreeSet::from([3]));
}

// ---------------------------------------------------------------------------
// Value objects
// ---------------------------------------------------------------------------

#[test]
fn results_convert_to_value_objects() {
    let portal = portal();
    let service = service(&portal);
    let results = service
        .search(&SearchSettings::gene_search("CDK2", None))
        .unwrap();

    let converted = service
        .load_value_objects(&results[&EntityType::Gene])
        .unwrap();
    assert_eq!(converted.len(), 1);
    let vo = converted[0].result_object().unwrap();
    assert_eq!(vo.label, "CDK2");
    assert_eq!(vo.taxon_id, Some(HUMAN));
}

#[test]
fn publications_have_no_value_object() {
    let portal = portal();
    let service = service(&portal);
    let results = service
        .search(&SearchSettings::publication_search("neurogenesis"))
        .unwrap();

    let err = service
        .load_value_object(&results[&EntityType::Publication][0])
        .unwrap_err();
    assert!(matches!(
        err,
        SearchError::UnsupportedConversion(EntityType::Publication)
    ));
}

#[test]
fn custom_converter_replaces_default() {
    let portal = portal();
    let service = SearchService::builder(portal.collaborators())
        .converter(
            EntityType::Publication,
            Arc::new(|entity: &portal_core::entities::Entity| {
                let mut vo = ValueObject::from_entity(entity);
                vo.label = vo.label.to_uppercase();
                vo
            }),
        )
        .build()
        .unwrap();
    let results = service
        .search(&SearchSettings::publication_search("neurogenesis"))
        .unwrap();

    let vo = service
        .load_value_object(&results[&EntityType::Publication][0])
        .unwrap();
    assert_eq!(
        vo.result_object().unwrap().label,
        "HIPPOCAMPAL NEUROGENESIS IN ADULTS"
    );
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn invalid_config_fails_build() {
    let portal = portal();
    let mut config = PortalConfig::default();
    config.cache.capacity = 0;

    let err = SearchService::builder(portal.collaborators())
        .config(config)
        .build()
        .unwrap_err();
    assert!(matches!(err, SearchError::CacheInit(_)));
}

#[test]
fn invalid_search_config_fails_build() {
    let portal = portal();
    let mut config = PortalConfig::default();
    config.search.gene_uri_prefix = "http://example.org/genes/".to_string();

    let err = SearchService::builder(portal.collaborators())
        .config(config)
        .build()
        .unwrap_err();
    assert!(matches!(err, SearchError::Config(_)));
}

#[test]
fn shutdown_empties_child_cache() {
    let portal = portal();
    let service = service(&portal);
    service
        .search(&SearchSettings::dataset_search("hippocampus"))
        .unwrap();
    assert!(service.child_terms().entry_count() > 0);

    service.shutdown();
    assert_eq!(service.child_terms().entry_count(), 0);
}

#[test]
fn supported_types_default_to_all() {
    let portal = portal();
    let service = service(&portal);

    assert_eq!(
        service.supported_result_types().iter().copied().collect::<Vec<_>>(),
        EntityType::ALL.to_vec()
    );
}

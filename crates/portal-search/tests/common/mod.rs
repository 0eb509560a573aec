//! Shared fixture: a small human/mouse portal with ontology annotations.

#![allow(dead_code)]

use std::collections::BTreeSet;

use portal_core::enums::{AnnotationLevel, EntityId, EntityType};
use portal_search::memory::{MemoryAnnotations, MemoryOntology, MemoryPortal, MemoryStore};
use portal_search::{SearchResultMap, SearchService};

pub const HIPPOCAMPUS: &str = "http://purl.obolibrary.org/obo/UBERON_0001954";
pub const DENTATE_GYRUS: &str = "http://purl.obolibrary.org/obo/UBERON_0001885";
pub const NEURON: &str = "http://purl.obolibrary.org/obo/CL_0000540";
pub const SEIZURE: &str = "http://purl.obolibrary.org/obo/HP_0001250";
pub const CDK2_URI: &str = "http://purl.org/commons/record/ncbi_gene/1017";

pub const HUMAN: EntityId = 1;
pub const MOUSE: EntityId = 2;

const STORE: &str = r#"{
    "taxa": [
        { "id": 1, "scientific_name": "Homo sapiens", "common_name": "human" },
        { "id": 2, "scientific_name": "Mus musculus", "common_name": "mouse" }
    ],
    "platforms": [
        {
            "id": 100,
            "short_name": "GPL570",
            "name": "Affymetrix HG-U133 Plus 2",
            "manufacturer": "Affymetrix",
            "alternate_names": ["HG-U133_Plus_2"]
        },
        {
            "id": 101,
            "short_name": "GPL1261",
            "name": "Affymetrix Mouse 430 2",
            "manufacturer": "Affymetrix"
        }
    ],
    "datasets": [
        { "id": 1, "short_name": "GSE100", "name": "Hippocampal neurons in aging", "taxon": { "id": 1 } },
        { "id": 2, "short_name": "GSE200", "name": "Dentate gyrus neurons", "taxon": { "id": 1 } },
        { "id": 3, "short_name": "GSE300", "name": "Cortex astrocytes", "taxon": { "id": 2 } },
        { "id": 4, "short_name": "GSE400", "name": "Liver CDK2 knockdown", "taxon": { "id": 1 } }
    ],
    "genes": [
        { "id": 10, "official_symbol": "CDK2", "ncbi_gene_id": 1017, "taxon": { "id": 1 } },
        { "id": 11, "official_symbol": "SCN1A", "ncbi_gene_id": 6323, "taxon": { "id": 1 } }
    ],
    "probes": [
        { "id": 500, "name": "204252_at", "platform": { "id": 100, "short_name": "GPL570", "name": "Affymetrix HG-U133 Plus 2" } }
    ],
    "sequences": [{ "id": 600, "name": "NM_001798" }],
    "gene_sets": [{ "id": 700, "name": "cell cycle", "taxon": { "id": 1 } }],
    "dataset_collections": [{ "id": 800, "name": "brain atlas" }],
    "publications": [{ "id": 900, "title": "Hippocampal neurogenesis in adults", "accession": "PMID1" }],
    "phenotypes": [{ "id": 950, "value": "seizures", "value_uri": "http://purl.obolibrary.org/obo/HP_0001250" }],
    "platform_datasets": { "100": [4] },
    "probe_genes": { "500": [10] },
    "sequence_genes": { "600": [10] },
    "go_groups": { "cell cycle": [10] },
    "phenotype_genes": { "http://purl.obolibrary.org/obo/HP_0001250": [11] },
    "blacklist": [{ "id": 42, "accession": "GSE999", "entity_type": "dataset" }]
}"#;

pub fn store() -> MemoryStore {
    MemoryStore::from_json(STORE).unwrap()
}

pub fn ontology() -> MemoryOntology {
    MemoryOntology::new()
        .with_term(HIPPOCAMPUS, "hippocampus", &[DENTATE_GYRUS])
        .with_term(DENTATE_GYRUS, "dentate gyrus", &[])
        .with_term(NEURON, "neuron", &[])
}

pub fn annotations() -> MemoryAnnotations {
    MemoryAnnotations::new()
        .annotate(1, HIPPOCAMPUS, AnnotationLevel::Dataset)
        .annotate(1, NEURON, AnnotationLevel::Sample)
        .annotate(2, DENTATE_GYRUS, AnnotationLevel::FactorValue)
        .annotate(2, NEURON, AnnotationLevel::Dataset)
        .annotate(3, NEURON, AnnotationLevel::Dataset)
        .annotate(4, CDK2_URI, AnnotationLevel::Dataset)
        .in_taxon(1, HUMAN)
        .in_taxon(2, HUMAN)
        .in_taxon(3, MOUSE)
        .in_taxon(4, HUMAN)
}

pub fn portal() -> MemoryPortal {
    MemoryPortal::new(store(), ontology(), annotations())
}

pub fn service(portal: &MemoryPortal) -> SearchService {
    SearchService::builder(portal.collaborators()).build().unwrap()
}

/// Ids in one bucket, in ranked order.
pub fn ids(results: &SearchResultMap, entity_type: EntityType) -> Vec<EntityId> {
    results
        .get(&entity_type)
        .map(|bucket| bucket.iter().map(|r| r.result_id()).collect())
        .unwrap_or_default()
}

pub fn id_set(results: &SearchResultMap, entity_type: EntityType) -> BTreeSet<EntityId> {
    ids(results, entity_type).into_iter().collect()
}

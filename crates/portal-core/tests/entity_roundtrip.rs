//! Serde roundtrip and JsonSchema validation tests for entity types.

use schemars::schema_for;
use portal_core::entities::*;
use portal_core::enums::EntityType;
use portal_core::value_object::ValueObject;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn mouse() -> Taxon {
    Taxon {
        id: 2,
        scientific_name: Some("Mus musculus".into()),
        common_name: Some("mouse".into()),
    }
}

roundtrip_and_validate!(
    probe_with_platform_roundtrip,
    Probe,
    Probe {
        id: 7,
        name: "1007_s_at".into(),
        platform: Some(Platform {
            id: 96,
            short_name: "GPL96".into(),
            name: "Affymetrix GeneChip HG-U133A".into(),
            manufacturer: Some("Affymetrix".into()),
            alternate_names: vec!["HG-U133A".into()],
        }),
    }
);

roundtrip_and_validate!(
    tagged_gene_entity_roundtrip,
    Entity,
    Entity::Gene(Gene {
        id: 12,
        official_symbol: "Cdk2".into(),
        ncbi_gene_id: Some(12566),
        taxon: Some(mouse()),
    })
);

roundtrip_and_validate!(
    value_object_roundtrip,
    ValueObject,
    ValueObject {
        id: 5,
        entity_type: EntityType::Dataset,
        label: "GSE1234".into(),
        taxon_id: Some(2),
    }
);

#[test]
fn entity_is_tagged_by_snake_case_type() {
    let entity = Entity::DatasetCollection(DatasetCollection {
        id: 3,
        name: "brain studies".into(),
        taxon: None,
    });
    let json = serde_json::to_value(&entity).unwrap();
    assert_eq!(json["type"], "dataset_collection");
    assert_eq!(json["name"], "brain studies");
}

#[test]
fn optional_fields_default_when_missing() {
    let dataset: Dataset =
        serde_json::from_str(r#"{"id": 1, "short_name": "GSE1", "name": "first"}"#).unwrap();
    assert!(dataset.taxon.is_none());
    assert_eq!(ValueObject::from_entity(&dataset.into()).taxon_id, None);
}

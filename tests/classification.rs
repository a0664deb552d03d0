use catalog_curator::config::{ClassifierConfig, CurationConfig};
use catalog_curator::processor::{FieldSet, RecordClassifier, Rejection, Verdict};
use catalog_curator::storage::CatalogStore;
use serde_json::{Value, json};
use std::fs;
use tempfile::tempdir;

fn complete_product(id: &str) -> Value {
    let mut record = serde_json::Map::new();
    for field in ClassifierConfig::default().required_fields {
        record.insert(field, json!("x"));
    }
    record.insert("product_id".into(), json!(id));
    record.insert("product_tags".into(), json!(["glyphosate", "herbicides"]));
    record.insert("isActive".into(), json!("true"));
    Value::Object(record)
}

fn classifier() -> RecordClassifier {
    RecordClassifier::from_config(&CurationConfig::default().classifier, FieldSet::Complete)
}

#[test]
fn complete_active_record_is_accepted() {
    assert_eq!(classifier().classify_value(&complete_product("P1")), Verdict::Accepted);
}

#[test]
fn inactive_flag_wins_over_completeness() {
    let mut inactive = complete_product("P3");
    inactive["isActive"] = json!("false");
    let mut boolean = complete_product("P4");
    boolean["isActive"] = json!(true);

    for record in [inactive, boolean] {
        match classifier().classify_value(&record) {
            Verdict::Rejected(Rejection::Inactive(_)) => {}
            other => panic!("expected gating rejection, got {:?}", other),
        }
    }
}

#[test]
fn empty_description_is_reported_missing() {
    let record = json!({"product_id": "P2", "isActive": "true", "description": ""});
    match classifier().classify_value(&record) {
        Verdict::Rejected(Rejection::MissingFields(fields)) => {
            assert!(fields.contains(&"description".to_string()));
            assert!(!fields.contains(&"product_id".to_string()));
        }
        other => panic!("expected missing fields, got {:?}", other),
    }
}

#[test]
fn accepted_output_reclassifies_as_fully_accepted() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("products_data.json");
    let accepted = dir.path().join("complete.json");
    let rejected = dir.path().join("incomplete.json");

    let values = vec![
        complete_product("P1"),
        json!({"product_id": "P2", "isActive": "true", "description": ""}),
        complete_product("P5"),
        json!("not a record"),
    ];
    CatalogStore::save_json(&input, &values).unwrap();

    let first = classifier().partition_file(&input, &accepted, &rejected).unwrap();
    assert_eq!(first.accepted.len(), 2);
    assert_eq!(first.rejected.len(), 2);
    assert_eq!(CatalogStore::load_values(&input).unwrap().len(), 4);

    let again = classifier()
        .partition(&CatalogStore::load_values(&accepted).unwrap());
    assert_eq!(again.accepted.len(), 2);
    assert!(again.rejected.is_empty());
}

#[test]
fn folder_classification_moves_only_accepted_files() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("products");
    let dest = dir.path().join("active_products");
    fs::create_dir(&source).unwrap();

    CatalogStore::save_json(&source.join("a.json"), &complete_product("P1")).unwrap();
    CatalogStore::save_json(&source.join("b.json"), &json!({"product_id": "P2", "isActive": "true"})).unwrap();
    fs::write(source.join("c.json"), "{ broken").unwrap();

    let outcome = classifier().classify_directory(&source, &dest).unwrap();
    assert_eq!(outcome.moved, vec!["a.json"]);
    assert_eq!(outcome.kept.len(), 2);
    assert!(dest.join("a.json").exists());
    assert!(source.join("b.json").exists());
    assert!(source.join("c.json").exists());

    // second pass over the destination accepts everything
    let rerun = classifier().classify_directory(&dest, &dir.path().join("again")).unwrap();
    assert!(rerun.kept.is_empty());
    assert_eq!(rerun.moved.len(), 1);
}

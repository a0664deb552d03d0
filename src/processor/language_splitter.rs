use tracing::info;

use super::rule_normalizer::RuleNormalizer;
use crate::models::{Record, rename_field, text_field};

#[derive(Debug, Clone, Default)]
pub struct LanguageSplit {
    pub english: Vec<Record>,
    pub bengali: Vec<Record>,
}

/// Separate records whose `name_field` contains Bengali script from the rest,
/// renaming `rename.0` to `rename.1` in place on every record
pub fn split_by_language(records: Vec<Record>, name_field: &str, rename: (&str, &str)) -> LanguageSplit {
    let mut split = LanguageSplit::default();

    for mut record in records {
        rename_field(&mut record, rename.0, rename.1);
        if RuleNormalizer::contains_bengali(text_field(&record, name_field)) {
            split.bengali.push(record);
        } else {
            split.english.push(record);
        }
    }

    info!(
        "Separated {} English and {} Bengali products",
        split.english.len(),
        split.bengali.len()
    );
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, name: &str) -> Record {
        json!({"product_id": id, "product_name": name, "common_name": "Glyphosate", "origin": ""})
            .as_object()
            .unwrap()
            .clone()
    }

    #[test]
    fn test_split_and_rename() {
        let records = vec![
            record("KB-001", "Round Up"),
            record("KB-002", "রাউন্ডআপ"),
            record("KB-003", "Tilt 250 EC"),
        ];

        let split = split_by_language(records, "product_name", ("common_name", "medicine_name"));

        let english: Vec<_> = split.english.iter().map(|r| r["product_id"].clone()).collect();
        assert_eq!(english, vec![json!("KB-001"), json!("KB-003")]);
        assert_eq!(split.bengali.len(), 1);
        assert_eq!(split.bengali[0]["product_id"], "KB-002");

        let keys: Vec<&str> = split.english[0].keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["product_id", "product_name", "medicine_name", "origin"]);
    }

    #[test]
    fn test_missing_name_counts_as_english() {
        let mut bare = Record::new();
        bare.insert("product_id".into(), json!("X"));

        let split = split_by_language(vec![bare], "product_name", ("common_name", "medicine_name"));
        assert_eq!(split.english.len(), 1);
        assert!(split.english[0].get("medicine_name").is_none());
    }
}

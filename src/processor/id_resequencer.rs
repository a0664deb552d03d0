use serde_json::Value;
use tracing::info;

use super::rule_normalizer::RuleNormalizer;
use crate::models::{Record, display_field, text_field};
use crate::storage::{IMAGE_REF_PREFIX, StorageManager};

const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdChange {
    pub old_id: String,
    pub new_id: String,
    pub product_name: String,
}

/// Extension of an `images/...` reference; `None` for anything else
fn local_extension(reference: &str) -> Option<&str> {
    reference.strip_prefix(IMAGE_REF_PREFIX)?;
    let file_name = StorageManager::file_name_of(reference);
    Some(StorageManager::extension_of(file_name).unwrap_or(DEFAULT_IMAGE_EXTENSION))
}

/// Give every record `<prefix>-<nnn>` by 1-based position and point its
/// local image references at the new identifier
pub fn resequence_ids(records: &mut [Record], prefix: &str) -> Vec<IdChange> {
    let mut changes = Vec::with_capacity(records.len());

    for (index, record) in records.iter_mut().enumerate() {
        let old_id = display_field(record, "product_id");
        let new_id = RuleNormalizer::format_id(prefix, index + 1);
        record.insert("product_id".into(), Value::String(new_id.clone()));

        let primary_ext = local_extension(text_field(record, "product_image")).map(str::to_string);
        if let Some(ext) = primary_ext {
            let renamed = StorageManager::image_ref(&StorageManager::primary_image_name(&new_id, &ext));
            record.insert("product_image".into(), Value::String(renamed));
        }

        if let Some(Value::Array(additional)) = record.get_mut("additional_images") {
            for (position, image) in additional.iter_mut().enumerate() {
                let Some(ext) = image.as_str().and_then(local_extension).map(str::to_string) else {
                    continue;
                };
                let name = StorageManager::additional_image_name(&new_id, position + 1, &ext);
                *image = Value::String(StorageManager::image_ref(&name));
            }
        }

        let product_name = display_field(record, "product_name");
        info!("   {} → {}: {}", old_id, new_id, product_name);
        changes.push(IdChange {
            old_id,
            new_id,
            product_name,
        });
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resequence_rewrites_ids_and_local_images() {
        let mut records: Vec<Record> = vec![
            json!({
                "product_id": "MBL-007",
                "product_name": "Round Up",
                "product_image": "images/MBL-007.png",
                "additional_images": ["images/MBL-007_(2).webp", "https://cdn.example.com/x.jpg"]
            }),
            json!({"product_id": "MBL-007", "product_name": "Tilt", "product_image": "https://cdn.example.com/tilt.jpg"}),
            json!({"product_name": "No id", "product_image": ""}),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();

        let changes = resequence_ids(&mut records, "MBL");

        assert_eq!(records[0]["product_id"], "MBL-001");
        assert_eq!(records[0]["product_image"], "images/MBL-001.png");
        assert_eq!(
            records[0]["additional_images"],
            json!(["images/MBL-001_(1).webp", "https://cdn.example.com/x.jpg"])
        );
        assert_eq!(records[1]["product_id"], "MBL-002");
        assert_eq!(records[1]["product_image"], "https://cdn.example.com/tilt.jpg");
        assert_eq!(records[2]["product_id"], "MBL-003");
        assert_eq!(records[2]["product_image"], "");

        assert_eq!(changes[0].old_id, "MBL-007");
        assert_eq!(changes[2].old_id, "N/A");
    }

    #[test]
    fn test_extensionless_local_image_defaults_to_jpg() {
        let mut records = vec![json!({"product_id": "X", "product_image": "images/photo"})
            .as_object()
            .unwrap()
            .clone()];
        resequence_ids(&mut records, "KB");
        assert_eq!(records[0]["product_image"], "images/KB-001.jpg");
    }
}

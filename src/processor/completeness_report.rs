use crate::models::{Record, display_field, is_missing};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingEntry {
    pub product_id: String,
    pub product_name: String,
}

#[derive(Debug, Clone)]
pub struct FieldCompleteness {
    pub field: String,
    pub missing: Vec<MissingEntry>,
}

impl FieldCompleteness {
    pub fn percent_complete(&self, total: usize) -> f64 {
        if total == 0 {
            return 100.0;
        }
        (total - self.missing.len()) as f64 / total as f64 * 100.0
    }
}

/// Per-field list of records lacking a value
#[derive(Debug, Clone)]
pub struct CompletenessReport {
    pub total: usize,
    pub fields: Vec<FieldCompleteness>,
}

impl CompletenessReport {
    pub fn build(records: &[Record], fields: &[String]) -> Self {
        let fields = fields
            .iter()
            .map(|field| FieldCompleteness {
                field: field.clone(),
                missing: records
                    .iter()
                    .filter(|record| is_missing(record.get(field)))
                    .map(|record| MissingEntry {
                        product_id: display_field(record, "product_id"),
                        product_name: display_field(record, "product_name"),
                    })
                    .collect(),
            })
            .collect();

        Self {
            total: records.len(),
            fields,
        }
    }

    pub fn print(&self) {
        println!("🔍 CHECKING PRODUCT DATA COMPLETENESS");
        println!("{}", "=".repeat(60));
        println!("📊 MISSING DATA SUMMARY:");
        println!("Total products: {}", self.total);
        for field in &self.fields {
            println!("Missing {}: {}", heading(&field.field).to_lowercase(), field.missing.len());
        }
        println!();

        for field in self.fields.iter().filter(|f| !f.missing.is_empty()) {
            println!("❌ MISSING {}:", heading(&field.field).to_uppercase());
            println!("{}", "-".repeat(40));
            for entry in &field.missing {
                println!("{} - {}", entry.product_id, entry.product_name);
            }
            println!();
        }

        println!("📈 COMPLETENESS SUMMARY:");
        println!("{}", "=".repeat(40));
        for field in &self.fields {
            println!(
                "{}: {:.1}% complete ({} missing)",
                heading(&field.field),
                field.percent_complete(self.total),
                field.missing.len()
            );
        }
    }
}

/// `crops_pests` -> `Crops Pests`
fn heading(field: &str) -> String {
    field
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_lists_missing_per_field() {
        let records: Vec<Record> = vec![
            json!({"product_id": "MBL-001", "product_name": "Round Up", "description": "x", "side_effect": " "}),
            json!({"product_id": "MBL-002", "product_name": "Tilt", "description": "", "side_effect": "None"}),
            json!({"product_id": "MBL-003", "product_name": "Karate"}),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();

        let fields = vec!["description".to_string(), "side_effect".to_string()];
        let report = CompletenessReport::build(&records, &fields);

        assert_eq!(report.total, 3);
        let description = &report.fields[0];
        assert_eq!(
            description.missing,
            vec![
                MissingEntry {
                    product_id: "MBL-002".into(),
                    product_name: "Tilt".into()
                },
                MissingEntry {
                    product_id: "MBL-003".into(),
                    product_name: "Karate".into()
                },
            ]
        );
        assert!((description.percent_complete(3) - 33.333).abs() < 0.01);
        assert_eq!(report.fields[1].missing.len(), 2);
    }

    #[test]
    fn test_heading() {
        assert_eq!(heading("crops_pests"), "Crops Pests");
        assert_eq!(heading("description"), "Description");
    }

    #[test]
    fn test_empty_collection_is_complete() {
        let report = CompletenessReport::build(&[], &["description".to_string()]);
        assert_eq!(report.fields[0].percent_complete(report.total), 100.0);
    }
}

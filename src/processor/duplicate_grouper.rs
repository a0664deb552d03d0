use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use tracing::info;

use crate::config::DuplicateConfig;
use crate::models::{Record, display_field, text_field};

// Anything that is not a letter, digit or whitespace; combining marks and
// underscore count as punctuation
static PUNCTUATION_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]+").unwrap());

/// Lower-case, turn punctuation runs into spaces, collapse whitespace
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    PUNCTUATION_RUN
        .replace_all(&lowered, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Records sharing one normalized key, in input order
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub key: String,
    pub members: Vec<Record>,
}

impl DuplicateGroup {
    pub fn is_duplicate(&self) -> bool {
        self.members.len() > 1
    }
}

/// Token-overlap heuristic flagging pairs that may be the same product
/// written in two languages. Annotation only.
#[derive(Debug, Clone)]
pub struct VariantDetector {
    suffixes: HashSet<String>,
    min_similarity: f64,
}

impl VariantDetector {
    pub fn new(suffixes: &[String], min_similarity: f64) -> Self {
        Self {
            suffixes: suffixes.iter().map(|s| s.to_lowercase()).collect(),
            min_similarity,
        }
    }

    /// Suffixes are dropped only as whole tokens, so words that merely
    /// contain one (`secret`, `second`) keep their letters
    fn clean(&self, text: &str) -> String {
        text.to_lowercase()
            .split_whitespace()
            .filter(|token| !self.suffixes.contains(*token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Shared-token ratio, or `None` when the lengths differ more than twofold
    /// or either side has no tokens left
    pub fn similarity(&self, a: &str, b: &str) -> Option<f64> {
        let clean_a = self.clean(a);
        let clean_b = self.clean(b);

        let (len_a, len_b) = (clean_a.chars().count(), clean_b.chars().count());
        if len_a > len_b * 2 || len_b > len_a * 2 {
            return None;
        }

        let words_a: HashSet<&str> = clean_a.split_whitespace().collect();
        let words_b: HashSet<&str> = clean_b.split_whitespace().collect();
        if words_a.is_empty() || words_b.is_empty() {
            return None;
        }

        let common = words_a.intersection(&words_b).count();
        Some(common as f64 / words_a.len().max(words_b.len()) as f64)
    }

    pub fn is_possible_variant(&self, a: &str, b: &str) -> bool {
        self.similarity(a, b)
            .is_some_and(|score| score >= self.min_similarity && score < 1.0)
    }

    /// True when any pair of the given names looks like a variant
    pub fn any_pair(&self, names: &[&str]) -> bool {
        names.iter().enumerate().any(|(i, a)| {
            names[i + 1..]
                .iter()
                .any(|b| self.is_possible_variant(a, b))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Keep,
    Remove,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberDecision {
    pub product_id: String,
    pub product_name: String,
    pub decision: Decision,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateEntry {
    pub composite_key: String,
    pub count: usize,
    pub possible_language_variant: bool,
    pub decisions: Vec<MemberDecision>,
    pub products: Vec<Record>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateSummary {
    pub original_products: usize,
    pub true_duplicate_groups: usize,
    pub total_duplicate_products: usize,
    pub unique_products_after_filtering: usize,
    pub products_removed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateReport {
    pub summary: DuplicateSummary,
    pub true_duplicates: Vec<DuplicateEntry>,
}

/// Unique records plus the report of what was dropped
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub unique: Vec<Record>,
    pub report: DuplicateReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldDuplicateEntry {
    pub normalized_name: String,
    pub possible_language_variant: bool,
    pub products: Vec<Record>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldDuplicateSummary {
    pub total_products: usize,
    pub duplicate_product_names: usize,
    pub duplicate_common_names: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldDuplicateReport {
    pub summary: FieldDuplicateSummary,
    pub product_name_duplicates: Vec<FieldDuplicateEntry>,
    pub common_name_duplicates: Vec<FieldDuplicateEntry>,
}

/// Groups records by `normalize(a) | normalize(b)` and keeps the first of each group
#[derive(Debug, Clone)]
pub struct DuplicateGrouper {
    id_field: String,
    key_fields: (String, String),
    detector: VariantDetector,
}

impl DuplicateGrouper {
    pub fn new(config: &DuplicateConfig) -> Self {
        Self {
            id_field: config.id_field.clone(),
            key_fields: config.key_fields.clone(),
            detector: VariantDetector::new(&config.formulation_suffixes, config.variant_min_similarity),
        }
    }

    pub fn detector(&self) -> &VariantDetector {
        &self.detector
    }

    pub fn composite_key(&self, record: &Record) -> String {
        let (field_a, field_b) = &self.key_fields;
        format!(
            "{}|{}",
            normalize_text(text_field(record, field_a)),
            normalize_text(text_field(record, field_b))
        )
    }

    /// Every key in order of first appearance; groups of size 1 included
    pub fn group(&self, records: &[Record]) -> Vec<DuplicateGroup> {
        group_by(records, |record| Some(self.composite_key(record)))
    }

    pub fn filter(&self, records: &[Record]) -> FilterOutcome {
        let groups = self.group(records);
        let mut unique = Vec::with_capacity(groups.len());
        let mut true_duplicates = Vec::new();

        for group in groups {
            if let Some(first) = group.members.first() {
                unique.push(first.clone());
            }
            if group.is_duplicate() {
                true_duplicates.push(self.describe(group));
            }
        }

        let total_duplicate_products: usize = true_duplicates.iter().map(|d| d.count).sum();
        let summary = DuplicateSummary {
            original_products: records.len(),
            true_duplicate_groups: true_duplicates.len(),
            total_duplicate_products,
            unique_products_after_filtering: unique.len(),
            products_removed: total_duplicate_products - true_duplicates.len(),
        };
        info!(
            "🔍 {} records, {} duplicate groups, {} removed",
            summary.original_products, summary.true_duplicate_groups, summary.products_removed
        );

        FilterOutcome {
            unique,
            report: DuplicateReport {
                summary,
                true_duplicates,
            },
        }
    }

    fn describe(&self, group: DuplicateGroup) -> DuplicateEntry {
        let names: Vec<&str> = group
            .members
            .iter()
            .map(|record| text_field(record, &self.key_fields.0))
            .collect();
        let possible_language_variant = self.detector.any_pair(&names);

        let decisions = group
            .members
            .iter()
            .enumerate()
            .map(|(i, record)| MemberDecision {
                product_id: display_field(record, &self.id_field),
                product_name: display_field(record, &self.key_fields.0),
                decision: if i == 0 { Decision::Keep } else { Decision::Remove },
            })
            .collect();

        DuplicateEntry {
            composite_key: group.key,
            count: group.members.len(),
            possible_language_variant,
            decisions,
            products: group.members,
        }
    }

    /// Groups of size > 1 over a single field; empty values are skipped
    pub fn duplicates_by_field(&self, records: &[Record], field: &str) -> Vec<FieldDuplicateEntry> {
        group_by(records, |record| {
            let key = normalize_text(text_field(record, field));
            (!key.is_empty()).then_some(key)
        })
        .into_iter()
        .filter(DuplicateGroup::is_duplicate)
        .map(|group| {
            let names: Vec<&str> = group.members.iter().map(|r| text_field(r, field)).collect();
            FieldDuplicateEntry {
                possible_language_variant: self.detector.any_pair(&names),
                normalized_name: group.key,
                products: group.members,
            }
        })
        .collect()
    }

    /// Report-only scan over each key field on its own
    pub fn field_report(&self, records: &[Record]) -> FieldDuplicateReport {
        let product_name_duplicates = self.duplicates_by_field(records, &self.key_fields.0);
        let common_name_duplicates = self.duplicates_by_field(records, &self.key_fields.1);

        FieldDuplicateReport {
            summary: FieldDuplicateSummary {
                total_products: records.len(),
                duplicate_product_names: product_name_duplicates.len(),
                duplicate_common_names: common_name_duplicates.len(),
            },
            product_name_duplicates,
            common_name_duplicates,
        }
    }
}

fn group_by<F>(records: &[Record], key_of: F) -> Vec<DuplicateGroup>
where
    F: Fn(&Record) -> Option<String>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for record in records {
        let Some(key) = key_of(record) else {
            continue;
        };
        match index.get(&key) {
            Some(&position) => groups[position].members.push(record.clone()),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(DuplicateGroup {
                    key,
                    members: vec![record.clone()],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, name: &str, common: &str) -> Record {
        json!({"product_id": id, "product_name": name, "common_name": common})
            .as_object()
            .unwrap()
            .clone()
    }

    fn grouper() -> DuplicateGrouper {
        DuplicateGrouper::new(&DuplicateConfig::default())
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("Glyphosate 41% SL"), "glyphosate 41 sl");
        assert_eq!(normalize_text("  glyphosate  41 sl "), "glyphosate 41 sl");
        assert_eq!(normalize_text("Mancozeb_80-WP"), "mancozeb 80 wp");
        assert_eq!(normalize_text(""), "");
        // vowel signs and virama split Bengali words
        assert_eq!(normalize_text("রাউন্ডআপ!"), "র উন ডআপ");
    }

    #[test]
    fn test_bengali_spacing_variants_share_a_key() {
        assert_eq!(normalize_text("রাউন্ডআপ"), normalize_text("রা উন্ডআপ"));

        let records = vec![
            record("KB-001", "রাউন্ডআপ", "গ্লাইফোসেট"),
            record("KB-002", "রা উন্ডআপ", "গ্লাইফোসেট"),
        ];
        let outcome = grouper().filter(&records);
        assert_eq!(outcome.unique.len(), 1);
        assert_eq!(outcome.report.summary.products_removed, 1);
    }

    #[test]
    fn test_suffix_inside_a_word_is_kept() {
        let detector = grouper().detector().clone();
        assert_eq!(detector.clean("Secret 50 EC"), "secret 50");
        assert_eq!(detector.similarity("Secret EC", "Secret"), Some(1.0));
    }

    #[test]
    fn test_same_composite_key_keeps_first() {
        let records = vec![
            record("KB-001", "Glyphosate 41% SL", "Glyphosate"),
            record("KB-002", "Other", "Thing"),
            record("KB-003", "glyphosate  41 sl", "GLYPHOSATE"),
        ];

        let outcome = grouper().filter(&records);
        let ids: Vec<_> = outcome.unique.iter().map(|r| r["product_id"].clone()).collect();
        assert_eq!(ids, vec![json!("KB-001"), json!("KB-002")]);

        let summary = &outcome.report.summary;
        assert_eq!(summary.original_products, 3);
        assert_eq!(summary.true_duplicate_groups, 1);
        assert_eq!(summary.total_duplicate_products, 2);
        assert_eq!(summary.unique_products_after_filtering, 2);
        assert_eq!(summary.products_removed, 1);

        let entry = &outcome.report.true_duplicates[0];
        assert_eq!(entry.composite_key, "glyphosate 41 sl|glyphosate");
        assert_eq!(entry.decisions[0].decision, Decision::Keep);
        assert_eq!(entry.decisions[1].product_id, "KB-003");
        assert_eq!(entry.decisions[1].decision, Decision::Remove);
    }

    #[test]
    fn test_same_name_different_common_name_not_grouped() {
        let records = vec![
            record("A", "Round Up", "Glyphosate"),
            record("B", "Round Up", "Paraquat"),
        ];
        let groups = grouper().group(&records);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| !g.is_duplicate()));
    }

    #[test]
    fn test_missing_fields_share_empty_key() {
        let mut bare = Record::new();
        bare.insert("product_id".into(), json!("X"));
        assert_eq!(grouper().composite_key(&bare), "|");
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = vec![
            record("1", "A", "x"),
            record("2", "a.", "X"),
            record("3", "B", "y"),
            record("4", "b", "y!"),
        ];
        let first = grouper().filter(&records);
        let second = grouper().filter(&first.unique);

        assert_eq!(second.report.summary.true_duplicate_groups, 0);
        assert_eq!(second.unique.len(), first.unique.len());
    }

    #[test]
    fn test_variant_similarity() {
        let detector = grouper().detector().clone();

        // suffix removal is by token, "sc" inside a word is kept
        assert_eq!(detector.similarity("Score 250 EC", "score 250"), Some(1.0));
        assert_eq!(detector.similarity("Round Up Max", "Round Up Plus"), Some(2.0 / 3.0));
        assert!(detector.is_possible_variant("Round Up Max", "Round Up Plus"));
        assert!(!detector.is_possible_variant("Round Up", "round up"));
        assert_eq!(detector.similarity("Ab", "Abcdefgh"), None);
        assert_eq!(detector.similarity("EC", "WP"), None);
    }

    #[test]
    fn test_variant_annotation_does_not_change_decisions() {
        let records = vec![
            record("1", "Tilt 250 EC Max", "Propiconazole"),
            record("2", "Tilt 250 EC, Max", "Propiconazole"),
        ];
        let outcome = grouper().filter(&records);
        let entry = &outcome.report.true_duplicates[0];

        assert!(entry.possible_language_variant);
        assert_eq!(outcome.unique.len(), 1);
        assert_eq!(entry.decisions[1].decision, Decision::Remove);
    }

    #[test]
    fn test_field_report() {
        let records = vec![
            record("1", "Round Up", "Glyphosate"),
            record("2", "round-up", "Paraquat"),
            record("3", "Gramoxone", "paraquat"),
            record("4", "", ""),
            record("5", "", ""),
        ];

        let report = grouper().field_report(&records);
        assert_eq!(report.summary.total_products, 5);
        assert_eq!(report.summary.duplicate_product_names, 1);
        assert_eq!(report.summary.duplicate_common_names, 1);
        assert_eq!(report.product_name_duplicates[0].normalized_name, "round up");
        assert_eq!(report.common_name_duplicates[0].products.len(), 2);
    }

    #[test]
    fn test_report_serializes_decisions_upper_case() {
        let records = vec![record("1", "A", "x"), record("2", "A", "x")];
        let report = grouper().filter(&records).report;
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["true_duplicates"][0]["decisions"][0]["decision"], "KEEP");
        assert_eq!(value["summary"]["products_removed"], 1);
    }
}

use anyhow::{Result, anyhow};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::rule_normalizer::RuleNormalizer;
use crate::models::{ActivityFlag, Product, Record, rename_field};

pub const KB_ID_PREFIX: &str = "KB";
/// Stock figure every converted product is published with
pub const KB_DEFAULT_STOCK: &str = "3654";
/// Field the knowledge base's medicine name is written under
pub const KB_NAME_FIELD: &str = "common_name";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KbPestEntry {
    pub pest: Option<String>,
    pub symptoms: Option<String>,
    pub causes: Option<String>,
    pub products: Vec<KbProduct>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KbProduct {
    pub product_name: Option<String>,
    pub medicine_name: Option<String>,
    pub application_rates: Option<String>,
    pub frequency_of_use: Option<String>,
    pub safety_precautions: Option<String>,
}

/// One product mention with the crop and pest it was listed under
struct KbMention<'a> {
    crop: &'a str,
    entry: &'a KbPestEntry,
    product: &'a KbProduct,
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

/// Parse the crop -> pest entries mapping, keeping crop order.
/// Crops whose value is not a list are skipped, as are malformed entries.
pub fn parse_knowledge_base(kb: &Value) -> Result<Vec<(String, Vec<KbPestEntry>)>> {
    let crops: &Map<String, Value> = kb
        .as_object()
        .ok_or_else(|| anyhow!("Knowledge base must be a JSON object keyed by crop"))?;

    let mut parsed = Vec::with_capacity(crops.len());
    for (crop, value) in crops {
        let Some(entries) = value.as_array() else {
            warn!("Skipping crop '{}': expected a list of pest entries", crop);
            continue;
        };

        let entries = entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match KbPestEntry::deserialize(entry) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping entry {} of crop '{}': {}", index, crop, e);
                    None
                }
            })
            .collect();
        parsed.push((crop.clone(), entries));
    }

    Ok(parsed)
}

/// Flatten the knowledge base into one record per product mention.
/// Identifiers come from the 1-based position of each mention.
pub fn convert_knowledge_base(kb: &Value, extraction_date: &str) -> Result<Vec<Record>> {
    let crops = parse_knowledge_base(kb)?;
    let mentions = crops.iter().flat_map(|(crop, entries)| {
        entries.iter().flat_map(move |entry| {
            entry.products.iter().map(move |product| KbMention {
                crop: crop.as_str(),
                entry,
                product,
            })
        })
    });

    let records = mentions
        .enumerate()
        .map(|(index, mention)| convert_mention(index + 1, &mention, extraction_date))
        .collect::<Result<Vec<_>>>()?;

    info!("Converted {} products from the knowledge base", records.len());
    Ok(records)
}

fn convert_mention(position: usize, mention: &KbMention, extraction_date: &str) -> Result<Record> {
    let product_name = text(&mention.product.product_name);
    let medicine_name = text(&mention.product.medicine_name);
    let pest = text(&mention.entry.pest);

    let product = Product {
        product_id: RuleNormalizer::format_id(KB_ID_PREFIX, position),
        product_name: RuleNormalizer::clean_text(product_name),
        medicine_name: RuleNormalizer::clean_text(medicine_name),
        application_rates: RuleNormalizer::clean_text(text(&mention.product.application_rates)),
        frequency_of_use: RuleNormalizer::clean_text(text(&mention.product.frequency_of_use)),
        side_effect: RuleNormalizer::clean_text(text(&mention.product.safety_precautions)),
        crops_pests: RuleNormalizer::clean_text(&format!("{} - {}", mention.crop, pest)),
        crops: RuleNormalizer::clean_text(mention.crop),
        pest: RuleNormalizer::clean_text(pest),
        symptoms: RuleNormalizer::clean_text(text(&mention.entry.symptoms)),
        causes: RuleNormalizer::clean_text(text(&mention.entry.causes)),
        product_tags: RuleNormalizer::dedupe_tags([product_name, medicine_name, mention.crop, pest]),
        serial_no: position.to_string(),
        is_active: Some(ActivityFlag::Active),
        stocks: Some(KB_DEFAULT_STOCK.to_string()),
        extraction_date: extraction_date.to_string(),
        ..Default::default()
    };

    let mut record = product.to_record()?;
    rename_field(&mut record, "medicine_name", KB_NAME_FIELD);
    Ok(record)
}

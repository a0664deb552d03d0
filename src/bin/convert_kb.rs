use anyhow::{Context, Result};
use catalog_curator::config::CurationConfig;
use catalog_curator::models::{display_field, extraction_timestamp};
use catalog_curator::processor::convert_knowledge_base;
use catalog_curator::storage::CatalogStore;
use chrono::Local;
use serde_json::Value;
use std::fs;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = CurationConfig::load_default()?;
    let paths = &config.paths;

    let content = fs::read_to_string(&paths.kb_file)
        .with_context(|| format!("Failed to read knowledge base {}", paths.kb_file.display()))?;
    let kb: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", paths.kb_file.display()))?;

    let records = convert_knowledge_base(&kb, &extraction_timestamp(&Local::now()))?;
    CatalogStore::save_records(&paths.kb_converted_file, &records)?;

    println!("🔄 KNOWLEDGE BASE CONVERSION");
    println!("{}", "=".repeat(60));
    println!("Converted products: {}", records.len());
    println!("Output: {}", paths.kb_converted_file.display());
    for record in records.iter().take(3) {
        println!(
            "   {} - {} ({})",
            display_field(record, "product_id"),
            display_field(record, "product_name"),
            display_field(record, "crops_pests")
        );
    }
    Ok(())
}

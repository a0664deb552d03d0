use anyhow::Result;
use catalog_curator::config::CurationConfig;
use catalog_curator::processor::{KB_NAME_FIELD, split_by_language};
use catalog_curator::storage::CatalogStore;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = CurationConfig::load_default()?;
    let paths = &config.paths;

    let records = CatalogStore::load_records(&paths.kb_filtered_file)?;
    let total = records.len();
    let split = split_by_language(records, "product_name", (KB_NAME_FIELD, "medicine_name"));

    CatalogStore::save_records(&paths.english_file, &split.english)?;
    CatalogStore::save_records(&paths.bengali_file, &split.bengali)?;

    println!("🌐 LANGUAGE SEPARATION");
    println!("{}", "=".repeat(60));
    println!("Total products: {}", total);
    println!("English products: {} → {}", split.english.len(), paths.english_file.display());
    println!("Bengali products: {} → {}", split.bengali.len(), paths.bengali_file.display());
    Ok(())
}

use anyhow::Result;
use catalog_curator::config::CurationConfig;
use catalog_curator::processor::{Decision, DuplicateGrouper};
use catalog_curator::storage::CatalogStore;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = CurationConfig::load_default()?;
    let paths = &config.paths;

    let records = CatalogStore::load_records(&paths.kb_converted_file)?;
    let grouper = DuplicateGrouper::new(&config.duplicates);
    let outcome = grouper.filter(&records);

    CatalogStore::save_records(&paths.kb_filtered_file, &outcome.unique)?;
    CatalogStore::save_json(&paths.duplicates_report_file, &outcome.report)?;
    info!("📋 Duplicate report saved to {}", paths.duplicates_report_file.display());

    let summary = &outcome.report.summary;
    println!("\n{}", "=".repeat(60));
    println!("🔍 TRUE DUPLICATE FILTERING");
    println!("{}", "=".repeat(60));
    println!("Original products: {}", summary.original_products);
    println!("True duplicate groups: {}", summary.true_duplicate_groups);
    println!("Total duplicate products: {}", summary.total_duplicate_products);
    println!("Products removed: {}", summary.products_removed);
    println!("Unique products after filtering: {}", summary.unique_products_after_filtering);

    for entry in &outcome.report.true_duplicates {
        let variant = if entry.possible_language_variant {
            " (possible language variant)"
        } else {
            ""
        };
        println!("\n🔁 {} × {}{}", entry.count, entry.composite_key, variant);
        for member in &entry.decisions {
            let marker = match member.decision {
                Decision::Keep => "KEEP  ",
                Decision::Remove => "REMOVE",
            };
            println!("   [{}] {} - {}", marker, member.product_id, member.product_name);
        }
    }

    println!("\n💾 Unique products saved to {}", paths.kb_filtered_file.display());
    Ok(())
}

use anyhow::Result;
use catalog_curator::config::CurationConfig;
use catalog_curator::models::display_field;
use catalog_curator::processor::{DuplicateGrouper, FieldDuplicateEntry};
use catalog_curator::storage::CatalogStore;

fn print_entries(title: &str, entries: &[FieldDuplicateEntry], id_field: &str) {
    println!("\n{} ({} groups)", title, entries.len());
    println!("{}", "-".repeat(40));
    for entry in entries {
        let variant = if entry.possible_language_variant {
            " (possible language variant)"
        } else {
            ""
        };
        println!("'{}' × {}{}", entry.normalized_name, entry.products.len(), variant);
        for record in &entry.products {
            println!(
                "   {} - {}",
                display_field(record, id_field),
                display_field(record, "product_name")
            );
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = CurationConfig::load_default()?;
    let paths = &config.paths;

    let records = CatalogStore::load_records(&paths.kb_converted_file)?;
    let grouper = DuplicateGrouper::new(&config.duplicates);
    let report = grouper.field_report(&records);

    println!("🔍 DUPLICATE NAME SCAN");
    println!("{}", "=".repeat(60));
    println!("Total products: {}", report.summary.total_products);
    println!("Duplicate product names: {}", report.summary.duplicate_product_names);
    println!("Duplicate common names: {}", report.summary.duplicate_common_names);

    let id_field = &config.duplicates.id_field;
    print_entries("📦 PRODUCT NAME DUPLICATES", &report.product_name_duplicates, id_field);
    print_entries("🧪 COMMON NAME DUPLICATES", &report.common_name_duplicates, id_field);

    CatalogStore::save_json(&paths.field_duplicates_report_file, &report)?;
    println!("\n📋 Report saved to {}", paths.field_duplicates_report_file.display());
    Ok(())
}

use anyhow::Result;
use catalog_curator::config::CurationConfig;
use catalog_curator::processor::resequence_ids;
use catalog_curator::storage::CatalogStore;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = CurationConfig::load_default()?;
    let data_file = &config.paths.data_file;

    let mut records = CatalogStore::load_records(data_file)?;
    let changes = resequence_ids(&mut records, &config.site.id_prefix);
    CatalogStore::save_records(data_file, &records)?;

    let renumbered = changes.iter().filter(|c| c.old_id != c.new_id).count();
    println!("🔢 PRODUCT ID RESEQUENCING");
    println!("{}", "=".repeat(60));
    println!("Products: {}", changes.len());
    println!("IDs changed: {}", renumbered);
    if let (Some(first), Some(last)) = (changes.first(), changes.last()) {
        println!("Range: {} → {}", first.new_id, last.new_id);
    }
    Ok(())
}

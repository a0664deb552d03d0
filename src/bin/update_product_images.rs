use anyhow::Result;
use catalog_curator::config::CurationConfig;
use catalog_curator::images::{count_local_and_placeholder, update_placeholder_images};
use catalog_curator::storage::CatalogStore;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = CurationConfig::load_default()?;
    let paths = &config.paths;
    let markers = &config.images.placeholder_markers;

    let update = update_placeholder_images(&paths.data_file, &paths.backup_file, &paths.images_dir, markers)?;

    println!("\n📊 UPDATE SUMMARY:");
    println!("{}", "=".repeat(40));
    println!("Updated: {}", update.updated.len());
    println!("Still placeholder: {}", update.not_found.len());

    if update.updated.is_empty() {
        println!("\nℹ️  No updates were needed");
        return Ok(());
    }

    println!("\n✅ Updated product images:");
    for change in &update.updated {
        println!("   {}: {} → {}", change.product_id, change.old_image, change.new_image);
    }
    println!("\n💾 Backup saved to: {}", paths.backup_file.display());

    let records = CatalogStore::load_records(&paths.data_file)?;
    let (local, placeholder) = count_local_and_placeholder(&records, markers);
    println!("\n🔍 VERIFICATION:");
    println!("Products with local images: {}", local);
    println!("Products with placeholders: {}", placeholder);
    Ok(())
}

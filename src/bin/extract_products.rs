use anyhow::Result;
use catalog_curator::config::CurationConfig;
use catalog_curator::models::extraction_timestamp;
use catalog_curator::processor::{ListingExtractor, save_extraction, summarize};
use chrono::Local;
use tracing::{info, warn};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = CurationConfig::load_default()?;
    let extractor = ListingExtractor::new(config.categories.listing_categories.clone(), &config.site.id_prefix)?;

    info!("🔍 Extracting products from {}", config.paths.download_dir.display());
    let (_, products) =
        extractor.extract_latest(&config.paths.download_dir, &extraction_timestamp(&Local::now()))?;

    if products.is_empty() {
        warn!("❌ No products found in the HTML file");
        return Ok(());
    }

    let written = save_extraction(&products, &config.paths.data_file, &config.paths.data_dir)?;
    summarize(&products).print();

    println!("\n📁 Files written:");
    for path in written {
        println!("  {}", path.display());
    }
    Ok(())
}

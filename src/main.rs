use anyhow::{Context, Result};
use catalog_curator::config::CurationConfig;
use catalog_curator::fetcher::{HttpPageFetcher, download_listing};
use catalog_curator::models::extraction_timestamp;
use catalog_curator::processor::{
    DetailEnricher, EnrichRange, EnrichmentSummary, ListingExtractor, save_extraction, summarize,
};
use catalog_curator::storage::CatalogStore;
use chrono::Local;
use std::env;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    // Reuse the newest saved listing page instead of downloading a fresh one
    let offline = env::args().any(|arg| arg == "--offline" || arg == "-o");

    if offline {
        info!("🚀 Starting Catalog Pipeline (using saved listing page)");
    } else {
        info!("🚀 Starting Catalog Pipeline (downloading listing page)");
    }

    let config = CurationConfig::load_default().context("Failed to load curation configuration")?;
    info!("Loaded configuration for {} ({})", config.site.name, config.site.base_url);

    let fetcher = HttpPageFetcher::new(&config.scraping).context("Failed to build HTTP client")?;

    // Step 1: listing page
    if !offline {
        let saved = download_listing(
            &fetcher,
            &config.site.listing_url,
            &config.paths.download_dir,
            &Local::now(),
        )
        .await
        .context("Listing download failed")?;
        info!(
            "📄 Content length: {} characters (status {})",
            saved.characters, saved.status
        );
    }

    // Step 2: product tables
    let extractor = ListingExtractor::new(config.categories.listing_categories.clone(), &config.site.id_prefix)?;
    let (_, products) =
        extractor.extract_latest(&config.paths.download_dir, &extraction_timestamp(&Local::now()))?;
    if products.is_empty() {
        warn!("No products found in the listing page, nothing to enhance");
        return Ok(());
    }
    save_extraction(&products, &config.paths.data_file, &config.paths.data_dir)?;
    summarize(&products).print();

    // Step 3: detail pages
    let mut records = CatalogStore::load_records(&config.paths.data_file)?;
    let enricher = DetailEnricher::new(&fetcher, &config)?;
    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await
        }
    };
    let run = enricher
        .enrich_all(&mut records, EnrichRange::default(), shutdown)
        .await;

    if let Err(e) = CatalogStore::save_records(&config.paths.data_file, &records) {
        error!("❌ Failed to save enhanced products: {:#}", e);
        return Err(e);
    }
    EnrichmentSummary::from_records(&records).print();

    if run.interrupted {
        warn!(
            "⏹️ Pipeline interrupted: {} products processed, progress saved to {}",
            run.processed,
            config.paths.data_file.display()
        );
    } else {
        info!("\n=== Pipeline Summary ===");
        info!("Products extracted: {}", products.len());
        info!("Products enhanced: {}", run.enriched);
        info!("Products without URL: {}", run.without_url);
        info!("Failed page fetches: {}", run.failed);
        info!("Images downloaded: {}", run.images_downloaded);
        info!("🎉 Pipeline completed!");
    }

    Ok(())
}

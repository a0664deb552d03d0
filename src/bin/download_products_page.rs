use anyhow::{Context, Result};
use catalog_curator::config::CurationConfig;
use catalog_curator::fetcher::{HttpPageFetcher, download_listing};
use chrono::Local;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = CurationConfig::load_default()?;
    let fetcher = HttpPageFetcher::new(&config.scraping).context("Failed to build HTTP client")?;

    info!("🚀 Downloading product listing from {}", config.site.name);
    let saved = download_listing(
        &fetcher,
        &config.site.listing_url,
        &config.paths.download_dir,
        &Local::now(),
    )
    .await?;

    println!("✅ Successfully downloaded and saved to: {}", saved.path.display());
    println!("📄 Content length: {} characters", saved.characters);
    println!("🌐 Status code: {}", saved.status);
    Ok(())
}

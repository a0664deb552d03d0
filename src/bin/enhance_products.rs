use anyhow::{Context, Result, anyhow};
use catalog_curator::config::CurationConfig;
use catalog_curator::fetcher::HttpPageFetcher;
use catalog_curator::processor::{DetailEnricher, EnrichRange, EnrichmentSummary};
use catalog_curator::storage::CatalogStore;
use std::env;
use tracing::{info, warn};

/// `enhance_products [start] [max]`
fn parse_range(args: &[String]) -> Result<EnrichRange> {
    let start = match args.first() {
        Some(start) => start
            .parse()
            .with_context(|| format!("Invalid start index: {}", start))?,
        None => 0,
    };
    let max = match args.get(1) {
        Some(max) => Some(max.parse().with_context(|| format!("Invalid product count: {}", max))?),
        None => None,
    };
    if args.len() > 2 {
        return Err(anyhow!("Usage: enhance_products [start] [max]"));
    }
    Ok(EnrichRange { start, max })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    let range = parse_range(&args)?;

    let config = CurationConfig::load_default()?;
    let data_file = &config.paths.data_file;
    if !data_file.is_file() {
        return Err(anyhow!(
            "{} not found. Please run extract_products first.",
            data_file.display()
        ));
    }

    let mut records = CatalogStore::load_records(data_file)?;
    info!("📊 Loaded {} products", records.len());

    let fetcher = HttpPageFetcher::new(&config.scraping).context("Failed to build HTTP client")?;
    let enricher = DetailEnricher::new(&fetcher, &config)?;
    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await
        }
    };

    let run = enricher.enrich_all(&mut records, range, shutdown).await;
    CatalogStore::save_records(data_file, &records)?;
    EnrichmentSummary::from_records(&records).print();

    println!("\nProcessed: {}", run.processed);
    println!("Enhanced: {}", run.enriched);
    println!("Without URL: {}", run.without_url);
    println!("Failed: {}", run.failed);
    println!("Images downloaded: {}", run.images_downloaded);

    if run.interrupted {
        warn!("⏹️ Interrupted by user, progress saved to {}", data_file.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_range() {
        let range = parse_range(&args(&[])).unwrap();
        assert_eq!((range.start, range.max), (0, None));

        let range = parse_range(&args(&["5", "10"])).unwrap();
        assert_eq!((range.start, range.max), (5, Some(10)));

        assert!(parse_range(&args(&["five"])).is_err());
        assert!(parse_range(&args(&["1", "2", "3"])).is_err());
    }
}

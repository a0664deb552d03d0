use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::page_fetcher::PageFetcher;
use crate::storage::{CatalogStore, StorageManager};

/// Where the listing page was saved and what it looked like
#[derive(Debug, Clone)]
pub struct SavedListing {
    pub path: PathBuf,
    pub characters: usize,
    pub status: u16,
}

/// Fetch the listing page and save it under a timestamped name.
/// Nothing is written when the fetch fails.
pub async fn download_listing<Tz>(
    fetcher: &dyn PageFetcher,
    listing_url: &str,
    download_dir: &Path,
    fetched_at: &DateTime<Tz>,
) -> Result<SavedListing>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let file_name = StorageManager::listing_file_name(listing_url, fetched_at)?;

    info!("🌐 Downloading: {}", listing_url);
    let page = match fetcher.fetch_page(listing_url).await {
        Ok(page) => page,
        Err(e) => {
            error!("❌ Error downloading the page: {:#}", e);
            return Err(e);
        }
    };

    CatalogStore::ensure_dir(download_dir)?;
    let path = download_dir.join(file_name);
    fs::write(&path, &page.body).with_context(|| format!("Failed to write {}", path.display()))?;

    let saved = SavedListing {
        path,
        characters: page.body.chars().count(),
        status: page.status,
    };
    info!("✅ Saved listing page to {}", saved.path.display());
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::StaticPageFetcher;
    use chrono::Utc;
    use tempfile::tempdir;

    const LISTING_URL: &str = "https://www.mcdonaldbd.com/our-products/";

    #[tokio::test]
    async fn test_download_saves_timestamped_file() {
        let dir = tempdir().unwrap();
        let download_dir = dir.path().join("downloaded_content");
        let fetcher = StaticPageFetcher::new().with_page(LISTING_URL, "<html>পণ্য</html>");
        let fetched_at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

        let saved = download_listing(&fetcher, LISTING_URL, &download_dir, &fetched_at)
            .await
            .unwrap();

        assert_eq!(
            saved.path,
            download_dir.join("mcdonaldbd.com_products_page_20250102_030405.html")
        );
        assert_eq!(saved.characters, 17);
        assert_eq!(saved.status, 200);
        assert_eq!(fs::read_to_string(&saved.path).unwrap(), "<html>পণ্য</html>");
    }

    #[tokio::test]
    async fn test_failed_download_writes_nothing() {
        let dir = tempdir().unwrap();
        let download_dir = dir.path().join("downloaded_content");
        let fetched_at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

        let result =
            download_listing(&StaticPageFetcher::new(), LISTING_URL, &download_dir, &fetched_at).await;

        assert!(result.is_err());
        assert!(!download_dir.exists());
    }
}

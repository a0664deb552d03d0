use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use regex::Regex;
use std::fmt::Display;
use std::sync::LazyLock;
use url::Url;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATOR_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());

/// Folder prefix used in record image references
pub const IMAGE_REF_PREFIX: &str = "images/";

/// Naming rules for every file the curation tools write
pub struct StorageManager;

impl StorageManager {
    /// `<domain>_products_page_<YYYYMMDD_HHMMSS>.html`, domain without `www.`
    pub fn listing_file_name<Tz>(listing_url: &str, fetched_at: &DateTime<Tz>) -> Result<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let url = Url::parse(listing_url)
            .with_context(|| format!("Invalid listing URL: {}", listing_url))?;
        let host = url.host_str().unwrap_or("unknown-host");
        let domain = host.replace("www.", "");
        let timestamp = fetched_at.format("%Y%m%d_%H%M%S");

        Ok(format!("{}_products_page_{}.html", domain, timestamp))
    }

    /// Per-category data file name, e.g. `herbicides_weedicides.json`
    pub fn category_file_name(category: &str) -> String {
        let cleaned = NON_WORD.replace_all(category, "");
        let cleaned = SEPARATOR_RUN.replace_all(cleaned.trim(), "_");
        format!("{}.json", cleaned.to_lowercase())
    }

    pub fn primary_image_name(product_id: &str, extension: &str) -> String {
        format!("{}.{}", product_id, extension)
    }

    /// Additional images are numbered from 1: `<id>_(<n>).<ext>`
    pub fn additional_image_name(product_id: &str, position: usize, extension: &str) -> String {
        format!("{}_({}).{}", product_id, position, extension)
    }

    /// Reference stored in a record for a file inside the images folder
    pub fn image_ref(file_name: &str) -> String {
        format!("{}{}", IMAGE_REF_PREFIX, file_name)
    }

    /// Final path segment of an image reference or URL
    pub fn file_name_of(reference: &str) -> &str {
        reference
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(reference)
    }

    /// Extension of a file name, without the dot
    pub fn extension_of(file_name: &str) -> Option<&str> {
        let (stem, ext) = file_name.rsplit_once('.')?;
        (!stem.is_empty() && !ext.is_empty()).then_some(ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_listing_file_name() {
        let fetched_at = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap();
        let name =
            StorageManager::listing_file_name("https://www.mcdonaldbd.com/our-products/", &fetched_at)
                .unwrap();
        assert_eq!(name, "mcdonaldbd.com_products_page_20250309_140507.html");
    }

    #[test]
    fn test_listing_file_name_rejects_bad_url() {
        let fetched_at = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap();
        assert!(StorageManager::listing_file_name("not a url", &fetched_at).is_err());
    }

    #[test]
    fn test_category_file_name() {
        assert_eq!(
            StorageManager::category_file_name("Herbicides / Weedicides"),
            "herbicides_weedicides.json"
        );
        assert_eq!(
            StorageManager::category_file_name("Fertilizers (Macro & Micro)"),
            "fertilizers_macro_micro.json"
        );
        assert_eq!(
            StorageManager::category_file_name("Plant Growth Regulator (PGR)"),
            "plant_growth_regulator_pgr.json"
        );
    }

    #[test]
    fn test_image_names() {
        assert_eq!(StorageManager::primary_image_name("MBL-007", "png"), "MBL-007.png");
        assert_eq!(
            StorageManager::additional_image_name("MBL-007", 2, "jpg"),
            "MBL-007_(2).jpg"
        );
        assert_eq!(StorageManager::image_ref("MBL-007.png"), "images/MBL-007.png");
    }

    #[test]
    fn test_file_name_and_extension() {
        assert_eq!(StorageManager::file_name_of("images/MBL-001.jpg"), "MBL-001.jpg");
        assert_eq!(StorageManager::file_name_of("MBL-001.jpg"), "MBL-001.jpg");
        assert_eq!(StorageManager::extension_of("MBL-001_(1).webp"), Some("webp"));
        assert_eq!(StorageManager::extension_of("README"), None);
        assert_eq!(StorageManager::extension_of(".hidden"), None);
    }
}

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};
use url::Url;

use super::listing_extractor::{element_text, parse_selector};
use super::rule_normalizer::RuleNormalizer;
use crate::config::{CategoryConfig, CurationConfig};
use crate::fetcher::PageFetcher;
use crate::models::{Record, display_field, is_missing, text_field};
use crate::storage::{CatalogStore, StorageManager};

/// Fields whose fill rate is reported after enrichment
const SUMMARY_FIELDS: [&str; 5] = [
    "description",
    "application_rates",
    "crops_pests",
    "product_image",
    "additional_images",
];

/// What one product page yielded, before any image is downloaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageDetails {
    pub application_rates: String,
    pub crops_pests: String,
    pub description: String,
    pub primary_image: Option<String>,
    /// 1-based position among the content images, and the image URL
    pub content_images: Vec<(usize, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichOutcome {
    Enriched { fields_filled: usize, images: usize },
    NoUrl,
    FetchFailed,
}

/// Which slice of the collection to enrich
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrichRange {
    pub start: usize,
    pub max: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct EnrichRun {
    pub processed: usize,
    pub enriched: usize,
    pub without_url: usize,
    pub failed: usize,
    pub images_downloaded: usize,
    pub interrupted: bool,
}

struct DetailSelectors {
    dosage_items: Selector,
    crops_pests_items: Selector,
    description: Selector,
    primary_image: Selector,
    content_images: Selector,
}

/// Fetches each product's page and fills in the detail fields and images
pub struct DetailEnricher<'a> {
    fetcher: &'a dyn PageFetcher,
    base_url: Url,
    images_dir: PathBuf,
    delay: Duration,
    upload_marker: String,
    categories: CategoryConfig,
    selectors: DetailSelectors,
}

impl<'a> DetailEnricher<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, config: &CurationConfig) -> Result<Self> {
        let selectors = &config.selectors;
        Ok(Self {
            fetcher,
            base_url: Url::parse(&config.site.base_url)
                .with_context(|| format!("Invalid base URL: {}", config.site.base_url))?,
            images_dir: config.paths.images_dir.clone(),
            delay: Duration::from_millis(config.scraping.delay_between_requests_ms),
            upload_marker: selectors.upload_marker.clone(),
            categories: config.categories.clone(),
            selectors: DetailSelectors {
                dosage_items: parse_selector(&selectors.dosage_items)?,
                crops_pests_items: parse_selector(&selectors.crops_pests_items)?,
                description: parse_selector(&selectors.description)?,
                primary_image: parse_selector(&selectors.primary_image)?,
                content_images: parse_selector(&selectors.content_images)?,
            },
        })
    }

    /// Parse a product page; no network access
    pub fn extract_details(&self, html: &str) -> PageDetails {
        let document = Html::parse_document(html);
        let joined = |selector: &Selector| {
            document
                .select(selector)
                .map(|item| element_text(&item))
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join("; ")
        };

        let primary_image = document
            .select(&self.selectors.primary_image)
            .next()
            .and_then(|img| {
                let src = img.value().attr("src").unwrap_or_default();
                if src.is_empty() {
                    return None;
                }
                let largest = img
                    .value()
                    .attr("srcset")
                    .and_then(|srcset| srcset.split(',').next_back())
                    .and_then(|candidate| candidate.split_whitespace().next())
                    .filter(|url| !url.is_empty());
                Some(largest.unwrap_or(src).to_string())
            });

        let content_images = document
            .select(&self.selectors.content_images)
            .enumerate()
            .filter_map(|(index, img)| {
                let src = img.value().attr("src")?;
                src.contains(&self.upload_marker)
                    .then(|| (index + 1, src.to_string()))
            })
            .collect();

        PageDetails {
            application_rates: joined(&self.selectors.dosage_items),
            crops_pests: joined(&self.selectors.crops_pests_items),
            description: document
                .select(&self.selectors.description)
                .next()
                .map(|p| element_text(&p))
                .unwrap_or_default(),
            primary_image,
            content_images,
        }
    }

    /// Enrich one record in place
    pub async fn enrich_record(&self, record: &mut Record) -> EnrichOutcome {
        let classify_text = format!(
            "{} {}",
            text_field(record, "product_name"),
            text_field(record, "medicine_name")
        );
        if let Some(category) = self.categories.classify(&classify_text) {
            info!("   📋 Category: {}", category);
            record.insert("category_name".into(), Value::String(category.to_string()));
        }

        let product_url = text_field(record, "product_url").to_string();
        if product_url.is_empty() {
            warn!("   ⚠️ No URL available for {}", display_field(record, "product_name"));
            return EnrichOutcome::NoUrl;
        }

        let page_url = match self.base_url.join(&product_url) {
            Ok(url) => url,
            Err(e) => {
                warn!("❌ Invalid product URL {}: {}", product_url, e);
                return EnrichOutcome::FetchFailed;
            }
        };

        info!("📄 Downloading: {}", page_url);
        let page = match self.fetcher.fetch_page(page_url.as_str()).await {
            Ok(page) => page,
            Err(e) => {
                warn!("❌ Error downloading {}: {:#}", page_url, e);
                return EnrichOutcome::FetchFailed;
            }
        };

        let details = self.extract_details(&page.body);
        let mut fields_filled = 0;
        for (field, value) in [
            ("application_rates", &details.application_rates),
            ("crops_pests", &details.crops_pests),
            ("description", &details.description),
        ] {
            if !value.is_empty() {
                record.insert(field.into(), Value::String(value.clone()));
                fields_filled += 1;
            }
        }

        let product_id = text_field(record, "product_id").to_string();
        let images = self.download_images(&product_id, &details).await;
        if let Some((primary, additional)) = images.split_first() {
            record.insert("product_image".into(), Value::String(primary.clone()));
            if !additional.is_empty() {
                record.insert("additional_images".into(), Value::from(additional.to_vec()));
            }
        }

        let tags = RuleNormalizer::product_tags(
            text_field(record, "medicine_name"),
            text_field(record, "category_name"),
            text_field(record, "crops_pests"),
        );
        record.insert("product_tags".into(), Value::from(tags));

        info!("   ✅ Enhanced with: {} fields", fields_filled);
        if !images.is_empty() {
            info!("   🖼️ Downloaded {} images", images.len());
        }
        EnrichOutcome::Enriched {
            fields_filled,
            images: images.len(),
        }
    }

    async fn download_images(&self, product_id: &str, details: &PageDetails) -> Vec<String> {
        let mut saved = Vec::new();

        if let Some(src) = &details.primary_image {
            let name = |ext: &str| StorageManager::primary_image_name(product_id, ext);
            if let Some(image_ref) = self.download_image(src, name).await {
                saved.push(image_ref);
            }
        }

        for (position, src) in &details.content_images {
            let name = |ext: &str| StorageManager::additional_image_name(product_id, *position, ext);
            if let Some(image_ref) = self.download_image(src, name).await {
                saved.push(image_ref);
            }
        }

        saved
    }

    async fn download_image<F>(&self, src: &str, file_name: F) -> Option<String>
    where
        F: Fn(&str) -> String,
    {
        let result = async {
            let url = self.base_url.join(src)?;
            let asset = self.fetcher.fetch_asset(url.as_str()).await?;
            let name = file_name(image_extension(asset.content_type.as_deref(), src));

            CatalogStore::ensure_dir(&self.images_dir)?;
            let path = self.images_dir.join(&name);
            fs::write(&path, &asset.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            anyhow::Ok(name)
        }
        .await;

        match result {
            Ok(name) => {
                info!("🖼️ Downloaded image: {}", name);
                Some(StorageManager::image_ref(&name))
            }
            Err(e) => {
                warn!("❌ Error downloading image {}: {:#}", src, e);
                None
            }
        }
    }

    /// Enrich `records[range]` in order, pausing after every page fetch.
    /// When `shutdown` resolves the run stops at its current await point.
    pub async fn enrich_all<S>(&self, records: &mut [Record], range: EnrichRange, shutdown: S) -> EnrichRun
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut run = EnrichRun::default();

        let total = records.len();
        let start = range.start.min(total);
        let end = range.max.map_or(total, |max| start.saturating_add(max).min(total));
        info!("🔍 Enhancing {} products with detailed information...", end - start);

        for index in start..end {
            let record = &mut records[index];
            info!(
                "📄 Processing {}/{}: {}",
                index + 1,
                total,
                display_field(record, "product_name")
            );

            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    run.interrupted = true;
                    break;
                }
                outcome = self.enrich_record(record) => outcome,
            };
            run.processed += 1;

            match outcome {
                EnrichOutcome::NoUrl => {
                    run.without_url += 1;
                    continue;
                }
                EnrichOutcome::FetchFailed => run.failed += 1,
                EnrichOutcome::Enriched { images, .. } => {
                    run.enriched += 1;
                    run.images_downloaded += images;
                }
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    run.interrupted = true;
                    break;
                }
                _ = sleep(self.delay) => {}
            }
        }

        if run.interrupted {
            warn!("⏹️ Enhancement interrupted after {} products", run.processed);
        } else {
            info!("🎉 Enhanced {} products successfully!", run.enriched);
        }
        run
    }
}

/// File extension for a downloaded image: content type first, then URL suffix
pub fn image_extension(content_type: Option<&str>, url: &str) -> &'static str {
    let content_type = content_type.unwrap_or_default().to_lowercase();
    if content_type.contains("jpeg") || content_type.contains("jpg") {
        return "jpg";
    }
    if content_type.contains("png") {
        return "png";
    }
    if content_type.contains("webp") {
        return "webp";
    }

    let url = url.to_lowercase();
    if url.ends_with(".png") {
        "png"
    } else if url.ends_with(".webp") {
        "webp"
    } else {
        "jpg"
    }
}

/// Category counts and fill rates after an enrichment run
#[derive(Debug, Clone, Default)]
pub struct EnrichmentSummary {
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
    pub filled: Vec<(&'static str, usize)>,
}

impl EnrichmentSummary {
    pub fn from_records(records: &[Record]) -> Self {
        let mut by_category = BTreeMap::new();
        for record in records {
            *by_category.entry(display_field(record, "category_name")).or_default() += 1;
        }

        let filled = SUMMARY_FIELDS
            .iter()
            .map(|field| {
                let count = records.iter().filter(|r| !is_missing(r.get(*field))).count();
                (*field, count)
            })
            .collect();

        Self {
            total: records.len(),
            by_category,
            filled,
        }
    }

    pub fn print(&self) {
        println!("\n{}", "=".repeat(60));
        println!("📊 ENHANCEMENT SUMMARY");
        println!("{}", "=".repeat(60));
        println!("Total Products: {}", self.total);
        println!("\n📋 Products by Category:");
        for (category, count) in &self.by_category {
            println!("  {}: {} products", category, count);
        }

        println!("\n🔍 Enhanced Fields:");
        for (field, count) in &self.filled {
            let percentage = if self.total == 0 {
                0.0
            } else {
                *count as f64 / self.total as f64 * 100.0
            };
            println!("  {}: {}/{} ({:.1}%)", field, count, self.total, percentage);
        }
        println!("{}", "=".repeat(60));
    }
}

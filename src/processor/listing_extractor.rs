use anyhow::{Context, Result, anyhow};
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::rule_normalizer::RuleNormalizer;
use crate::models::Product;
use crate::storage::{CatalogStore, StorageManager};

/// Words that mark a table's header row as a product table
const HEADER_KEYWORDS: [&str; 4] = ["product", "name", "common", "reg"];
/// Previous siblings inspected when looking for a table's category heading
const CATEGORY_LOOKBACK: usize = 10;
const MAX_HEADING_CHARS: usize = 100;
const UNKNOWN_CATEGORY: &str = "Unknown";

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("Invalid selector '{}': {:?}", selector, e))
}

/// Visible text of an element with whitespace collapsed
pub fn element_text(element: &ElementRef) -> String {
    RuleNormalizer::clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Turns the product listing page into `Product` rows
pub struct ListingExtractor {
    categories: Vec<String>,
    id_prefix: String,
    table: Selector,
    row: Selector,
    header_cell: Selector,
    data_cell: Selector,
    anchor: Selector,
}

/// Counts printed after an extraction
#[derive(Debug, Clone, Default)]
pub struct ExtractionSummary {
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
    pub with_url: usize,
    pub with_image: usize,
}

impl ListingExtractor {
    pub fn new(categories: Vec<String>, id_prefix: impl Into<String>) -> Result<Self> {
        Ok(Self {
            categories,
            id_prefix: id_prefix.into(),
            table: parse_selector("table")?,
            row: parse_selector("tr")?,
            header_cell: parse_selector("th, td")?,
            data_cell: parse_selector("td")?,
            anchor: parse_selector("a")?,
        })
    }

    /// Extract every product row, stamping each with `extraction_date`
    pub fn extract(&self, html: &str, extraction_date: &str) -> Vec<Product> {
        let document = Html::parse_document(html);
        let tables: Vec<ElementRef> = document
            .select(&self.table)
            .filter(|table| self.is_product_table(table))
            .collect();
        info!("📊 Found {} product tables", tables.len());

        let mut products = Vec::new();
        for (index, table) in tables.iter().enumerate() {
            let category = self.category_for(table);
            info!("📋 Processing table {}: {}", index + 1, category);

            let extracted = self.extract_rows(table, &category, extraction_date);
            info!("   ✅ Extracted {} products", extracted.len());
            products.extend(extracted);
        }

        products
    }

    fn is_product_table(&self, table: &ElementRef) -> bool {
        let rows: Vec<ElementRef> = table.select(&self.row).collect();
        if rows.len() <= 1 {
            return false;
        }

        let headers = rows[0]
            .select(&self.header_cell)
            .map(|cell| element_text(&cell))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        HEADER_KEYWORDS.iter().any(|keyword| headers.contains(keyword))
    }

    /// Nearest short preceding sibling naming a known category
    fn category_for(&self, table: &ElementRef) -> String {
        for sibling in table.prev_siblings().take(CATEGORY_LOOKBACK) {
            let text = match sibling.value() {
                Node::Element(_) => ElementRef::wrap(sibling).map(|e| element_text(&e)),
                Node::Text(text) => Some(RuleNormalizer::clean_text(text)),
                _ => None,
            };
            let Some(text) = text else { continue };
            if text.is_empty() || text.chars().count() >= MAX_HEADING_CHARS {
                continue;
            }

            let lowered = text.to_lowercase();
            if let Some(category) = self
                .categories
                .iter()
                .find(|category| lowered.contains(&category.to_lowercase()))
            {
                return category.clone();
            }
        }

        UNKNOWN_CATEGORY.to_string()
    }

    fn extract_rows(&self, table: &ElementRef, category: &str, extraction_date: &str) -> Vec<Product> {
        table
            .select(&self.row)
            .skip(1)
            .filter_map(|row| {
                let cells: Vec<ElementRef> = row.select(&self.data_cell).collect();
                if cells.len() < 4 {
                    return None;
                }

                let serial_no = element_text(&cells[0]);
                let (product_name, product_url) = match cells[1].select(&self.anchor).next() {
                    Some(link) => (
                        element_text(&link),
                        link.value().attr("href").unwrap_or_default().to_string(),
                    ),
                    None => (element_text(&cells[1]), String::new()),
                };

                Some(Product {
                    product_id: format!("{}-{}", self.id_prefix, RuleNormalizer::pad_serial(&serial_no)),
                    product_name,
                    medicine_name: element_text(&cells[2]),
                    category_name: category.to_string(),
                    reg_no: element_text(&cells[3]),
                    serial_no,
                    product_url,
                    origin: cells.get(4).map(element_text).unwrap_or_default(),
                    extraction_date: extraction_date.to_string(),
                    ..Default::default()
                })
            })
            .collect()
    }

    /// Extract from the most recently saved listing page in `download_dir`
    pub fn extract_latest(&self, download_dir: &Path, extraction_date: &str) -> Result<(PathBuf, Vec<Product>)> {
        let html_file = CatalogStore::latest_file_with_extension(download_dir, "html")?
            .ok_or_else(|| anyhow!("No HTML files found in {}", download_dir.display()))?;
        info!("📄 Processing file: {}", html_file.display());

        let html = fs::read_to_string(&html_file)
            .with_context(|| format!("Failed to read {}", html_file.display()))?;
        let products = self.extract(&html, extraction_date);
        info!("✅ Extracted {} products", products.len());
        Ok((html_file, products))
    }
}

/// Products grouped by category, categories in order of first appearance
pub fn group_by_category(products: &[Product]) -> Vec<(String, Vec<Product>)> {
    let mut groups: Vec<(String, Vec<Product>)> = Vec::new();
    for product in products {
        match groups.iter_mut().find(|(category, _)| *category == product.category_name) {
            Some((_, members)) => members.push(product.clone()),
            None => groups.push((product.category_name.clone(), vec![product.clone()])),
        }
    }
    groups
}

/// Write all products to `data_file` and each category to its own file in `data_dir`
pub fn save_extraction(products: &[Product], data_file: &Path, data_dir: &Path) -> Result<Vec<PathBuf>> {
    CatalogStore::save_json(data_file, products)?;
    info!("💾 Saved {} products to {}", products.len(), data_file.display());

    let mut written = vec![data_file.to_path_buf()];
    for (category, members) in group_by_category(products) {
        let path = data_dir.join(StorageManager::category_file_name(&category));
        match CatalogStore::save_json(&path, &members) {
            Ok(()) => {
                info!("💾 Saved {} {} products to {}", members.len(), category, path.display());
                written.push(path);
            }
            Err(e) => warn!("❌ Error saving {}: {:#}", category, e),
        }
    }

    Ok(written)
}

pub fn summarize(products: &[Product]) -> ExtractionSummary {
    let mut summary = ExtractionSummary {
        total: products.len(),
        ..Default::default()
    };
    for product in products {
        *summary.by_category.entry(product.category_name.clone()).or_default() += 1;
        if !product.product_url.is_empty() {
            summary.with_url += 1;
        }
        if !product.product_image.is_empty() {
            summary.with_image += 1;
        }
    }
    summary
}

impl ExtractionSummary {
    pub fn print(&self) {
        println!("\n{}", "=".repeat(60));
        println!("📊 EXTRACTION SUMMARY");
        println!("{}", "=".repeat(60));
        println!("Total Products: {}", self.total);
        println!("\n📋 Products by Category:");
        for (category, count) in &self.by_category {
            println!("  {}: {} products", category, count);
        }
        println!("\n🔗 Products with URLs: {}", self.with_url);
        println!("🖼️ Products with Images: {}", self.with_image);
        println!("{}", "=".repeat(60));
    }
}

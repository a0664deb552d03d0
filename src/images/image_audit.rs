use anyhow::{Result, anyhow};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

use crate::models::{Record, display_field, text_field};
use crate::storage::{CatalogStore, IMAGE_REF_PREFIX, StorageManager};

/// Extensions counted as product images in the images folder
pub const AUDIT_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "bmp"];

/// Names of the image files directly inside `images_dir`
pub fn list_image_files(images_dir: &Path) -> Result<BTreeSet<String>> {
    if !images_dir.is_dir() {
        return Err(anyhow!("Images folder not found: {}", images_dir.display()));
    }

    Ok(CatalogStore::list_files_with_extensions(images_dir, &AUDIT_EXTENSIONS)?
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect())
}

fn is_placeholder(reference: &str, markers: &[String]) -> bool {
    markers.iter().any(|marker| reference.contains(marker.as_str()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    Found(String),
    Placeholder(String),
    /// Expected file name, or "No image path"
    Missing(String),
}

#[derive(Debug, Clone)]
pub struct ImageCheck {
    pub product_id: String,
    pub product_name: String,
    pub status: ImageStatus,
}

/// Product-to-image verification; orphaned files are only reported
#[derive(Debug, Clone)]
pub struct ImageAudit {
    pub total_products: usize,
    pub image_files: BTreeSet<String>,
    pub checks: Vec<ImageCheck>,
    pub orphaned: Vec<String>,
}

impl ImageAudit {
    pub fn run(records: &[Record], image_files: BTreeSet<String>, placeholder_markers: &[String]) -> Self {
        let checks = records
            .iter()
            .map(|record| {
                let product_id = display_field(record, "product_id");
                let product_image = text_field(record, "product_image");
                let expected = if product_image.is_empty() {
                    StorageManager::primary_image_name(&product_id, "jpg")
                } else {
                    StorageManager::file_name_of(product_image).to_string()
                };

                let status = if image_files.contains(&expected) {
                    ImageStatus::Found(expected)
                } else if is_placeholder(product_image, placeholder_markers) {
                    ImageStatus::Placeholder(product_image.to_string())
                } else if product_image.is_empty() {
                    ImageStatus::Missing("No image path".to_string())
                } else {
                    ImageStatus::Missing(product_image.to_string())
                };

                ImageCheck {
                    product_id,
                    product_name: display_field(record, "product_name"),
                    status,
                }
            })
            .collect();

        let referenced = referenced_file_names(records);
        let orphaned = image_files
            .iter()
            .filter(|name| !referenced.contains(*name))
            .cloned()
            .collect();

        Self {
            total_products: records.len(),
            image_files,
            checks,
            orphaned,
        }
    }

    pub fn found(&self) -> impl Iterator<Item = &ImageCheck> {
        self.checks.iter().filter(|c| matches!(c.status, ImageStatus::Found(_)))
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &ImageCheck> {
        self.checks.iter().filter(|c| matches!(c.status, ImageStatus::Placeholder(_)))
    }

    pub fn missing(&self) -> impl Iterator<Item = &ImageCheck> {
        self.checks.iter().filter(|c| matches!(c.status, ImageStatus::Missing(_)))
    }

    pub fn print(&self) {
        let found = self.found().count();
        let placeholders: Vec<_> = self.placeholders().collect();
        let missing: Vec<_> = self.missing().collect();

        println!("📊 Total products in database: {}", self.total_products);
        println!("📁 Total image files in images folder: {}", self.image_files.len());
        println!("{}", "=".repeat(60));
        println!("✅ Products with images: {}", found);
        println!("⚠️  Products with placeholder images: {}", placeholders.len());
        println!("❌ Products missing images: {}", missing.len());
        println!("{}", "=".repeat(60));

        if !missing.is_empty() {
            println!("🚨 MISSING IMAGES:");
            println!("{}", "-".repeat(40));
            for check in &missing {
                if let ImageStatus::Missing(expected) = &check.status {
                    println!("ID: {} | {}", check.product_id, check.product_name);
                    println!("   Expected: {}\n", expected);
                }
            }
        }

        if !placeholders.is_empty() {
            println!("⚠️  PLACEHOLDER IMAGES:");
            println!("{}", "-".repeat(40));
            for check in &placeholders {
                if let ImageStatus::Placeholder(reference) = &check.status {
                    println!("ID: {} | {}", check.product_id, check.product_name);
                    println!("   Placeholder: {}\n", reference);
                }
            }
        }

        let percent = |count: usize| {
            if self.total_products == 0 {
                0.0
            } else {
                count as f64 / self.total_products as f64 * 100.0
            }
        };
        println!("📈 SUMMARY:");
        println!("{}", "-".repeat(40));
        println!("Total products: {}", self.total_products);
        println!("With actual images: {} ({:.1}%)", found, percent(found));
        println!(
            "With placeholder images: {} ({:.1}%)",
            placeholders.len(),
            percent(placeholders.len())
        );
        println!("Missing images: {} ({:.1}%)", missing.len(), percent(missing.len()));

        if !self.orphaned.is_empty() {
            println!(
                "\n🔍 ORPHANED IMAGES (images without corresponding products): {}",
                self.orphaned.len()
            );
            println!("{}", "-".repeat(40));
            for name in &self.orphaned {
                println!("   {}", name);
            }
        }
    }
}

/// Every file name a record could own: `<id>.<ext>` for each known
/// extension plus the primary and additional image references
fn referenced_file_names(records: &[Record]) -> BTreeSet<String> {
    let mut referenced = BTreeSet::new();

    for record in records {
        let product_id = text_field(record, "product_id");
        if !product_id.is_empty() {
            for ext in AUDIT_EXTENSIONS {
                referenced.insert(StorageManager::primary_image_name(product_id, ext));
            }
        }

        let primary = text_field(record, "product_image");
        if !primary.is_empty() {
            referenced.insert(StorageManager::file_name_of(primary).to_string());
        }

        if let Some(Value::Array(additional)) = record.get("additional_images") {
            referenced.extend(
                additional
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|reference| StorageManager::file_name_of(reference).to_string()),
            );
        }
    }

    referenced
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpdate {
    pub product_id: String,
    pub old_image: String,
    pub new_image: String,
}

#[derive(Debug, Clone, Default)]
pub struct PlaceholderUpdate {
    pub updated: Vec<ImageUpdate>,
    /// Product id and placeholder reference with no local file
    pub not_found: Vec<(String, String)>,
}

/// Point placeholder references at a local `<id>.<ext>` file when one exists
pub fn replace_placeholders(
    records: &mut [Record],
    image_files: &BTreeSet<String>,
    placeholder_markers: &[String],
) -> PlaceholderUpdate {
    let mut update = PlaceholderUpdate::default();

    for record in records.iter_mut() {
        let product_image = text_field(record, "product_image").to_string();
        if !is_placeholder(&product_image, placeholder_markers) {
            continue;
        }

        let product_id = text_field(record, "product_id").to_string();
        let local = AUDIT_EXTENSIONS
            .iter()
            .map(|ext| StorageManager::primary_image_name(&product_id, ext))
            .find(|name| image_files.contains(name));

        match local {
            Some(file_name) => {
                let new_image = StorageManager::image_ref(&file_name);
                record.insert("product_image".into(), Value::String(new_image.clone()));
                info!("✅ {}: {} → {}", product_id, product_image, new_image);
                update.updated.push(ImageUpdate {
                    product_id,
                    old_image: product_image,
                    new_image,
                });
            }
            None => {
                info!("❌ {}: No local image found for {}", product_id, product_image);
                update.not_found.push((product_id, product_image));
            }
        }
    }

    update
}

/// Replace placeholders in `data_file`. When anything changes the original
/// array is written to `backup_file` before the data file is overwritten.
pub fn update_placeholder_images(
    data_file: &Path,
    backup_file: &Path,
    images_dir: &Path,
    placeholder_markers: &[String],
) -> Result<PlaceholderUpdate> {
    if !data_file.is_file() {
        return Err(anyhow!("Products file not found: {}", data_file.display()));
    }
    let image_files = list_image_files(images_dir)?;

    let original = CatalogStore::load_records(data_file)?;
    let mut records = original.clone();
    let update = replace_placeholders(&mut records, &image_files, placeholder_markers);

    if !update.updated.is_empty() {
        CatalogStore::save_records(backup_file, &original)?;
        info!("💾 Backup saved to: {}", backup_file.display());
        CatalogStore::save_records(data_file, &records)?;
    }

    Ok(update)
}

/// Records whose image is a local reference, and those still on a placeholder
pub fn count_local_and_placeholder(records: &[Record], placeholder_markers: &[String]) -> (usize, usize) {
    records.iter().fold((0, 0), |(local, placeholder), record| {
        let image = text_field(record, "product_image");
        if is_placeholder(image, placeholder_markers) {
            (local, placeholder + 1)
        } else if image.starts_with(IMAGE_REF_PREFIX) {
            (local + 1, placeholder)
        } else {
            (local, placeholder)
        }
    })
}

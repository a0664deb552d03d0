use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::site_config::{CategoryConfig, ScrapingConfig, SelectorConfig, SiteConfig};

/// Default location of the TOML file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "src/configs/curation.toml";

/// Top-level configuration shared by every curation tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurationConfig {
    pub site: SiteConfig,
    pub scraping: ScrapingConfig,
    pub selectors: SelectorConfig,
    pub categories: CategoryConfig,
    pub paths: PathsConfig,
    pub classifier: ClassifierConfig,
    pub duplicates: DuplicateConfig,
    pub images: ImageConfig,
}

/// File and folder locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub download_dir: PathBuf,
    pub data_dir: PathBuf,
    pub data_file: PathBuf,
    pub backup_file: PathBuf,
    pub images_dir: PathBuf,
    pub products_dir: PathBuf,
    pub active_dir: PathBuf,
    pub complete_file: PathBuf,
    pub incomplete_file: PathBuf,
    pub kb_file: PathBuf,
    pub kb_converted_file: PathBuf,
    pub kb_filtered_file: PathBuf,
    pub duplicates_report_file: PathBuf,
    pub field_duplicates_report_file: PathBuf,
    pub english_file: PathBuf,
    pub bengali_file: PathBuf,
}

/// Required-field sets for the record classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub activity_field: String,
    pub required_fields: Vec<String>,
    pub essential_fields: Vec<String>,
    /// Optional fields named in the essential-check report
    pub ignored_fields: Vec<String>,
    /// Fields covered by the completeness report
    pub report_fields: Vec<String>,
}

/// Composite key and near-duplicate heuristic settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateConfig {
    pub id_field: String,
    pub key_fields: (String, String),
    pub formulation_suffixes: Vec<String>,
    pub variant_min_similarity: f64,
}

/// Image resizing and audit settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub jpeg_quality: u8,
    pub placeholder_markers: Vec<String>,
}

impl CurationConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read curation config file: {}", path.display()))?;

        let config: CurationConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse curation config file: {}", path.display()))?;

        Ok(config)
    }

    /// File if present, built-in defaults otherwise, then environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            info!("Loading curation config from {}", path.display());
            Self::from_file(path)?
        } else {
            warn!("Config file {} not found, using built-in defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides_with(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_default() -> Result<Self> {
        Self::load(DEFAULT_CONFIG_PATH)
    }

    /// Apply `CATALOG_*` overrides using the given variable lookup
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("CATALOG_BASE_URL") {
            self.site.base_url = base_url;
        }

        if let Some(listing_url) = lookup("CATALOG_LISTING_URL") {
            self.site.listing_url = listing_url;
        }

        if let Some(delay) = lookup("CATALOG_REQUEST_DELAY_MS") {
            self.scraping.delay_between_requests_ms = delay
                .trim()
                .parse()
                .with_context(|| format!("Invalid CATALOG_REQUEST_DELAY_MS: {}", delay))?;
        }

        if let Some(data_file) = lookup("CATALOG_DATA_FILE") {
            self.paths.data_file = PathBuf::from(data_file);
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.site.validate()?;

        if self.classifier.required_fields.is_empty() {
            return Err(anyhow::anyhow!("Required field list cannot be empty"));
        }

        if self.classifier.essential_fields.is_empty() {
            return Err(anyhow::anyhow!("Essential field list cannot be empty"));
        }

        if self.images.width == 0 || self.images.height == 0 {
            return Err(anyhow::anyhow!("Image target size must be non-zero"));
        }

        if !(0.0..=1.0).contains(&self.duplicates.variant_min_similarity) {
            return Err(anyhow::anyhow!(
                "Variant similarity threshold must be within [0, 1], got {}",
                self.duplicates.variant_min_similarity
            ));
        }

        Ok(())
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloaded_content"),
            data_dir: PathBuf::from("data"),
            data_file: PathBuf::from("data/products_data.json"),
            backup_file: PathBuf::from("data/products_data_backup.json"),
            images_dir: PathBuf::from("images"),
            products_dir: PathBuf::from("products"),
            active_dir: PathBuf::from("active_products"),
            complete_file: PathBuf::from("data/complete_products.json"),
            incomplete_file: PathBuf::from("data/incomplete_products.json"),
            kb_file: PathBuf::from("kb.json"),
            kb_converted_file: PathBuf::from("kb_converted_products.json"),
            kb_filtered_file: PathBuf::from("kb_filtered_products.json"),
            duplicates_report_file: PathBuf::from("true_duplicates_report.json"),
            field_duplicates_report_file: PathBuf::from("duplicate_products_report.json"),
            english_file: PathBuf::from("kb_english_products.json"),
            bengali_file: PathBuf::from("kb_bengali_products.json"),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            activity_field: "isActive".to_string(),
            required_fields: strings(&[
                "product_id",
                "product_name",
                "product_image",
                "medicine_name",
                "category_name",
                "description",
                "application_rates",
                "frequency_of_use",
                "side_effect",
                "crops_pests",
                "crops",
                "pest",
                "symptoms",
                "causes",
                "product_tags",
                "reg_no",
                "serial_no",
                "product_url",
                "origin",
                "isActive",
                "Stocks",
                "extraction_date",
            ]),
            essential_fields: strings(&[
                "product_id",
                "product_name",
                "product_image",
                "medicine_name",
                "category_name",
                "description",
                "application_rates",
                "frequency_of_use",
                "side_effect",
                "crops_pests",
                "crops",
                "pest",
                "symptoms",
                "causes",
                "product_tags",
                "isActive",
                "Stocks",
                "extraction_date",
            ]),
            ignored_fields: strings(&["reg_no", "serial_no", "product_url", "origin", "product_price"]),
            report_fields: strings(&[
                "description",
                "application_rates",
                "frequency_of_use",
                "side_effect",
                "crops_pests",
            ]),
        }
    }
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            id_field: "product_id".to_string(),
            key_fields: ("product_name".to_string(), "common_name".to_string()),
            formulation_suffixes: strings(&["ec", "wp", "sl", "sp", "wg", "sc", "gr", "df", "se", "wdg"]),
            variant_min_similarity: 0.6,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("product-image"),
            output_dir: PathBuf::from("images"),
            width: 512,
            height: 512,
            jpeg_quality: 95,
            placeholder_markers: strings(&["product-image.jpg", "product-image.png"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = CurationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.classifier.required_fields.len(), 22);
        assert_eq!(config.classifier.essential_fields.len(), 18);
        assert!(!config.classifier.required_fields.contains(&"product_price".to_string()));
    }

    #[test]
    fn test_essential_fields_are_a_subset() {
        let config = ClassifierConfig::default();
        for field in &config.essential_fields {
            assert!(config.required_fields.contains(field), "{} not required", field);
        }
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CATALOG_BASE_URL", "https://staging.example.com"),
            ("CATALOG_REQUEST_DELAY_MS", "250"),
            ("CATALOG_DATA_FILE", "fixtures/products.json"),
        ]);

        let mut config = CurationConfig::default();
        config
            .apply_env_overrides_with(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.site.base_url, "https://staging.example.com");
        assert_eq!(config.scraping.delay_between_requests_ms, 250);
        assert_eq!(config.paths.data_file, PathBuf::from("fixtures/products.json"));
        // untouched
        assert_eq!(config.site.listing_url, "https://www.mcdonaldbd.com/our-products/");
    }

    #[test]
    fn test_invalid_delay_override_is_rejected() {
        let mut config = CurationConfig::default();
        let result = config.apply_env_overrides_with(|name| {
            (name == "CATALOG_REQUEST_DELAY_MS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_from_toml_sections() {
        let content = r#"
            [scraping]
            delay_between_requests_ms = 10

            [classifier]
            required_fields = ["product_id", "description"]

            [duplicates]
            key_fields = ["product_name", "medicine_name"]
        "#;

        let config: CurationConfig = toml::from_str(content).unwrap();
        assert_eq!(config.scraping.delay_between_requests_ms, 10);
        assert_eq!(config.classifier.required_fields, vec!["product_id", "description"]);
        assert_eq!(config.classifier.activity_field, "isActive");
        assert_eq!(config.duplicates.key_fields.1, "medicine_name");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bundled_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let config = CurationConfig::from_file(&path).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.paths.data_file, PathsConfig::default().data_file);
        assert_eq!(config.classifier.required_fields.len(), 22);
        assert_eq!(config.categories.keywords.len(), CategoryConfig::default().keywords.len());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CurationConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.paths.active_dir, PathBuf::from("active_products"));
    }
}

use serde::{Deserialize, Serialize};

/// Configuration for the retailer site the catalog is scraped from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub base_url: String,
    pub listing_url: String,
    /// Prefix for identifiers derived from the listing serial number
    pub id_prefix: String,
}

/// Scraping behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    pub delay_between_requests_ms: u64,
    pub timeout_seconds: u64,
}

/// CSS selectors for the product detail pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub dosage_items: String,
    pub crops_pests_items: String,
    pub description: String,
    pub primary_image: String,
    pub content_images: String,
    /// Substring a content image `src` must contain to count as a product photo
    pub upload_marker: String,
}

/// Keyword to category rule, checked in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryKeyword {
    pub keyword: String,
    pub category: String,
}

/// Category knowledge for the listing tables and the detail enricher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    /// Headings that introduce a product table on the listing page
    pub listing_categories: Vec<String>,
    pub keywords: Vec<CategoryKeyword>,
}

impl SiteConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_url.is_empty() {
            return Err(anyhow::anyhow!("Site base URL cannot be empty"));
        }
        if self.listing_url.is_empty() {
            return Err(anyhow::anyhow!("Site listing URL cannot be empty"));
        }
        Ok(())
    }
}

impl CategoryConfig {
    /// First category whose keyword occurs in the (lower-cased) text
    pub fn classify(&self, text: &str) -> Option<&str> {
        let text_lower = text.to_lowercase();
        self.keywords
            .iter()
            .find(|rule| text_lower.contains(&rule.keyword))
            .map(|rule| rule.category.as_str())
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "McDonald Bangladesh".to_string(),
            base_url: "https://www.mcdonaldbd.com".to_string(),
            listing_url: "https://www.mcdonaldbd.com/our-products/".to_string(),
            id_prefix: "MBL".to_string(),
        }
    }
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            delay_between_requests_ms: 2000,
            timeout_seconds: 30,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            dosage_items: "div.dosage-rate ul li".to_string(),
            crops_pests_items: "div.crops-pests ul li".to_string(),
            description: "div.entry-content p".to_string(),
            primary_image: "img.wp-post-image".to_string(),
            content_images: "div.entry-content img".to_string(),
            upload_marker: "wp-content/uploads".to_string(),
        }
    }
}

const HERBICIDES: &str = "Herbicides / Weedicides";
const INSECTICIDES: &str = "Insecticides";
const FUNGICIDES: &str = "Fungicides";
const ANTIBACTERIALS: &str = "Antibacterial Antibiotic";
const ACARICIDES: &str = "Acaricides / Miticides";
const GROWTH_REGULATORS: &str = "Plant Growth Regulator (PGR)";
const FERTILIZERS: &str = "Fertilizers (Macro & Micro)";
const PUBLIC_HEALTH: &str = "Public Health Product (PHP)";

impl Default for CategoryConfig {
    fn default() -> Self {
        let rules: &[(&str, &str)] = &[
            ("herbicide", HERBICIDES),
            ("weedicide", HERBICIDES),
            ("weed", HERBICIDES),
            ("oxadiazon", HERBICIDES),
            ("glyphosate", HERBICIDES),
            ("paraquat", HERBICIDES),
            ("pendimethalin", HERBICIDES),
            ("pyrazosulfuran", HERBICIDES),
            ("bensulfuron", HERBICIDES),
            ("acetachlor", HERBICIDES),
            ("quizalofop", HERBICIDES),
            ("carfentrazone", HERBICIDES),
            ("isoproturon", HERBICIDES),
            ("insecticide", INSECTICIDES),
            ("imidacloprid", INSECTICIDES),
            ("abamectin", INSECTICIDES),
            ("fipronil", INSECTICIDES),
            ("cartap", INSECTICIDES),
            ("carbaryl", INSECTICIDES),
            ("diazinon", INSECTICIDES),
            ("cypermethrin", INSECTICIDES),
            ("pymetrozine", INSECTICIDES),
            ("thiamethoxam", INSECTICIDES),
            ("lufenuron", INSECTICIDES),
            ("emamectin", INSECTICIDES),
            ("acetamiprid", INSECTICIDES),
            ("indoxacarb", INSECTICIDES),
            ("profenoso", INSECTICIDES),
            ("lambda-cyhalothrin", INSECTICIDES),
            ("beta-cyfluthrin", INSECTICIDES),
            ("fungicide", FUNGICIDES),
            ("carbendazim", FUNGICIDES),
            ("mancozeb", FUNGICIDES),
            ("hexaconazole", FUNGICIDES),
            ("copper", FUNGICIDES),
            ("sulphur", FUNGICIDES),
            ("cymoxanil", FUNGICIDES),
            ("azoxystrobin", FUNGICIDES),
            ("difenoconazole", FUNGICIDES),
            ("tebuconazole", FUNGICIDES),
            ("trifloxystrobin", FUNGICIDES),
            ("iprodion", FUNGICIDES),
            ("propiconazole", FUNGICIDES),
            ("kasugamycin", FUNGICIDES),
            ("boscalid", FUNGICIDES),
            ("fenoxanil", FUNGICIDES),
            ("tricyclazole", FUNGICIDES),
            ("cyprodinil", FUNGICIDES),
            ("fludioxonil", FUNGICIDES),
            ("carboxin", FUNGICIDES),
            ("thiram", FUNGICIDES),
            ("antibacterial", ANTIBACTERIALS),
            ("antibiotic", ANTIBACTERIALS),
            ("streptomycin", ANTIBACTERIALS),
            ("tetracycline", ANTIBACTERIALS),
            ("acaricide", ACARICIDES),
            ("miticide", ACARICIDES),
            ("propergite", ACARICIDES),
            ("fenpyroximate", ACARICIDES),
            ("fenazaquin", ACARICIDES),
            ("pgr", GROWTH_REGULATORS),
            ("growth regulator", GROWTH_REGULATORS),
            ("triacontanol", GROWTH_REGULATORS),
            ("brassinolide", GROWTH_REGULATORS),
            ("fertilizer", FERTILIZERS),
            ("zinc", FERTILIZERS),
            ("magnesium", FERTILIZERS),
            ("boron", FERTILIZERS),
            ("sulphate", FERTILIZERS),
            ("chelated", FERTILIZERS),
            ("public health", PUBLIC_HEALTH),
        ];

        Self {
            listing_categories: [
                HERBICIDES,
                INSECTICIDES,
                FUNGICIDES,
                ANTIBACTERIALS,
                ACARICIDES,
                GROWTH_REGULATORS,
                FERTILIZERS,
                PUBLIC_HEALTH,
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            keywords: rules
                .iter()
                .map(|(keyword, category)| CategoryKeyword {
                    keyword: keyword.to_string(),
                    category: category.to_string(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let scraping_config = ScrapingConfig::default();
        assert_eq!(scraping_config.delay_between_requests_ms, 2000);
        assert_eq!(scraping_config.timeout_seconds, 30);

        let site_config = SiteConfig::default();
        assert!(site_config.validate().is_ok());
        assert_eq!(site_config.id_prefix, "MBL");
    }

    #[test]
    fn test_keyword_order_decides_category() {
        let categories = CategoryConfig::default();

        assert_eq!(categories.classify("Round Up glyphosate"), Some(HERBICIDES));
        assert_eq!(categories.classify("Admire IMIDACLOPRID 70 WG"), Some(INSECTICIDES));
        // "weed" is checked before "zinc"
        assert_eq!(categories.classify("zinc weed killer"), Some(HERBICIDES));
        assert_eq!(categories.classify("plain water"), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let site: SiteConfig = toml::from_str(r#"base_url = "https://example.com""#).unwrap();
        assert_eq!(site.base_url, "https://example.com");
        assert_eq!(site.id_prefix, "MBL");
    }
}

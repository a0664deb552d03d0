use std::collections::HashSet;

/// First and last code points of the Bengali block
const BENGALI_RANGE: (char, char) = ('\u{0980}', '\u{09FF}');

/// Text rules shared by the extractor, the enricher and the converters
pub struct RuleNormalizer;

impl RuleNormalizer {
    /// Collapse every whitespace run to one space and trim
    pub fn clean_text(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Lower-cased, trimmed, non-empty tags; the first occurrence of each is kept
    pub fn dedupe_tags<I, S>(tags: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        tags.into_iter()
            .map(|tag| tag.as_ref().trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .filter(|tag| seen.insert(tag.clone()))
            .collect()
    }

    /// Tags for an enriched product: medicine name, the first `/` segment of
    /// the category, and the first three `;` segments of crops & pests
    pub fn product_tags(medicine_name: &str, category_name: &str, crops_pests: &str) -> Vec<String> {
        let mut tags = vec![medicine_name.to_string()];
        if let Some(category) = category_name.split('/').next() {
            tags.push(category.to_string());
        }
        tags.extend(crops_pests.split(';').take(3).map(str::to_string));

        Self::dedupe_tags(tags)
    }

    pub fn contains_bengali(text: &str) -> bool {
        text.chars().any(|c| (BENGALI_RANGE.0..=BENGALI_RANGE.1).contains(&c))
    }

    /// `<prefix>-<n>` with `n` zero-padded to at least three digits
    pub fn format_id(prefix: &str, position: usize) -> String {
        format!("{}-{:03}", prefix, position)
    }

    /// Left-pad a listing serial with zeros to width 3
    pub fn pad_serial(serial: &str) -> String {
        format!("{:0>3}", serial.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(RuleNormalizer::clean_text("  Apply\n\t 2 ml   per litre "), "Apply 2 ml per litre");
        assert_eq!(RuleNormalizer::clean_text("   "), "");
    }

    #[test]
    fn test_dedupe_tags_keeps_first_occurrence() {
        let tags = RuleNormalizer::dedupe_tags(["Rice", "", "stem borer", "rice ", "Jute"]);
        assert_eq!(tags, vec!["rice", "stem borer", "jute"]);
    }

    #[test]
    fn test_product_tags() {
        let tags = RuleNormalizer::product_tags(
            "Glyphosate 41% SL",
            "Herbicides / Weedicides",
            "Tea - Weeds; Rice - Weeds; Jute - Weeds; Wheat - Weeds",
        );
        assert_eq!(
            tags,
            vec!["glyphosate 41% sl", "herbicides", "tea - weeds", "rice - weeds", "jute - weeds"]
        );

        assert!(RuleNormalizer::product_tags("", "", "").is_empty());
    }

    #[test]
    fn test_contains_bengali() {
        assert!(RuleNormalizer::contains_bengali("রাউন্ডআপ 41"));
        assert!(RuleNormalizer::contains_bengali("Round Up (রাউন্ডআপ)"));
        assert!(!RuleNormalizer::contains_bengali("Round Up"));
        assert!(!RuleNormalizer::contains_bengali("राउंडअप"));
    }

    #[test]
    fn test_ids_and_serials() {
        assert_eq!(RuleNormalizer::format_id("KB", 7), "KB-007");
        assert_eq!(RuleNormalizer::format_id("MBL", 1234), "MBL-1234");
        assert_eq!(RuleNormalizer::pad_serial("5"), "005");
        assert_eq!(RuleNormalizer::pad_serial(" 12 "), "012");
        assert_eq!(RuleNormalizer::pad_serial("1234"), "1234");
    }
}

pub mod completeness_report;
pub mod detail_enricher;
pub mod duplicate_grouper;
pub mod id_resequencer;
pub mod kb_converter;
pub mod language_splitter;
pub mod listing_extractor;
pub mod record_classifier;
pub mod rule_normalizer;

pub use completeness_report::*;
pub use detail_enricher::*;
pub use duplicate_grouper::*;
pub use id_resequencer::*;
pub use kb_converter::*;
pub use language_splitter::*;
pub use listing_extractor::*;
pub use record_classifier::*;
pub use rule_normalizer::*;

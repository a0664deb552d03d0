use anyhow::Result;
use catalog_curator::config::CurationConfig;
use catalog_curator::processor::{FieldSet, RecordClassifier};
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = CurationConfig::load_default()?;
    let classifier = RecordClassifier::from_config(&config.classifier, FieldSet::Essential);
    let (source, dest) = (&config.paths.products_dir, &config.paths.active_dir);

    info!(
        "🔍 Checking products in {} against {} essential fields",
        source.display(),
        classifier.required_fields().len()
    );
    println!("Essential fields: {}", classifier.required_fields().join(", "));
    println!("Ignored optional fields: {}", config.classifier.ignored_fields.join(", "));

    let outcome = classifier.classify_directory(source, dest)?;
    outcome.print_report(source, dest);
    Ok(())
}

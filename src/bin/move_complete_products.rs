use anyhow::Result;
use catalog_curator::config::CurationConfig;
use catalog_curator::processor::{FieldSet, RecordClassifier};
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = CurationConfig::load_default()?;
    let classifier = RecordClassifier::from_config(&config.classifier, FieldSet::Complete);
    let (source, dest) = (&config.paths.products_dir, &config.paths.active_dir);

    info!(
        "🔍 Checking products in {} against {} required fields",
        source.display(),
        classifier.required_fields().len()
    );
    println!("Required fields: {}", classifier.required_fields().join(", "));

    let outcome = classifier.classify_directory(source, dest)?;
    outcome.print_report(source, dest);
    Ok(())
}

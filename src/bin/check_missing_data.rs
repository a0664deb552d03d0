use anyhow::Result;
use catalog_curator::config::CurationConfig;
use catalog_curator::processor::CompletenessReport;
use catalog_curator::storage::CatalogStore;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = CurationConfig::load_default()?;
    let records = CatalogStore::load_records(&config.paths.data_file)?;

    CompletenessReport::build(&records, &config.classifier.report_fields).print();
    Ok(())
}

use anyhow::Result;
use catalog_curator::config::CurationConfig;
use catalog_curator::images::{ImageAudit, list_image_files};
use catalog_curator::storage::CatalogStore;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = CurationConfig::load_default()?;
    let records = CatalogStore::load_records(&config.paths.data_file)?;
    let image_files = list_image_files(&config.paths.images_dir)?;

    ImageAudit::run(&records, image_files, &config.images.placeholder_markers).print();
    Ok(())
}

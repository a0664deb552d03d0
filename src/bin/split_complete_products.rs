use anyhow::Result;
use catalog_curator::config::CurationConfig;
use catalog_curator::processor::{FieldSet, RecordClassifier};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = CurationConfig::load_default()?;
    let paths = &config.paths;
    let classifier = RecordClassifier::from_config(&config.classifier, FieldSet::Complete);

    let partition = classifier.partition_file(&paths.data_file, &paths.complete_file, &paths.incomplete_file)?;
    let total = partition.accepted.len() + partition.rejected.len();

    println!("\n{}", "=".repeat(60));
    println!("📊 SPLIT SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Total products: {}", total);
    println!(
        "✅ Complete & active: {} → {}",
        partition.accepted.len(),
        paths.complete_file.display()
    );
    println!(
        "❌ Incomplete/inactive: {} → {}",
        partition.rejected.len(),
        paths.incomplete_file.display()
    );

    if !partition.rejected.is_empty() {
        println!("\nRejected products:");
        for rejected in &partition.rejected {
            let product_id = rejected
                .value
                .get("product_id")
                .and_then(|id| id.as_str())
                .unwrap_or("N/A");
            println!("  • #{} {}: {}", rejected.position + 1, product_id, rejected.reason);
        }
    }
    Ok(())
}

use anyhow::Result;
use catalog_curator::config::CurationConfig;
use catalog_curator::images::ImageResizer;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = CurationConfig::load_default()?;
    let images = &config.images;
    let resizer = ImageResizer::new(images);

    let run = resizer.resize_tree(&images.input_dir, &images.output_dir)?;
    if run.found == 0 {
        println!("No image files found in {}", images.input_dir.display());
        return Ok(());
    }

    println!("\n{}", "=".repeat(60));
    println!("🖼️ RESIZE SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Images found: {}", run.found);
    println!("Resized to {}x{}: {}", images.width, images.height, run.written.len());
    println!("Failed: {}", run.failed.len());
    for (path, reason) in &run.failed {
        println!("   ✗ {}: {}", path.display(), reason);
    }
    println!("Output folder: {}", images.output_dir.display());
    Ok(())
}

use anyhow::{Context, Result, anyhow};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ImageReader, Rgb, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use walkdir::WalkDir;

use crate::config::ImageConfig;
use crate::storage::CatalogStore;

/// Extensions picked up by the resizer, compared case-insensitively
pub const RESIZABLE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

#[derive(Debug, Clone, Default)]
pub struct ResizeRun {
    pub found: usize,
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Resizes every image under a folder to a fixed-size JPEG
pub struct ImageResizer {
    width: u32,
    height: u32,
    quality: u8,
}

impl ImageResizer {
    pub fn new(config: &ImageConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            quality: config.jpeg_quality,
        }
    }

    /// All resizable images below `input_dir`, in walk order
    pub fn find_images(input_dir: &Path) -> Result<Vec<PathBuf>> {
        if !input_dir.is_dir() {
            return Err(anyhow!("Input folder not found: {}", input_dir.display()));
        }

        Ok(WalkDir::new(input_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| {
                        RESIZABLE_EXTENSIONS
                            .iter()
                            .any(|wanted| ext.eq_ignore_ascii_case(wanted))
                    })
            })
            .map(|e| e.into_path())
            .collect())
    }

    /// Decode, flatten onto white, resize and save one image as JPEG
    pub fn resize_file(&self, input: &Path, output: &Path) -> Result<()> {
        let decoded = ImageReader::open(input)
            .with_context(|| format!("Failed to open {}", input.display()))?
            .with_guessed_format()?
            .decode()
            .with_context(|| format!("Failed to decode {}", input.display()))?;
        let flattened = flatten_onto_white(&decoded.to_rgba8());
        let resized = imageops::resize(&flattened, self.width, self.height, FilterType::Lanczos3);

        if let Some(parent) = output.parent() {
            CatalogStore::ensure_dir(parent)?;
        }
        let file = File::create(output).with_context(|| format!("Failed to create {}", output.display()))?;
        let mut writer = BufWriter::new(file);
        JpegEncoder::new_with_quality(&mut writer, self.quality)
            .encode_image(&resized)
            .with_context(|| format!("Failed to encode {}", output.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", output.display()))?;
        Ok(())
    }

    /// Resize every image under `input_dir` into the mirrored path under
    /// `output_dir`, always with a `.jpg` extension. One failure does not stop the batch.
    pub fn resize_tree(&self, input_dir: &Path, output_dir: &Path) -> Result<ResizeRun> {
        let images = Self::find_images(input_dir)?;
        let mut run = ResizeRun {
            found: images.len(),
            ..Default::default()
        };
        if images.is_empty() {
            return Ok(run);
        }
        info!("Found {} image files to process...", images.len());

        for input in images {
            let relative = input.strip_prefix(input_dir).unwrap_or(input.as_path());
            let output = output_dir.join(relative).with_extension("jpg");
            info!("Processing: {}", relative.display());

            match self.resize_file(&input, &output) {
                Ok(()) => {
                    info!("  ✓ Resized and saved to: {}", output.display());
                    run.written.push(output);
                }
                Err(e) => {
                    error!("  ✗ Failed to process {}: {:#}", relative.display(), e);
                    run.failed.push((input, format!("{:#}", e)));
                }
            }
        }

        Ok(run)
    }
}

/// Composite an RGBA image over a white background
fn flatten_onto_white(rgba: &image::RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |channel: u8| -> u8 {
            let alpha = a as u32;
            ((channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}

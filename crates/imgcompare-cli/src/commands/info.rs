use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use image::ImageFormat;
use imgcompare_core::io::image_io::{is_supported_image, load_raster};

#[derive(Args)]
pub struct InfoArgs {
    /// Input image file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let raster = load_raster(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let format = ImageFormat::from_path(&args.file)
        .map(|f| format!("{f:?}"))
        .unwrap_or_else(|_| "unknown".into());
    let bytes = raster.as_rgba().as_raw().len();

    println!("File:        {}", args.file.display());
    println!("Format:      {}", format);
    println!("Dimensions:  {}x{}", raster.width(), raster.height());
    println!("Decoded:     {:.1} MB (RGBA8)", bytes as f64 / (1024.0 * 1024.0));
    if !is_supported_image(&args.file) {
        println!("Note:        extension not offered by the file picker");
    }

    Ok(())
}

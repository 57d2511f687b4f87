use std::path::Path;

use image::ImageFormat;

use crate::consts::SUPPORTED_EXTENSIONS;
use crate::error::{CompareError, Result};
use crate::raster::RasterImage;

/// Decodes an image file into a [`RasterImage`].
///
/// The engine owns one loader and calls it on the caller thread whenever a
/// side's path changes or its file is reported as updated.
pub trait ImageLoader: Send {
    fn load(&self, path: &Path) -> Result<RasterImage>;
}

/// Loader backed by the `image` crate's format detection.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsImageLoader;

impl ImageLoader for FsImageLoader {
    fn load(&self, path: &Path) -> Result<RasterImage> {
        load_raster(path)
    }
}

/// Load any supported image file as RGBA8.
pub fn load_raster(path: &Path) -> Result<RasterImage> {
    let img = image::open(path)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(CompareError::InvalidDimensions {
            width: img.width(),
            height: img.height(),
        });
    }
    Ok(RasterImage::new(img.to_rgba8()))
}

/// Save a raster as PNG, regardless of the path's extension.
pub fn save_png(raster: &RasterImage, path: &Path) -> Result<()> {
    raster.as_rgba().save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save a raster, choosing the format from the file extension.
pub fn save_raster(raster: &RasterImage, path: &Path) -> Result<()> {
    raster.as_rgba().save(path)?;
    Ok(())
}

/// Whether `path` carries one of the extensions offered by file pickers.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

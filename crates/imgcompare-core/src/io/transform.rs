use std::fmt;
use std::path::Path;

use image::DynamicImage;
use tracing::info;

use crate::error::Result;

/// Quarter-turn rotation direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    Left,
    Right,
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rotation::Left => write!(f, "left"),
            Rotation::Right => write!(f, "right"),
        }
    }
}

/// Mirror axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

impl fmt::Display for FlipDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlipDirection::Horizontal => write!(f, "horizontally"),
            FlipDirection::Vertical => write!(f, "vertically"),
        }
    }
}

/// Rotate the image at `path` by 90 degrees and overwrite it.
pub fn rotate_file(path: &Path, rotation: Rotation) -> Result<()> {
    rewrite_file(path, |img| match rotation {
        Rotation::Left => img.rotate270(),
        Rotation::Right => img.rotate90(),
    })?;
    info!(path = %path.display(), %rotation, "Rotated image");
    Ok(())
}

/// Mirror the image at `path` and overwrite it.
pub fn flip_file(path: &Path, direction: FlipDirection) -> Result<()> {
    rewrite_file(path, |img| match direction {
        FlipDirection::Horizontal => img.fliph(),
        FlipDirection::Vertical => img.flipv(),
    })?;
    info!(path = %path.display(), %direction, "Flipped image");
    Ok(())
}

fn rewrite_file(path: &Path, op: impl FnOnce(&DynamicImage) -> DynamicImage) -> Result<()> {
    let img = image::open(path)?;
    let format = image::ImageFormat::from_path(path)?;
    op(&img).save_with_format(path, format)?;
    Ok(())
}

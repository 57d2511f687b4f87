use std::fmt;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::geometry::{Rect, Size};

/// Bytes per RGBA8 pixel.
const CHANNELS: usize = 4;

/// An immutable RGBA8 pixel buffer.
#[derive(Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// A zero-sized image.
    pub fn empty() -> Self {
        Self::new(RgbaImage::new(0, 0))
    }

    /// Image of `size` filled with a single colour.
    pub fn filled(size: Size, rgba: [u8; 4]) -> Self {
        Self::new(RgbaImage::from_pixel(size.width, size.height, Rgba(rgba)))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.pixels
    }

    /// Raw bytes of `width` pixels starting at `(x, y)`.
    ///
    /// The caller guarantees the span lies inside the image.
    pub fn row_span(&self, x: u32, y: u32, width: u32) -> &[u8] {
        let stride = self.width() as usize * CHANNELS;
        let start = y as usize * stride + x as usize * CHANNELS;
        &self.pixels.as_raw()[start..start + width as usize * CHANNELS]
    }

    /// Nearest-neighbour resample to `size`. An empty target yields an empty image.
    pub fn resized(&self, size: Size) -> RasterImage {
        if size.is_empty() || self.is_empty() {
            return RasterImage::empty();
        }
        if size == self.size() {
            return self.clone();
        }
        RasterImage::new(imageops::resize(
            &self.pixels,
            size.width,
            size.height,
            FilterType::Nearest,
        ))
    }

    /// Copy of the region `rect`, clipped to the image bounds.
    pub fn cropped(&self, rect: Rect) -> RasterImage {
        let clipped = rect.clipped_to(self.size());
        if clipped.is_empty() {
            return RasterImage::empty();
        }
        RasterImage::new(
            imageops::crop_imm(
                &self.pixels,
                clipped.x,
                clipped.y,
                clipped.width,
                clipped.height,
            )
            .to_image(),
        )
    }
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl From<RgbaImage> for RasterImage {
    fn from(pixels: RgbaImage) -> Self {
        Self::new(pixels)
    }
}

use serde::{Deserialize, Serialize};

use crate::consts::MAX_SCALED_PIXELS;

/// Integer width/height pair in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0,
        height: 0,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Component-wise maximum, used for composite sizes.
    pub fn max(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin covering `size`.
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clip to the bounds `[0, bounds)`. The origin is kept; width and height shrink.
    pub fn clipped_to(&self, bounds: Size) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.width.min(bounds.width.saturating_sub(self.x)),
            self.height.min(bounds.height.saturating_sub(self.y)),
        )
    }
}

/// Pan offset of the composite relative to the viewport centre.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pan {
    pub x: f64,
    pub y: f64,
}

impl Pan {
    pub const ZERO: Pan = Pan { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Snapshot of the view parameters a geometry pass is computed against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewParams {
    pub zoom: f64,
    pub pan: Pan,
    pub viewport: Size,
}

/// Geometry of one surface under a given [`ViewParams`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceGeometry {
    pub scaled: Size,
    pub source_rect: Rect,
    pub target_rect: Rect,
}

/// Size of a `source` image resampled by `zoom`.
///
/// Both axes truncate toward zero, so repeated calls are bit-identical.
pub fn scaled_size(source: Size, zoom: f64) -> Size {
    Size::new(scale_dimension(source.width, zoom), scale_dimension(source.height, zoom))
}

/// Whether an image of `size` fits the [`MAX_SCALED_PIXELS`] budget.
pub fn within_pixel_budget(size: Size) -> bool {
    size.width as u64 * size.height as u64 <= MAX_SCALED_PIXELS
}

fn scale_dimension(dimension: u32, zoom: f64) -> u32 {
    // `as` saturates: negative/NaN products become 0, overflow becomes u32::MAX.
    (dimension as f64 * zoom) as u32
}

/// Visible window of the scaled image: centred on the viewport, shifted by
/// `pan`, never extending before the image origin.
pub fn source_rect(scaled: Size, viewport: Size, pan: Pan) -> Rect {
    let x = (scaled.width as f64 / 2.0 - viewport.width as f64 / 2.0 - pan.x).max(0.0);
    let y = (scaled.height as f64 / 2.0 - viewport.height as f64 / 2.0 - pan.y).max(0.0);
    Rect::new(
        x as u32,
        y as u32,
        viewport.width.min(scaled.width),
        viewport.height.min(scaled.height),
    )
}

/// Placement of the visible window inside the viewport, centring images
/// smaller than the viewport.
pub fn target_rect(scaled: Size, viewport: Size) -> Rect {
    let x = (viewport.width as f64 / 2.0 - scaled.width as f64 / 2.0).max(0.0);
    let y = (viewport.height as f64 / 2.0 - scaled.height as f64 / 2.0).max(0.0);
    Rect::new(
        x as u32,
        y as u32,
        viewport.width.min(scaled.width),
        viewport.height.min(scaled.height),
    )
}

/// Part of `target` actually covered by image pixels.
///
/// Near the edge of a smaller image the visible window can run past it while
/// the pan is clamped against the larger composite; the uncovered remainder
/// shows the background instead of stretching the image.
pub fn drawn_rect(source: Rect, target: Rect, image: Size) -> Rect {
    let clipped = source.clipped_to(image);
    Rect::new(
        target.x,
        target.y,
        target.width.min(clipped.width),
        target.height.min(clipped.height),
    )
}

/// Geometry for a surface whose scaled size is already known.
pub fn rects_for(scaled: Size, params: &ViewParams) -> SurfaceGeometry {
    if scaled.is_empty() {
        return empty_geometry(params.viewport);
    }
    SurfaceGeometry {
        scaled,
        source_rect: source_rect(scaled, params.viewport, params.pan),
        target_rect: target_rect(scaled, params.viewport),
    }
}

/// Full geometry for a source image of size `source` (zero when absent).
pub fn surface_geometry(source: Size, params: &ViewParams) -> SurfaceGeometry {
    if source.is_empty() {
        return empty_geometry(params.viewport);
    }
    rects_for(scaled_size(source, params.zoom), params)
}

/// An absent image shows nothing and lets the background fill the viewport.
fn empty_geometry(viewport: Size) -> SurfaceGeometry {
    SurfaceGeometry {
        scaled: Size::ZERO,
        source_rect: Rect::ZERO,
        target_rect: Rect::from_size(viewport),
    }
}

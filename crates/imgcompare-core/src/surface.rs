use std::sync::Arc;

use tracing::{debug, warn};

use crate::geometry::{rects_for, scaled_size, within_pixel_budget, Rect, Size, ViewParams};
use crate::raster::RasterImage;

/// One side of the comparison: its decoded source, the zoom-scaled copy the
/// renderer draws from, and the rects of the last completed geometry pass.
///
/// Rects may lag behind the engine's zoom/pan/viewport until the next pass
/// completes. Images are shared, so cloning a surface for the worker is cheap.
#[derive(Clone, Debug)]
pub struct ImageSurface {
    source: Option<Arc<RasterImage>>,
    scaled: Option<Arc<RasterImage>>,
    /// Zoom the current `scaled` image was produced with.
    scaled_zoom: Option<f64>,
    source_rect: Rect,
    target_rect: Rect,
}

impl Default for ImageSurface {
    fn default() -> Self {
        Self {
            source: None,
            scaled: None,
            scaled_zoom: None,
            source_rect: Rect::ZERO,
            target_rect: Rect::ZERO,
        }
    }
}

impl ImageSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface holding `source`, not yet scaled.
    pub fn with_source(source: Option<Arc<RasterImage>>) -> Self {
        let mut surface = Self::new();
        surface.set_source(source);
        surface
    }

    /// Replace the source image. The scaled copy and rects are reset until
    /// the next [`rescale`](Self::rescale).
    pub fn set_source(&mut self, source: Option<Arc<RasterImage>>) {
        self.source = source.filter(|img| !img.is_empty());
        self.scaled = None;
        self.scaled_zoom = None;
        self.source_rect = Rect::ZERO;
        self.target_rect = Rect::ZERO;
    }

    /// Resample the source by `params.zoom` and recompute both rects.
    ///
    /// A scaled copy already produced at the same zoom is reused. A zoom whose
    /// result would exceed [`MAX_SCALED_PIXELS`](crate::consts::MAX_SCALED_PIXELS)
    /// leaves the surface without a scaled image.
    pub fn rescale(&mut self, params: &ViewParams) {
        match &self.source {
            Some(source) => {
                let reusable = self.scaled.is_some() && self.scaled_zoom == Some(params.zoom);
                if !reusable {
                    let size = scaled_size(source.size(), params.zoom);
                    debug!(
                        from = ?source.size(),
                        to = ?size,
                        zoom = params.zoom,
                        "Resampling surface"
                    );
                    if within_pixel_budget(size) {
                        let scaled = source.resized(size);
                        self.scaled = (!scaled.is_empty()).then(|| Arc::new(scaled));
                    } else {
                        warn!(
                            to = ?size,
                            zoom = params.zoom,
                            "Scaled image exceeds the pixel budget, not resampling"
                        );
                        self.scaled = None;
                    }
                    self.scaled_zoom = Some(params.zoom);
                }
            }
            None => {
                self.scaled = None;
                self.scaled_zoom = None;
            }
        }
        self.recompute_rects(params);
    }

    /// Recompute source/target rects for a new pan or viewport, leaving the
    /// scaled image untouched.
    pub fn recompute_rects(&mut self, params: &ViewParams) {
        let geometry = rects_for(self.scaled_size(), params);
        self.source_rect = geometry.source_rect;
        self.target_rect = geometry.target_rect;
    }

    pub fn source(&self) -> Option<&Arc<RasterImage>> {
        self.source.as_ref()
    }

    pub fn scaled(&self) -> Option<&Arc<RasterImage>> {
        self.scaled.as_ref()
    }

    pub fn source_rect(&self) -> Rect {
        self.source_rect
    }

    pub fn target_rect(&self) -> Rect {
        self.target_rect
    }

    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    pub fn source_size(&self) -> Size {
        self.source.as_ref().map_or(Size::ZERO, |img| img.size())
    }

    pub fn scaled_size(&self) -> Size {
        self.scaled.as_ref().map_or(Size::ZERO, |img| img.size())
    }
}

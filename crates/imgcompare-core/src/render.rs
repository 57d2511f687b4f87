use std::sync::Arc;

use image::RgbaImage;
use rayon::prelude::*;

use crate::consts::{COMPOSITE_BACKGROUND_RGBA, OVERLAY_MATCH_RGBA, OVERLAY_NO_MATCH_RGBA};
use crate::engine::CompositorEngine;
use crate::geometry::{drawn_rect, Rect, Size};
use crate::operation::{MatchState, Side};
use crate::raster::RasterImage;

/// What a renderer needs to draw one side: the `source_rect` region of
/// `image` goes into `target_rect` of the viewport at `opacity`.
#[derive(Clone, Debug)]
pub struct RenderLayer {
    pub image: Option<Arc<RasterImage>>,
    pub source_rect: Rect,
    pub target_rect: Rect,
    pub opacity: f32,
}

impl RenderLayer {
    /// Viewport region this layer paints, see [`drawn_rect`].
    pub fn drawn_rect(&self) -> Rect {
        self.image.as_ref().map_or(Rect::ZERO, |image| {
            drawn_rect(self.source_rect, self.target_rect, image.size())
        })
    }
}

/// Everything needed to paint the composite viewport once.
#[derive(Clone, Debug)]
pub struct RenderFrame {
    pub viewport: Size,
    pub left: RenderLayer,
    pub right: RenderLayer,
    /// Drawn over the whole viewport after both layers.
    pub overlay: [u8; 4],
    pub background: [u8; 4],
}

/// Translucent green for a match, translucent red otherwise.
pub fn overlay_color(state: MatchState) -> [u8; 4] {
    if state.is_match() {
        OVERLAY_MATCH_RGBA
    } else {
        OVERLAY_NO_MATCH_RGBA
    }
}

impl RenderFrame {
    /// Snapshot the engine's last applied surfaces.
    pub fn capture(engine: &CompositorEngine, opacity_left: f32, opacity_right: f32) -> Self {
        let layer = |side: Side, opacity: f32| {
            let surface = engine.surface(side);
            RenderLayer {
                image: surface.scaled().cloned(),
                source_rect: surface.source_rect(),
                target_rect: surface.target_rect(),
                opacity: opacity.clamp(0.0, 1.0),
            }
        };
        Self {
            viewport: engine.viewport(),
            left: layer(Side::Left, opacity_left),
            right: layer(Side::Right, opacity_right),
            overlay: overlay_color(engine.match_state()),
            background: COMPOSITE_BACKGROUND_RGBA,
        }
    }
}

/// Paint `frame` in software: background, left layer, right layer, overlay.
pub fn compose(frame: &RenderFrame) -> RasterImage {
    let Size { width, height } = frame.viewport;
    let mut out = RgbaImage::new(width, height);
    if frame.viewport.is_empty() {
        return RasterImage::new(out);
    }

    let stride = width as usize * 4;
    let buf: &mut [u8] = &mut out;
    buf.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as u32;
            for px in row.chunks_exact_mut(4) {
                px.copy_from_slice(&frame.background);
            }
            for layer in [&frame.left, &frame.right] {
                draw_layer_row(row, y, layer);
            }
            for px in row.chunks_exact_mut(4) {
                blend(px, frame.overlay, 1.0);
            }
        });

    RasterImage::new(out)
}

fn draw_layer_row(row: &mut [u8], y: u32, layer: &RenderLayer) {
    let Some(image) = &layer.image else {
        return;
    };
    if layer.opacity <= 0.0 {
        return;
    }
    let drawn = layer.drawn_rect();
    if y < drawn.y || y >= drawn.y + drawn.height {
        return;
    }
    let src_y = layer.source_rect.y + (y - drawn.y);

    let viewport_width = (row.len() / 4) as u32;
    let width = drawn.width.min(viewport_width.saturating_sub(drawn.x));
    for dx in 0..width {
        let src = image.pixel(layer.source_rect.x + dx, src_y);
        let offset = (drawn.x + dx) as usize * 4;
        blend(&mut row[offset..offset + 4], src, layer.opacity);
    }
}

/// Straight-alpha "source over" of `src` at `opacity` onto `dst`.
fn blend(dst: &mut [u8], src: [u8; 4], opacity: f32) {
    let sa = src[3] as f32 / 255.0 * opacity;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for c in 0..3 {
        let value = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        dst[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

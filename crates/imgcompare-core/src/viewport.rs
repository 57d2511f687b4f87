//! Zoom ladder, zoom-to-fit and pan clamping.
//!
//! [`ViewportController`] sits between the input layer and the
//! [`CompositorEngine`]: it turns button presses, drags and wheel deltas into
//! validated zoom/pan values and pushes them into the engine.

use tracing::debug;

use crate::consts::{
    DEFAULT_OPACITY_LEFT, DEFAULT_OPACITY_RIGHT, DEFAULT_ZOOM_LEVEL_INDEX, MAX_ZOOM_LEVEL_INDEX,
    WHEEL_PAN_STEP, ZOOM_LEVELS,
};
use crate::engine::{CompositorEngine, CompositorEvent};
use crate::geometry::{scaled_size, Pan, Size};
use crate::operation::Side;
use crate::settings::Settings;

/// Largest pan offset along one axis: `max(composite/2 - viewport/2, 0)`.
pub fn pan_bound(composite: u32, viewport: u32) -> f64 {
    (composite as f64 / 2.0 - viewport as f64 / 2.0).max(0.0)
}

/// Clamp each axis of `pan` to `[-bound, bound]` for that axis.
pub fn clamp_pan(pan: Pan, composite: Size, viewport: Size) -> Pan {
    let bx = pan_bound(composite.width, viewport.width);
    let by = pan_bound(composite.height, viewport.height);
    Pan::new(pan.x.clamp(-bx, bx), pan.y.clamp(-by, by))
}

/// Zoom at which `source_composite` exactly fits `viewport` on its limiting axis.
///
/// `None` when either size has a zero dimension.
pub fn fit_zoom(viewport: Size, source_composite: Size) -> Option<f64> {
    if viewport.is_empty() || source_composite.is_empty() {
        return None;
    }
    let width_ratio = source_composite.width as f64 / viewport.width as f64;
    let height_ratio = source_composite.height as f64 / viewport.height as f64;
    Some(1.0 / width_ratio.max(height_ratio))
}

/// First ladder index whose level is at least `zoom`, or the top of the ladder.
pub fn ladder_index_at_or_above(zoom: f64) -> usize {
    ZOOM_LEVELS
        .iter()
        .position(|&level| level >= zoom)
        .unwrap_or(MAX_ZOOM_LEVEL_INDEX)
}

/// Last ladder index whose level is at most `zoom`, or the bottom of the ladder.
pub fn ladder_index_at_or_below(zoom: f64) -> usize {
    ZOOM_LEVELS
        .iter()
        .rposition(|&level| level <= zoom)
        .unwrap_or(0)
}

#[derive(Clone, Copy, Debug)]
struct Drag {
    press: (f64, f64),
    pan_at_press: Pan,
}

/// Owns the user-facing view state and drives the engine's zoom and pan.
#[derive(Clone, Debug)]
pub struct ViewportController {
    zoom_level_index: usize,
    zoom_fit: bool,
    zoom: f64,
    pan: Pan,
    previous_zoom: f64,
    previous_pan: Pan,
    drag: Option<Drag>,
    opacity_left: f32,
    opacity_right: f32,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportController {
    pub fn new() -> Self {
        let zoom = ZOOM_LEVELS[DEFAULT_ZOOM_LEVEL_INDEX];
        Self {
            zoom_level_index: DEFAULT_ZOOM_LEVEL_INDEX,
            zoom_fit: false,
            zoom,
            pan: Pan::ZERO,
            previous_zoom: zoom,
            previous_pan: Pan::ZERO,
            drag: None,
            opacity_left: DEFAULT_OPACITY_LEFT,
            opacity_right: DEFAULT_OPACITY_RIGHT,
        }
    }

    /// Restore ladder index, pan and opacities from `settings`.
    ///
    /// The pan is clamped the first time it is pushed into an engine.
    pub fn from_settings(settings: &Settings) -> Self {
        let settings = settings.sanitized();
        let zoom = ZOOM_LEVELS[settings.zoom_level_index];
        Self {
            zoom_level_index: settings.zoom_level_index,
            zoom,
            pan: settings.pan(),
            previous_zoom: zoom,
            previous_pan: settings.pan(),
            opacity_left: settings.opacity_left,
            opacity_right: settings.opacity_right,
            ..Self::new()
        }
    }

    /// Write the view state back into `settings`.
    pub fn store_settings(&self, settings: &mut Settings) {
        settings.zoom_level_index = self.zoom_level_index;
        settings.pan_x = self.pan.x;
        settings.pan_y = self.pan.y;
        settings.opacity_left = self.opacity_left;
        settings.opacity_right = self.opacity_right;
    }

    // ------------------------------------------------------------------
    // Zoom
    // ------------------------------------------------------------------

    /// One ladder step up. Leaving zoom-fit lands on the first level above
    /// the fitted zoom.
    pub fn zoom_in(&mut self, engine: &mut CompositorEngine) {
        let index = if self.zoom_fit {
            let index = ladder_index_at_or_above(self.zoom);
            if ZOOM_LEVELS[index] > self.zoom {
                index
            } else {
                index + 1
            }
        } else {
            self.zoom_level_index + 1
        };
        self.set_zoom_level_index(index, engine);
    }

    /// One ladder step down. Leaving zoom-fit lands on the first level below
    /// the fitted zoom.
    pub fn zoom_out(&mut self, engine: &mut CompositorEngine) {
        let index = if self.zoom_fit {
            let index = ladder_index_at_or_below(self.zoom);
            if ZOOM_LEVELS[index] < self.zoom {
                index
            } else {
                index.saturating_sub(1)
            }
        } else {
            self.zoom_level_index.saturating_sub(1)
        };
        self.set_zoom_level_index(index, engine);
    }

    pub fn zoom_default(&mut self, engine: &mut CompositorEngine) {
        self.set_zoom_level_index(DEFAULT_ZOOM_LEVEL_INDEX, engine);
    }

    /// Select a ladder level directly, leaving zoom-fit mode.
    pub fn set_zoom_level_index(&mut self, index: usize, engine: &mut CompositorEngine) {
        self.zoom_fit = false;
        self.zoom_level_index = index.min(MAX_ZOOM_LEVEL_INDEX);
        self.apply_zoom(ZOOM_LEVELS[self.zoom_level_index], engine);
    }

    /// Apply an arbitrary zoom outside the ladder. Later ladder steps start
    /// from the highest level not above it.
    pub fn set_zoom(&mut self, zoom: f64, engine: &mut CompositorEngine) {
        if !(zoom.is_finite() && zoom > 0.0) {
            return;
        }
        self.zoom_fit = false;
        self.zoom_level_index = ladder_index_at_or_below(zoom);
        self.apply_zoom(zoom, engine);
    }

    /// Fit the whole source composite into the viewport and centre it.
    ///
    /// No-op while no image is loaded or the viewport is empty.
    pub fn zoom_to_fit(&mut self, engine: &mut CompositorEngine) {
        let Some(zoom) = fit_zoom(engine.viewport(), engine.source_composite_size()) else {
            return;
        };
        debug!(zoom, "Zoom to fit");
        self.zoom_fit = true;
        self.apply_zoom(zoom, engine);
        self.set_pan(Pan::ZERO, engine);
    }

    fn apply_zoom(&mut self, zoom: f64, engine: &mut CompositorEngine) {
        if zoom != self.zoom {
            self.previous_zoom = self.zoom;
            self.previous_pan = self.pan;
            self.zoom = zoom;
            if zoom < self.previous_zoom {
                // The bounds shrink: pull the previous offset back inside them.
                self.pan = clamp_pan(self.previous_pan, self.composite(engine), engine.viewport());
            }
        }
        engine.set_zoom(self.zoom);
        engine.set_pan(self.pan);
    }

    // ------------------------------------------------------------------
    // Pan
    // ------------------------------------------------------------------

    /// Clamp `pan` to the current bounds and push it into the engine.
    pub fn set_pan(&mut self, pan: Pan, engine: &mut CompositorEngine) {
        self.pan = clamp_pan(pan, self.composite(engine), engine.viewport());
        engine.set_pan(self.pan);
    }

    /// Pointer pressed at `pos`.
    pub fn pan_start(&mut self, pos: (f64, f64)) {
        self.drag = Some(Drag {
            press: pos,
            pan_at_press: self.pan,
        });
    }

    /// Pointer moved to `pos` while pressed.
    pub fn pan_move(&mut self, pos: (f64, f64), engine: &mut CompositorEngine) {
        let Some(drag) = self.drag else {
            return;
        };
        let pan = Pan::new(
            pos.0 - drag.press.0 + drag.pan_at_press.x,
            pos.1 - drag.press.1 + drag.pan_at_press.y,
        );
        self.set_pan(pan, engine);
    }

    pub fn pan_finish(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Wheel input. With the zoom modifier held the vertical delta steps the
    /// ladder; otherwise each axis pans by a fixed step.
    pub fn scroll(&mut self, delta: (f64, f64), zoom_modifier: bool, engine: &mut CompositorEngine) {
        if zoom_modifier {
            if delta.1 > 0.0 {
                self.zoom_in(engine);
            } else if delta.1 < 0.0 {
                self.zoom_out(engine);
            }
            return;
        }
        let step = |d: f64| {
            if d > 0.0 {
                WHEEL_PAN_STEP
            } else if d < 0.0 {
                -WHEEL_PAN_STEP
            } else {
                0.0
            }
        };
        let (dx, dy) = (step(delta.0), step(delta.1));
        if dx != 0.0 || dy != 0.0 {
            self.set_pan(Pan::new(self.pan.x + dx, self.pan.y + dy), engine);
        }
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Centre the view, return to the default zoom and restore opacities.
    pub fn reset(&mut self, engine: &mut CompositorEngine) {
        debug!("Reset view");
        self.set_pan(Pan::ZERO, engine);
        self.zoom_default(engine);
        self.opacity_left = DEFAULT_OPACITY_LEFT;
        self.opacity_right = DEFAULT_OPACITY_RIGHT;
    }

    /// Push the current zoom and pan into `engine`, e.g. after a source loads.
    pub fn sync(&mut self, engine: &mut CompositorEngine) {
        if self.zoom_fit {
            if let Some(zoom) = fit_zoom(engine.viewport(), engine.source_composite_size()) {
                self.zoom = zoom;
            }
        }
        engine.set_zoom(self.zoom);
        self.set_pan(self.pan, engine);
    }

    /// Resize the engine's viewport, refitting in zoom-fit mode.
    pub fn resize_viewport(&mut self, viewport: Size, engine: &mut CompositorEngine) {
        if viewport == engine.viewport() {
            return;
        }
        engine.resize_viewport(viewport);
        if self.zoom_fit {
            self.zoom_fit = false;
            self.zoom_to_fit(engine);
        } else {
            self.set_pan(self.pan, engine);
        }
    }

    /// React to an engine notification.
    pub fn handle_event(&mut self, event: &CompositorEvent, engine: &mut CompositorEngine) {
        match event {
            CompositorEvent::SourceChanged { .. } => self.sync(engine),
            // Bounds moved: keep the pan inside them.
            CompositorEvent::CompositeSizeChanged { .. } => self.set_pan(self.pan, engine),
            _ => {}
        }
    }

    /// Composite size at the controller's zoom.
    ///
    /// Truncation is monotone, so this equals the max of both scaled sizes
    /// even before the engine has applied the new zoom.
    fn composite(&self, engine: &CompositorEngine) -> Size {
        scaled_size(engine.source_composite_size(), self.zoom)
    }

    // ------------------------------------------------------------------
    // Opacity
    // ------------------------------------------------------------------

    pub fn opacity(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.opacity_left,
            Side::Right => self.opacity_right,
        }
    }

    /// Set a layer's opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, side: Side, opacity: f32) {
        let opacity = if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) };
        match side {
            Side::Left => self.opacity_left = opacity,
            Side::Right => self.opacity_right = opacity,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn zoom_level_index(&self) -> usize {
        self.zoom_level_index
    }

    pub fn is_zoom_fit(&self) -> bool {
        self.zoom_fit
    }

    pub fn pan(&self) -> Pan {
        self.pan
    }

    pub fn previous_zoom(&self) -> f64 {
        self.previous_zoom
    }

    pub fn previous_pan(&self) -> Pan {
        self.previous_pan
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom_fit || self.zoom_level_index < MAX_ZOOM_LEVEL_INDEX
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom_fit || self.zoom_level_index > 0
    }
}

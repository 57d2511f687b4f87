use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::consts::{DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_COMPARE_THRESHOLD, MAX_COMPARE_THRESHOLD};
use crate::error::{CompareError, Result};
use crate::geometry::{Pan, Size, ViewParams};
use crate::io::image_io::{FsImageLoader, ImageLoader};
use crate::operation::{MatchState, OperationKind, Side, Status};
use crate::scheduler::{Completion, OperationScheduler, Outcome, WakeFn};
use crate::settings::Settings;
use crate::surface::ImageSurface;

/// State change notifications, sent to every subscriber right after the
/// mutation commits.
#[derive(Clone, Debug, PartialEq)]
pub enum CompositorEvent {
    SourceChanged { side: Side, path: Option<PathBuf> },
    MatchChanged(MatchState),
    StatusChanged(Status),
    OperationChanged(OperationKind),
    ZoomChanged(f64),
    PanChanged(Pan),
    ThresholdChanged(f64),
    /// `source` is the max of both source sizes, `scaled` the max of both scaled sizes.
    CompositeSizeChanged { source: Size, scaled: Size },
    /// New surfaces are ready to be drawn.
    SurfacesUpdated,
}

/// Owns both sides of a comparison and keeps their geometry and match state
/// up to date as zoom, pan, viewport and sources change.
///
/// All work runs on the scheduler's worker; results are applied on the
/// caller's thread by [`poll`](Self::poll) or [`wait_idle`](Self::wait_idle).
pub struct CompositorEngine {
    loader: Box<dyn ImageLoader>,
    left: ImageSurface,
    right: ImageSurface,
    left_path: Option<PathBuf>,
    right_path: Option<PathBuf>,
    zoom: f64,
    pan: Pan,
    viewport: Size,
    threshold: f64,
    match_state: MatchState,
    status: Status,
    operation: OperationKind,
    /// Geometry work abandoned by a timeout or worker failure, redone with
    /// the next dispatch.
    deferred: OperationKind,
    busy_timeout: Duration,
    scheduler: OperationScheduler,
    subscribers: Vec<mpsc::Sender<CompositorEvent>>,
    source_composite: Size,
    composite: Size,
}

impl CompositorEngine {
    /// Engine decoding files with the `image` crate.
    pub fn new(viewport: Size) -> Self {
        Self::with_loader(viewport, Box::new(FsImageLoader))
    }

    pub fn with_loader(viewport: Size, loader: Box<dyn ImageLoader>) -> Self {
        Self {
            loader,
            left: ImageSurface::new(),
            right: ImageSurface::new(),
            left_path: None,
            right_path: None,
            zoom: 1.0,
            pan: Pan::ZERO,
            viewport,
            threshold: DEFAULT_COMPARE_THRESHOLD,
            match_state: MatchState::Unknown,
            status: Status::Idle,
            operation: OperationKind::NoOp,
            deferred: OperationKind::NoOp,
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
            scheduler: OperationScheduler::new(),
            subscribers: Vec::new(),
            source_composite: Size::ZERO,
            composite: Size::ZERO,
        }
    }

    /// Apply the engine-related parts of `settings` (threshold, busy timeout).
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_threshold(settings.threshold);
        self.busy_timeout = settings.busy_timeout();
    }

    /// Receive [`CompositorEvent`]s from now on.
    pub fn subscribe(&mut self) -> mpsc::Receiver<CompositorEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Callback the worker runs whenever a completion is ready, e.g. a repaint request.
    pub fn set_wake(&mut self, wake: WakeFn) {
        self.scheduler.set_wake(wake);
    }

    pub fn set_busy_timeout(&mut self, timeout: Duration) {
        self.busy_timeout = timeout;
    }

    // ------------------------------------------------------------------
    // Sources
    // ------------------------------------------------------------------

    pub fn set_left_source(&mut self, path: impl AsRef<Path>) {
        self.set_source(Side::Left, path);
    }

    pub fn set_right_source(&mut self, path: impl AsRef<Path>) {
        self.set_source(Side::Right, path);
    }

    /// Load `path` into `side` and rescale it. No-op for an empty path or the
    /// path already shown on that side.
    pub fn set_source(&mut self, side: Side, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if path.as_os_str().is_empty() || self.path(side) == Some(path) {
            return;
        }
        info!(%side, path = %path.display(), "Setting source");
        *self.path_mut(side) = Some(path.to_path_buf());
        self.emit(CompositorEvent::SourceChanged {
            side,
            path: Some(path.to_path_buf()),
        });
        self.load_side(side);
    }

    /// Re-decode the file currently shown on `side`.
    pub fn reload_source(&mut self, side: Side) {
        if self.path(side).is_none() {
            return;
        }
        self.load_side(side);
    }

    /// React to an external change of the file at `path` (rotate, flip, overwrite).
    pub fn file_updated(&mut self, path: &Path) {
        for side in Side::BOTH {
            if self.path(side) == Some(path) {
                debug!(%side, path = %path.display(), "File updated, reloading");
                self.reload_source(side);
            }
        }
    }

    /// Remove the image shown on `side`.
    pub fn clear_source(&mut self, side: Side) {
        if self.path(side).is_none() && !self.surface(side).is_loaded() {
            return;
        }
        *self.path_mut(side) = None;
        *self.surface_mut(side) = ImageSurface::new();
        self.emit(CompositorEvent::SourceChanged { side, path: None });
        self.set_match(MatchState::Unknown);
        self.notify_composite_sizes();

        if self.any_loaded() {
            self.dispatch(OperationKind::ScaleOneSide(side));
        } else {
            self.scheduler.cancel();
            self.deferred = OperationKind::NoOp;
            self.set_operation(OperationKind::NoOp);
            self.set_status(Status::Idle);
            self.emit(CompositorEvent::SurfacesUpdated);
        }
    }

    fn load_side(&mut self, side: Side) {
        let Some(path) = self.path(side).map(Path::to_path_buf) else {
            return;
        };
        let image = match self.loader.load(&path) {
            Ok(image) if image.is_empty() => {
                warn!(%side, path = %path.display(), "Decoded image is empty");
                None
            }
            Ok(image) => {
                info!(%side, width = image.width(), height = image.height(), "Loaded image");
                Some(Arc::new(image))
            }
            Err(e) => {
                warn!(%side, path = %path.display(), "Failed to load image: {e}");
                None
            }
        };

        *self.surface_mut(side) = ImageSurface::with_source(image);
        self.set_match(MatchState::NoMatch);
        self.notify_composite_sizes();
        self.dispatch(OperationKind::ScaleOneSide(side));
    }

    // ------------------------------------------------------------------
    // View parameters
    // ------------------------------------------------------------------

    /// Rescale both sides to `zoom`. Ignored unless `zoom > 0` and a side is loaded.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !(zoom.is_finite() && zoom > 0.0) || !self.any_loaded() || zoom == self.zoom {
            return;
        }
        info!("Zoom level {:.0}%", zoom * 100.0);
        self.zoom = zoom;
        self.emit(CompositorEvent::ZoomChanged(zoom));
        self.set_match(MatchState::NoMatch);
        self.dispatch(OperationKind::ScaleBothSides);
    }

    /// Move the visible window. Ignored unless a side is loaded.
    pub fn set_pan(&mut self, pan: Pan) {
        if !self.any_loaded() || pan == self.pan {
            return;
        }
        self.pan = pan;
        self.emit(CompositorEvent::PanChanged(pan));
        self.set_match(MatchState::NoMatch);
        self.dispatch(OperationKind::UpdateRectsOnly);
    }

    /// Record a new viewport size and recompute rects if anything is shown.
    pub fn resize_viewport(&mut self, viewport: Size) {
        if viewport == self.viewport {
            return;
        }
        debug!(?viewport, "Viewport resized");
        self.viewport = viewport;
        if self.any_loaded() {
            self.dispatch(OperationKind::UpdateRectsOnly);
        }
    }

    /// Store the compare threshold, clamped to `[0, MAX_COMPARE_THRESHOLD]`.
    ///
    /// The comparison itself is exact and does not read it.
    pub fn set_threshold(&mut self, threshold: f64) {
        let threshold = if threshold.is_nan() {
            DEFAULT_COMPARE_THRESHOLD
        } else {
            threshold.clamp(0.0, MAX_COMPARE_THRESHOLD)
        };
        if threshold != self.threshold {
            debug!(threshold, "Threshold changed");
            self.threshold = threshold;
            self.emit(CompositorEvent::ThresholdChanged(threshold));
        }
    }

    // ------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------

    fn dispatch(&mut self, kind: OperationKind) {
        // A geometry operation replaced before it was applied still has to
        // happen; fold it into the replacement.
        let kind = if self.status == Status::Busy {
            self.operation.merge(kind)
        } else {
            kind
        };
        let kind = std::mem::take(&mut self.deferred).merge(kind);

        self.set_operation(kind);
        self.set_status(Status::Busy);

        let params = self.view_params();
        if let Err(e) = self
            .scheduler
            .dispatch(kind, params, self.left.clone(), self.right.clone())
        {
            warn!("Failed to dispatch {kind}: {e}");
            self.defer(kind);
            self.set_match(MatchState::Unknown);
            self.set_operation(OperationKind::NoOp);
            self.set_status(Status::Idle);
        }
    }

    /// Apply every completion that has arrived. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.scheduler.try_completion() {
            self.handle_completion(completion);
            applied += 1;
        }
        self.check_busy_timeout();
        applied
    }

    /// Drive completions until the engine is idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            self.poll();
            if self.status == Status::Idle {
                return Ok(());
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(CompareError::Timeout(timeout));
            }
            if let Some(completion) = self.scheduler.wait_completion(remaining) {
                self.handle_completion(completion);
            }
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        debug!(kind = %completion.kind, generation = completion.generation, "Operation complete");
        match completion.outcome {
            Outcome::Geometry { left, right } => {
                self.left = left;
                self.right = right;
                self.emit(CompositorEvent::SurfacesUpdated);
                self.notify_composite_sizes();

                // Stay busy: the compare pass belongs to the same change.
                // Assigned directly so no OperationChanged(NoOp) is emitted in between.
                self.operation = OperationKind::NoOp;
                self.dispatch(OperationKind::CompareOnly);
            }
            Outcome::Compared(state) => {
                self.set_match(state);
                self.finish();
            }
            Outcome::Nothing => self.finish(),
            Outcome::Failed(reason) => {
                warn!(kind = %completion.kind, "Operation failed: {reason}");
                self.defer(completion.kind);
                self.set_match(MatchState::Unknown);
                self.finish();
            }
        }
    }

    fn check_busy_timeout(&mut self) {
        if self.status != Status::Busy {
            return;
        }
        let Some((kind, elapsed)) = self.scheduler.outstanding() else {
            return;
        };
        if elapsed > self.busy_timeout {
            warn!(%kind, ?elapsed, "Operation timed out, abandoning");
            self.scheduler.cancel();
            self.defer(kind);
            self.set_match(MatchState::Unknown);
            self.finish();
        }
    }

    fn defer(&mut self, kind: OperationKind) {
        if kind.is_geometry() {
            self.deferred = self.deferred.merge(kind);
        }
    }

    fn finish(&mut self) {
        self.set_operation(OperationKind::NoOp);
        self.set_status(Status::Idle);
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    fn emit(&mut self, event: CompositorEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn set_match(&mut self, state: MatchState) {
        if self.match_state != state {
            self.match_state = state;
            self.emit(CompositorEvent::MatchChanged(state));
        }
    }

    fn set_status(&mut self, status: Status) {
        if self.status != status {
            self.status = status;
            self.emit(CompositorEvent::StatusChanged(status));
        }
    }

    fn set_operation(&mut self, operation: OperationKind) {
        if self.operation != operation {
            self.operation = operation;
            self.emit(CompositorEvent::OperationChanged(operation));
        }
    }

    fn notify_composite_sizes(&mut self) {
        let source = self.left.source_size().max(self.right.source_size());
        let scaled = self.left.scaled_size().max(self.right.scaled_size());
        if source != self.source_composite || scaled != self.composite {
            self.source_composite = source;
            self.composite = scaled;
            self.emit(CompositorEvent::CompositeSizeChanged { source, scaled });
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn view_params(&self) -> ViewParams {
        ViewParams {
            zoom: self.zoom,
            pan: self.pan,
            viewport: self.viewport,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Pan {
        self.pan
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    pub fn match_state(&self) -> MatchState {
        self.match_state
    }

    /// `true` only after a completed comparison found the visible regions identical.
    pub fn matched(&self) -> bool {
        self.match_state.is_match()
    }

    pub fn surface(&self, side: Side) -> &ImageSurface {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn path(&self, side: Side) -> Option<&Path> {
        match side {
            Side::Left => self.left_path.as_deref(),
            Side::Right => self.right_path.as_deref(),
        }
    }

    pub fn is_loaded(&self, side: Side) -> bool {
        self.surface(side).is_loaded()
    }

    /// Whether either side holds a decoded image.
    pub fn any_loaded(&self) -> bool {
        self.left.is_loaded() || self.right.is_loaded()
    }

    /// Max of both source image sizes.
    pub fn source_composite_size(&self) -> Size {
        self.source_composite
    }

    /// Max of both scaled image sizes, as of the last applied geometry pass.
    pub fn composite_size(&self) -> Size {
        self.composite
    }

    fn surface_mut(&mut self, side: Side) -> &mut ImageSurface {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    fn path_mut(&mut self, side: Side) -> &mut Option<PathBuf> {
        match side {
            Side::Left => &mut self.left_path,
            Side::Right => &mut self.right_path,
        }
    }
}

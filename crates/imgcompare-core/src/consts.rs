/// Discrete zoom multipliers selectable by ladder index, ascending.
pub const ZOOM_LEVELS: [f64; 7] = [0.10, 0.25, 0.50, 0.75, 1.00, 2.00, 4.00];

/// Ladder index of the 100% zoom level.
pub const DEFAULT_ZOOM_LEVEL_INDEX: usize = 4;

/// Highest selectable ladder index.
pub const MAX_ZOOM_LEVEL_INDEX: usize = ZOOM_LEVELS.len() - 1;

/// Largest scaled image, in pixels, a surface will allocate (1 GiB of RGBA).
///
/// Continuous zooms (explicit factors, fit on tiny images) can ask for more;
/// such a side is left without a scaled image.
pub const MAX_SCALED_PIXELS: u64 = 1 << 28;

/// Default compare threshold. Stored and persisted, not used by the exact comparison.
pub const DEFAULT_COMPARE_THRESHOLD: f64 = 0.0;

/// Upper bound for the compare threshold.
pub const MAX_COMPARE_THRESHOLD: f64 = 100.0;

pub const DEFAULT_OPACITY_LEFT: f32 = 1.0;

pub const DEFAULT_OPACITY_RIGHT: f32 = 1.0;

/// Pan distance applied per wheel notch when the zoom modifier is not held.
pub const WHEEL_PAN_STEP: f64 = 10.0;

/// Overlay drawn over the composite when the visible regions match (RGBA).
pub const OVERLAY_MATCH_RGBA: [u8; 4] = [0, 200, 0, 50];

/// Overlay drawn over the composite when they do not (or cannot be shown to) match.
pub const OVERLAY_NO_MATCH_RGBA: [u8; 4] = [200, 0, 0, 50];

/// Minimum compared pixel count to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Default time an operation may stay outstanding before it is abandoned.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 30_000;

/// File extensions offered by file pickers.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

/// Name of the worker thread spawned by the operation scheduler.
pub const WORKER_THREAD_NAME: &str = "imgcompare-worker";

/// Colour behind both layers in software composition (opaque black).
pub const COMPOSITE_BACKGROUND_RGBA: [u8; 4] = [0, 0, 0, 255];

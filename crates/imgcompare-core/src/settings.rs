use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{
    DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_COMPARE_THRESHOLD, DEFAULT_OPACITY_LEFT,
    DEFAULT_OPACITY_RIGHT, DEFAULT_ZOOM_LEVEL_INDEX, MAX_COMPARE_THRESHOLD, MAX_ZOOM_LEVEL_INDEX,
};
use crate::error::Result;
use crate::geometry::Pan;

/// Persisted user preferences for a comparison session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Compare tolerance (0..=100). Stored only; comparison is exact.
    pub threshold: f64,
    pub zoom_level_index: usize,
    pub pan_x: f64,
    pub pan_y: f64,
    /// Layer opacity (0.0..=1.0).
    pub opacity_left: f32,
    pub opacity_right: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_file_left: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_file_right: Option<PathBuf>,
    /// How long an operation may stay outstanding before it is abandoned.
    pub busy_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_COMPARE_THRESHOLD,
            zoom_level_index: DEFAULT_ZOOM_LEVEL_INDEX,
            pan_x: 0.0,
            pan_y: 0.0,
            opacity_left: DEFAULT_OPACITY_LEFT,
            opacity_right: DEFAULT_OPACITY_RIGHT,
            last_file_left: None,
            last_file_right: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl Settings {
    /// Read settings from a TOML file. Missing keys take their defaults and
    /// out-of-range values are clamped.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&contents)?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(settings.sanitized())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        debug!(path = %path.display(), "Saved settings");
        Ok(())
    }

    /// Copy with every value clamped into its valid range.
    pub fn sanitized(&self) -> Self {
        let finite_or = |v: f64, default: f64| if v.is_finite() { v } else { default };
        let unit = |v: f32, default: f32| if v.is_nan() { default } else { v.clamp(0.0, 1.0) };
        Self {
            threshold: finite_or(self.threshold, DEFAULT_COMPARE_THRESHOLD)
                .clamp(0.0, MAX_COMPARE_THRESHOLD),
            zoom_level_index: self.zoom_level_index.min(MAX_ZOOM_LEVEL_INDEX),
            pan_x: finite_or(self.pan_x, 0.0),
            pan_y: finite_or(self.pan_y, 0.0),
            opacity_left: unit(self.opacity_left, DEFAULT_OPACITY_LEFT),
            opacity_right: unit(self.opacity_right, DEFAULT_OPACITY_RIGHT),
            last_file_left: self.last_file_left.clone(),
            last_file_right: self.last_file_right.clone(),
            busy_timeout_ms: self.busy_timeout_ms.max(1),
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms.max(1))
    }

    pub fn pan(&self) -> Pan {
        Pan::new(self.pan_x, self.pan_y)
    }
}

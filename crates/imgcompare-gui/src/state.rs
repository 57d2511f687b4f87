use std::path::PathBuf;

use imgcompare_core::geometry::Rect;

/// Settings file used when no other location is chosen.
pub const SETTINGS_FILE: &str = "imgcompare.toml";

const MAX_LOG_LINES: usize = 200;

#[derive(Default)]
pub struct UIState {
    pub log_messages: Vec<String>,
}

impl UIState {
    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_LINES {
            let excess = self.log_messages.len() - MAX_LOG_LINES;
            self.log_messages.drain(..excess);
        }
    }
}

/// Uploaded crop of one side's scaled image and where it is drawn.
pub struct LayerTexture {
    pub texture: egui::TextureHandle,
    /// Placement inside the viewport in physical pixels, sized like the
    /// uploaded crop.
    pub target_rect: Rect,
}

#[derive(Default)]
pub struct ViewportState {
    pub left: Option<LayerTexture>,
    pub right: Option<LayerTexture>,
    /// Surfaces changed since the textures were last uploaded.
    pub textures_dirty: bool,
}

pub fn settings_path() -> PathBuf {
    PathBuf::from(SETTINGS_FILE)
}

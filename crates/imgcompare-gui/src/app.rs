use std::path::Path;
use std::sync::{mpsc, Arc};

use anyhow::{Context, Result};
use imgcompare_core::engine::{CompositorEngine, CompositorEvent};
use imgcompare_core::geometry::{drawn_rect, Size};
use imgcompare_core::operation::Side;
use imgcompare_core::settings::Settings;
use imgcompare_core::viewport::ViewportController;
use tracing::warn;

use crate::convert::region_to_color_image;
use crate::messages::UiMessage;
use crate::panels;
use crate::state::{settings_path, LayerTexture, UIState, ViewportState};

pub struct ImageCompareApp {
    pub engine: CompositorEngine,
    pub controller: ViewportController,
    pub events: mpsc::Receiver<CompositorEvent>,
    pub msg_tx: mpsc::Sender<UiMessage>,
    pub msg_rx: mpsc::Receiver<UiMessage>,
    pub settings: Settings,
    pub ui_state: UIState,
    pub viewport: ViewportState,
    pub show_about: bool,
}

impl ImageCompareApp {
    pub fn new(ctx: &egui::Context) -> Self {
        let mut ui_state = UIState::default();
        let path = settings_path();
        let settings = if path.exists() {
            match Settings::load(&path) {
                Ok(settings) => {
                    ui_state.add_log(format!("Settings loaded from {}", path.display()));
                    settings
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring unreadable settings");
                    ui_state.add_log(format!("ERROR: {e}"));
                    Settings::default()
                }
            }
        } else {
            Settings::default()
        };

        // The real size arrives with the first frame.
        let mut engine = CompositorEngine::new(Size::ZERO);
        engine.apply_settings(&settings);
        let repaint_ctx = ctx.clone();
        engine.set_wake(Arc::new(move || repaint_ctx.request_repaint()));
        let events = engine.subscribe();
        let controller = ViewportController::from_settings(&settings);

        let (msg_tx, msg_rx) = mpsc::channel();
        let mut app = Self {
            engine,
            controller,
            events,
            msg_tx,
            msg_rx,
            settings,
            ui_state,
            viewport: ViewportState::default(),
            show_about: false,
        };

        let last_files = [
            (Side::Left, app.settings.last_file_left.clone()),
            (Side::Right, app.settings.last_file_right.clone()),
        ];
        for (side, file) in last_files {
            if let Some(file) = file.filter(|f| f.exists()) {
                app.open_source(side, &file);
            }
        }
        app
    }

    pub fn open_source(&mut self, side: Side, path: &Path) {
        self.engine.set_source(side, path);
        if self.engine.is_loaded(side) {
            self.ui_state
                .add_log(format!("Opened {side}: {}", path.display()));
        } else {
            self.ui_state
                .add_log(format!("ERROR: could not decode {}", path.display()));
        }
    }

    /// Copy the current view state into the settings and write them out.
    pub fn save_settings(&mut self, path: &Path) -> Result<()> {
        self.controller.store_settings(&mut self.settings);
        self.settings.threshold = self.engine.threshold();
        self.settings.last_file_left = self.engine.path(Side::Left).map(Path::to_path_buf);
        self.settings.last_file_right = self.engine.path(Side::Right).map(Path::to_path_buf);
        self.settings
            .save(path)
            .with_context(|| format!("Failed to save settings to {}", path.display()))
    }

    pub fn apply_settings(&mut self, settings: Settings) {
        let settings = settings.sanitized();
        self.engine.apply_settings(&settings);
        self.controller = ViewportController::from_settings(&settings);
        self.controller.sync(&mut self.engine);
        self.settings = settings;
    }

    /// Apply finished background work and forward engine events.
    fn poll_engine(&mut self) {
        self.engine.poll();

        while let Ok(event) = self.events.try_recv() {
            self.controller.handle_event(&event, &mut self.engine);
            match event {
                CompositorEvent::SurfacesUpdated => self.viewport.textures_dirty = true,
                CompositorEvent::SourceChanged { side, path: None } => {
                    self.viewport.textures_dirty = true;
                    self.ui_state.add_log(format!("Cleared {side}"));
                }
                CompositorEvent::MatchChanged(state) => {
                    self.ui_state.add_log(format!("Result: {state}"));
                }
                _ => {}
            }
        }
    }

    fn poll_messages(&mut self) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                UiMessage::OpenSource { side, path } => self.open_source(side, &path),
                UiMessage::FileTransformed { path, description } => {
                    self.ui_state
                        .add_log(format!("{description}: {}", path.display()));
                    self.engine.file_updated(&path);
                }
                UiMessage::SettingsSaved { path } => {
                    self.ui_state
                        .add_log(format!("Settings saved to {}", path.display()));
                }
                UiMessage::SettingsImported { settings } => {
                    self.apply_settings(settings);
                    self.ui_state.add_log("Settings imported".into());
                }
                UiMessage::CompositeSaved { path } => {
                    self.ui_state.add_log(format!("Saved: {}", path.display()));
                }
                UiMessage::Error { message } => {
                    self.ui_state.add_log(format!("ERROR: {message}"));
                }
            }
        }
    }

    fn update_textures(&mut self, ctx: &egui::Context) {
        if !self.viewport.textures_dirty {
            return;
        }
        self.viewport.textures_dirty = false;
        self.viewport.left = self.layer_texture(ctx, Side::Left);
        self.viewport.right = self.layer_texture(ctx, Side::Right);
    }

    fn layer_texture(&self, ctx: &egui::Context, side: Side) -> Option<LayerTexture> {
        let surface = self.engine.surface(side);
        let scaled = surface.scaled()?;
        let image = region_to_color_image(scaled, surface.source_rect())?;
        let name = match side {
            Side::Left => "viewport_left",
            Side::Right => "viewport_right",
        };
        Some(LayerTexture {
            texture: ctx.load_texture(name, image, egui::TextureOptions::NEAREST),
            target_rect: drawn_rect(surface.source_rect(), surface.target_rect(), scaled.size()),
        })
    }
}

impl eframe::App for ImageCompareApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_engine();
        self.poll_messages();
        self.update_textures(ctx);

        panels::menu_bar::show(ctx, self);
        panels::status::show(ctx, self);
        panels::controls::show(ctx, self);
        panels::viewport::show(ctx, self);

        if self.show_about {
            egui::Window::new("About Image Compare")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("Image Compare");
                        ui.label("Pixel-exact side-by-side image comparison");
                        ui.add_space(8.0);
                        ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                        ui.add_space(8.0);
                        if ui.button("Close").clicked() {
                            self.show_about = false;
                        }
                    });
                });
        }
    }
}

use std::path::{Path, PathBuf};

use imgcompare_core::consts::{MAX_COMPARE_THRESHOLD, MAX_ZOOM_LEVEL_INDEX, ZOOM_LEVELS};
use imgcompare_core::io::transform::{flip_file, rotate_file, FlipDirection, Rotation};
use imgcompare_core::operation::Side;

use crate::app::ImageCompareApp;
use crate::messages::UiMessage;
use crate::panels::menu_bar::open_file;

const LEFT_PANEL_WIDTH: f32 = 280.0;

pub fn show(ctx: &egui::Context, app: &mut ImageCompareApp) {
    egui::SidePanel::left("controls")
        .default_width(LEFT_PANEL_WIDTH)
        .resizable(true)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.set_min_width(LEFT_PANEL_WIDTH - 20.0);

                source_section(ui, app, Side::Left);
                ui.separator();
                source_section(ui, app, Side::Right);
                ui.separator();
                zoom_section(ui, app);
                ui.separator();
                blend_section(ui, app);
                ui.separator();
                compare_section(ui, app);
            });
        });
}

fn section_header(ui: &mut egui::Ui, label: &str, status: Option<&str>) {
    ui.horizontal(|ui| {
        ui.strong(label);
        if let Some(s) = status {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.small(s);
            });
        }
    });
}

fn source_section(ui: &mut egui::Ui, app: &mut ImageCompareApp, side: Side) {
    let title = match side {
        Side::Left => "Left Image",
        Side::Right => "Right Image",
    };
    let loaded = app.engine.is_loaded(side);
    section_header(ui, title, loaded.then_some("loaded"));
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        if ui.button("Open...").clicked() {
            open_file(app, side);
        }
        let has_path = app.engine.path(side).is_some();
        if ui.add_enabled(has_path, egui::Button::new("Reload")).clicked() {
            app.engine.reload_source(side);
        }
        if ui.add_enabled(has_path, egui::Button::new("Clear")).clicked() {
            app.engine.clear_source(side);
        }
    });

    let Some(path) = app.engine.path(side).map(Path::to_path_buf) else {
        ui.small("No file");
        return;
    };
    ui.label(
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
    );
    if loaded {
        let size = app.engine.surface(side).source_size();
        ui.small(format!("{}x{}", size.width, size.height));
    } else {
        ui.small("Could not decode");
    }

    ui.add_enabled_ui(loaded, |ui| {
        ui.horizontal(|ui| {
            if ui.button("Rotate \u{27f2}").on_hover_text("Rotate left").clicked() {
                transform_file(app, path.clone(), Transform::Rotate(Rotation::Left));
            }
            if ui.button("Rotate \u{27f3}").on_hover_text("Rotate right").clicked() {
                transform_file(app, path.clone(), Transform::Rotate(Rotation::Right));
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Flip \u{2194}").on_hover_text("Flip horizontally").clicked() {
                transform_file(app, path.clone(), Transform::Flip(FlipDirection::Horizontal));
            }
            if ui.button("Flip \u{2195}").on_hover_text("Flip vertically").clicked() {
                transform_file(app, path.clone(), Transform::Flip(FlipDirection::Vertical));
            }
        });
    });
}

fn zoom_section(ui: &mut egui::Ui, app: &mut ImageCompareApp) {
    let zoom_label = format!("{:.0}%", app.controller.zoom() * 100.0);
    section_header(ui, "Zoom", Some(&zoom_label));
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        if ui.add_enabled(app.controller.can_zoom_out(), egui::Button::new("\u{2212}")).clicked() {
            app.controller.zoom_out(&mut app.engine);
        }
        if ui.add_enabled(app.controller.can_zoom_in(), egui::Button::new("+")).clicked() {
            app.controller.zoom_in(&mut app.engine);
        }
        if ui.button("100%").clicked() {
            app.controller.zoom_default(&mut app.engine);
        }
        if ui
            .selectable_label(app.controller.is_zoom_fit(), "Fit")
            .clicked()
        {
            app.controller.zoom_to_fit(&mut app.engine);
        }
    });

    let mut index = app.controller.zoom_level_index();
    let level_label = format!("{:.0}%", ZOOM_LEVELS[index] * 100.0);
    let slider = egui::Slider::new(&mut index, 0..=MAX_ZOOM_LEVEL_INDEX)
        .show_value(false)
        .text(level_label);
    if ui.add(slider).changed() {
        app.controller.set_zoom_level_index(index, &mut app.engine);
    }

    let pan = app.controller.pan();
    ui.small(format!("Pan {:.0}, {:.0}", pan.x, pan.y));
    if ui.button("Reset View").clicked() {
        app.controller.reset(&mut app.engine);
        app.ui_state.add_log("View reset".into());
    }
}

fn blend_section(ui: &mut egui::Ui, app: &mut ImageCompareApp) {
    section_header(ui, "Opacity", None);
    ui.add_space(4.0);

    for (side, label) in [(Side::Left, "Left"), (Side::Right, "Right")] {
        let mut opacity = app.controller.opacity(side);
        if ui
            .add(egui::Slider::new(&mut opacity, 0.0..=1.0).text(label))
            .changed()
        {
            app.controller.set_opacity(side, opacity);
        }
    }
}

fn compare_section(ui: &mut egui::Ui, app: &mut ImageCompareApp) {
    let state = app.engine.match_state().to_string();
    section_header(ui, "Compare", Some(&state));
    ui.add_space(4.0);

    let mut threshold = app.engine.threshold();
    if ui
        .add(egui::Slider::new(&mut threshold, 0.0..=MAX_COMPARE_THRESHOLD).text("Threshold"))
        .on_hover_text("Stored with the settings; matching is always exact")
        .changed()
    {
        app.engine.set_threshold(threshold);
    }
}

#[derive(Clone, Copy)]
enum Transform {
    Rotate(Rotation),
    Flip(FlipDirection),
}

/// Rewrite the file off the UI thread; the engine reloads it once done.
fn transform_file(app: &ImageCompareApp, path: PathBuf, transform: Transform) {
    let msg_tx = app.msg_tx.clone();
    std::thread::spawn(move || {
        let (result, description) = match transform {
            Transform::Rotate(rotation) => {
                (rotate_file(&path, rotation), format!("Rotated {rotation}"))
            }
            Transform::Flip(direction) => {
                (flip_file(&path, direction), format!("Flipped {direction}"))
            }
        };
        let msg = match result {
            Ok(()) => UiMessage::FileTransformed { path, description },
            Err(e) => UiMessage::Error {
                message: e.to_string(),
            },
        };
        let _ = msg_tx.send(msg);
    });
}

use imgcompare_core::consts::SUPPORTED_EXTENSIONS;
use imgcompare_core::io::image_io::save_png;
use imgcompare_core::operation::Side;
use imgcompare_core::render::{compose, RenderFrame};
use imgcompare_core::settings::Settings;

use crate::app::ImageCompareApp;
use crate::messages::UiMessage;
use crate::state::settings_path;

pub fn show(ctx: &egui::Context, app: &mut ImageCompareApp) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                let open_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O);
                if ui.add(egui::Button::new("Open Left...").shortcut_text(ctx.format_shortcut(&open_shortcut))).clicked() {
                    ui.close();
                    open_file(app, Side::Left);
                }

                let open_right_shortcut = egui::KeyboardShortcut::new(
                    egui::Modifiers::COMMAND | egui::Modifiers::SHIFT,
                    egui::Key::O,
                );
                if ui.add(egui::Button::new("Open Right...").shortcut_text(ctx.format_shortcut(&open_right_shortcut))).clicked() {
                    ui.close();
                    open_file(app, Side::Right);
                }

                ui.separator();

                let save_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::S);
                if ui.add(egui::Button::new("Save Composite...").shortcut_text(ctx.format_shortcut(&save_shortcut))).clicked() {
                    ui.close();
                    save_composite(app);
                }

                ui.separator();

                if ui.button("Save Settings").clicked() {
                    ui.close();
                    save_settings(app);
                }

                if ui.button("Import Settings...").clicked() {
                    ui.close();
                    import_settings(app);
                }

                if ui.button("Export Settings...").clicked() {
                    ui.close();
                    export_settings(app);
                }

                ui.separator();

                let quit_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q);
                if ui.add(egui::Button::new("Quit").shortcut_text(ctx.format_shortcut(&quit_shortcut))).clicked() {
                    ui.close();
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                if ui.add_enabled(app.controller.can_zoom_in(), egui::Button::new("Zoom In")).clicked() {
                    ui.close();
                    app.controller.zoom_in(&mut app.engine);
                }
                if ui.add_enabled(app.controller.can_zoom_out(), egui::Button::new("Zoom Out")).clicked() {
                    ui.close();
                    app.controller.zoom_out(&mut app.engine);
                }
                if ui.button("Actual Size").clicked() {
                    ui.close();
                    app.controller.zoom_default(&mut app.engine);
                }
                if ui.button("Zoom to Fit").clicked() {
                    ui.close();
                    app.controller.zoom_to_fit(&mut app.engine);
                }
                ui.separator();
                if ui.button("Reset View").clicked() {
                    ui.close();
                    app.controller.reset(&mut app.engine);
                    app.ui_state.add_log("View reset".into());
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    ui.close();
                    app.show_about = true;
                }
            });
        });

        // Keyboard shortcuts (consumed outside menus)
        if ctx.input_mut(|i| {
            i.consume_shortcut(&egui::KeyboardShortcut::new(
                egui::Modifiers::COMMAND | egui::Modifiers::SHIFT,
                egui::Key::O,
            ))
        }) {
            open_file(app, Side::Right);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O))) {
            open_file(app, Side::Left);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::S))) {
            save_composite(app);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Plus))) {
            app.controller.zoom_in(&mut app.engine);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Minus))) {
            app.controller.zoom_out(&mut app.engine);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Num0))) {
            app.controller.zoom_default(&mut app.engine);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q))) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

pub(crate) fn open_file(app: &mut ImageCompareApp, side: Side) {
    let msg_tx = app.msg_tx.clone();
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .set_title(format!("Open {side} image"))
            .add_filter("Images", &SUPPORTED_EXTENSIONS)
            .add_filter("All files", &["*"])
            .pick_file()
        {
            let _ = msg_tx.send(UiMessage::OpenSource { side, path });
        }
    });
}

fn save_composite(app: &mut ImageCompareApp) {
    if !app.engine.any_loaded() {
        app.ui_state.add_log("Nothing to save".into());
        return;
    }
    let frame = RenderFrame::capture(
        &app.engine,
        app.controller.opacity(Side::Left),
        app.controller.opacity(Side::Right),
    );
    let msg_tx = app.msg_tx.clone();
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name("composite.png")
            .save_file()
        {
            let msg = match save_png(&compose(&frame), &path) {
                Ok(()) => UiMessage::CompositeSaved { path },
                Err(e) => UiMessage::Error {
                    message: e.to_string(),
                },
            };
            let _ = msg_tx.send(msg);
        }
    });
}

fn save_settings(app: &mut ImageCompareApp) {
    let path = settings_path();
    match app.save_settings(&path) {
        Ok(()) => {
            let _ = app.msg_tx.send(UiMessage::SettingsSaved { path });
        }
        Err(e) => app.ui_state.add_log(format!("ERROR: {e:#}")),
    }
}

fn import_settings(app: &mut ImageCompareApp) {
    let msg_tx = app.msg_tx.clone();
    std::thread::spawn(move || {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("TOML", &["toml"])
            .pick_file()
        else {
            return;
        };
        let msg = match Settings::load(&path) {
            Ok(settings) => UiMessage::SettingsImported { settings },
            Err(e) => UiMessage::Error {
                message: e.to_string(),
            },
        };
        let _ = msg_tx.send(msg);
    });
}

fn export_settings(app: &mut ImageCompareApp) {
    let mut settings = app.settings.clone();
    app.controller.store_settings(&mut settings);
    settings.threshold = app.engine.threshold();

    let msg_tx = app.msg_tx.clone();
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("TOML", &["toml"])
            .set_file_name("imgcompare.toml")
            .save_file()
        {
            let msg = match settings.save(&path) {
                Ok(()) => UiMessage::SettingsSaved { path },
                Err(e) => UiMessage::Error {
                    message: e.to_string(),
                },
            };
            let _ = msg_tx.send(msg);
        }
    });
}

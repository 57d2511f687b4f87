use imgcompare_core::operation::{MatchState, Status};

use crate::app::ImageCompareApp;

pub fn show(ctx: &egui::Context, app: &mut ImageCompareApp) {
    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        ui.add_space(2.0);

        if app.engine.status() == Status::Busy {
            let detail = format!("{}...", app.engine.operation());
            ui.add(egui::ProgressBar::new(0.0).text(detail).animate(true));
        } else {
            // Same height as the busy bar, no animation
            ui.add(egui::ProgressBar::new(0.0).text(""));
        }

        // Log area, fixed height for 4 lines.
        let line_height = ui.text_style_height(&egui::TextStyle::Body);
        let spacing = ui.spacing().item_spacing.y;
        let log_height = line_height * 4.0 + spacing * 3.0;

        egui::ScrollArea::vertical()
            .max_height(log_height)
            .min_scrolled_height(log_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if app.ui_state.log_messages.is_empty() {
                    for _ in 0..4 {
                        ui.label("");
                    }
                } else {
                    for msg in &app.ui_state.log_messages {
                        ui.label(msg);
                    }
                }
            });

        ui.horizontal(|ui| {
            let composite = app.engine.composite_size();
            if !composite.is_empty() {
                ui.label(format!("{}x{}", composite.width, composite.height));
                ui.separator();
            }
            let fit = if app.controller.is_zoom_fit() { " (fit)" } else { "" };
            ui.label(format!("Zoom: {:.0}%{fit}", app.controller.zoom() * 100.0));
            ui.separator();
            let state = app.engine.match_state();
            ui.colored_label(match_color(state), state.to_string());
            ui.separator();
            ui.label(format!("{}", app.engine.status()));
        });

        ui.add_space(2.0);
    });
}

fn match_color(state: MatchState) -> egui::Color32 {
    match state {
        MatchState::Match => egui::Color32::from_rgb(80, 200, 80),
        MatchState::NoMatch | MatchState::Incomparable => egui::Color32::from_rgb(220, 80, 80),
        MatchState::Unknown => egui::Color32::from_gray(140),
    }
}

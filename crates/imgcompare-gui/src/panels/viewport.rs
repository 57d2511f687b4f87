use imgcompare_core::geometry::{Rect, Size};
use imgcompare_core::operation::Side;
use imgcompare_core::render::overlay_color;

use crate::app::ImageCompareApp;
use crate::convert::overlay_to_color32;
use crate::state::LayerTexture;

pub fn show(ctx: &egui::Context, app: &mut ImageCompareApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let rect = ui.available_rect_before_wrap();
        paint_background(ui, rect);

        // Geometry works in physical pixels.
        let ppp = ctx.pixels_per_point();
        let size = Size::new(
            (rect.width() * ppp).max(0.0) as u32,
            (rect.height() * ppp).max(0.0) as u32,
        );
        app.controller.resize_viewport(size, &mut app.engine);

        if !app.engine.any_loaded() {
            show_placeholder(ui);
            return;
        }

        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        handle_scroll(ui, &response, app);
        handle_pan(&response, app, ppp);
        if response.double_clicked() {
            app.controller.zoom_to_fit(&mut app.engine);
        }

        for (side, layer) in [
            (Side::Left, app.viewport.left.as_ref()),
            (Side::Right, app.viewport.right.as_ref()),
        ] {
            if let Some(layer) = layer {
                draw_layer(ui, layer, rect, ppp, app.controller.opacity(side));
            }
        }

        let overlay = overlay_to_color32(overlay_color(app.engine.match_state()));
        ui.painter().rect_filled(rect, 0.0, overlay);
    });
}

fn paint_background(ui: &egui::Ui, rect: egui::Rect) {
    ui.painter()
        .rect_filled(rect, 0.0, egui::Color32::from_gray(30));
}

/// Wheel pans; with the command modifier egui reports it as zoom instead.
fn handle_scroll(ui: &egui::Ui, response: &egui::Response, app: &mut ImageCompareApp) {
    if !response.hovered() {
        return;
    }
    let (scroll, zoom_delta) = ui.input(|i| (i.raw_scroll_delta, i.zoom_delta()));
    if zoom_delta > 1.0 {
        app.controller.scroll((0.0, 1.0), true, &mut app.engine);
    } else if zoom_delta < 1.0 {
        app.controller.scroll((0.0, -1.0), true, &mut app.engine);
    } else if scroll != egui::Vec2::ZERO {
        app.controller
            .scroll((scroll.x as f64, scroll.y as f64), false, &mut app.engine);
    }
}

fn handle_pan(response: &egui::Response, app: &mut ImageCompareApp, ppp: f32) {
    if response.drag_stopped() {
        app.controller.pan_finish();
        return;
    }
    let Some(pos) = response.interact_pointer_pos() else {
        return;
    };
    let pos = ((pos.x * ppp) as f64, (pos.y * ppp) as f64);
    if response.drag_started_by(egui::PointerButton::Primary) {
        app.controller.pan_start(pos);
    } else if response.dragged_by(egui::PointerButton::Primary) && app.controller.is_dragging() {
        app.controller.pan_move(pos, &mut app.engine);
    }
}

fn draw_layer(ui: &egui::Ui, layer: &LayerTexture, viewport: egui::Rect, ppp: f32, opacity: f32) {
    let target = to_points(layer.target_rect, viewport, ppp);
    ui.painter().image(
        layer.texture.id(),
        target,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE.gamma_multiply(opacity),
    );
}

fn to_points(rect: Rect, viewport: egui::Rect, ppp: f32) -> egui::Rect {
    egui::Rect::from_min_size(
        viewport.min + egui::vec2(rect.x as f32 / ppp, rect.y as f32 / ppp),
        egui::vec2(rect.width as f32 / ppp, rect.height as f32 / ppp),
    )
}

fn show_placeholder(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.label(
            egui::RichText::new("Open a left and a right image to compare")
                .size(18.0)
                .color(egui::Color32::from_gray(100)),
        );
    });
}

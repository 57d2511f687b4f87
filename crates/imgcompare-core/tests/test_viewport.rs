#[allow(dead_code)]
mod common;

use approx::assert_relative_eq;

use common::{engine, gradient, loaded_engine, MapLoader, WAIT};
use imgcompare_core::consts::{DEFAULT_ZOOM_LEVEL_INDEX, MAX_ZOOM_LEVEL_INDEX, ZOOM_LEVELS};
use imgcompare_core::engine::CompositorEngine;
use imgcompare_core::geometry::{Pan, Size};
use imgcompare_core::operation::Side;
use imgcompare_core::settings::Settings;
use imgcompare_core::viewport::{
    clamp_pan, fit_zoom, ladder_index_at_or_above, ladder_index_at_or_below, pan_bound,
    ViewportController,
};

fn empty_engine() -> CompositorEngine {
    engine((100, 100), &MapLoader::new())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

#[test]
fn test_pan_bound() {
    assert_eq!(pan_bound(400, 100), 150.0);
    assert_eq!(pan_bound(50, 100), 0.0);
}

#[test]
fn test_clamp_pan_is_symmetric() {
    let composite = Size::new(300, 500);
    let viewport = Size::new(100, 100);
    for (x, y) in [(1000.0, -1000.0), (-1000.0, 1000.0), (42.0, -7.0), (0.0, 0.0)] {
        let pan = clamp_pan(Pan::new(x, y), composite, viewport);
        assert!(pan.x.abs() <= 100.0);
        assert!(pan.y.abs() <= 200.0);
    }
    assert_eq!(
        clamp_pan(Pan::new(1000.0, -1000.0), composite, viewport),
        Pan::new(100.0, -200.0)
    );
    assert_eq!(
        clamp_pan(Pan::new(42.0, -7.0), composite, viewport),
        Pan::new(42.0, -7.0)
    );
}

#[test]
fn test_fit_zoom_uses_limiting_axis() {
    assert_relative_eq!(
        fit_zoom(Size::new(50, 50), Size::new(200, 200)).unwrap(),
        0.25
    );
    assert_relative_eq!(
        fit_zoom(Size::new(100, 100), Size::new(400, 200)).unwrap(),
        0.25
    );
    assert_relative_eq!(
        fit_zoom(Size::new(800, 600), Size::new(200, 100)).unwrap(),
        3.0
    );
}

#[test]
fn test_fit_zoom_requires_non_empty_sizes() {
    assert!(fit_zoom(Size::new(50, 50), Size::new(0, 200)).is_none());
    assert!(fit_zoom(Size::ZERO, Size::new(10, 10)).is_none());
}

#[test]
fn test_ladder_search() {
    assert_eq!(ladder_index_at_or_above(0.3), 2);
    assert_eq!(ladder_index_at_or_above(0.25), 1);
    assert_eq!(ladder_index_at_or_above(500.0), MAX_ZOOM_LEVEL_INDEX);
    assert_eq!(ladder_index_at_or_below(0.3), 1);
    assert_eq!(ladder_index_at_or_below(0.01), 0);
}

// ---------------------------------------------------------------------------
// Ladder navigation
// ---------------------------------------------------------------------------

#[test]
fn test_zoom_in_steps_are_clamped() {
    let mut engine = empty_engine();
    let mut controller = ViewportController::new();
    assert_eq!(controller.zoom_level_index(), DEFAULT_ZOOM_LEVEL_INDEX);

    for k in 1..=8 {
        controller.zoom_in(&mut engine);
        assert_eq!(
            controller.zoom_level_index(),
            (DEFAULT_ZOOM_LEVEL_INDEX + k).min(MAX_ZOOM_LEVEL_INDEX)
        );
    }
    assert!(!controller.can_zoom_in());
}

#[test]
fn test_ladder_tops_out_at_four_times() {
    assert_eq!(MAX_ZOOM_LEVEL_INDEX, 6);
    assert_eq!(ZOOM_LEVELS[MAX_ZOOM_LEVEL_INDEX], 4.0);

    let mut engine = empty_engine();
    let mut controller = ViewportController::new();
    controller.set_zoom_level_index(99, &mut engine);
    assert_eq!(controller.zoom(), 4.0);
}

#[test]
fn test_zoom_out_steps_floor_at_zero() {
    let mut engine = empty_engine();
    let mut controller = ViewportController::new();
    for _ in 0..10 {
        controller.zoom_out(&mut engine);
    }
    assert_eq!(controller.zoom_level_index(), 0);
    assert_eq!(controller.zoom(), ZOOM_LEVELS[0]);
    assert!(!controller.can_zoom_out());
}

#[test]
fn test_zoom_drives_engine() {
    let (mut engine, _) = loaded_engine((100, 100), gradient(80, 80), gradient(80, 80));
    let mut controller = ViewportController::new();

    controller.zoom_in(&mut engine);
    assert_eq!(engine.zoom(), 2.0);
    engine.wait_idle(WAIT).unwrap();
    assert_eq!(engine.composite_size(), Size::new(160, 160));

    controller.zoom_default(&mut engine);
    assert_eq!(engine.zoom(), 1.0);
}

// ---------------------------------------------------------------------------
// Zoom to fit
// ---------------------------------------------------------------------------

#[test]
fn test_zoom_to_fit() {
    let (mut engine, _) = loaded_engine((50, 50), gradient(200, 200), gradient(200, 200));
    let mut controller = ViewportController::new();
    controller.set_pan(Pan::new(30.0, -30.0), &mut engine);

    controller.zoom_to_fit(&mut engine);

    assert!(controller.is_zoom_fit());
    assert_relative_eq!(controller.zoom(), 0.25);
    assert_relative_eq!(engine.zoom(), 0.25);
    assert_eq!(controller.pan(), Pan::ZERO);
    assert_eq!(engine.pan(), Pan::ZERO);

    engine.wait_idle(WAIT).unwrap();
    assert_eq!(engine.composite_size(), Size::new(50, 50));
    assert!(engine.matched());
}

#[test]
fn test_zoom_to_fit_without_images_is_noop() {
    let mut engine = empty_engine();
    let mut controller = ViewportController::new();
    controller.zoom_to_fit(&mut engine);
    assert!(!controller.is_zoom_fit());
    assert_eq!(controller.zoom(), 1.0);
}

#[test]
fn test_leaving_fit_resolves_nearest_level() {
    // Fit zoom 0.3 sits between 0.25 and 0.5.
    let (mut engine, _) = loaded_engine((60, 60), gradient(200, 200), gradient(200, 200));
    let mut controller = ViewportController::new();

    controller.zoom_to_fit(&mut engine);
    assert_relative_eq!(controller.zoom(), 0.3);
    controller.zoom_in(&mut engine);
    assert!(!controller.is_zoom_fit());
    assert_eq!(controller.zoom_level_index(), 2);

    controller.zoom_to_fit(&mut engine);
    controller.zoom_out(&mut engine);
    assert_eq!(controller.zoom_level_index(), 1);
}

#[test]
fn test_leaving_fit_on_a_ladder_level_still_steps() {
    // Fit zoom 0.25 is itself a ladder level.
    let (mut engine, _) = loaded_engine((50, 50), gradient(200, 200), gradient(200, 200));
    let mut controller = ViewportController::new();

    controller.zoom_to_fit(&mut engine);
    controller.zoom_in(&mut engine);
    assert_eq!(controller.zoom(), 0.5);

    controller.zoom_to_fit(&mut engine);
    controller.zoom_out(&mut engine);
    assert_eq!(controller.zoom(), 0.1);
}

// ---------------------------------------------------------------------------
// Pan
// ---------------------------------------------------------------------------

#[test]
fn test_set_pan_is_clamped() {
    let (mut engine, _) = loaded_engine((100, 100), gradient(400, 400), gradient(400, 400));
    let mut controller = ViewportController::new();

    controller.set_pan(Pan::new(500.0, -500.0), &mut engine);

    assert_eq!(controller.pan(), Pan::new(150.0, -150.0));
    assert_eq!(engine.pan(), Pan::new(150.0, -150.0));
}

#[test]
fn test_zoom_out_pulls_pan_inside_new_bounds() {
    let (mut engine, _) = loaded_engine((100, 100), gradient(400, 400), gradient(400, 400));
    let mut controller = ViewportController::new();
    controller.set_pan(Pan::new(150.0, 150.0), &mut engine);

    controller.zoom_out(&mut engine);

    // 400 * 0.75 = 300 → bound 100
    assert_eq!(controller.previous_pan(), Pan::new(150.0, 150.0));
    assert_eq!(controller.previous_zoom(), 1.0);
    assert_eq!(controller.pan(), Pan::new(100.0, 100.0));
    assert_eq!(engine.pan(), Pan::new(100.0, 100.0));
}

#[test]
fn test_zoom_in_keeps_pan() {
    let (mut engine, _) = loaded_engine((100, 100), gradient(400, 400), gradient(400, 400));
    let mut controller = ViewportController::new();
    controller.set_pan(Pan::new(-80.0, 40.0), &mut engine);

    controller.zoom_in(&mut engine);

    assert_eq!(controller.pan(), Pan::new(-80.0, 40.0));
}

#[test]
fn test_drag_pan() {
    let (mut engine, _) = loaded_engine((100, 100), gradient(400, 400), gradient(400, 400));
    let mut controller = ViewportController::new();
    controller.set_pan(Pan::new(10.0, 10.0), &mut engine);

    controller.pan_start((50.0, 50.0));
    controller.pan_move((70.0, 45.0), &mut engine);
    assert_eq!(controller.pan(), Pan::new(30.0, 5.0));
    controller.pan_move((1000.0, 50.0), &mut engine);
    assert_eq!(controller.pan(), Pan::new(150.0, 10.0));
    controller.pan_finish();

    controller.pan_move((0.0, 0.0), &mut engine);
    assert_eq!(controller.pan(), Pan::new(150.0, 10.0));
}

#[test]
fn test_scroll_pans_by_fixed_step() {
    let (mut engine, _) = loaded_engine((100, 100), gradient(400, 400), gradient(400, 400));
    let mut controller = ViewportController::new();

    controller.scroll((0.0, 120.0), false, &mut engine);
    assert_eq!(controller.pan(), Pan::new(0.0, 10.0));
    controller.scroll((-3.0, -1.0), false, &mut engine);
    assert_eq!(controller.pan(), Pan::new(-10.0, 0.0));
}

#[test]
fn test_scroll_with_modifier_zooms() {
    let mut engine = empty_engine();
    let mut controller = ViewportController::new();

    controller.scroll((0.0, 1.0), true, &mut engine);
    assert_eq!(controller.zoom_level_index(), DEFAULT_ZOOM_LEVEL_INDEX + 1);
    controller.scroll((0.0, -1.0), true, &mut engine);
    controller.scroll((0.0, -1.0), true, &mut engine);
    assert_eq!(controller.zoom_level_index(), DEFAULT_ZOOM_LEVEL_INDEX - 1);
}

#[test]
fn test_composite_change_reclamps_pan() {
    let (mut engine, loader) = loaded_engine((100, 100), gradient(400, 400), gradient(400, 400));
    let mut controller = ViewportController::new();
    controller.set_pan(Pan::new(150.0, 150.0), &mut engine);
    let events = engine.subscribe();

    loader.insert("small-left.png", gradient(200, 200));
    loader.insert("small-right.png", gradient(200, 200));
    engine.set_left_source("small-left.png");
    engine.set_right_source("small-right.png");
    for event in events.try_iter() {
        controller.handle_event(&event, &mut engine);
    }

    assert_eq!(controller.pan(), Pan::new(50.0, 50.0));
    engine.wait_idle(WAIT).unwrap();
    assert_eq!(engine.pan(), Pan::new(50.0, 50.0));
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[test]
fn test_reset() {
    let (mut engine, _) = loaded_engine((100, 100), gradient(400, 400), gradient(400, 400));
    let mut controller = ViewportController::new();
    controller.zoom_in(&mut engine);
    controller.set_pan(Pan::new(40.0, 40.0), &mut engine);
    controller.set_opacity(Side::Right, 0.3);

    controller.reset(&mut engine);

    assert_eq!(controller.zoom_level_index(), DEFAULT_ZOOM_LEVEL_INDEX);
    assert_eq!(controller.pan(), Pan::ZERO);
    assert_eq!(controller.opacity(Side::Right), 1.0);
    assert_eq!(engine.zoom(), 1.0);
}

#[test]
fn test_opacity_is_clamped() {
    let mut controller = ViewportController::new();
    controller.set_opacity(Side::Left, 1.7);
    controller.set_opacity(Side::Right, -0.2);
    assert_eq!(controller.opacity(Side::Left), 1.0);
    assert_eq!(controller.opacity(Side::Right), 0.0);
}

#[test]
fn test_settings_roundtrip() {
    let settings = Settings {
        zoom_level_index: 6,
        pan_x: 12.0,
        pan_y: -4.0,
        opacity_left: 0.5,
        ..Settings::default()
    };
    let controller = ViewportController::from_settings(&settings);
    assert_eq!(controller.zoom(), ZOOM_LEVELS[6]);
    assert_eq!(controller.pan(), Pan::new(12.0, -4.0));

    let mut stored = Settings::default();
    controller.store_settings(&mut stored);
    assert_eq!(stored.zoom_level_index, 6);
    assert_eq!(stored.pan_x, 12.0);
    assert_eq!(stored.opacity_left, 0.5);
}

#[test]
fn test_sync_pushes_view_into_engine() {
    let loader = MapLoader::new();
    loader.insert("a.png", gradient(100, 100));
    let mut engine = engine((50, 50), &loader);
    let mut controller = ViewportController::from_settings(&Settings {
        zoom_level_index: 5,
        pan_x: 500.0,
        ..Settings::default()
    });
    let events = engine.subscribe();

    engine.set_left_source("a.png");
    for event in events.try_iter() {
        controller.handle_event(&event, &mut engine);
    }

    assert_eq!(engine.zoom(), 2.0);
    // 100 * 2 = 200 → bound 75
    assert_eq!(engine.pan(), Pan::new(75.0, 0.0));
}

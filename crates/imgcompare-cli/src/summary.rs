use std::path::Path;

use console::Style;
use imgcompare_core::engine::CompositorEngine;
use imgcompare_core::geometry::Rect;
use imgcompare_core::operation::{MatchState, Side};
use imgcompare_core::viewport::ViewportController;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    path: Style,
    matched: Style,
    mismatched: Style,
    unknown: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            path: Style::new().underlined(),
            matched: Style::new().green().bold(),
            mismatched: Style::new().red().bold(),
            unknown: Style::new().dim().yellow(),
        }
    }
}

fn rect(r: Rect) -> String {
    format!("{}x{} at ({}, {})", r.width, r.height, r.x, r.y)
}

pub fn print_compare_summary(
    left: &Path,
    right: &Path,
    engine: &CompositorEngine,
    controller: &ViewportController,
) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Image Comparison"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(16)));
    println!();

    let viewport = engine.viewport();
    let zoom_note = if controller.is_zoom_fit() { " (fit)" } else { "" };
    println!(
        "  {:<14}{}",
        s.label.apply_to("Viewport"),
        s.value.apply_to(format!("{}x{}", viewport.width, viewport.height))
    );
    println!(
        "  {:<14}{}{}",
        s.label.apply_to("Zoom"),
        s.value.apply_to(format!("{:.0}%", engine.zoom() * 100.0)),
        zoom_note
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Pan"),
        s.value
            .apply_to(format!("{:.1}, {:.1}", engine.pan().x, engine.pan().y))
    );
    println!();

    for (side, path) in [(Side::Left, left), (Side::Right, right)] {
        let surface = engine.surface(side);
        let source = surface.source_size();
        let scaled = surface.scaled_size();
        let title = match side {
            Side::Left => "Left",
            Side::Right => "Right",
        };
        println!("  {}", s.header.apply_to(title));
        println!(
            "    {:<12}{}",
            s.label.apply_to("File"),
            s.path.apply_to(path.display())
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Source"),
            s.value.apply_to(format!("{}x{}", source.width, source.height))
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Scaled"),
            s.value.apply_to(format!("{}x{}", scaled.width, scaled.height))
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Visible"),
            s.value.apply_to(rect(surface.source_rect()))
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Drawn at"),
            s.value.apply_to(rect(surface.target_rect()))
        );
        println!();
    }

    let state = engine.match_state();
    let style = match state {
        MatchState::Match => &s.matched,
        MatchState::NoMatch | MatchState::Incomparable => &s.mismatched,
        MatchState::Unknown => &s.unknown,
    };
    println!("  {:<14}{}", s.label.apply_to("Result"), style.apply_to(state));
    println!();
}

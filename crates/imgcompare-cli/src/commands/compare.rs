use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use imgcompare_core::engine::{CompositorEngine, CompositorEvent};
use imgcompare_core::error::CompareError;
use imgcompare_core::geometry::{Pan, Size};
use imgcompare_core::io::image_io::save_png;
use imgcompare_core::operation::{Side, Status};
use imgcompare_core::render::{compose, RenderFrame};
use imgcompare_core::settings::Settings;
use imgcompare_core::viewport::ViewportController;

use crate::summary::print_compare_summary;

#[derive(Args)]
pub struct CompareArgs {
    /// Left image
    pub left: PathBuf,

    /// Right image
    pub right: PathBuf,

    /// Viewport size the comparison is evaluated in (WIDTHxHEIGHT)
    #[arg(long, default_value = "1024x768", value_parser = parse_size)]
    pub viewport: Size,

    /// Continuous zoom factor (e.g. 1.5)
    #[arg(long, conflicts_with_all = ["zoom_index", "fit"])]
    pub zoom: Option<f64>,

    /// Zoom ladder index (0 = 10%, 4 = 100%, 6 = 400%)
    #[arg(long, conflicts_with = "fit")]
    pub zoom_index: Option<usize>,

    /// Fit the larger image into the viewport
    #[arg(long)]
    pub fit: bool,

    /// Pan offset from the centre (X,Y), clamped to the image bounds
    #[arg(long, value_parser = parse_pan, allow_hyphen_values = true)]
    pub pan: Option<Pan>,

    /// Settings file (TOML) supplying zoom, pan, opacity and threshold
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Write the rendered composite viewport to a PNG file
    #[arg(long)]
    pub composite: Option<PathBuf>,

    /// Exit with an error unless the visible regions match
    #[arg(long)]
    pub strict: bool,

    /// Seconds to wait for the comparison
    #[arg(long, default_value_t = 120)]
    pub timeout: u64,
}

pub fn run(args: &CompareArgs) -> Result<()> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    let mut engine = CompositorEngine::new(args.viewport);
    engine.apply_settings(&settings);
    let mut controller = ViewportController::from_settings(&settings);
    let events = engine.subscribe();

    engine.set_left_source(&args.left);
    engine.set_right_source(&args.right);
    for (side, path) in [(Side::Left, &args.left), (Side::Right, &args.right)] {
        if !engine.is_loaded(side) {
            bail!("Could not decode {} image {}", side, path.display());
        }
    }
    pump_events(&events, &mut controller, &mut engine);

    if args.fit {
        controller.zoom_to_fit(&mut engine);
    } else if let Some(index) = args.zoom_index {
        controller.set_zoom_level_index(index, &mut engine);
    } else if let Some(zoom) = args.zoom {
        if !(zoom.is_finite() && zoom > 0.0) {
            bail!("Zoom must be a positive number, got {zoom}");
        }
        controller.set_zoom(zoom, &mut engine);
    }
    if let Some(pan) = args.pan {
        controller.set_pan(pan, &mut engine);
    }

    wait_for_engine(&events, &mut controller, &mut engine, Duration::from_secs(args.timeout))?;

    print_compare_summary(&args.left, &args.right, &engine, &controller);

    if let Some(ref path) = args.composite {
        let frame = RenderFrame::capture(
            &engine,
            controller.opacity(Side::Left),
            controller.opacity(Side::Right),
        );
        save_png(&compose(&frame), path)
            .with_context(|| format!("Failed to write composite to {}", path.display()))?;
        println!("Composite saved to {}", path.display());
    }

    if args.strict && !engine.matched() {
        bail!("Visible regions do not match ({})", engine.match_state());
    }
    Ok(())
}

fn pump_events(
    events: &Receiver<CompositorEvent>,
    controller: &mut ViewportController,
    engine: &mut CompositorEngine,
) {
    while let Ok(event) = events.try_recv() {
        controller.handle_event(&event, engine);
    }
}

fn wait_for_engine(
    events: &Receiver<CompositorEvent>,
    controller: &mut ViewportController,
    engine: &mut CompositorEngine,
    timeout: Duration,
) -> Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]")?);
    pb.enable_steady_tick(Duration::from_millis(80));

    let deadline = Instant::now() + timeout;
    loop {
        pb.set_message(engine.operation().to_string());
        match engine.wait_idle(Duration::from_millis(50)) {
            Ok(()) => {}
            Err(CompareError::Timeout(_)) => {}
            Err(e) => return Err(e.into()),
        }
        pump_events(events, controller, engine);
        if engine.status() == Status::Idle {
            break;
        }
        if Instant::now() >= deadline {
            pb.abandon();
            bail!("Comparison did not finish within {}s", timeout.as_secs());
        }
    }
    pb.finish_and_clear();
    Ok(())
}

fn parse_size(s: &str) -> std::result::Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let width = w.trim().parse::<u32>().map_err(|e| format!("width: {e}"))?;
    let height = h.trim().parse::<u32>().map_err(|e| format!("height: {e}"))?;
    if width == 0 || height == 0 {
        return Err("viewport dimensions must be non-zero".into());
    }
    Ok(Size::new(width, height))
}

fn parse_pan(s: &str) -> std::result::Result<Pan, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("x: {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("y: {e}"))?;
    Ok(Pan::new(x, y))
}

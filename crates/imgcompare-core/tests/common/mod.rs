use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{Rgba, RgbaImage};

use imgcompare_core::engine::{CompositorEngine, CompositorEvent};
use imgcompare_core::error::{CompareError, Result};
use imgcompare_core::geometry::Size;
use imgcompare_core::io::image_io::{save_png, ImageLoader};
use imgcompare_core::raster::RasterImage;

/// Generous upper bound for background work in tests.
pub const WAIT: Duration = Duration::from_secs(10);

pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 255, 255];

/// Solid-colour image.
pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RasterImage {
    RasterImage::filled(Size::new(width, height), rgba)
}

/// Image where every pixel is distinct, so any misplaced region shows up.
pub fn gradient(width: u32, height: u32) -> RasterImage {
    RasterImage::new(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    }))
}

/// Copy of `image` with one pixel changed.
pub fn with_pixel(image: &RasterImage, x: u32, y: u32, rgba: [u8; 4]) -> RasterImage {
    let mut pixels = image.as_rgba().clone();
    pixels.put_pixel(x, y, Rgba(rgba));
    RasterImage::new(pixels)
}

/// In-memory loader keyed by path. Clones share the same map.
#[derive(Clone, Default)]
pub struct MapLoader {
    images: Arc<Mutex<HashMap<PathBuf, RasterImage>>>,
}

impl MapLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &str, image: RasterImage) {
        self.images
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), image);
    }
}

impl ImageLoader for MapLoader {
    fn load(&self, path: &Path) -> Result<RasterImage> {
        self.images
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                CompareError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    path.display().to_string(),
                ))
            })
    }
}

/// Engine backed by `loader` with the given viewport.
pub fn engine(viewport: (u32, u32), loader: &MapLoader) -> CompositorEngine {
    CompositorEngine::with_loader(Size::new(viewport.0, viewport.1), Box::new(loader.clone()))
}

/// Engine with `left` and `right` loaded and all work applied.
pub fn loaded_engine(
    viewport: (u32, u32),
    left: RasterImage,
    right: RasterImage,
) -> (CompositorEngine, MapLoader) {
    let loader = MapLoader::new();
    loader.insert("left.png", left);
    loader.insert("right.png", right);
    let mut engine = engine(viewport, &loader);
    engine.set_left_source("left.png");
    engine.set_right_source("right.png");
    engine.wait_idle(WAIT).unwrap();
    (engine, loader)
}

/// Write `image` as a PNG under `dir`.
pub fn write_png(dir: &Path, name: &str, image: &RasterImage) -> PathBuf {
    let path = dir.join(name);
    save_png(image, &path).unwrap();
    path
}

/// Everything queued on `rx` so far.
pub fn drain(rx: &std::sync::mpsc::Receiver<CompositorEvent>) -> Vec<CompositorEvent> {
    rx.try_iter().collect()
}

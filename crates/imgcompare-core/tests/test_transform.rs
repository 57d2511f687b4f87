#[allow(dead_code)]
mod common;

use common::{gradient, write_png, WAIT};
use imgcompare_core::engine::CompositorEngine;
use imgcompare_core::geometry::Size;
use imgcompare_core::io::image_io::{is_supported_image, load_raster};
use imgcompare_core::io::transform::{flip_file, rotate_file, FlipDirection, Rotation};
use imgcompare_core::operation::{MatchState, Side};

#[test]
fn test_rotate_right_swaps_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let original = gradient(6, 3);
    let path = write_png(dir.path(), "img.png", &original);

    rotate_file(&path, Rotation::Right).unwrap();
    let rotated = load_raster(&path).unwrap();

    assert_eq!(rotated.size(), Size::new(3, 6));
    // Clockwise: the bottom-left corner becomes the top-left.
    assert_eq!(rotated.pixel(0, 0), original.pixel(0, 2));
}

#[test]
fn test_rotate_left_then_right_restores() {
    let dir = tempfile::tempdir().unwrap();
    let original = gradient(5, 4);
    let path = write_png(dir.path(), "img.png", &original);

    rotate_file(&path, Rotation::Left).unwrap();
    rotate_file(&path, Rotation::Right).unwrap();

    assert_eq!(load_raster(&path).unwrap(), original);
}

#[test]
fn test_flip_horizontal() {
    let dir = tempfile::tempdir().unwrap();
    let original = gradient(5, 4);
    let path = write_png(dir.path(), "img.png", &original);

    flip_file(&path, FlipDirection::Horizontal).unwrap();
    let flipped = load_raster(&path).unwrap();

    assert_eq!(flipped.pixel(0, 1), original.pixel(4, 1));
}

#[test]
fn test_flip_vertical_twice_restores() {
    let dir = tempfile::tempdir().unwrap();
    let original = gradient(5, 4);
    let path = write_png(dir.path(), "img.png", &original);

    flip_file(&path, FlipDirection::Vertical).unwrap();
    assert_eq!(load_raster(&path).unwrap().pixel(2, 0), original.pixel(2, 3));
    flip_file(&path, FlipDirection::Vertical).unwrap();

    assert_eq!(load_raster(&path).unwrap(), original);
}

#[test]
fn test_transform_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(rotate_file(&dir.path().join("nope.png"), Rotation::Left).is_err());
}

#[test]
fn test_engine_reloads_transformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let image = gradient(32, 32);
    let left = write_png(dir.path(), "left.png", &image);
    let right = write_png(dir.path(), "right.png", &image);

    let mut engine = CompositorEngine::new(Size::new(64, 64));
    engine.set_left_source(&left);
    engine.set_right_source(&right);
    engine.wait_idle(WAIT).unwrap();
    assert!(engine.matched());

    flip_file(&right, FlipDirection::Horizontal).unwrap();
    engine.file_updated(&right);
    engine.wait_idle(WAIT).unwrap();

    assert_eq!(engine.match_state(), MatchState::NoMatch);
    let source = engine.surface(Side::Right).source().unwrap();
    assert_eq!(source.pixel(0, 0), image.pixel(31, 0));
}

#[test]
fn test_supported_extensions() {
    assert!(is_supported_image(std::path::Path::new("a.PNG")));
    assert!(is_supported_image(std::path::Path::new("b.jpeg")));
    assert!(!is_supported_image(std::path::Path::new("c.tiff")));
    assert!(!is_supported_image(std::path::Path::new("noext")));
}

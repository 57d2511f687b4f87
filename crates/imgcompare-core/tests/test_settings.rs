use std::path::PathBuf;
use std::time::Duration;

use imgcompare_core::consts::{
    DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_ZOOM_LEVEL_INDEX, MAX_COMPARE_THRESHOLD,
    MAX_ZOOM_LEVEL_INDEX,
};
use imgcompare_core::error::CompareError;
use imgcompare_core::settings::Settings;

#[test]
fn test_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.threshold, 0.0);
    assert_eq!(settings.zoom_level_index, DEFAULT_ZOOM_LEVEL_INDEX);
    assert_eq!(settings.opacity_left, 1.0);
    assert_eq!(settings.opacity_right, 1.0);
    assert_eq!(settings.busy_timeout(), Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS));
    assert!(settings.last_file_left.is_none());
}

#[test]
fn test_save_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    let settings = Settings {
        threshold: 7.5,
        zoom_level_index: 2,
        pan_x: -20.0,
        pan_y: 35.5,
        opacity_left: 0.25,
        opacity_right: 0.75,
        last_file_left: Some(PathBuf::from("/tmp/a.png")),
        last_file_right: None,
        busy_timeout_ms: 1500,
    };

    settings.save(&path).unwrap();
    let loaded = Settings::load(&path).unwrap();

    assert_eq!(loaded, settings);
}

#[test]
fn test_missing_keys_take_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.toml");
    std::fs::write(&path, "threshold = 5.0\npan_y = 12.0\n").unwrap();

    let loaded = Settings::load(&path).unwrap();

    assert_eq!(loaded.threshold, 5.0);
    assert_eq!(loaded.pan_y, 12.0);
    assert_eq!(loaded.pan_x, 0.0);
    assert_eq!(loaded.zoom_level_index, DEFAULT_ZOOM_LEVEL_INDEX);
}

#[test]
fn test_out_of_range_values_are_clamped_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wild.toml");
    std::fs::write(
        &path,
        "threshold = 250.0\nzoom_level_index = 42\nopacity_left = 3.0\nopacity_right = -1.0\nbusy_timeout_ms = 0\n",
    )
    .unwrap();

    let loaded = Settings::load(&path).unwrap();

    assert_eq!(loaded.threshold, MAX_COMPARE_THRESHOLD);
    assert_eq!(loaded.zoom_level_index, MAX_ZOOM_LEVEL_INDEX);
    assert_eq!(loaded.opacity_left, 1.0);
    assert_eq!(loaded.opacity_right, 0.0);
    assert_eq!(loaded.busy_timeout_ms, 1);
}

#[test]
fn test_sanitized_replaces_non_finite() {
    let settings = Settings {
        threshold: f64::NAN,
        pan_x: f64::INFINITY,
        opacity_left: f32::NAN,
        ..Settings::default()
    }
    .sanitized();
    assert_eq!(settings.threshold, 0.0);
    assert_eq!(settings.pan_x, 0.0);
    assert_eq!(settings.opacity_left, 1.0);
}

#[test]
fn test_invalid_toml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "threshold = [not valid").unwrap();

    let err = Settings::load(&path).unwrap_err();
    assert!(matches!(err, CompareError::SettingsParse(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Settings::load(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, CompareError::Io(_)));
}

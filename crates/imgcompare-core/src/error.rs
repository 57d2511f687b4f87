use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid settings file: {0}")]
    SettingsParse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    SettingsSerialize(#[from] toml::ser::Error),

    #[error("Failed to start worker thread: {0}")]
    WorkerSpawn(String),

    #[error("Engine still busy after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, CompareError>;

// pixform/src/core/mod.rs
use std::fmt;
use thiserror::Error;

mod registry;
mod settings;
mod workspace;

pub use registry::{ImageRecord, ImageRegistry, RegistryEvent, REGISTRY_CAPACITY};
pub use settings::{
    parse_hex_color, Algorithm, OutputFormat, Preset, ResizeMode, Rotation, Settings,
    SettingsPatch, SizeUnit, TargetSize, Unit,
};
pub use workspace::Workspace;

/// Identifier handed out by the registry at ingestion. Never reused within
/// one registry, even after the record is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub(crate) u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of one batch apply. Failing items are collected here instead of
/// aborting the rest of the batch.
#[derive(Debug, Default)]
pub struct BatchStats {
    pub processed: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
    pub failures: Vec<(ImageId, String)>,
}

impl BatchStats {
    pub fn savings_percent(&self) -> f64 {
        if self.bytes_before == 0 {
            return 0.0;
        }
        let saved = self.bytes_before as f64 - self.bytes_after as f64;
        (saved / self.bytes_before as f64 * 100.0).clamp(0.0, 100.0)
    }
}

#[derive(Error, Debug)]
pub enum PixformError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported file type: {0}")]
    InvalidFileType(String),

    #[error("Registry is full ({0} images max)")]
    QuotaExceeded(usize),

    #[error("Failed to decode {name}: {reason}")]
    DecodeFailure { name: String, reason: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("No image with id {0}")]
    NotFound(ImageId),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Conversion service error: {0}")]
    Network(String),
}

pub type Result<T> = std::result::Result<T, PixformError>;

// pixform/src/processors/loader.rs
use crate::core::{PixformError, Result};
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::path::Path;

/// Decodes uploaded bytes into pixel data, with a dimension cap so a
/// malicious header cannot request an absurd allocation.
#[derive(Clone)]
pub struct Loader {
    max_dimensions: (u32, u32),
}

impl Loader {
    pub fn new() -> Self {
        Self {
            max_dimensions: (100_000, 100_000),
        }
    }

    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_dimensions = (width, height);
        self
    }

    pub fn decode(&self, name: &str, bytes: &[u8]) -> Result<DynamicImage> {
        log::debug!("decoding {} ({} bytes)", name, bytes.len());

        let image = image::load_from_memory(bytes).map_err(|e| PixformError::DecodeFailure {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        let (max_w, max_h) = self.max_dimensions;
        if width > max_w || height > max_h {
            return Err(PixformError::InvalidParameter(format!(
                "image dimensions {}x{} exceed maximum {}x{}",
                width, height, max_w, max_h
            )));
        }

        Ok(image)
    }

    /// Container format as reported by the magic bytes.
    pub fn sniff_format(&self, bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// MIME type a browser would attach to this file, derived from the
/// extension. Unknown extensions are rejected up front.
pub fn content_type_for_path(path: &Path) -> Result<&'static str> {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .map_err(|_| PixformError::InvalidFileType(path.display().to_string()))
}

// pixform/src/processors/mod.rs
mod encoder;
mod loader;
mod metadata;
mod transformer;

pub use encoder::{png_bytes, Encoder};
pub use loader::{content_type_for_path, Loader};
pub use metadata::ExifProbe;
pub use transformer::Transformer;

use crate::core::{Result, Settings};
use image::DynamicImage;

/// Result of running one image through the transform pipeline.
pub struct TransformOutput {
    pub image: DynamicImage,
    pub encoded: Vec<u8>,
}

/// Full per-image pipeline: orientation, resize, re-encode.
pub fn transform(image: &DynamicImage, settings: &Settings) -> Result<TransformOutput> {
    let transformed = Transformer::new(settings).transform(image);
    let (image, encoded) = Encoder::from_settings(settings).encode(transformed)?;
    Ok(TransformOutput { image, encoded })
}

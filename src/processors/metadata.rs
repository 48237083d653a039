// pixform/src/processors/metadata.rs
use crate::core::{PixformError, Result};
use exif::{Exif, Reader, Tag};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read-only EXIF access. Re-encoding always drops metadata, so the probe
/// exists to report what a source file carries, not to rewrite it.
#[derive(Default)]
pub struct ExifProbe;

impl ExifProbe {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&self, path: &Path) -> Result<Option<Exif>> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(&file);

        match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => Ok(Some(exif)),
            Err(exif::Error::NotFound(_)) => Ok(None),
            Err(e) => Err(PixformError::Processing(format!(
                "EXIF read error in {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub fn has_exif(&self, path: &Path) -> bool {
        self.read(path).ok().flatten().is_some()
    }

    /// Camera-facing subset of the fields, label/value pairs.
    pub fn summarize(&self, exif: &Exif) -> Vec<(String, String)> {
        const SHOWN: [Tag; 11] = [
            Tag::Make,
            Tag::Model,
            Tag::DateTimeOriginal,
            Tag::ExposureTime,
            Tag::FNumber,
            Tag::PhotographicSensitivity,
            Tag::FocalLength,
            Tag::Orientation,
            Tag::Software,
            Tag::Artist,
            Tag::Copyright,
        ];

        exif.fields()
            .filter(|field| SHOWN.contains(&field.tag))
            .map(|field| {
                (
                    field.tag.to_string(),
                    field.display_value().with_unit(exif).to_string(),
                )
            })
            .collect()
    }
}

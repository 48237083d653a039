// pixform/src/processors/transformer.rs
use crate::core::{Algorithm, ResizeMode, Rotation, Settings, Unit};
use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Geometry stage of the pipeline: orientation first, then resampling.
/// Target dimensions always refer to the final orientation.
pub struct Transformer {
    width: Option<u32>,
    height: Option<u32>,
    unit: Unit,
    mode: ResizeMode,
    scale: f32,
    algorithm: Algorithm,
    rotation: Rotation,
    flip_horizontal: bool,
    flip_vertical: bool,
}

impl Transformer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            unit: settings.unit,
            mode: settings.mode,
            scale: settings.scale,
            algorithm: settings.algorithm,
            rotation: settings.rotation,
            flip_horizontal: settings.flip_horizontal,
            flip_vertical: settings.flip_vertical,
        }
    }

    pub fn transform(&self, image: &DynamicImage) -> DynamicImage {
        let oriented = self.orient(image);

        let (current_w, current_h) = oriented.dimensions();
        let Some((target_w, target_h)) = self.resolve_target(current_w, current_h) else {
            return oriented;
        };

        if (target_w, target_h) == (current_w, current_h) {
            log::debug!("target equals current dimensions, skipping resample");
            return oriented;
        }

        log::debug!(
            "resampling {}x{} -> {}x{} ({:?})",
            current_w,
            current_h,
            target_w,
            target_h,
            self.mode
        );

        let filter = self.filter_type();
        match self.mode {
            ResizeMode::Fit => oriented.resize(target_w, target_h, filter),
            ResizeMode::Fill => oriented.resize_to_fill(target_w, target_h, filter),
            ResizeMode::Stretch => oriented.resize_exact(target_w, target_h, filter),
        }
    }

    fn orient(&self, image: &DynamicImage) -> DynamicImage {
        let mut oriented = match self.rotation {
            Rotation::None => image.clone(),
            Rotation::Cw90 => image.rotate90(),
            Rotation::Cw180 => image.rotate180(),
            Rotation::Cw270 => image.rotate270(),
        };

        if self.flip_horizontal {
            oriented = oriented.fliph();
        }
        if self.flip_vertical {
            oriented = oriented.flipv();
        }

        oriented
    }

    /// Target box in pixels, or None when nothing asks for a resize.
    /// A single given dimension derives the other from the source ratio;
    /// with neither set, the scale percentage drives both axes.
    fn resolve_target(&self, orig_w: u32, orig_h: u32) -> Option<(u32, u32)> {
        let (w, h) = match self.unit {
            Unit::Pixels => (self.width, self.height),
            Unit::Percent => (
                self.width
                    .map(|p| scaled(orig_w, f64::from(p) / 100.0)),
                self.height
                    .map(|p| scaled(orig_h, f64::from(p) / 100.0)),
            ),
        };

        match (w, h) {
            (Some(w), Some(h)) => Some((w.max(1), h.max(1))),
            (Some(w), None) => {
                let ratio = f64::from(w) / f64::from(orig_w);
                Some((w.max(1), scaled(orig_h, ratio)))
            }
            (None, Some(h)) => {
                let ratio = f64::from(h) / f64::from(orig_h);
                Some((scaled(orig_w, ratio), h.max(1)))
            }
            (None, None) => {
                if (self.scale - 100.0).abs() < f32::EPSILON {
                    return None;
                }
                let factor = f64::from(self.scale) / 100.0;
                Some((scaled(orig_w, factor), scaled(orig_h, factor)))
            }
        }
    }

    fn filter_type(&self) -> FilterType {
        match self.algorithm {
            Algorithm::Nearest => FilterType::Nearest,
            Algorithm::Bilinear => FilterType::Triangle,
            Algorithm::Bicubic => FilterType::CatmullRom,
        }
    }
}

fn scaled(value: u32, factor: f64) -> u32 {
    ((f64::from(value) * factor).round() as u32).max(1)
}

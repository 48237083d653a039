// pixform/src/core/settings.rs
use crate::core::{PixformError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Pixels,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// Largest size that fits inside the target box, aspect preserved.
    Fit,
    /// Exact target box, aspect preserved by cropping the overflow.
    Fill,
    /// Exact target box, aspect ignored.
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Nearest,
    Bilinear,
    Bicubic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
            OutputFormat::Gif => "gif",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
            OutputFormat::Gif => "image/gif",
        }
    }

    /// Whether the encoded output can carry an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, OutputFormat::Jpeg)
    }
}

/// Rotation in quarter turns, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Normalizes any multiple of 90 degrees, negative included.
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        if degrees % 90 != 0 {
            return Err(PixformError::InvalidParameter(format!(
                "rotation must be a multiple of 90 degrees, got {}",
                degrees
            )));
        }
        Ok(match degrees.rem_euclid(360) {
            0 => Rotation::None,
            90 => Rotation::Cw90,
            180 => Rotation::Cw180,
            _ => Rotation::Cw270,
        })
    }

    /// True when the rotation swaps width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Cw90 | Rotation::Cw270)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Kb,
    Mb,
}

/// Requested ceiling for the encoded output size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub value: u32,
    pub unit: SizeUnit,
}

impl TargetSize {
    pub fn bytes(self) -> u64 {
        match self.unit {
            SizeUnit::Kb => u64::from(self.value) * 1024,
            SizeUnit::Mb => u64::from(self.value) * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Web,
    Social,
    Thumbnail,
    Print,
    Custom,
}

impl Preset {
    /// Fixed target dimensions, or None for `Custom`.
    pub fn dimensions(self) -> Option<(u32, u32)> {
        match self {
            Preset::Web => Some((1920, 1080)),
            Preset::Social => Some((1080, 1080)),
            Preset::Thumbnail => Some((300, 300)),
            Preset::Print => Some((2480, 3508)),
            Preset::Custom => None,
        }
    }
}

/// One transformation configuration. A value snapshot: the workspace holds
/// the live copy and every processed record keeps the copy applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub unit: Unit,
    pub lock_aspect: bool,
    pub mode: ResizeMode,
    pub scale: f32,
    pub algorithm: Algorithm,
    pub target_size: Option<TargetSize>,
    pub quality: u8,
    pub format: OutputFormat,
    pub keep_alpha: bool,
    pub background: [u8; 3],
    pub keep_metadata: bool,
    pub rotation: Rotation,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            unit: Unit::Pixels,
            lock_aspect: true,
            mode: ResizeMode::Fit,
            scale: 100.0,
            algorithm: Algorithm::Bicubic,
            target_size: None,
            quality: 85,
            format: OutputFormat::Jpeg,
            keep_alpha: true,
            background: [255, 255, 255],
            keep_metadata: false,
            rotation: Rotation::None,
            flip_horizontal: false,
            flip_vertical: false,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.width.unwrap_or(0) > 100_000 || self.height.unwrap_or(0) > 100_000 {
            return Err(PixformError::InvalidParameter(
                "dimensions too large (max 100,000 pixels)".to_string(),
            ));
        }

        if self.quality > 100 {
            return Err(PixformError::InvalidParameter(
                "quality must be between 0 and 100".to_string(),
            ));
        }

        if !(self.scale > 0.0 && self.scale <= 10_000.0) {
            return Err(PixformError::InvalidParameter(
                "scale must be between 0 and 10,000 percent".to_string(),
            ));
        }

        Ok(())
    }
}

/// Partial update merged into a [`Settings`] snapshot. `None` leaves the
/// field alone; the double option on dimensions distinguishes "untouched"
/// from "cleared".
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub width: Option<Option<u32>>,
    pub height: Option<Option<u32>>,
    pub unit: Option<Unit>,
    pub lock_aspect: Option<bool>,
    pub mode: Option<ResizeMode>,
    pub scale: Option<f32>,
    pub algorithm: Option<Algorithm>,
    pub target_size: Option<Option<TargetSize>>,
    pub quality: Option<u8>,
    pub format: Option<OutputFormat>,
    pub keep_alpha: Option<bool>,
    pub background: Option<String>,
    pub keep_metadata: Option<bool>,
    pub rotation: Option<Rotation>,
    pub flip_horizontal: Option<bool>,
    pub flip_vertical: Option<bool>,
}

/// Merges `patch` into `settings`. `ratio` is the width/height ratio of the
/// first selected image; with aspect-lock on and exactly one dimension in
/// the patch, the other dimension is recomputed from it. No selection, no
/// recompute.
pub fn apply_patch(settings: &mut Settings, patch: SettingsPatch, ratio: Option<f64>) {
    if let Some(unit) = patch.unit {
        settings.unit = unit;
    }
    if let Some(lock) = patch.lock_aspect {
        settings.lock_aspect = lock;
    }

    let width_changed = patch.width.is_some();
    let height_changed = patch.height.is_some();

    if let Some(width) = patch.width {
        settings.width = width;
    }
    if let Some(height) = patch.height {
        settings.height = height;
    }

    if settings.lock_aspect && width_changed != height_changed {
        match settings.unit {
            Unit::Pixels => {
                if let Some(ratio) = ratio {
                    if width_changed {
                        settings.height = settings
                            .width
                            .map(|w| ((f64::from(w) / ratio).round() as u32).max(1));
                    } else {
                        settings.width = settings
                            .height
                            .map(|h| ((f64::from(h) * ratio).round() as u32).max(1));
                    }
                }
            }
            // Equal percentages preserve the ratio by construction.
            Unit::Percent => {
                if width_changed {
                    settings.height = settings.width;
                } else {
                    settings.width = settings.height;
                }
            }
        }
    }

    if let Some(mode) = patch.mode {
        settings.mode = mode;
    }
    if let Some(scale) = patch.scale {
        settings.scale = scale;
    }
    if let Some(algorithm) = patch.algorithm {
        settings.algorithm = algorithm;
    }
    if let Some(target_size) = patch.target_size {
        settings.target_size = target_size;
    }
    if let Some(quality) = patch.quality {
        settings.quality = quality.min(100);
    }
    if let Some(format) = patch.format {
        settings.format = format;
    }
    if let Some(keep_alpha) = patch.keep_alpha {
        settings.keep_alpha = keep_alpha;
    }
    if let Some(ref hex) = patch.background {
        match parse_hex_color(hex) {
            Some(rgb) => settings.background = rgb,
            // Malformed input keeps the previous color.
            None => log::warn!("ignoring invalid background color {:?}", hex),
        }
    }
    if let Some(keep_metadata) = patch.keep_metadata {
        settings.keep_metadata = keep_metadata;
    }
    if let Some(rotation) = patch.rotation {
        settings.rotation = rotation;
    }
    if let Some(flip) = patch.flip_horizontal {
        settings.flip_horizontal = flip;
    }
    if let Some(flip) = patch.flip_vertical {
        settings.flip_vertical = flip;
    }
}

/// Applies a named preset. Everything except `Custom` pins both dimensions
/// in pixels and releases the aspect lock.
pub fn apply_preset(settings: &mut Settings, preset: Preset) {
    if let Some((width, height)) = preset.dimensions() {
        settings.width = Some(width);
        settings.height = Some(height);
        settings.unit = Unit::Pixels;
        settings.lock_aspect = false;
    }
}

/// Parses a 3- or 6-digit hex color, with or without the leading `#`.
pub fn parse_hex_color(input: &str) -> Option<[u8; 3]> {
    let digits = input.strip_prefix('#').unwrap_or(input);

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    match digits.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in digits.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 16 + v;
            }
            Some(rgb)
        }
        6 => {
            let mut rgb = [0u8; 3];
            for (i, chunk) in digits.as_bytes().chunks(2).enumerate() {
                let s = std::str::from_utf8(chunk).ok()?;
                rgb[i] = u8::from_str_radix(s, 16).ok()?;
            }
            Some(rgb)
        }
        _ => None,
    }
}

// pixform/src/processors/encoder.rs
use crate::core::{OutputFormat, PixformError, Result, Settings};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use oxipng::{optimize_from_memory, Options};
use std::io::Cursor;

// Lowest quality the target-size search will fall to.
const QUALITY_FLOOR: u8 = 10;
const QUALITY_STEP: u8 = 10;

/// Final stage of the pipeline: alpha handling and encoding to the output
/// format. Quality drives the jpeg encoder; the webp encoder in `image` is
/// lossless, and png goes through oxipng instead.
pub struct Encoder {
    format: OutputFormat,
    quality: u8,
    keep_alpha: bool,
    background: [u8; 3],
    target_bytes: Option<u64>,
    optimize_png: bool,
}

impl Encoder {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            format: settings.format,
            quality: settings.quality.clamp(1, 100),
            keep_alpha: settings.keep_alpha,
            background: settings.background,
            target_bytes: settings.target_size.map(|t| t.bytes()),
            optimize_png: true,
        }
    }

    pub fn with_png_optimization(mut self, optimize: bool) -> Self {
        self.optimize_png = optimize;
        self
    }

    /// Encodes `image`, returning the (possibly flattened) pixels together
    /// with the encoded bytes.
    pub fn encode(&self, image: DynamicImage) -> Result<(DynamicImage, Vec<u8>)> {
        let image = if self.format.supports_alpha() && self.keep_alpha {
            image
        } else {
            flatten(&image, self.background)
        };

        let encoded = match self.format {
            OutputFormat::Jpeg => self.encode_jpeg(&image)?,
            OutputFormat::Png => self.encode_png(&image)?,
            OutputFormat::WebP => write_with(&image, ImageFormat::WebP)?,
            OutputFormat::Gif => write_with(&image, ImageFormat::Gif)?,
        };

        if let Some(target) = self.target_bytes {
            if encoded.len() as u64 > target {
                log::warn!(
                    "encoded output is {} bytes, above the {} byte target",
                    encoded.len(),
                    target
                );
            }
        }

        Ok((image, encoded))
    }

    /// Encodes at the configured quality; with a target size set, walks the
    /// quality down until the output fits or the floor is reached.
    fn encode_jpeg(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let rgb = image.to_rgb8();

        let mut quality = self.quality;
        loop {
            let encoded = jpeg_bytes(&rgb, quality)?;

            let fits = match self.target_bytes {
                Some(target) => encoded.len() as u64 <= target,
                None => true,
            };
            if fits || quality <= QUALITY_FLOOR {
                return Ok(encoded);
            }

            quality = quality.saturating_sub(QUALITY_STEP).max(QUALITY_FLOOR);
            log::debug!("output above target size, retrying at quality {}", quality);
        }
    }

    fn encode_png(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let plain = write_with(image, ImageFormat::Png)?;
        if !self.optimize_png {
            return Ok(plain);
        }

        optimize_from_memory(&plain, &Options::default())
            .map_err(|e| PixformError::Encoding(format!("PNG optimization failed: {}", e)))
    }
}

fn jpeg_bytes(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut cursor, quality).encode_image(rgb)?;
    Ok(cursor.into_inner())
}

fn write_with(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, format)?;
    Ok(cursor.into_inner())
}

/// Unoptimized PNG bytes, used for payloads of records that were never
/// run through the pipeline.
pub fn png_bytes(image: &DynamicImage) -> Result<Vec<u8>> {
    write_with(image, ImageFormat::Png)
}

/// Composites over a solid background, discarding the alpha channel.
fn flatten(image: &DynamicImage, background: [u8; 3]) -> DynamicImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut flat = RgbImage::new(width, height);
    for (out, pixel) in flat.pixels_mut().zip(rgba.pixels()) {
        let alpha = u16::from(pixel[3]);
        for channel in 0..3 {
            let fg = u16::from(pixel[channel]) * alpha;
            let bg = u16::from(background[channel]) * (255 - alpha);
            out[channel] = ((fg + bg) / 255) as u8;
        }
    }

    DynamicImage::ImageRgb8(flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8, 255])
        }))
    }

    fn settings_for(format: OutputFormat) -> Settings {
        Settings {
            format,
            ..Settings::default()
        }
    }

    #[test]
    fn jpeg_quality_changes_output_size() {
        let image = gradient(64, 64);
        let rgb = image.to_rgb8();

        let high = jpeg_bytes(&rgb, 95).unwrap();
        let low = jpeg_bytes(&rgb, 10).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn jpeg_round_trips_through_the_decoder() {
        let encoder = Encoder::from_settings(&settings_for(OutputFormat::Jpeg));
        let (image, encoded) = encoder.encode(gradient(32, 16)).unwrap();

        let decoded = image::load_from_memory(&encoded).unwrap();
        assert_eq!(decoded.dimensions(), (32, 16));
        assert_eq!(image.dimensions(), (32, 16));
    }

    #[test]
    fn jpeg_discards_alpha_via_background() {
        // fully transparent pixel over a red background
        let rgba = RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 0]));
        let mut settings = settings_for(OutputFormat::Jpeg);
        settings.background = [255, 0, 0];

        let encoder = Encoder::from_settings(&settings);
        let (image, _) = encoder.encode(DynamicImage::ImageRgba8(rgba)).unwrap();

        let pixel = image.to_rgb8().get_pixel(0, 0).0;
        assert_eq!(pixel, [255, 0, 0]);
    }

    #[test]
    fn png_keeps_alpha_by_default() {
        let rgba = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 128]));
        let encoder =
            Encoder::from_settings(&settings_for(OutputFormat::Png)).with_png_optimization(false);
        let (_, encoded) = encoder.encode(DynamicImage::ImageRgba8(rgba)).unwrap();

        let decoded = image::load_from_memory(&encoded).unwrap();
        assert_eq!(decoded.to_rgba8().get_pixel(0, 0)[3], 128);
    }

    #[test]
    fn png_flattens_when_alpha_is_discarded() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 0]));
        let mut settings = settings_for(OutputFormat::Png);
        settings.keep_alpha = false;
        settings.background = [10, 20, 30];

        let encoder = Encoder::from_settings(&settings).with_png_optimization(false);
        let (image, _) = encoder.encode(DynamicImage::ImageRgba8(rgba)).unwrap();
        assert_eq!(image.to_rgb8().get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn half_alpha_blends_with_background() {
        let flat = flatten(
            &DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 128]))),
            [0, 0, 0],
        );
        let pixel = flat.to_rgb8().get_pixel(0, 0).0;
        // 255 * 128/255 rounds down to 128
        assert_eq!(pixel, [128, 128, 128]);
    }

    #[test]
    fn target_size_walks_quality_down() {
        use crate::core::{SizeUnit, TargetSize};

        let mut settings = settings_for(OutputFormat::Jpeg);
        settings.quality = 95;
        settings.target_size = Some(TargetSize {
            value: 1,
            unit: SizeUnit::Kb,
        });

        let encoder = Encoder::from_settings(&settings);
        let (_, constrained) = encoder.encode(gradient(64, 64)).unwrap();

        let unconstrained = Encoder::from_settings(&settings_for(OutputFormat::Jpeg))
            .encode(gradient(64, 64))
            .unwrap()
            .1;
        // the search cannot guarantee the target, but it must not give up
        // before reaching the floor
        assert!(constrained.len() <= unconstrained.len());
    }

    #[test]
    fn webp_and_gif_outputs_decode_back() {
        for format in [OutputFormat::WebP, OutputFormat::Gif] {
            let encoder = Encoder::from_settings(&settings_for(format));
            let (_, encoded) = encoder.encode(gradient(16, 16)).unwrap();
            let decoded = image::load_from_memory(&encoded).unwrap();
            assert_eq!(decoded.dimensions(), (16, 16));
        }
    }
}

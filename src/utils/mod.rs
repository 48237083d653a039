// pixform/src/utils/mod.rs
use crate::core::{PixformError, Result, SizeUnit, TargetSize};
use std::path::Path;

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = (bytes_f64.log10() / base.log10()).floor() as i32;
    let exponent = exponent.min(UNITS.len() as i32 - 1);
    let size = bytes_f64 / base.powi(exponent);

    format!("{:.2} {}", size, UNITS[exponent as usize])
}

pub fn calculate_aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        0.0
    } else {
        width as f32 / height as f32
    }
}

/// Parses a target size argument like `500kb`, `2mb` or a bare kilobyte
/// count.
pub fn parse_target_size(input: &str) -> Result<TargetSize> {
    let lower = input.trim().to_lowercase();

    let (digits, unit) = if let Some(d) = lower.strip_suffix("kb") {
        (d, SizeUnit::Kb)
    } else if let Some(d) = lower.strip_suffix("mb") {
        (d, SizeUnit::Mb)
    } else {
        (lower.as_str(), SizeUnit::Kb)
    };

    let value: u32 = digits.trim().parse().map_err(|_| {
        PixformError::InvalidParameter(format!("cannot parse target size {:?}", input))
    })?;

    if value == 0 {
        return Err(PixformError::InvalidParameter(
            "target size must be positive".to_string(),
        ));
    }

    Ok(TargetSize { value, unit })
}

pub fn is_supported_format(path: &Path) -> bool {
    let extensions = ["jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp"];

    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn sanitize_filename(filename: &str) -> String {
    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
    filename
        .chars()
        .map(|c| if invalid_chars.contains(&c) { '_' } else { c })
        .collect()
}

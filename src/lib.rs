mod cli;
mod convert;
mod core;
mod processors;
mod utils;

pub use cli::{AlgorithmArg, Cli, Commands, FormatArg, ModeArg, PresetArg, ProcessCmd};
pub use convert::{
    data_url, ConvertOptions, ConvertRequest, ConvertResponse, Orientation, PageSize,
};
pub use crate::core::{
    parse_hex_color, Algorithm, BatchStats, ImageId, ImageRecord, ImageRegistry, OutputFormat,
    PixformError, Preset, RegistryEvent, ResizeMode, Result, Rotation, Settings, SettingsPatch,
    SizeUnit, TargetSize, Unit, Workspace, REGISTRY_CAPACITY,
};
pub use processors::{Encoder, ExifProbe, Loader, Transformer};
pub use utils::{
    calculate_aspect_ratio, format_file_size, is_supported_format, parse_target_size,
};

pub mod prelude {
    pub use crate::{
        ConvertOptions, OutputFormat, Preset, ResizeMode, Settings, SettingsPatch, Workspace,
    };
}

// Re-export commonly used types
pub use image::DynamicImage;

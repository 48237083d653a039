// pixform/src/cli.rs
use crate::core::{Algorithm, OutputFormat, Preset, ResizeMode};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pixform", version, about = "Batch image resizer and format converter")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resize, transform and re-encode a batch of images
    Process(ProcessCmd),

    /// Print dimensions, format and metadata of one image
    Info { input: PathBuf },

    /// List the built-in dimension presets
    Presets,
}

#[derive(Args)]
pub struct ProcessCmd {
    /// Input files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory the processed images are written to
    #[arg(short, long)]
    pub output: PathBuf,

    /// Recurse into input directories
    #[arg(short, long)]
    pub recursive: bool,

    /// Start from a named dimension preset
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Target width
    #[arg(long)]
    pub width: Option<u32>,

    /// Target height
    #[arg(long)]
    pub height: Option<u32>,

    /// Treat width/height as percentages of the source dimensions
    #[arg(long)]
    pub percent: bool,

    /// How target dimensions reconcile with the source aspect ratio
    #[arg(long, value_enum, default_value_t = ModeArg::Fit)]
    pub mode: ModeArg,

    /// Scale percentage, used when no dimensions are given
    #[arg(long)]
    pub scale: Option<f32>,

    /// Resampling algorithm
    #[arg(long, value_enum, default_value_t = AlgorithmArg::Bicubic)]
    pub algorithm: AlgorithmArg,

    /// Encoding quality (jpeg)
    #[arg(short, long, default_value_t = 85)]
    pub quality: u8,

    /// Output format (defaults to jpg)
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Background hex color used when transparency is dropped
    #[arg(long)]
    pub background: Option<String>,

    /// Drop the alpha channel and composite over the background
    #[arg(long)]
    pub flatten: bool,

    /// Rotation in degrees, any multiple of 90
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub rotate: i32,

    /// Mirror horizontally
    #[arg(long)]
    pub flip_horizontal: bool,

    /// Mirror vertically
    #[arg(long)]
    pub flip_vertical: bool,

    /// Ask to keep EXIF metadata (re-encoding cannot honor this yet)
    #[arg(long)]
    pub keep_metadata: bool,

    /// Target output size per image, e.g. 500kb or 2mb
    #[arg(long)]
    pub target_size: Option<String>,

    /// Worker threads for the batch (0 = rayon default)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Fit,
    Fill,
    Stretch,
}

impl From<ModeArg> for ResizeMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Fit => ResizeMode::Fit,
            ModeArg::Fill => ResizeMode::Fill,
            ModeArg::Stretch => ResizeMode::Stretch,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlgorithmArg {
    Nearest,
    Bilinear,
    Bicubic,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Nearest => Algorithm::Nearest,
            AlgorithmArg::Bilinear => Algorithm::Bilinear,
            AlgorithmArg::Bicubic => Algorithm::Bicubic,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Jpg,
    Png,
    Webp,
    Gif,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpg => OutputFormat::Jpeg,
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Webp => OutputFormat::WebP,
            FormatArg::Gif => OutputFormat::Gif,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PresetArg {
    Web,
    Social,
    Thumbnail,
    Print,
    Custom,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Web => Preset::Web,
            PresetArg::Social => Preset::Social,
            PresetArg::Thumbnail => Preset::Thumbnail,
            PresetArg::Print => Preset::Print,
            PresetArg::Custom => Preset::Custom,
        }
    }
}

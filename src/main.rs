use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use pixform::{
    calculate_aspect_ratio, format_file_size, is_supported_format, parse_target_size, Cli,
    Commands, ExifProbe, Loader, PixformError, Preset, ProcessCmd, Rotation, SettingsPatch, Unit,
    Workspace,
};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match cli.command {
        Commands::Process(cmd) => process(cmd),
        Commands::Info { input } => info(&input),
        Commands::Presets => {
            presets();
            Ok(())
        }
    }
}

fn process(cmd: ProcessCmd) -> anyhow::Result<()> {
    if cmd.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cmd.threads)
            .build_global()
            .context("failed to size the worker pool")?;
    }

    let paths = collect_inputs(&cmd.inputs, cmd.recursive)?;
    anyhow::ensure!(!paths.is_empty(), "no image files found in the given inputs");

    let mut workspace = Workspace::new();
    configure(&mut workspace, &cmd)?;

    let probe = ExifProbe::new();
    let bar = progress_bar(paths.len());
    let mut skipped = Vec::new();

    for (index, path) in paths.iter().enumerate() {
        match workspace.ingest_file(path) {
            Ok(_) => {
                if cmd.keep_metadata && probe.has_exif(path) {
                    log::warn!("{}: EXIF metadata is dropped on re-encode", path.display());
                }
            }
            Err(e @ PixformError::QuotaExceeded(_)) => {
                log::warn!("{}; skipping the remaining inputs", e);
                skipped.extend(paths[index..].iter().cloned());
                break;
            }
            Err(e) => {
                log::warn!("cannot ingest {}: {}", path.display(), e);
                skipped.push(path.clone());
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    let stats = workspace.apply_to_all()?;
    let written = workspace.export_processed(&cmd.output)?;

    println!(
        "Processed {} images to: {}",
        written.len(),
        cmd.output.display()
    );
    if stats.bytes_before > 0 {
        println!(
            "Size: {} -> {} ({:.1}% saved)",
            format_file_size(stats.bytes_before),
            format_file_size(stats.bytes_after),
            stats.savings_percent()
        );
    }

    if !skipped.is_empty() {
        println!("Skipped {} input(s):", skipped.len());
        for path in &skipped {
            println!("  {}", path.display());
        }
    }
    for (id, reason) in &stats.failures {
        eprintln!("failed to process {}: {}", id, reason);
    }

    Ok(())
}

/// Translates CLI flags into the settings snapshot: preset first, explicit
/// flags override.
fn configure(workspace: &mut Workspace, cmd: &ProcessCmd) -> anyhow::Result<()> {
    if let Some(preset) = cmd.preset {
        workspace.apply_preset(preset.into());
    }

    let target_size = match &cmd.target_size {
        Some(raw) => Some(Some(parse_target_size(raw)?)),
        None => None,
    };

    workspace.update_settings(SettingsPatch {
        width: cmd.width.map(Some),
        height: cmd.height.map(Some),
        unit: cmd.percent.then_some(Unit::Percent),
        lock_aspect: None,
        mode: Some(cmd.mode.into()),
        scale: cmd.scale,
        algorithm: Some(cmd.algorithm.into()),
        target_size,
        quality: Some(cmd.quality),
        format: cmd.format.map(Into::into),
        keep_alpha: Some(!cmd.flatten),
        background: cmd.background.clone(),
        keep_metadata: Some(cmd.keep_metadata),
        rotation: Some(Rotation::from_degrees(cmd.rotate)?),
        flip_horizontal: Some(cmd.flip_horizontal),
        flip_vertical: Some(cmd.flip_vertical),
    });

    Ok(())
}

fn collect_inputs(inputs: &[PathBuf], recursive: bool) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let walker = if recursive {
                WalkDir::new(input)
            } else {
                WalkDir::new(input).max_depth(1)
            };

            for entry in walker.into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() && is_supported_format(entry.path()) {
                    paths.push(entry.into_path());
                }
            }
        } else if input.exists() {
            paths.push(input.clone());
        } else {
            anyhow::bail!("input does not exist: {}", input.display());
        }
    }

    paths.sort();
    Ok(paths)
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );
    bar
}

fn info(input: &Path) -> anyhow::Result<()> {
    anyhow::ensure!(input.exists(), "file does not exist: {}", input.display());

    let bytes = std::fs::read(input)?;
    let format = Loader::new()
        .sniff_format(&bytes)
        .map(|f| format!("{:?}", f))
        .unwrap_or_else(|| "Unknown".to_string());
    let (width, height) = image::image_dimensions(input)?;

    let probe = ExifProbe::new();
    let exif = probe.read(input).unwrap_or(None);

    println!("=== Image Information ===");
    println!("File: {}", input.display());
    println!("Size: {}", format_file_size(bytes.len() as u64));
    println!("Dimensions: {} x {} pixels", width, height);
    println!("Aspect Ratio: {:.2}", calculate_aspect_ratio(width, height));
    println!("Format: {}", format);
    println!("Has EXIF metadata: {}", exif.is_some());

    if let Some(exif) = exif {
        println!("\n=== EXIF Metadata ===");
        for (label, value) in probe.summarize(&exif) {
            println!("{:25}: {}", label, value);
        }
    }

    Ok(())
}

fn presets() {
    println!("Available presets:");
    for (preset, name) in [
        (Preset::Web, "web"),
        (Preset::Social, "social"),
        (Preset::Thumbnail, "thumbnail"),
        (Preset::Print, "print"),
    ] {
        let (width, height) = preset.dimensions().expect("fixed preset");
        println!("  {:10} {} x {}", name, width, height);
    }
    println!("  {:10} keeps the current settings", "custom");
}

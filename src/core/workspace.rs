// pixform/src/core/workspace.rs
use crate::convert::{data_url, ConvertOptions, ConvertRequest};
use crate::core::registry::RegistryEvent;
use crate::core::{
    settings, BatchStats, ImageId, ImageRegistry, PixformError, Preset, Result, Settings,
    SettingsPatch,
};
use crate::processors;
use crate::utils::sanitize_filename;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Owns the full pipeline state: the image registry, the ordered selection,
/// and the current settings snapshot. All operations go through here; there
/// is no shared global state.
#[derive(Default)]
pub struct Workspace {
    registry: ImageRegistry,
    selection: Vec<ImageId>,
    settings: Settings,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ImageRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Selection order is insertion order; the first entry drives the
    /// aspect-lock ratio and PDF page order.
    pub fn selection(&self) -> &[ImageId] {
        &self.selection
    }

    pub fn on_change(&mut self, observer: impl Fn(&RegistryEvent) + 'static) {
        self.registry.subscribe(observer);
    }

    pub fn ingest_bytes(&mut self, name: &str, content_type: &str, bytes: &[u8]) -> Result<ImageId> {
        self.registry.ingest_bytes(name, content_type, bytes)
    }

    /// Reads a file from disk, inferring the content type from its
    /// extension the way a browser would attach one.
    pub fn ingest_file(&mut self, path: &Path) -> Result<ImageId> {
        let content_type = processors::content_type_for_path(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        let bytes = std::fs::read(path)?;
        self.registry.ingest_bytes(&name, content_type, &bytes)
    }

    pub fn remove(&mut self, id: ImageId) -> Result<()> {
        self.registry.remove(id)?;
        self.selection.retain(|&s| s != id);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.registry.clear();
        self.selection.clear();
    }

    pub fn select(&mut self, id: ImageId) -> Result<()> {
        if !self.registry.contains(id) {
            return Err(PixformError::NotFound(id));
        }
        if !self.selection.contains(&id) {
            self.selection.push(id);
        }
        Ok(())
    }

    pub fn deselect(&mut self, id: ImageId) {
        self.selection.retain(|&s| s != id);
    }

    pub fn select_all(&mut self) {
        self.selection = self.registry.ids();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Merges a partial settings update. The aspect-lock recompute uses the
    /// ratio of the first selected image and is skipped with no selection.
    pub fn update_settings(&mut self, patch: SettingsPatch) {
        let ratio = self
            .selection
            .first()
            .and_then(|&id| self.registry.get(id))
            .map(|record| record.aspect_ratio());
        settings::apply_patch(&mut self.settings, patch, ratio);
    }

    pub fn apply_preset(&mut self, preset: Preset) {
        settings::apply_preset(&mut self.settings, preset);
    }

    pub fn apply_to_selected(&mut self) -> Result<BatchStats> {
        let ids = self.selection.clone();
        let settings = self.settings.clone();
        self.apply_with(&ids, &settings)
    }

    pub fn apply_to_all(&mut self) -> Result<BatchStats> {
        let ids = self.registry.ids();
        let settings = self.settings.clone();
        self.apply_with(&ids, &settings)
    }

    /// Applies `settings` to each id. Items run as independent parallel
    /// jobs; results are committed in id-list order. A failing item is
    /// collected in the stats and never aborts the rest of the batch.
    pub fn apply_with(&mut self, ids: &[ImageId], settings: &Settings) -> Result<BatchStats> {
        let mut stats = BatchStats::default();

        if ids.is_empty() {
            return Ok(stats);
        }

        settings.validate()?;

        let mut jobs = Vec::new();
        for &id in ids {
            match self.registry.get(id) {
                Some(record) => jobs.push((id, record.original().clone(), record.original_size())),
                None => stats
                    .failures
                    .push((id, PixformError::NotFound(id).to_string())),
            }
        }

        let results: Vec<_> = jobs
            .into_par_iter()
            .map(|(id, image, size_before)| {
                let result = processors::transform(&image, settings);
                (id, size_before, result)
            })
            .collect();

        for (id, size_before, result) in results {
            match result {
                Ok(output) => {
                    stats.processed += 1;
                    stats.bytes_before += size_before;
                    stats.bytes_after += output.encoded.len() as u64;
                    self.registry.commit(id, output, settings.clone())?;
                }
                Err(e) => {
                    log::warn!("transform of {} failed: {}", id, e);
                    stats.failures.push((id, e.to_string()));
                }
            }
        }

        Ok(stats)
    }

    /// Writes the encoded output of every processed record into `dir`,
    /// deduplicating file names with a numeric suffix.
    pub fn export_processed(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for record in self.registry.records() {
            let (Some(encoded), Some(applied)) = (record.encoded(), record.applied_settings())
            else {
                continue;
            };

            let stem = Path::new(record.name())
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("image");
            let stem = sanitize_filename(stem);
            let extension = applied.format.extension();

            let mut path = dir.join(format!("{stem}.{extension}"));
            let mut counter = 1;
            while path.exists() {
                path = dir.join(format!("{stem}_{counter}.{extension}"));
                counter += 1;
            }

            std::fs::write(&path, encoded)?;
            written.push(path);
        }

        Ok(written)
    }

    /// Builds the request payload for the remote PDF conversion service,
    /// pages ordered by `ids`.
    pub fn pdf_request(&self, ids: &[ImageId], options: ConvertOptions) -> Result<ConvertRequest> {
        let mut images = Vec::with_capacity(ids.len());
        for &id in ids {
            let record = self.registry.get(id).ok_or(PixformError::NotFound(id))?;
            let payload = match (record.encoded(), record.applied_settings()) {
                (Some(bytes), Some(applied)) => data_url(applied.format.mime_type(), bytes),
                _ => data_url("image/png", &processors::png_bytes(record.current())?),
            };
            images.push(payload);
        }
        Ok(ConvertRequest::new(images, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OutputFormat, ResizeMode, Rotation};
    use image::DynamicImage;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([200, 100, 50, 255]),
        ));
        let mut cursor = std::io::Cursor::new(Vec::new());
        img.write_to(&mut cursor, image::ImageFormat::Png).unwrap();
        cursor.into_inner()
    }

    fn workspace_with(dims: &[(u32, u32)]) -> (Workspace, Vec<ImageId>) {
        let mut ws = Workspace::new();
        let ids = dims
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| {
                ws.ingest_bytes(&format!("{i}.png"), "image/png", &png_bytes(w, h))
                    .unwrap()
            })
            .collect();
        (ws, ids)
    }

    #[test]
    fn removal_prunes_selection() {
        let (mut ws, ids) = workspace_with(&[(4, 4), (6, 6)]);
        ws.select(ids[0]).unwrap();
        ws.select(ids[1]).unwrap();

        ws.remove(ids[0]).unwrap();
        assert_eq!(ws.selection(), &[ids[1]]);

        ws.clear();
        assert!(ws.selection().is_empty());
        assert!(ws.registry().is_empty());
    }

    #[test]
    fn select_requires_live_record() {
        let (mut ws, ids) = workspace_with(&[(4, 4)]);
        ws.remove(ids[0]).unwrap();
        assert!(ws.select(ids[0]).is_err());
    }

    #[test]
    fn selecting_twice_keeps_one_entry() {
        let (mut ws, ids) = workspace_with(&[(4, 4)]);
        ws.select(ids[0]).unwrap();
        ws.select(ids[0]).unwrap();
        assert_eq!(ws.selection().len(), 1);
    }

    #[test]
    fn aspect_lock_uses_first_selected_image() {
        let (mut ws, ids) = workspace_with(&[(800, 600), (100, 100)]);
        ws.select(ids[0]).unwrap();
        ws.select(ids[1]).unwrap();

        ws.update_settings(SettingsPatch {
            width: Some(Some(400)),
            ..Default::default()
        });

        // ratio comes from the 800x600 image, not the square one
        assert_eq!(ws.settings().height, Some(300));
    }

    #[test]
    fn empty_selection_apply_is_a_noop() {
        let (mut ws, ids) = workspace_with(&[(10, 10)]);
        let stats = ws.apply_to_selected().unwrap();

        assert_eq!(stats.processed, 0);
        assert!(stats.failures.is_empty());
        assert!(!ws.registry().get(ids[0]).unwrap().is_processed());
    }

    #[test]
    fn social_preset_with_fill_yields_exact_square() {
        let (mut ws, ids) = workspace_with(&[(800, 600)]);
        ws.apply_preset(Preset::Social);
        ws.update_settings(SettingsPatch {
            mode: Some(ResizeMode::Fill),
            ..Default::default()
        });

        let stats = ws.apply_to_all().unwrap();
        assert_eq!(stats.processed, 1);

        let record = ws.registry().get(ids[0]).unwrap();
        assert_eq!(record.current_dimensions(), (1080, 1080));
        assert_eq!(record.original_dimensions(), (800, 600));
        assert!(record.is_processed());
        assert_eq!(record.applied_settings().unwrap().width, Some(1080));
    }

    #[test]
    fn missing_id_fails_alone_without_aborting_batch() {
        let (mut ws, ids) = workspace_with(&[(20, 20)]);
        let dead = ids[0];
        ws.remove(dead).unwrap();
        let live = ws.ingest_bytes("live.png", "image/png", &png_bytes(20, 20)).unwrap();

        let settings = Settings::default();
        let stats = ws.apply_with(&[dead, live], &settings).unwrap();

        assert_eq!(stats.processed, 1);
        assert_eq!(stats.failures.len(), 1);
        assert_eq!(stats.failures[0].0, dead);
        assert!(ws.registry().get(live).unwrap().is_processed());
    }

    #[test]
    fn rotation_swaps_current_dimensions() {
        let (mut ws, ids) = workspace_with(&[(40, 20)]);
        ws.update_settings(SettingsPatch {
            rotation: Some(Rotation::Cw90),
            ..Default::default()
        });

        ws.apply_to_all().unwrap();
        let record = ws.registry().get(ids[0]).unwrap();
        assert_eq!(record.current_dimensions(), (20, 40));
    }

    #[test]
    fn reapplying_transforms_from_the_original() {
        let (mut ws, ids) = workspace_with(&[(100, 50)]);
        ws.update_settings(SettingsPatch {
            scale: Some(50.0),
            ..Default::default()
        });

        ws.apply_to_all().unwrap();
        ws.apply_to_all().unwrap();

        // 50% twice is still 50% of the original, not 25%
        let record = ws.registry().get(ids[0]).unwrap();
        assert_eq!(record.current_dimensions(), (50, 25));
    }

    #[test]
    fn export_writes_only_processed_records() {
        let (mut ws, ids) = workspace_with(&[(8, 8), (9, 9)]);
        ws.select(ids[0]).unwrap();
        ws.apply_to_selected().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let written = ws.export_processed(dir.path()).unwrap();

        assert_eq!(written.len(), 1);
        let name = written[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with(".jpg"), "unexpected export name {name}");
    }

    #[test]
    fn pdf_request_orders_pages_by_id_list() {
        let (mut ws, ids) = workspace_with(&[(4, 4), (6, 6)]);
        ws.update_settings(SettingsPatch {
            format: Some(OutputFormat::Png),
            ..Default::default()
        });
        ws.apply_to_all().unwrap();

        let request = ws
            .pdf_request(&[ids[1], ids[0]], ConvertOptions::default())
            .unwrap();
        assert_eq!(request.images.len(), 2);
        assert!(request.images[0].starts_with("data:image/png;base64,"));
    }
}

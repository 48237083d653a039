// pixform/src/core/registry.rs
use crate::core::{ImageId, PixformError, Result, Settings};
use crate::processors::{Loader, TransformOutput};
use image::{DynamicImage, GenericImageView};

/// Hard ceiling on the number of live records.
pub const REGISTRY_CAPACITY: usize = 50;

/// One ingested image: the immutable original plus its current transformed
/// state. `current_*` always reflect the most recently applied transform.
pub struct ImageRecord {
    id: ImageId,
    name: String,
    original: DynamicImage,
    original_width: u32,
    original_height: u32,
    original_size: u64,
    current: DynamicImage,
    current_width: u32,
    current_height: u32,
    current_size: u64,
    encoded: Option<Vec<u8>>,
    applied: Option<Settings>,
    processed: bool,
}

impl ImageRecord {
    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn original(&self) -> &DynamicImage {
        &self.original
    }

    pub fn original_dimensions(&self) -> (u32, u32) {
        (self.original_width, self.original_height)
    }

    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    pub fn current(&self) -> &DynamicImage {
        &self.current
    }

    pub fn current_dimensions(&self) -> (u32, u32) {
        (self.current_width, self.current_height)
    }

    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Encoded output of the last apply, if any.
    pub fn encoded(&self) -> Option<&[u8]> {
        self.encoded.as_deref()
    }

    /// The settings snapshot that produced the current state.
    pub fn applied_settings(&self) -> Option<&Settings> {
        self.applied.as_ref()
    }

    pub fn is_processed(&self) -> bool {
        self.processed
    }

    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.original_width) / f64::from(self.original_height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEvent {
    Ingested(ImageId),
    Updated(ImageId),
    Removed(ImageId),
    Cleared,
}

type Observer = Box<dyn Fn(&RegistryEvent)>;

/// Bounded in-memory store for uploaded images. Mutations notify registered
/// observers so a rendering layer can re-draw from the registry.
#[derive(Default)]
pub struct ImageRegistry {
    records: Vec<ImageRecord>,
    next_id: u64,
    observers: Vec<Observer>,
    loader: Loader,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl Fn(&RegistryEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&self, event: RegistryEvent) {
        for observer in &self.observers {
            observer(&event);
        }
    }

    /// Decodes `bytes` and appends a new record with `current = original`.
    /// The registry is left untouched on any failure.
    pub fn ingest_bytes(&mut self, name: &str, content_type: &str, bytes: &[u8]) -> Result<ImageId> {
        if !content_type.starts_with("image/") {
            return Err(PixformError::InvalidFileType(content_type.to_string()));
        }

        if self.records.len() >= REGISTRY_CAPACITY {
            return Err(PixformError::QuotaExceeded(REGISTRY_CAPACITY));
        }

        let decoded = self.loader.decode(name, bytes)?;
        let (width, height) = (decoded.width(), decoded.height());

        let id = ImageId(self.next_id);
        self.next_id += 1;

        log::debug!("ingested {} as {} ({}x{})", name, id, width, height);

        self.records.push(ImageRecord {
            id,
            name: name.to_string(),
            current: decoded.clone(),
            original: decoded,
            original_width: width,
            original_height: height,
            original_size: bytes.len() as u64,
            current_width: width,
            current_height: height,
            current_size: bytes.len() as u64,
            encoded: None,
            applied: None,
            processed: false,
        });

        self.notify(RegistryEvent::Ingested(id));
        Ok(id)
    }

    pub fn remove(&mut self, id: ImageId) -> Result<()> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(PixformError::NotFound(id))?;
        self.records.remove(index);
        self.notify(RegistryEvent::Removed(id));
        Ok(())
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.notify(RegistryEvent::Cleared);
    }

    pub fn get(&self, id: ImageId) -> Option<&ImageRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: ImageId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> Vec<ImageId> {
        self.records.iter().map(|r| r.id).collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter()
    }

    /// Writes a transform result back into the record.
    pub(crate) fn commit(
        &mut self,
        id: ImageId,
        output: TransformOutput,
        settings: Settings,
    ) -> Result<()> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(PixformError::NotFound(id))?;

        record.current_width = output.image.width();
        record.current_height = output.image.height();
        record.current_size = output.encoded.len() as u64;
        record.current = output.image;
        record.encoded = Some(output.encoded);
        record.applied = Some(settings);
        record.processed = true;

        self.notify(RegistryEvent::Updated(id));
        Ok(())
    }
}

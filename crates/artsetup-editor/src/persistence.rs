//! Boundaries to the external persistence and image services.
//!
//! The editor only talks to these traits. Every call is async and may fail;
//! failures are reported, never retried here.

use artsetup_core::{
    ArtworkId, ArtworkMetadata, ImageDimensions, ImageRef, ModelError, PlacementDefaults,
    PlacementRecord, RecordId, Scenario, ScenarioId, ScenarioPrompt,
};
use std::future::Future;

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10_000_000;

const IMAGE_TYPES: &[&str] = &["jpeg", "jpg", "png", "gif"];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PersistenceError {
    #[error("record {0} not found")]
    NotFound(RecordId),

    #[error("stale write to {id}: stored version {stored}, attempted {attempted}")]
    StaleWrite { id: RecordId, stored: u64, attempted: u64 },

    #[error("upload rejected: {0}")]
    UploadRejected(String),

    #[error("persistence service unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

// ─── Uploads ──────────────────────────────────────────────────────────────

/// An image file as received from the upload form.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Lower-cased file extension, without the dot.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        (!stem.is_empty() && !ext.is_empty()).then(|| ext.to_ascii_lowercase())
    }

    /// Images only: both the extension and the mime type must name a
    /// jpeg, png, or gif, and the file must fit in [`MAX_UPLOAD_BYTES`].
    pub fn validate(&self) -> Result<(), PersistenceError> {
        let ext_ok = self
            .extension()
            .is_some_and(|ext| IMAGE_TYPES.contains(&ext.as_str()));
        let mime_ok = self
            .mime_type
            .to_ascii_lowercase()
            .strip_prefix("image/")
            .is_some_and(|sub| IMAGE_TYPES.contains(&sub));
        if !(ext_ok && mime_ok) {
            return Err(PersistenceError::UploadRejected(format!(
                "images only ({}, {})",
                self.file_name, self.mime_type
            )));
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(PersistenceError::UploadRejected(format!(
                "{} is {} bytes, limit is {MAX_UPLOAD_BYTES}",
                self.file_name,
                self.bytes.len()
            )));
        }
        Ok(())
    }
}

/// Everything the upload form supplies besides the file itself.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArtwork {
    pub metadata: ArtworkMetadata,
    /// Natural pixel size of the uploaded image.
    pub natural: ImageDimensions,
    pub placement: PlacementDefaults,
}

impl NewArtwork {
    pub fn new(metadata: ArtworkMetadata, natural: ImageDimensions) -> Self {
        Self {
            metadata,
            natural,
            placement: PlacementDefaults::default(),
        }
    }

    /// Build the initial record once the store has assigned an id and
    /// stored the image.
    pub fn into_record(self, id: ArtworkId, image: ImageRef) -> Result<PlacementRecord, ModelError> {
        self.metadata.validate()?;
        Ok(PlacementRecord::create(id, self.natural, &self.placement)?
            .with_metadata(self.metadata)
            .with_image(image))
    }
}

// ─── Service traits ───────────────────────────────────────────────────────

/// A listed record with the version of its last accepted save (0 if it
/// was never updated).
#[derive(Debug, Clone, PartialEq)]
pub struct StoredArtwork {
    pub record: PlacementRecord,
    pub version: u64,
}

impl StoredArtwork {
    pub fn new(record: PlacementRecord, version: u64) -> Self {
        Self { record, version }
    }
}

pub trait ArtworkStore: Send + Sync + 'static {
    fn list(&self) -> impl Future<Output = Result<Vec<StoredArtwork>, PersistenceError>> + Send;

    fn create(
        &self,
        artwork: NewArtwork,
        upload: ImageUpload,
    ) -> impl Future<Output = Result<PlacementRecord, PersistenceError>> + Send;

    /// Persist the full merged record. `version` increases with every save
    /// of the same id, continuing from the version `list` reported; stores
    /// may reject versions not newer than what they hold.
    fn update(
        &self,
        id: ArtworkId,
        version: u64,
        record: PlacementRecord,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;

    fn delete(&self, id: ArtworkId) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

pub trait ScenarioStore: Send + Sync + 'static {
    fn list(&self) -> impl Future<Output = Result<Vec<Scenario>, PersistenceError>> + Send;

    /// The scenario is named after the uploaded file.
    fn create(&self, upload: ImageUpload) -> impl Future<Output = Result<Scenario, PersistenceError>> + Send;

    fn delete(&self, id: ScenarioId) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

/// Text-to-image service used to generate scenario backgrounds.
pub trait ImageGenerator: Send + Sync + 'static {
    fn generate(
        &self,
        prompt: &ScenarioPrompt,
    ) -> impl Future<Output = Result<Vec<u8>, PersistenceError>> + Send;
}

// ─── Save outcomes ────────────────────────────────────────────────────────

/// Result of one debounced save, delivered on the session's event channel.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceEvent {
    Saved { id: ArtworkId, version: u64 },
    Failed { id: ArtworkId, version: u64, error: PersistenceError },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, mime: &str, len: usize) -> ImageUpload {
        ImageUpload::new(name, mime, vec![0; len])
    }

    #[test]
    fn accepts_common_image_types() {
        assert!(upload("a.png", "image/png", 10).validate().is_ok());
        assert!(upload("b.JPG", "image/jpeg", 10).validate().is_ok());
        assert!(upload("c.gif", "image/gif", 10).validate().is_ok());
    }

    #[test]
    fn rejects_mismatched_or_foreign_types() {
        assert!(upload("a.pdf", "application/pdf", 10).validate().is_err());
        assert!(upload("a.png", "text/plain", 10).validate().is_err());
        assert!(upload("a.webp", "image/png", 10).validate().is_err());
        assert!(upload("png", "image/png", 10).validate().is_err());
    }

    #[test]
    fn rejects_oversized_files() {
        assert_eq!(MAX_UPLOAD_BYTES, 10_000_000);
        assert!(upload("big.png", "image/png", MAX_UPLOAD_BYTES).validate().is_ok());
        assert!(matches!(
            upload("big.png", "image/png", MAX_UPLOAD_BYTES + 1).validate(),
            Err(PersistenceError::UploadRejected(_))
        ));
    }

    #[test]
    fn new_artwork_needs_valid_metadata() {
        let new = NewArtwork::new(ArtworkMetadata::default(), ImageDimensions::new(10.0, 10.0));
        assert!(matches!(
            new.into_record(RecordId::intern("nope"), ImageRef::default()),
            Err(ModelError::InvalidValue { field: "metadata.title", .. })
        ));
    }
}

//! In-process stores.
//!
//! Used by the CLI's replay mode and by tests. They behave like the real
//! service as far as the editor can observe: ids and image references are
//! assigned on create, unknown ids are `NotFound`, and uploads are validated.
//! On top of that they reject out-of-order saves, keep a log of every
//! accepted save, and can be told to fail upcoming calls.

use crate::persistence::*;
use artsetup_core::{ArtworkId, ImageRef, PlacementRecord, RecordId, Scenario, ScenarioId, ScenarioPrompt};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// One accepted `update` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveLogEntry {
    pub id: ArtworkId,
    pub version: u64,
    pub record: PlacementRecord,
}

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn image_ref(field: &str, n: u64, upload: &ImageUpload) -> ImageRef {
    let ext = upload.extension().unwrap_or_else(|| "bin".to_string());
    ImageRef::new(format!("/api/uploads/{field}-{n}.{ext}"))
}

// ─── Artworks ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct ArtworkTable {
    records: Vec<PlacementRecord>,
    versions: HashMap<ArtworkId, u64>,
    saves: Vec<SaveLogEntry>,
    failures: VecDeque<PersistenceError>,
    uploads: u64,
}

#[derive(Default)]
pub struct MemoryArtworkStore {
    table: Mutex<ArtworkTable>,
    latency: Duration,
}

impl MemoryArtworkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `records`, in order.
    pub fn with_records(records: impl IntoIterator<Item = PlacementRecord>) -> Self {
        let store = Self::default();
        guard(&store.table).records.extend(records);
        store
    }

    /// Delay every call by `latency` before it touches the table.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the next call fail with `error`. Queued failures are consumed
    /// one per call, in order.
    pub fn fail_next(&self, error: PersistenceError) {
        guard(&self.table).failures.push_back(error);
    }

    /// Current stored records.
    pub fn records(&self) -> Vec<PlacementRecord> {
        guard(&self.table).records.clone()
    }

    pub fn get(&self, id: ArtworkId) -> Option<PlacementRecord> {
        guard(&self.table).records.iter().find(|r| r.id == id).cloned()
    }

    /// Every accepted save, oldest first.
    pub fn save_log(&self) -> Vec<SaveLogEntry> {
        guard(&self.table).saves.clone()
    }

    async fn enter(&self) -> Result<MutexGuard<'_, ArtworkTable>, PersistenceError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let mut table = guard(&self.table);
        match table.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(table),
        }
    }
}

impl ArtworkStore for MemoryArtworkStore {
    async fn list(&self) -> Result<Vec<StoredArtwork>, PersistenceError> {
        let table = self.enter().await?;
        Ok(table
            .records
            .iter()
            .map(|r| StoredArtwork::new(r.clone(), table.versions.get(&r.id).copied().unwrap_or(0)))
            .collect())
    }

    async fn create(&self, artwork: NewArtwork, upload: ImageUpload) -> Result<PlacementRecord, PersistenceError> {
        upload.validate()?;
        let mut table = self.enter().await?;
        table.uploads += 1;
        let image = image_ref("artworkImage", table.uploads, &upload);
        let record = artwork.into_record(RecordId::with_prefix("artwork"), image)?;
        log::info!("stored artwork {} ({})", record.id, record.image.as_str());
        table.records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: ArtworkId, version: u64, record: PlacementRecord) -> Result<(), PersistenceError> {
        let mut table = self.enter().await?;
        let idx = table
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(PersistenceError::NotFound(id))?;
        let stored = table.versions.get(&id).copied().unwrap_or(0);
        if version <= stored {
            return Err(PersistenceError::StaleWrite {
                id,
                stored,
                attempted: version,
            });
        }
        table.versions.insert(id, version);
        table.records[idx] = record.clone();
        table.saves.push(SaveLogEntry { id, version, record });
        Ok(())
    }

    async fn delete(&self, id: ArtworkId) -> Result<(), PersistenceError> {
        let mut table = self.enter().await?;
        let idx = table
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(PersistenceError::NotFound(id))?;
        table.records.remove(idx);
        table.versions.remove(&id);
        log::info!("deleted artwork {id}");
        Ok(())
    }
}

// ─── Scenarios ────────────────────────────────────────────────────────────

#[derive(Default)]
struct ScenarioTable {
    scenarios: Vec<Scenario>,
    failures: VecDeque<PersistenceError>,
    uploads: u64,
}

#[derive(Default)]
pub struct MemoryScenarioStore {
    table: Mutex<ScenarioTable>,
}

impl MemoryScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, error: PersistenceError) {
        guard(&self.table).failures.push_back(error);
    }

    pub fn scenarios(&self) -> Vec<Scenario> {
        guard(&self.table).scenarios.clone()
    }

    fn enter(&self) -> Result<MutexGuard<'_, ScenarioTable>, PersistenceError> {
        let mut table = guard(&self.table);
        match table.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(table),
        }
    }
}

impl ScenarioStore for MemoryScenarioStore {
    async fn list(&self) -> Result<Vec<Scenario>, PersistenceError> {
        Ok(self.enter()?.scenarios.clone())
    }

    async fn create(&self, upload: ImageUpload) -> Result<Scenario, PersistenceError> {
        upload.validate()?;
        let mut table = self.enter()?;
        table.uploads += 1;
        let scenario = Scenario {
            id: RecordId::with_prefix("scenario"),
            name: upload.file_name.clone(),
            image: image_ref("scenarioImage", table.uploads, &upload),
        };
        log::info!("stored scenario {} ({})", scenario.id, scenario.name);
        table.scenarios.push(scenario.clone());
        Ok(scenario)
    }

    async fn delete(&self, id: ScenarioId) -> Result<(), PersistenceError> {
        let mut table = self.enter()?;
        let idx = table
            .scenarios
            .iter()
            .position(|s| s.id == id)
            .ok_or(PersistenceError::NotFound(id))?;
        table.scenarios.remove(idx);
        Ok(())
    }
}

// ─── Image generation ─────────────────────────────────────────────────────

/// Generator that answers every prompt with the same image bytes and
/// remembers what it was asked.
#[derive(Default)]
pub struct MemoryImageGenerator {
    image: Vec<u8>,
    prompts: Mutex<Vec<String>>,
}

impl MemoryImageGenerator {
    pub fn new(image: Vec<u8>) -> Self {
        Self {
            image,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        guard(&self.prompts).clone()
    }
}

impl ImageGenerator for MemoryImageGenerator {
    async fn generate(&self, prompt: &ScenarioPrompt) -> Result<Vec<u8>, PersistenceError> {
        guard(&self.prompts).push(prompt.as_str().to_string());
        if self.image.is_empty() {
            return Err(PersistenceError::Unavailable("no image configured".into()));
        }
        Ok(self.image.clone())
    }
}

//! Editor session: the state behind the canvas.
//!
//! A session owns the undo/redo timeline, the selection, the set of
//! artworks staged on the canvas, and the debounced saver. Edits are
//! synchronous: they merge into the current snapshot, commit it to history,
//! and arm a save for the touched record. Saves complete in the background
//! and report through the event channel returned by [`EditorSession::new`].
//!
//! Undo and redo only move through history. They neither schedule nor
//! cancel saves, so the persisted record may lag behind what is on screen
//! until the next edit of that artwork.

use crate::config::EditorConfig;
use crate::debounce::{Debouncer, SaveSink};
use crate::history::History;
use crate::persistence::*;
use artsetup_core::*;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

// ─── Save sink ────────────────────────────────────────────────────────────

/// Forwards debounced records to an [`ArtworkStore`] and reports outcomes.
pub struct StoreSink<S> {
    store: Arc<S>,
    events: mpsc::UnboundedSender<PersistenceEvent>,
}

impl<S: ArtworkStore> SaveSink<ArtworkId, PlacementRecord> for StoreSink<S> {
    async fn send(&self, id: ArtworkId, version: u64, record: PlacementRecord) {
        let event = match self.store.update(id, version, record).await {
            Ok(()) => {
                log::debug!("saved {id} v{version}");
                PersistenceEvent::Saved { id, version }
            }
            Err(error) => {
                log::warn!("save of {id} v{version} failed: {error}");
                PersistenceEvent::Failed { id, version, error }
            }
        };
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }
}

// ─── Session ──────────────────────────────────────────────────────────────

/// Live edits between `begin_gesture` and `end_gesture`.
struct Gesture {
    depth: usize,
    before: Snapshot,
    live: Snapshot,
    label: &'static str,
}

pub struct EditorSession<S: ArtworkStore> {
    store: Arc<S>,
    config: EditorConfig,
    history: History<Snapshot>,
    gesture: Option<Gesture>,
    selection: Option<ArtworkId>,
    staged: HashSet<ArtworkId>,
    saves: Debouncer<ArtworkId, PlacementRecord, StoreSink<S>>,
}

impl<S: ArtworkStore> EditorSession<S> {
    /// Start an empty session. Saves are spawned on the current Tokio
    /// runtime, so edits must happen inside one.
    pub fn new(store: Arc<S>, config: EditorConfig) -> (Self, mpsc::UnboundedReceiver<PersistenceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Arc::new(StoreSink {
            store: Arc::clone(&store),
            events: tx,
        });
        let session = Self {
            store,
            history: History::with_limit(Snapshot::empty(), config.history_limit),
            saves: Debouncer::new(config.save_debounce(), sink),
            config,
            gesture: None,
            selection: None,
            staged: HashSet::new(),
        };
        (session, rx)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn history(&self) -> &History<Snapshot> {
        &self.history
    }

    /// What is on screen right now, including an open gesture's edits.
    pub fn current(&self) -> &Snapshot {
        match &self.gesture {
            Some(g) => &g.live,
            None => self.history.current(),
        }
    }

    // ─── Loading ──────────────────────────────────────────────────────────

    /// Fetch every artwork and start a fresh timeline from them. Save
    /// versions pick up where the store left off.
    pub async fn load(&mut self) -> Result<(), SessionError> {
        let stored = self.store.list().await?;
        let mut records = Vec::with_capacity(stored.len());
        for StoredArtwork { record, version } in stored {
            self.saves.prime(record.id, version);
            records.push(record);
        }
        self.load_records(records)
    }

    pub fn load_records(&mut self, records: Vec<PlacementRecord>) -> Result<(), SessionError> {
        let snapshot = Snapshot::from_records(records)?;
        log::info!("loaded {} artworks", snapshot.len());
        self.history.reset(snapshot);
        self.gesture = None;
        self.selection = None;
        self.staged.clear();
        Ok(())
    }

    // ─── Edits ────────────────────────────────────────────────────────────

    /// Merge `patch` into one artwork, record it, and arm its save.
    /// An empty patch changes nothing and records nothing.
    pub fn update_artwork(&mut self, id: ArtworkId, patch: &PlacementPatch) -> Result<Arc<PlacementRecord>, SessionError> {
        if patch.is_empty() {
            return self
                .current()
                .get_shared(id)
                .ok_or_else(|| ModelError::UnknownRecord(id).into());
        }
        let (next, merged) = self.current().with_updated(id, patch)?;
        self.apply(next, patch.describe());
        self.saves.schedule(id, PlacementRecord::clone(&merged));
        Ok(merged)
    }

    /// Same as [`update_artwork`](Self::update_artwork) for an untyped UI
    /// payload. Any unrecognised key rejects the whole update.
    pub fn update_artwork_json(&mut self, id: ArtworkId, payload: &Value) -> Result<Arc<PlacementRecord>, SessionError> {
        let patch = PlacementPatch::from_json(payload)?;
        self.update_artwork(id, &patch)
    }

    /// Put transform, frame, and mat back to their defaults.
    pub fn reset_artwork(&mut self, id: ArtworkId) -> Result<(), SessionError> {
        let record = self.current().get(id).ok_or(ModelError::UnknownRecord(id))?;
        let reset = reset_transform(record);
        let next = self.current().with_replaced(reset.clone())?;
        self.apply(next, "reset");
        self.saves.schedule(id, reset);
        Ok(())
    }

    /// Move an artwork in z-order. Returns false when already in place.
    pub fn reorder(&mut self, id: ArtworkId, order: ZOrder) -> Result<bool, SessionError> {
        match self.current().with_reordered(id, order)? {
            Some(next) => {
                self.apply(next, "reorder");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Upload a new artwork. The store assigns its id and image reference;
    /// start geometry comes from the session's config.
    pub async fn create_artwork(&mut self, mut artwork: NewArtwork, upload: ImageUpload) -> Result<PlacementRecord, SessionError> {
        artwork.placement = self.config.placement;
        let record = self.store.create(artwork, upload).await?;
        let next = self.current().with_added(record.clone())?;
        self.apply(next, "add");
        Ok(record)
    }

    /// Delete from the store, then locally. A failed delete leaves the
    /// session untouched.
    pub async fn delete_artwork(&mut self, id: ArtworkId) -> Result<(), SessionError> {
        if !self.current().contains(id) {
            return Err(ModelError::UnknownRecord(id).into());
        }
        if let Err(error) = self.store.delete(id).await {
            log::warn!("delete of {id} failed: {error}");
            return Err(error.into());
        }
        self.saves.cancel(&id);
        let next = self.current().with_removed(id)?;
        self.apply(next, "delete");
        self.staged.remove(&id);
        if self.selection == Some(id) {
            self.selection = None;
        }
        Ok(())
    }

    fn apply(&mut self, next: Snapshot, label: &'static str) {
        match &mut self.gesture {
            Some(g) => {
                g.live = next;
                g.label = label;
            }
            None => self.history.commit_described(next, label),
        }
    }

    // ─── Gestures ─────────────────────────────────────────────────────────

    /// Open a gesture (e.g. a drag). Edits until the matching
    /// [`end_gesture`](Self::end_gesture) are shown and saved as usual but
    /// enter history as a single entry. Gestures nest.
    pub fn begin_gesture(&mut self) {
        match &mut self.gesture {
            Some(g) => g.depth += 1,
            None => {
                let before = self.history.current().clone();
                self.gesture = Some(Gesture {
                    depth: 1,
                    live: before.clone(),
                    before,
                    label: "edit",
                });
            }
        }
    }

    /// Close a gesture. When the outermost one closes and the snapshot
    /// changed, one history entry is recorded. Returns whether it was.
    pub fn end_gesture(&mut self) -> bool {
        let Some(g) = &mut self.gesture else {
            return false;
        };
        g.depth -= 1;
        if g.depth > 0 {
            return false;
        }
        let Some(g) = self.gesture.take() else {
            return false;
        };
        if g.live == g.before {
            return false;
        }
        self.history.commit_described(g.live, g.label);
        true
    }

    fn close_gestures(&mut self) {
        if let Some(g) = &mut self.gesture {
            g.depth = 1;
            self.end_gesture();
        }
    }

    // ─── History ──────────────────────────────────────────────────────────

    /// Step back. An open gesture is closed first.
    pub fn undo(&mut self) -> &Snapshot {
        self.close_gestures();
        self.history.undo()
    }

    pub fn redo(&mut self) -> &Snapshot {
        self.close_gestures();
        self.history.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Selection & staging ──────────────────────────────────────────────

    pub fn select(&mut self, id: ArtworkId) -> Result<(), SessionError> {
        if !self.current().contains(id) {
            return Err(ModelError::UnknownRecord(id).into());
        }
        self.selection = Some(id);
        Ok(())
    }

    /// Select the topmost staged artwork under a canvas point.
    pub fn select_at(&mut self, x: f64, y: f64) -> Option<ArtworkId> {
        let on_canvas = Snapshot::from_records(self.staged_artworks().into_iter().cloned()).ok()?;
        let hit = hit_test(&on_canvas, x, y);
        self.selection = hit;
        hit
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// The selection, if it still exists in the current snapshot.
    pub fn selected(&self) -> Option<ArtworkId> {
        self.selection.filter(|id| self.current().contains(*id))
    }

    /// Put an artwork on the canvas or take it off. Returns whether it is
    /// staged afterwards.
    pub fn toggle_staged(&mut self, id: ArtworkId) -> Result<bool, SessionError> {
        if !self.current().contains(id) {
            return Err(ModelError::UnknownRecord(id).into());
        }
        if self.staged.remove(&id) {
            if self.selection == Some(id) {
                self.selection = None;
            }
            Ok(false)
        } else {
            self.staged.insert(id);
            Ok(true)
        }
    }

    /// Staged ids in z-order.
    pub fn staged(&self) -> Vec<ArtworkId> {
        self.current().ids().filter(|id| self.staged.contains(id)).collect()
    }

    pub fn staged_artworks(&self) -> Vec<&PlacementRecord> {
        self.current()
            .iter()
            .filter(|r| self.staged.contains(&r.id))
            .collect()
    }

    /// Take the selected artwork off the canvas and clear the selection.
    /// The artwork itself is kept.
    pub fn discard_selected(&mut self) -> Option<ArtworkId> {
        let id = self.selection.take()?;
        self.staged.remove(&id);
        Some(id)
    }

    /// Render plans for everything on the canvas, bottom to top.
    pub fn render_plans(&self) -> Vec<RenderPlan> {
        self.staged_artworks()
            .into_iter()
            .map(derive_render_transform)
            .collect()
    }

    // ─── Saves ────────────────────────────────────────────────────────────

    /// Send every armed save now. Returns how many were sent.
    pub async fn flush_saves(&self) -> usize {
        self.saves.flush().await
    }

    pub fn pending_saves(&self) -> usize {
        self.saves.pending()
    }
}

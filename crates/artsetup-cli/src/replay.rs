//! `--replay`: run a scripted editing session against an in-memory store.
//!
//! Script shape:
//!
//! ```json
//! { "documents": [ ...stored artwork documents... ],
//!   "ops": [ { "op": "update", "id": "a1", "patch": { "transform3d": { "scale": 2 } } },
//!            { "op": "wait", "ms": 1200 },
//!            { "op": "undo" } ] }
//! ```

use artsetup_core::{ArtworkDocument, ArtworkId, ZOrder};
use artsetup_editor::{EditorConfig, EditorSession, MemoryArtworkStore, PersistenceEvent};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub documents: Vec<ArtworkDocument>,
    pub ops: Vec<Op>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Op {
    Update { id: ArtworkId, patch: Value },
    Reset { id: ArtworkId },
    Undo,
    Redo,
    Reorder { id: ArtworkId, order: ZOrder },
    Delete { id: ArtworkId },
    Wait { ms: u64 },
}

/// Run `script` and return the final snapshot and the store's save log as
/// pretty JSON, both in stored-document shape.
///
/// # Errors
/// Returns a message naming the first op that failed.
pub async fn run(script: &str, config: EditorConfig) -> Result<String, String> {
    let script: Script = serde_json::from_str(script).map_err(|e| format!("invalid script: {e}"))?;
    let records = script
        .documents
        .iter()
        .map(ArtworkDocument::to_record)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid document: {e}"))?;

    let store = Arc::new(MemoryArtworkStore::with_records(records));
    let (mut session, mut events) = EditorSession::new(Arc::clone(&store), config);
    session.load().await.map_err(|e| e.to_string())?;

    for (n, op) in script.ops.into_iter().enumerate() {
        log::debug!("op {n}: {op:?}");
        let result = match op {
            Op::Update { id, patch } => session.update_artwork_json(id, &patch).map(|_| ()),
            Op::Reset { id } => session.reset_artwork(id),
            Op::Undo => {
                session.undo();
                Ok(())
            }
            Op::Redo => {
                session.redo();
                Ok(())
            }
            Op::Reorder { id, order } => session.reorder(id, order).map(|_| ()),
            Op::Delete { id } => session.delete_artwork(id).await,
            Op::Wait { ms } => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(())
            }
        };
        result.map_err(|e| format!("op {n}: {e}"))?;
    }

    let flushed = session.flush_saves().await;
    log::info!("flushed {flushed} pending saves");
    while let Ok(event) = events.try_recv() {
        if let PersistenceEvent::Failed { id, version, error } = event {
            log::warn!("save {id} v{version} failed: {error}");
        }
    }

    let snapshot: Vec<ArtworkDocument> = session.current().iter().map(ArtworkDocument::from_record).collect();
    let saves: Vec<Value> = store
        .save_log()
        .iter()
        .map(|entry| {
            json!({
                "id": entry.id,
                "version": entry.version,
                "document": ArtworkDocument::from_record(&entry.record),
            })
        })
        .collect();
    serde_json::to_string_pretty(&json!({ "snapshot": snapshot, "saves": saves })).map_err(|e| e.to_string())
}

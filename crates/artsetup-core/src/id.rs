//! Record identifiers.
//!
//! Artwork and scenario ids are assigned by the persistence service and show
//! up in every snapshot, save, and history entry, so they are interned once
//! into a process-wide table and passed around as 4-byte handles.
//!
//! Interned ids live for the rest of the process; the table never shrinks.
//! That is bounded by the number of distinct records a process ever sees,
//! which for an editor session is the size of one collection. Use
//! [`RecordId::lookup`] to resolve untrusted text without adding to it.

use lasso::{Spur, ThreadedRodeo};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

static IDS: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Identifier of a persisted record, as issued by the store.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(Spur);

/// Identifier of an artwork placement record.
pub type ArtworkId = RecordId;

/// Identifier of a scenario (background room image).
pub type ScenarioId = RecordId;

impl RecordId {
    pub fn intern(id: &str) -> Self {
        RecordId(IDS.get_or_intern(id))
    }

    /// The id for `text` if it was interned before. Never grows the table.
    pub fn lookup(text: &str) -> Option<Self> {
        IDS.get(text).map(RecordId)
    }

    pub fn as_str(&self) -> &str {
        IDS.resolve(&self.0)
    }

    /// Fresh `{prefix}_{n}` id for stores with no database to assign one.
    pub fn with_prefix(prefix: &str) -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Blank ids are rejected rather than interned.
impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.trim().is_empty() {
            return Err(D::Error::custom("record id must not be blank"));
        }
        Ok(RecordId::intern(&text))
    }
}

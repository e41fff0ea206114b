//! Linear undo/redo over whole-collection snapshots.
//!
//! The timeline is a list of snapshots plus a cursor. Committing while the
//! cursor sits before the end discards the abandoned future first, so the
//! timeline never branches. Undo/redo only move the cursor; past either end
//! they are no-ops.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
struct Entry<T> {
    snapshot: T,
    description: String,
}

#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<Entry<T>>,
    /// Always `< entries.len()`.
    index: usize,
    /// Maximum timeline length. `None` keeps everything.
    limit: Option<usize>,
}

impl<T: Default> Default for History<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> History<T> {
    /// Single-entry timeline holding `initial`.
    pub fn new(initial: T) -> Self {
        Self::with_limit(initial, None)
    }

    /// A limit below 1 is treated as 1: the current snapshot is never evicted.
    pub fn with_limit(initial: T, limit: Option<usize>) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(Entry {
            snapshot: initial,
            description: "load".to_string(),
        });
        Self {
            entries,
            index: 0,
            limit: limit.map(|l| l.max(1)),
        }
    }

    pub fn commit(&mut self, snapshot: T) {
        self.commit_described(snapshot, "edit");
    }

    /// Record `snapshot` after the cursor, dropping any redo entries.
    pub fn commit_described(&mut self, snapshot: T, description: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push_back(Entry {
            snapshot,
            description: description.to_string(),
        });
        if let Some(limit) = self.limit {
            while self.entries.len() > limit {
                self.entries.pop_front();
            }
        }
        self.index = self.entries.len() - 1;
        log::debug!("history commit `{description}` ({} entries)", self.entries.len());
    }

    /// Step back one entry. At the start this returns the current snapshot
    /// unchanged.
    pub fn undo(&mut self) -> &T {
        if self.can_undo() {
            self.index -= 1;
        }
        self.current()
    }

    /// Step forward one entry. At the end this returns the current snapshot
    /// unchanged.
    pub fn redo(&mut self) -> &T {
        if self.can_redo() {
            self.index += 1;
        }
        self.current()
    }

    pub fn current(&self) -> &T {
        &self.entries[self.index].snapshot
    }

    /// Replace the whole timeline with `snapshot` at index 0.
    pub fn reset(&mut self, snapshot: T) {
        self.entries.clear();
        self.entries.push_back(Entry {
            snapshot,
            description: "load".to_string(),
        });
        self.index = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: a timeline always holds the current snapshot.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Label of the entry that `undo` would leave.
    pub fn undo_description(&self) -> Option<&str> {
        self.can_undo()
            .then(|| self.entries[self.index].description.as_str())
    }

    /// Label of the entry that `redo` would enter.
    pub fn redo_description(&self) -> Option<&str> {
        self.can_redo()
            .then(|| self.entries[self.index + 1].description.as_str())
    }
}

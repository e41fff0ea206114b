//! Immutable collection snapshots.
//!
//! A `Snapshot` is every artwork's editor state at one point in time, in
//! z-order (later records draw on top). Records are held behind `Arc` so an
//! edit that touches one record shares all the others with the previous
//! snapshot instead of copying them.

use crate::error::ModelError;
use crate::id::ArtworkId;
use crate::model::PlacementRecord;
use crate::patch::PlacementPatch;
use crate::placement::apply_partial_update;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// Z-order moves within a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZOrder {
    /// One step toward the top (swap with the next record).
    Forward,
    /// One step toward the bottom (swap with the previous record).
    Backward,
    Front,
    Back,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    records: Vec<Arc<PlacementRecord>>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// # Errors
    /// `DuplicateId` if two records share an id.
    pub fn from_records(records: impl IntoIterator<Item = PlacementRecord>) -> Result<Self, ModelError> {
        let mut snapshot = Snapshot::empty();
        for record in records {
            if snapshot.contains(record.id) {
                return Err(ModelError::DuplicateId(record.id));
            }
            snapshot.records.push(Arc::new(record));
        }
        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: ArtworkId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: ArtworkId) -> Option<&PlacementRecord> {
        self.records.iter().find(|r| r.id == id).map(|r| r.as_ref())
    }

    /// Shared handle to a record, for callers that outlive the snapshot.
    pub fn get_shared(&self, id: ArtworkId) -> Option<Arc<PlacementRecord>> {
        self.records.iter().find(|r| r.id == id).cloned()
    }

    /// Records bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &PlacementRecord> {
        self.records.iter().map(|r| r.as_ref())
    }

    pub fn ids(&self) -> impl Iterator<Item = ArtworkId> + '_ {
        self.records.iter().map(|r| r.id)
    }

    fn position(&self, id: ArtworkId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    fn index_of(&self, id: ArtworkId) -> Result<usize, ModelError> {
        self.position(id).ok_or(ModelError::UnknownRecord(id))
    }

    /// Append a record on top.
    pub fn with_added(&self, record: PlacementRecord) -> Result<Self, ModelError> {
        if self.contains(record.id) {
            return Err(ModelError::DuplicateId(record.id));
        }
        let mut records = self.records.clone();
        records.push(Arc::new(record));
        Ok(Self { records })
    }

    pub fn with_removed(&self, id: ArtworkId) -> Result<Self, ModelError> {
        let idx = self.index_of(id)?;
        let mut records = self.records.clone();
        records.remove(idx);
        Ok(Self { records })
    }

    /// Swap in a whole new version of an existing record.
    pub fn with_replaced(&self, record: PlacementRecord) -> Result<Self, ModelError> {
        let idx = self.index_of(record.id)?;
        let mut records = self.records.clone();
        records[idx] = Arc::new(record);
        Ok(Self { records })
    }

    /// Merge `patch` into one record. Returns the new snapshot and the
    /// merged record (the payload for the outbound save).
    pub fn with_updated(
        &self,
        id: ArtworkId,
        patch: &PlacementPatch,
    ) -> Result<(Self, Arc<PlacementRecord>), ModelError> {
        let idx = self.index_of(id)?;
        let merged = Arc::new(apply_partial_update(&self.records[idx], patch)?);
        let mut records = self.records.clone();
        records[idx] = Arc::clone(&merged);
        Ok((Self { records }, merged))
    }

    /// Move a record in z-order. `Ok(None)` when the order would not change.
    pub fn with_reordered(&self, id: ArtworkId, order: ZOrder) -> Result<Option<Self>, ModelError> {
        let from = self.index_of(id)?;
        let last = self.records.len() - 1;
        let to = match order {
            ZOrder::Forward if from < last => from + 1,
            ZOrder::Backward if from > 0 => from - 1,
            ZOrder::Front if from < last => last,
            ZOrder::Back if from > 0 => 0,
            _ => return Ok(None),
        };
        let mut records = self.records.clone();
        let moved = records.remove(from);
        records.insert(to, moved);
        Ok(Some(Self { records }))
    }

    /// True when both snapshots hold the very same allocation for `id`.
    pub fn shares_record(&self, other: &Snapshot, id: ArtworkId) -> bool {
        match (self.position(id), other.position(id)) {
            (Some(a), Some(b)) => Arc::ptr_eq(&self.records[a], &other.records[b]),
            _ => false,
        }
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = Vec::<PlacementRecord>::deserialize(deserializer)?;
        Snapshot::from_records(records).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::RecordId;
    use crate::model::{ImageDimensions, Position};
    use crate::patch::TransformPatch;
    use crate::placement::create_initial;
    use pretty_assertions::assert_eq;

    fn record(name: &str) -> PlacementRecord {
        create_initial(
            RecordId::intern(name),
            ImageDimensions::new(300.0, 300.0),
            Position::default(),
            300.0,
        )
        .unwrap()
    }

    fn order(s: &Snapshot) -> Vec<&str> {
        s.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Snapshot::from_records([record("dup"), record("dup")]).unwrap_err();
        assert_eq!(err, ModelError::DuplicateId(RecordId::intern("dup")));

        let s = Snapshot::from_records([record("one")]).unwrap();
        assert!(s.with_added(record("one")).is_err());
    }

    #[test]
    fn update_shares_untouched_records() {
        let s0 = Snapshot::from_records([record("a"), record("b")]).unwrap();
        let patch = PlacementPatch::transform(TransformPatch {
            scale: Some(2.0),
            ..Default::default()
        });
        let (s1, merged) = s0.with_updated(RecordId::intern("a"), &patch).unwrap();

        assert_eq!(merged.transform3d.scale, 2.0);
        assert!(s1.shares_record(&s0, RecordId::intern("b")));
        assert!(!s1.shares_record(&s0, RecordId::intern("a")));
        // the older snapshot is unchanged
        assert_eq!(s0.get(RecordId::intern("a")).unwrap().transform3d.scale, 1.0);
    }

    #[test]
    fn remove_and_unknown_ids() {
        let s = Snapshot::from_records([record("x"), record("y")]).unwrap();
        let s2 = s.with_removed(RecordId::intern("x")).unwrap();
        assert_eq!(order(&s2), vec!["y"]);
        assert_eq!(
            s2.with_removed(RecordId::intern("x")).unwrap_err(),
            ModelError::UnknownRecord(RecordId::intern("x"))
        );
    }

    #[test]
    fn reorder_moves_and_reports_noops() {
        let s = Snapshot::from_records([record("p"), record("q"), record("r")]).unwrap();
        let front = s
            .with_reordered(RecordId::intern("p"), ZOrder::Front)
            .unwrap()
            .unwrap();
        assert_eq!(order(&front), vec!["q", "r", "p"]);

        let back = front
            .with_reordered(RecordId::intern("r"), ZOrder::Backward)
            .unwrap()
            .unwrap();
        assert_eq!(order(&back), vec!["r", "q", "p"]);

        assert_eq!(s.with_reordered(RecordId::intern("r"), ZOrder::Forward).unwrap(), None);
        assert_eq!(s.with_reordered(RecordId::intern("p"), ZOrder::Back).unwrap(), None);
    }

    #[test]
    fn serializes_as_record_array() {
        let s = Snapshot::from_records([record("ser")]).unwrap();
        let json = serde_json::to_value(&s).unwrap();
        assert!(json.is_array());
        let back: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }
}

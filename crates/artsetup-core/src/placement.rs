//! Placement operations: creation, partial merge, and reset.
//!
//! All operations are pure. They take a record by reference and return a
//! new one; the input is never mutated.

use crate::error::ModelError;
use crate::id::ArtworkId;
use crate::model::*;
use crate::patch::PlacementPatch;
use serde::{Deserialize, Serialize};

// ─── Config ───────────────────────────────────────────────────────────────

/// Starting geometry for newly uploaded artworks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlacementDefaults {
    /// Width every new artwork starts at; height follows the aspect ratio.
    pub start_width: f64,
    /// Top-left corner of a newly placed artwork.
    pub start_position: Position,
}

impl Default for PlacementDefaults {
    fn default() -> Self {
        Self {
            start_width: 300.0,
            start_position: Position::new(50.0, 50.0),
        }
    }
}

// ─── Creation ─────────────────────────────────────────────────────────────

/// Build a fresh record for an image with the given natural dimensions.
///
/// The width is held at `start_width` and the height derived from the
/// aspect ratio. Transform, frame, and mat start at their defaults, with
/// frame and mat hidden.
///
/// # Errors
/// `InvalidImageDimensions` when either natural side is not a positive,
/// finite number. No record is produced.
pub fn create_initial(
    id: ArtworkId,
    natural: ImageDimensions,
    start: Position,
    start_width: f64,
) -> Result<PlacementRecord, ModelError> {
    let aspect = natural.aspect_ratio()?;
    if !(start_width.is_finite() && start_width > 0.0) {
        return Err(ModelError::invalid("size.width", start_width));
    }
    let size = Size::new(start_width, start_width / aspect);
    log::debug!(
        "create {id}: {}x{} natural -> {}x{} at ({}, {})",
        natural.width,
        natural.height,
        size.width,
        size.height,
        start.x,
        start.y
    );
    Ok(PlacementRecord {
        id,
        position: start,
        size,
        transform3d: Transform3d::DEFAULT,
        frame: FrameStyle::default(),
        mat: MatStyle::default(),
        metadata: ArtworkMetadata::default(),
        image: ImageRef::default(),
    })
}

impl PlacementRecord {
    /// Create with the configured start width and position.
    pub fn create(
        id: ArtworkId,
        natural: ImageDimensions,
        defaults: &PlacementDefaults,
    ) -> Result<Self, ModelError> {
        create_initial(id, natural, defaults.start_position, defaults.start_width)
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: ArtworkMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = image;
        self
    }

    /// See [`apply_partial_update`].
    pub fn patched(&self, patch: &PlacementPatch) -> Result<Self, ModelError> {
        apply_partial_update(self, patch)
    }

    /// See [`reset_transform`].
    #[must_use]
    pub fn reset(&self) -> Self {
        reset_transform(self)
    }
}

// ─── Merge ────────────────────────────────────────────────────────────────

/// Merge only the leaves present in `patch` into a copy of `record`.
///
/// Rotations are clamped into [-180, 180]. Everything else is validated and
/// rejected rather than corrected.
///
/// # Errors
/// `InvalidValue` on non-finite numbers, a non-positive `scale` or
/// `perspective`, or negative box/frame/mat dimensions.
pub fn apply_partial_update(
    record: &PlacementRecord,
    patch: &PlacementPatch,
) -> Result<PlacementRecord, ModelError> {
    let mut next = record.clone();

    if let Some(p) = &patch.position {
        set(&mut next.position.x, p.x, "position.x", any_finite)?;
        set(&mut next.position.y, p.y, "position.y", any_finite)?;
    }
    if let Some(s) = &patch.size {
        set(&mut next.size.width, s.width, "size.width", non_negative)?;
        set(&mut next.size.height, s.height, "size.height", non_negative)?;
    }
    if let Some(t) = &patch.transform3d {
        let t3 = &mut next.transform3d;
        set(&mut t3.perspective, t.perspective, "transform3d.perspective", positive)?;
        set(&mut t3.scale, t.scale, "transform3d.scale", positive)?;
        set(&mut t3.rotate_x, t.rotate_x.map(clamp_angle), "transform3d.rotateX", any_finite)?;
        set(&mut t3.rotate_y, t.rotate_y.map(clamp_angle), "transform3d.rotateY", any_finite)?;
        set(&mut t3.rotation, t.rotation.map(clamp_angle), "transform3d.rotation", any_finite)?;
    }
    if let Some(f) = &patch.frame {
        if let Some(show) = f.show {
            next.frame.show = show;
        }
        if let Some(color) = f.color {
            next.frame.color = color;
        }
        set(&mut next.frame.width, f.width, "frame.width", non_negative)?;
        set(&mut next.frame.height, f.height, "frame.height", non_negative)?;
    }
    if let Some(m) = &patch.mat {
        if let Some(show) = m.show {
            next.mat.show = show;
        }
        set(&mut next.mat.width, m.width, "mat.width", non_negative)?;
        set(&mut next.mat.height, m.height, "mat.height", non_negative)?;
    }

    log::trace!("merged {} into {}", patch.describe(), record.id);
    Ok(next)
}

fn set(
    slot: &mut f64,
    value: Option<f64>,
    field: &'static str,
    accept: fn(f64) -> bool,
) -> Result<(), ModelError> {
    match value {
        None => Ok(()),
        Some(v) if accept(v) => {
            *slot = v;
            Ok(())
        }
        Some(v) => Err(ModelError::invalid(field, v)),
    }
}

fn any_finite(v: f64) -> bool {
    v.is_finite()
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

/// NaN passes through and is rejected by the finiteness check.
fn clamp_angle(deg: f64) -> f64 {
    let (lo, hi) = Transform3d::ROTATION_RANGE;
    if deg.is_nan() { deg } else { deg.clamp(lo, hi) }
}

// ─── Reset ────────────────────────────────────────────────────────────────

/// Copy of `record` with transform, frame, and mat back at their defaults.
/// Identity, box geometry, metadata, and image are preserved.
pub fn reset_transform(record: &PlacementRecord) -> PlacementRecord {
    PlacementRecord {
        transform3d: Transform3d::DEFAULT,
        frame: FrameStyle::default(),
        mat: MatStyle::default(),
        ..record.clone()
    }
}

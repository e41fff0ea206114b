pub mod error;
pub mod hit;
pub mod id;
pub mod matrix;
pub mod model;
pub mod patch;
pub mod placement;
pub mod prompt;
pub mod render;
pub mod snapshot;
pub mod wire;

pub use error::ModelError;
pub use hit::hit_test;
pub use id::{ArtworkId, RecordId, ScenarioId};
pub use matrix::Mat4;
pub use model::*;
pub use patch::{FramePatch, MatPatch, PlacementPatch, PositionPatch, SizePatch, TransformPatch};
pub use placement::{PlacementDefaults, apply_partial_update, create_initial, reset_transform};
pub use prompt::ScenarioPrompt;
pub use render::{Layer, PaddingLayer, RenderPlan, TransformOp, derive_render_transform};
pub use snapshot::{Snapshot, ZOrder};
pub use wire::{ArtworkDocument, ScenarioDocument};

use crate::id::RecordId;

/// Errors raised by the placement model, patches, and snapshots.
///
/// Every operation in this crate is synchronous and either succeeds or
/// returns one of these. Undo/redo bounds are not errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("invalid image dimensions {width}x{height}: both sides must be positive")]
    InvalidImageDimensions { width: f64, height: f64 },

    #[error("unknown field `{0}` in partial update")]
    UnknownField(String),

    #[error("malformed partial update: {0}")]
    MalformedPatch(String),

    #[error("invalid value for `{field}`: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("invalid color `{0}`")]
    InvalidColor(String),

    #[error("duplicate record id {0}")]
    DuplicateId(RecordId),

    #[error("no record with id {0}")]
    UnknownRecord(RecordId),

    #[error("scenario prompt is required")]
    EmptyPrompt,
}

impl ModelError {
    pub(crate) fn invalid(field: &'static str, value: impl ToString) -> Self {
        ModelError::InvalidValue {
            field,
            value: value.to_string(),
        }
    }
}

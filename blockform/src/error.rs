//! Error types for the sync engine

use thiserror::Error;

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Document text that does not conform to the structured-text grammar.
///
/// Carries the parser's message verbatim so it can be shown to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct DecodeError {
    pub message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<serde_yaml_ng::Error> for DecodeError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// State that could not be written out as document text.
#[derive(Debug, Error)]
#[error("failed to serialize document: {0}")]
pub struct EncodeError(#[from] serde_yaml_ng::Error);

/// Errors returned by the sync controller's entry points
#[derive(Debug, Error)]
pub enum SyncError {
    /// Edits are only accepted while the controller is ready
    #[error("cannot edit while {status}")]
    NotReady { status: &'static str },

    /// The edit names a field the schema does not define
    #[error("unknown field: {name}")]
    UnknownField { name: String },

    /// A list was given for a text field, or text for a multi-select
    #[error("value for field '{field}' must be {expected}")]
    ValueShapeMismatch {
        field: String,
        expected: &'static str,
    },

    /// Toggle was requested on a field that is not a multi-select
    #[error("field '{field}' is not a multi-select")]
    NotMultiSelect { field: String },

    /// Toggle named an option the field does not declare
    #[error("'{option}' is not an option of field '{field}'")]
    UnknownOption { field: String, option: String },

    /// Serializing the state failed
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

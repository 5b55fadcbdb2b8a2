//! Error recovery: what to show while the document fails to parse, and
//! the defaults a reset writes back.

use blockform_fields::{FormState, SchemaRegistry};
use serde::Serialize;

use crate::codec::DocumentCodec;
use crate::error::EncodeError;
use crate::store;
use crate::sync::SyncStatus;

pub const ERROR_TITLE: &str = "Error parsing YAML";
pub const RESET_LABEL: &str = "Reset to default values";

/// The error screen: the parser's message and a single reset action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveryView {
    pub title: String,
    pub message: String,
    pub action_label: String,
}

impl RecoveryView {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: ERROR_TITLE.to_string(),
            message: message.into(),
            action_label: RESET_LABEL.to_string(),
        }
    }

    /// A view for `Error` status, `None` otherwise.
    pub fn from_status(status: &SyncStatus) -> Option<Self> {
        match status {
            SyncStatus::Error { message } => Some(Self::new(message.clone())),
            SyncStatus::Loading | SyncStatus::Ready => None,
        }
    }
}

/// The document [`SyncController::reset`](crate::sync::SyncController::reset)
/// emits: every field at its default, serialized by the same codec.
pub fn default_document<C: DocumentCodec>(
    registry: &SchemaRegistry,
    codec: &C,
) -> Result<String, EncodeError> {
    codec.serialize(&store::to_raw(&FormState::defaults(registry)))
}

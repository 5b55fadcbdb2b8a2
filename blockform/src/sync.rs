//! Keeps form state and the host's document in step.
//!
//! The controller is a small state machine:
//!
//! ```text
//!            document ok                   edit / reset
//! Loading ─────────────────▶ Ready ◀──────────────────┐
//!    │                        │  ▲ └──────────────────┘
//!    │ document bad           │  │ reset / document ok
//!    ▼                        ▼  │
//!  Error ◀──────────────── document bad
//! ```
//!
//! It owns the only [`FormState`]. The render layer reads snapshots and
//! writes through [`SyncController::apply`]. Every edit and every reset
//! returns the replacement document for the host. When the host hands that
//! same text back, it is recognised as an echo and ignored, so an emission
//! never turns into a fresh load. Echoes may arrive late: any emission the
//! host has not yet handed back still counts, not only the latest one.

use std::collections::VecDeque;
use std::sync::Arc;

use blockform_fields::{FieldValue, FormState, SchemaRegistry};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::codec::{DocumentCodec, YamlCodec};
use crate::error::{DecodeError, EncodeError, Result, SyncError};
use crate::evaluator::{self, RenderPlan};
use crate::recovery::RecoveryView;
use crate::store;

/// Emissions remembered for echo detection. Older ones are forgotten first.
const MAX_PENDING_ECHOES: usize = 32;

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// No document has been processed yet
    Loading,
    /// The latest external document failed to parse
    Error { message: String },
    /// State reflects the document; edits are accepted
    Ready,
}

impl SyncStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SyncStatus::Loading => "loading",
            SyncStatus::Error { .. } => "showing a parse error",
            SyncStatus::Ready => "ready",
        }
    }
}

/// A change requested by the render layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FieldEdit {
    /// Replace the field's value
    Set { field: String, value: FieldValue },
    /// Check or uncheck one option of a multi-select
    Toggle { field: String, option: String },
}

impl FieldEdit {
    pub fn field(&self) -> &str {
        match self {
            FieldEdit::Set { field, .. } | FieldEdit::Toggle { field, .. } => field,
        }
    }
}

/// Result of handing the controller a document from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// Parsed and merged into state
    Applied,
    /// Identical to our last emission; nothing was re-parsed
    Echo,
    /// Did not parse; the controller is now in `Error`
    Rejected(DecodeError),
}

/// Replacement document text for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub document: String,
    pub revision: u64,
}

/// Owns the form state for one editing session.
pub struct SyncController<C: DocumentCodec = YamlCodec> {
    registry: Arc<SchemaRegistry>,
    codec: C,
    state: FormState,
    status: SyncStatus,
    revision: u64,
    /// Set once a document has parsed or the user reset; nothing is
    /// emitted before that so an unparsed host document is never overwritten.
    synced: bool,
    /// Emitted texts the host has not handed back yet, oldest first.
    pending_echoes: VecDeque<String>,
}

impl SyncController<YamlCodec> {
    /// A controller for YAML documents.
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self::with_codec(registry, YamlCodec)
    }
}

impl<C: DocumentCodec> SyncController<C> {
    pub fn with_codec(registry: Arc<SchemaRegistry>, codec: C) -> Self {
        let state = FormState::defaults(&registry);
        Self {
            registry,
            codec,
            state,
            status: SyncStatus::Loading,
            revision: 0,
            synced: false,
            pending_echoes: VecDeque::new(),
        }
    }

    /// Handle document text from the host, on first load or any later change.
    pub fn document_changed(&mut self, text: &str) -> DocumentOutcome {
        if let Some(pos) = self.pending_echoes.iter().position(|d| d == text) {
            // Earlier emissions can no longer come back once a later one has.
            self.pending_echoes.drain(..=pos);
            debug!(revision = self.revision, "ignoring echo of emitted document");
            return DocumentOutcome::Echo;
        }
        self.pending_echoes.clear();

        match self.codec.parse(text) {
            Ok(raw) => {
                let state = store::init_from_raw(&self.registry, &raw);
                self.replace_state(state);
                if !self.synced {
                    info!(fields = self.state.len(), "first document loaded");
                }
                self.synced = true;
                self.status = SyncStatus::Ready;
                DocumentOutcome::Applied
            }
            Err(err) => {
                // State keeps its last good value.
                warn!(error = %err, "document failed to parse");
                self.status = SyncStatus::Error {
                    message: err.message.clone(),
                };
                DocumentOutcome::Rejected(err)
            }
        }
    }

    /// Apply an edit from the render layer and emit the new document.
    ///
    /// Validation messages never block this; see [`RenderPlan::issues`].
    pub fn apply(&mut self, edit: FieldEdit) -> Result<Emission> {
        if self.status != SyncStatus::Ready {
            return Err(SyncError::NotReady {
                status: self.status.label(),
            });
        }

        let next = match edit {
            FieldEdit::Set { field, value } => {
                let def = self
                    .registry
                    .get(&field)
                    .ok_or_else(|| SyncError::UnknownField {
                        name: field.clone(),
                    })?;
                if !value.fits(&def.kind) {
                    return Err(SyncError::ValueShapeMismatch {
                        field,
                        expected: if def.kind.is_list() {
                            "a list"
                        } else {
                            "a string"
                        },
                    });
                }
                store::set(&self.state, &field, value)
            }
            FieldEdit::Toggle { field, option } => {
                store::toggle_option(&self.registry, &self.state, &field, &option)?
            }
        };

        self.replace_state(next);
        self.emit()
    }

    /// Convenience for `apply(FieldEdit::Set { .. })`.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<Emission> {
        self.apply(FieldEdit::Set {
            field: field.to_string(),
            value: value.into(),
        })
    }

    /// Convenience for `apply(FieldEdit::Toggle { .. })`.
    pub fn toggle(&mut self, field: &str, option: &str) -> Result<Emission> {
        self.apply(FieldEdit::Toggle {
            field: field.to_string(),
            option: option.to_string(),
        })
    }

    /// Rebuild state from schema defaults and emit it. Available from
    /// `Error` and `Ready`. The emitted text is
    /// [`default_document`](crate::recovery::default_document) for this
    /// registry and codec.
    pub fn reset(&mut self) -> Result<Emission> {
        if self.status == SyncStatus::Loading {
            return Err(SyncError::NotReady {
                status: self.status.label(),
            });
        }
        info!(from = self.status.label(), "resetting to schema defaults");
        self.replace_state(FormState::defaults(&self.registry));
        self.synced = true;
        self.status = SyncStatus::Ready;
        self.emit()
    }

    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == SyncStatus::Ready
    }

    /// The current state snapshot.
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Bumped every time the state actually changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// The visible fields to draw. `None` unless the controller is ready.
    pub fn render_plan(&self) -> Option<RenderPlan> {
        self.is_ready()
            .then(|| evaluator::render_plan(&self.registry, &self.state, self.revision))
    }

    /// The error screen to draw. `None` unless a document failed to parse.
    pub fn recovery(&self) -> Option<RecoveryView> {
        RecoveryView::from_status(&self.status)
    }

    /// Serialization of the current state, without emitting it.
    pub fn canonical_document(&self) -> std::result::Result<String, EncodeError> {
        self.codec.serialize(&store::to_raw(&self.state))
    }

    /// Swap in a new state. An equal state keeps the existing snapshot so
    /// readers holding it see no change.
    fn replace_state(&mut self, next: FormState) {
        if next == self.state {
            return;
        }
        self.state = next;
        self.revision += 1;
        debug!(revision = self.revision, "state updated");
    }

    fn emit(&mut self) -> Result<Emission> {
        if !self.synced {
            return Err(SyncError::NotReady {
                status: self.status.label(),
            });
        }
        let document = self.canonical_document()?;
        debug!(revision = self.revision, bytes = document.len(), "emitting document");
        if self.pending_echoes.len() == MAX_PENDING_ECHOES {
            self.pending_echoes.pop_front();
        }
        self.pending_echoes.push_back(document.clone());
        Ok(Emission {
            document,
            revision: self.revision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockform_fields::FieldDef;

    fn controller() -> SyncController {
        let registry = SchemaRegistry::builder()
            .field(FieldDef::text("title", "default title"))
            .field(FieldDef::multi_select("tags", &["a", "b", "c"], &["a"]))
            .build()
            .unwrap();
        SyncController::new(Arc::new(registry))
    }

    #[test]
    fn starts_loading_and_rejects_edits() {
        let mut ctl = controller();
        assert_eq!(ctl.status(), &SyncStatus::Loading);
        assert!(ctl.render_plan().is_none());
        assert!(matches!(
            ctl.set("title", "x"),
            Err(SyncError::NotReady { status: "loading" })
        ));
        assert!(matches!(ctl.reset(), Err(SyncError::NotReady { .. })));
    }

    #[test]
    fn load_then_edit_emits_document() {
        let mut ctl = controller();
        assert_eq!(ctl.document_changed("title: hello\n"), DocumentOutcome::Applied);
        assert!(ctl.is_ready());

        let emission = ctl.set("title", "changed").unwrap();
        assert_eq!(emission.document, "title: changed\ntags:\n- a\n");
        assert_eq!(emission.revision, ctl.revision());
    }

    #[test]
    fn echo_is_ignored() {
        let mut ctl = controller();
        ctl.document_changed("title: hello\n");
        let emission = ctl.toggle("tags", "c").unwrap();
        let snapshot = ctl.state().clone();
        let revision = ctl.revision();

        assert_eq!(ctl.document_changed(&emission.document), DocumentOutcome::Echo);
        assert!(ctl.state().ptr_eq(&snapshot));
        assert_eq!(ctl.revision(), revision);
    }

    #[test]
    fn equal_external_document_keeps_snapshot() {
        let mut ctl = controller();
        ctl.document_changed("title: hello\n");
        let snapshot = ctl.state().clone();
        let revision = ctl.revision();

        assert_eq!(
            ctl.document_changed("tags: [a]\ntitle: hello\n"),
            DocumentOutcome::Applied
        );
        assert!(ctl.state().ptr_eq(&snapshot));
        assert_eq!(ctl.revision(), revision);
    }

    #[test]
    fn shape_mismatch_and_unknown_field_rejected() {
        let mut ctl = controller();
        ctl.document_changed("");
        assert!(matches!(
            ctl.set("tags", "a"),
            Err(SyncError::ValueShapeMismatch { expected: "a list", .. })
        ));
        assert!(matches!(
            ctl.set("nope", "a"),
            Err(SyncError::UnknownField { .. })
        ));
    }

    #[test]
    fn parse_error_keeps_last_good_state() {
        let mut ctl = controller();
        ctl.document_changed("title: good\n");
        let outcome = ctl.document_changed("title: [bad\n");
        assert!(matches!(outcome, DocumentOutcome::Rejected(_)));
        assert!(matches!(ctl.status(), SyncStatus::Error { .. }));
        assert_eq!(ctl.state().text("title"), Some("good"));
        assert!(ctl.render_plan().is_none());
        assert!(ctl.recovery().is_some());
        assert!(matches!(ctl.set("title", "x"), Err(SyncError::NotReady { .. })));
    }

    #[test]
    fn previously_emitted_text_is_reparsed_after_an_error() {
        let mut ctl = controller();
        ctl.document_changed("title: good\n");
        let emission = ctl.set("title", "mine").unwrap();
        ctl.document_changed("title: [bad\n");

        assert_eq!(
            ctl.document_changed(&emission.document),
            DocumentOutcome::Applied
        );
        assert!(ctl.is_ready());
    }

    #[test]
    fn late_echo_of_earlier_emission_is_ignored() {
        let mut ctl = controller();
        ctl.document_changed("title: hello\n");
        let first = ctl.set("title", "a").unwrap();
        let second = ctl.set("title", "ab").unwrap();

        assert_eq!(ctl.document_changed(&first.document), DocumentOutcome::Echo);
        assert_eq!(ctl.state().text("title"), Some("ab"));
        assert_eq!(ctl.revision(), second.revision);

        assert_eq!(ctl.document_changed(&second.document), DocumentOutcome::Echo);
        // Once a later emission has come back, earlier ones are stale.
        assert_eq!(
            ctl.document_changed(&first.document),
            DocumentOutcome::Applied
        );
        assert_eq!(ctl.state().text("title"), Some("a"));
    }

    #[test]
    fn external_document_forgets_pending_emissions() {
        let mut ctl = controller();
        ctl.document_changed("title: hello\n");
        let emission = ctl.set("title", "mine").unwrap();
        ctl.document_changed("title: theirs\n");

        assert_eq!(
            ctl.document_changed(&emission.document),
            DocumentOutcome::Applied
        );
        assert_eq!(ctl.state().text("title"), Some("mine"));
    }

    #[test]
    fn reset_emits_default_document() {
        let mut ctl = controller();
        ctl.document_changed("title: hello\ntags: [b, c]\n");
        let emission = ctl.reset().unwrap();
        assert_eq!(
            emission.document,
            crate::recovery::default_document(ctl.registry(), &YamlCodec).unwrap()
        );
    }

    #[test]
    fn field_edits_deserialize_from_yaml() {
        let set: FieldEdit =
            serde_yaml_ng::from_str("action: set\nfield: title\nvalue: hi\n").unwrap();
        assert_eq!(
            set,
            FieldEdit::Set {
                field: "title".into(),
                value: FieldValue::from("hi"),
            }
        );

        let toggle: FieldEdit =
            serde_yaml_ng::from_str("action: toggle\nfield: tags\noption: b\n").unwrap();
        let mut ctl = controller();
        ctl.document_changed("");
        ctl.apply(toggle).unwrap();
        assert_eq!(ctl.state().list("tags").unwrap(), &["a", "b"]);
    }

    #[test]
    fn field_edit_reports_its_field() {
        let edit = FieldEdit::Toggle {
            field: "tags".into(),
            option: "a".into(),
        };
        assert_eq!(edit.field(), "tags");
    }
}

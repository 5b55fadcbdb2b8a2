//! Schema-driven editor engine for structured-text documents
//!
//! `blockform` keeps an in-memory form state in step with one YAML document.
//! The host supplies document text and receives replacement text; the render
//! layer draws one control per visible field and sends edits back.
//!
//! ```rust,ignore
//! let registry = Arc::new(slash_command_schema()?);
//! let mut controller = SyncController::new(registry);
//!
//! controller.document_changed(&host_text);
//! if let Some(plan) = controller.render_plan() {
//!     let edit = plan.field("title").unwrap().set("Deploy");
//!     let emission = controller.apply(edit)?;
//!     host.write(&emission.document);
//! }
//! ```
//!
//! # Modules
//!
//! - [`codec`]: document text to raw mapping and back
//! - [`store`]: raw mapping to form state, copy-on-write updates
//! - [`evaluator`]: visibility, enablement, and advisory validation
//! - [`sync`]: the controller state machine and echo suppression
//! - [`recovery`]: parse-error screen and reset defaults
//! - [`slash_command`]: the built-in slash command schema

pub mod codec;
pub mod error;
pub mod evaluator;
pub mod recovery;
pub mod slash_command;
pub mod store;
pub mod sync;

pub use blockform_fields::{
    FieldDef, FieldKind, FieldValue, FormState, Predicate, SchemaError, SchemaRegistry,
    ValidationRule, Widget,
};
pub use codec::{DocumentCodec, RawMapping, YamlCodec};
pub use error::{DecodeError, EncodeError, Result, SyncError};
pub use evaluator::{FieldStatus, FieldView, RenderPlan, ValidationIssue};
pub use recovery::RecoveryView;
pub use slash_command::slash_command_schema;
pub use sync::{DocumentOutcome, Emission, FieldEdit, SyncController, SyncStatus};

//! Field schema for the blockform editor
//!
//! `blockform-fields` is a schema-only crate. It owns the field definitions of
//! a form, the values those fields hold, and the rules that decide each
//! field's visibility, enablement, and validity. It knows nothing about
//! documents. The `blockform` crate builds the sync engine on top.
//!
//! # Architecture
//!
//! - **Ordered**: registry order is display order and serialization order
//! - **Closed kinds**: text, multi-line text, single-select, multi-select
//! - **Pure rules**: predicates read a whole [`FormState`] snapshot and nothing else
//! - **Fail fast**: a malformed schema is rejected when the registry is built
//! - **YAML as data**: declarative rules round-trip through `serde_yaml_ng`

pub mod error;
pub mod predicate;
pub mod registry;
pub mod state;
pub mod types;

pub use error::{Result, SchemaError};
pub use predicate::{Predicate, PredicateFn, ValidationRule, ValidatorFn};
pub use registry::{SchemaBuilder, SchemaRegistry};
pub use state::FormState;
pub use types::{FieldDef, FieldKind, FieldValue, Widget};

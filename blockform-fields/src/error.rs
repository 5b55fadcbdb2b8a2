//! Error types for the schema registry

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// A malformed schema. These are programming errors in the field
/// definitions, reported when the registry is built.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A field definition has an empty name
    #[error("field name cannot be empty")]
    EmptyFieldName,

    /// Two definitions share a name
    #[error("duplicate field name: {name}")]
    DuplicateFieldName { name: String },

    /// A select or multi-select field declares no options
    #[error("field '{name}' is a select but declares no options")]
    EmptyOptions { name: String },

    /// The same option appears twice in one field
    #[error("field '{name}' lists option '{option}' more than once")]
    DuplicateOption { name: String, option: String },

    /// The default is a list for a scalar field, or a scalar for a multi-select
    #[error("default for field '{name}' must be {expected}")]
    DefaultShapeMismatch { name: String, expected: &'static str },

    /// A select default names a value outside the declared options
    #[error("default '{value}' for field '{name}' is not one of its options")]
    DefaultNotInOptions { name: String, value: String },

    /// A predicate or validation rule refers to a field the registry does not define
    #[error("field '{name}' refers to unknown field '{reference}'")]
    UnknownFieldReference { name: String, reference: String },

    /// Schema YAML could not be read
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

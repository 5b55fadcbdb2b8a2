//! The ordered, read-only set of field definitions.
//!
//! Registry order is display order and serialization order. A registry is
//! checked once when it is built; a malformed schema never makes it into
//! a running editor.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::types::{FieldDef, FieldKind, FieldValue};

/// Collects field definitions for [`SchemaRegistry`].
///
/// ```rust,ignore
/// let registry = SchemaRegistry::builder()
///     .field(FieldDef::text("title", "My slash command"))
///     .field(FieldDef::select("type", &["webhook", "md_shortcut"], "webhook"))
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldDef>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field definition. Order of calls is display order.
    pub fn field(mut self, def: FieldDef) -> Self {
        self.fields.push(def);
        self
    }

    /// Append several field definitions.
    pub fn fields(mut self, defs: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(defs);
        self
    }

    /// Check every definition and build the registry.
    pub fn build(self) -> Result<SchemaRegistry> {
        let mut name_index = HashMap::with_capacity(self.fields.len());
        for (idx, def) in self.fields.iter().enumerate() {
            if def.name.is_empty() {
                return Err(SchemaError::EmptyFieldName);
            }
            if name_index.insert(def.name.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateFieldName {
                    name: def.name.clone(),
                });
            }
            check_options(def)?;
            check_default(def)?;
        }

        for def in &self.fields {
            check_references(def, &name_index)?;
        }

        debug!(fields = self.fields.len(), "schema registry built");

        Ok(SchemaRegistry {
            fields: self.fields,
            name_index,
        })
    }
}

fn check_options(def: &FieldDef) -> Result<()> {
    let options = match &def.kind {
        FieldKind::Select { options } | FieldKind::MultiSelect { options } => options,
        FieldKind::Text | FieldKind::MultilineText => return Ok(()),
    };
    if options.is_empty() {
        return Err(SchemaError::EmptyOptions {
            name: def.name.clone(),
        });
    }
    let mut seen = HashSet::new();
    for option in options {
        if !seen.insert(option.as_str()) {
            return Err(SchemaError::DuplicateOption {
                name: def.name.clone(),
                option: option.clone(),
            });
        }
    }
    Ok(())
}

fn check_default(def: &FieldDef) -> Result<()> {
    if !def.default.fits(&def.kind) {
        return Err(SchemaError::DefaultShapeMismatch {
            name: def.name.clone(),
            expected: if def.kind.is_list() {
                "a list"
            } else {
                "a string"
            },
        });
    }
    let not_in_options = |value: &String| SchemaError::DefaultNotInOptions {
        name: def.name.clone(),
        value: value.clone(),
    };
    match (&def.kind, &def.default) {
        (FieldKind::Select { options }, FieldValue::Text(value)) if !options.contains(value) => {
            Err(not_in_options(value))
        }
        (FieldKind::MultiSelect { options }, FieldValue::List(values)) => {
            match values.iter().find(|v| !options.contains(*v)) {
                Some(value) => Err(not_in_options(value)),
                None => Ok(()),
            }
        }
        _ => Ok(()),
    }
}

fn check_references(def: &FieldDef, name_index: &HashMap<String, usize>) -> Result<()> {
    let references = def
        .visible_when
        .references()
        .into_iter()
        .chain(def.enabled_when.references())
        .chain(def.validate.iter().flat_map(|r| r.references()));
    for reference in references {
        if !name_index.contains_key(reference) {
            return Err(SchemaError::UnknownFieldReference {
                name: def.name.clone(),
                reference: reference.to_string(),
            });
        }
    }
    Ok(())
}

/// The ordered set of field definitions for one form.
#[derive(Debug)]
pub struct SchemaRegistry {
    fields: Vec<FieldDef>,
    name_index: HashMap<String, usize>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Load field definitions from a YAML sequence.
    ///
    /// Code-only rules (`Custom` predicates and validators) cannot be
    /// expressed in YAML; build those schemas with [`SchemaRegistry::builder`].
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let fields: Vec<FieldDef> = serde_yaml_ng::from_str(yaml)?;
        SchemaBuilder::new().fields(fields).build()
    }

    /// All field definitions, in display order.
    pub fn fields_in_order(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Get a field definition by name.
    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.name_index.get(name).map(|&i| &self.fields[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

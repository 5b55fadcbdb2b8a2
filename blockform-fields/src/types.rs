//! Core field types for the schema registry.
//!
//! All types serialize to/from YAML via serde. A field definition describes
//! one named, typed key of the document together with the rules that decide
//! whether it is shown, whether it is editable, and whether its value is valid.

use serde::{Deserialize, Serialize};

use crate::predicate::{Predicate, ValidationRule};

/// The kind of a field. Determines the shape its value takes.
///
/// Options only exist on the select kinds, so a text field cannot carry them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    MultilineText,
    #[serde(rename = "single-select", alias = "select")]
    Select {
        options: Vec<String>,
    },
    MultiSelect {
        options: Vec<String>,
    },
}

impl FieldKind {
    /// Declared options for select kinds, empty otherwise.
    pub fn options(&self) -> &[String] {
        match self {
            FieldKind::Select { options } | FieldKind::MultiSelect { options } => options,
            FieldKind::Text | FieldKind::MultilineText => &[],
        }
    }

    /// True when values of this kind are lists.
    pub fn is_list(&self) -> bool {
        matches!(self, FieldKind::MultiSelect { .. })
    }
}

/// The value of a single field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            FieldValue::Text(_) => None,
        }
    }

    /// A value counts as set when it is a non-empty string or a non-empty list.
    pub fn is_set(&self) -> bool {
        match self {
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::List(items) => !items.is_empty(),
        }
    }

    /// True when the value has the shape `kind` expects.
    pub fn fits(&self, kind: &FieldKind) -> bool {
        matches!(self, FieldValue::List(_)) == kind.is_list()
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(items: Vec<&str>) -> Self {
        FieldValue::List(items.into_iter().map(String::from).collect())
    }
}

/// Which input control renders a field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Widget {
    TextInput,
    TextArea,
    Dropdown,
    CheckboxGroup,
}

/// A field definition: the complete schema for a single named key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub default: FieldValue,
    #[serde(default, skip_serializing_if = "Predicate::is_always")]
    pub visible_when: Predicate,
    #[serde(default, skip_serializing_if = "Predicate::is_always")]
    pub enabled_when: Predicate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validate: Vec<ValidationRule>,
}

impl FieldDef {
    fn new(name: impl Into<String>, kind: FieldKind, default: FieldValue) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind,
            default,
            visible_when: Predicate::Always,
            enabled_when: Predicate::Always,
            validate: Vec::new(),
        }
    }

    /// Single-line text field.
    pub fn text(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text, FieldValue::Text(default.into()))
    }

    /// Multi-line text field.
    pub fn multiline(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(name, FieldKind::MultilineText, FieldValue::Text(default.into()))
    }

    /// Single-select field.
    pub fn select(name: impl Into<String>, options: &[&str], default: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::Select {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
            FieldValue::Text(default.into()),
        )
    }

    /// Multi-select field.
    pub fn multi_select(name: impl Into<String>, options: &[&str], default: &[&str]) -> Self {
        Self::new(
            name,
            FieldKind::MultiSelect {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
            FieldValue::List(default.iter().map(|o| o.to_string()).collect()),
        )
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn visible_when(mut self, predicate: Predicate) -> Self {
        self.visible_when = predicate;
        self
    }

    pub fn enabled_when(mut self, predicate: Predicate) -> Self {
        self.enabled_when = predicate;
        self
    }

    /// Append a validation rule. Rules run in order; the first message wins.
    pub fn validate(mut self, rule: ValidationRule) -> Self {
        self.validate.push(rule);
        self
    }

    /// Caption text, with an empty description treated as absent.
    pub fn caption(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    /// Infer the input control from the field kind.
    pub fn widget(&self) -> Widget {
        match &self.kind {
            FieldKind::Text => Widget::TextInput,
            FieldKind::MultilineText => Widget::TextArea,
            FieldKind::Select { .. } => Widget::Dropdown,
            FieldKind::MultiSelect { .. } => Widget::CheckboxGroup,
        }
    }
}

//! Form state: the canonical value of every field.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::registry::SchemaRegistry;
use crate::types::FieldValue;

/// Field name → value, in registry order.
///
/// Values sit behind an `Arc`, so cloning a state is cheap and
/// [`FormState::with_value`] never mutates a snapshot someone else is
/// still reading. Two states that share storage compare `ptr_eq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    values: Arc<IndexMap<String, FieldValue>>,
}

impl FormState {
    pub fn from_values(values: IndexMap<String, FieldValue>) -> Self {
        Self {
            values: Arc::new(values),
        }
    }

    /// Every field at its schema default.
    pub fn defaults(registry: &SchemaRegistry) -> Self {
        Self::from_values(
            registry
                .fields_in_order()
                .iter()
                .map(|f| (f.name.clone(), f.default.clone()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    pub fn list(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(FieldValue::as_list)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(FieldValue::is_set)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// A new state with `name` replaced. Names not already present are
    /// ignored so the key set never changes.
    pub fn with_value(&self, name: &str, value: FieldValue) -> Self {
        if !self.values.contains_key(name) {
            return self.clone();
        }
        let mut next = self.clone();
        if let Some(slot) = Arc::make_mut(&mut next.values).get_mut(name) {
            *slot = value;
        }
        next
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when both states share the same storage.
    pub fn ptr_eq(&self, other: &FormState) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}

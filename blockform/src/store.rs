//! State store operations: build form state from raw documents and back.
//!
//! [`FormState`] values are immutable snapshots; every operation here
//! returns a new state rather than mutating one a render may still hold.

use blockform_fields::{FieldDef, FieldKind, FieldValue, FormState, SchemaRegistry};
use indexmap::IndexMap;
use serde_yaml_ng::Value;
use tracing::{debug, warn};

use crate::codec::RawMapping;
use crate::error::{Result, SyncError};

/// Build a state from a parsed document.
///
/// Every schema field gets the document's value when present and its default
/// otherwise. Keys the schema does not define are dropped.
pub fn init_from_raw(registry: &SchemaRegistry, raw: &RawMapping) -> FormState {
    for (key, _) in raw.iter() {
        let known = key.as_str().is_some_and(|k| registry.contains(k));
        if !known {
            debug!(key = ?key, "dropping document key not in schema");
        }
    }

    let values: IndexMap<String, FieldValue> = registry
        .fields_in_order()
        .iter()
        .map(|def| {
            let value = match raw.get(def.name.as_str()) {
                Some(raw_value) => coerce(def, raw_value).unwrap_or_else(|| {
                    warn!(field = %def.name, "document value has the wrong shape, using default");
                    def.default.clone()
                }),
                None => def.default.clone(),
            };
            (def.name.clone(), value)
        })
        .collect();

    FormState::from_values(values)
}

/// Convert a raw value into the shape the field expects. `None` means the
/// value cannot be used and the default applies.
fn coerce(def: &FieldDef, raw: &Value) -> Option<FieldValue> {
    let is_list = def.kind.is_list();
    match raw {
        Value::Null if is_list => Some(FieldValue::List(Vec::new())),
        Value::Null => Some(FieldValue::Text(String::new())),
        Value::Sequence(items) if is_list => Some(FieldValue::List(
            items
                .iter()
                .filter_map(|item| {
                    let text = scalar_text(item);
                    if text.is_none() {
                        warn!(field = %def.name, "skipping non-scalar list entry");
                    }
                    text
                })
                .collect(),
        )),
        other if is_list => scalar_text(other).map(|s| FieldValue::List(vec![s])),
        other => scalar_text(other).map(FieldValue::Text),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// The raw mapping for a state, in registry order.
pub fn to_raw(state: &FormState) -> RawMapping {
    let mut raw = RawMapping::with_capacity(state.len());
    for (name, value) in state.iter() {
        let value = match value {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::List(items) => {
                Value::Sequence(items.iter().cloned().map(Value::String).collect())
            }
        };
        raw.insert(Value::String(name.to_string()), value);
    }
    raw
}

pub fn get<'a>(state: &'a FormState, name: &str) -> Option<&'a FieldValue> {
    state.get(name)
}

/// A new state with `name` set to `value`. No validation happens here.
pub fn set(state: &FormState, name: &str, value: FieldValue) -> FormState {
    state.with_value(name, value)
}

/// Add `option` to a multi-select if absent, remove it if present.
///
/// The result lists declared options in schema order, followed by any
/// undeclared values the document carried, in their previous order.
pub fn toggle_option(
    registry: &SchemaRegistry,
    state: &FormState,
    name: &str,
    option: &str,
) -> Result<FormState> {
    let def = registry.get(name).ok_or_else(|| SyncError::UnknownField {
        name: name.to_string(),
    })?;
    let FieldKind::MultiSelect { options } = &def.kind else {
        return Err(SyncError::NotMultiSelect {
            field: name.to_string(),
        });
    };
    if !options.iter().any(|o| o == option) {
        return Err(SyncError::UnknownOption {
            field: name.to_string(),
            option: option.to_string(),
        });
    }

    let current = state.list(name).unwrap_or_default();
    let adding = !current.iter().any(|v| v == option);
    let selected = |candidate: &str| {
        if candidate == option {
            adding
        } else {
            current.iter().any(|v| v == candidate)
        }
    };

    let mut next: Vec<String> = options.iter().filter(|o| selected(o.as_str())).cloned().collect();
    next.extend(current.iter().filter(|v| !options.contains(*v)).cloned());

    Ok(state.with_value(name, FieldValue::List(next)))
}

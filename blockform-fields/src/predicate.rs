//! Rules that derive visibility, enablement, and validity from form state.
//!
//! Every rule is a pure function of the whole [`FormState`]. The declarative
//! variants serialize to YAML so schemas can be loaded as data; the `Custom`
//! variants hold plain function pointers for rules that only exist in code.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::FormState;

/// A code-only condition over the form state.
#[derive(Clone, Copy)]
pub struct PredicateFn(pub fn(&FormState) -> bool);

impl fmt::Debug for PredicateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PredicateFn(..)")
    }
}

/// A code-only validation check over the form state.
#[derive(Clone, Copy)]
pub struct ValidatorFn(pub fn(&FormState) -> Option<String>);

impl fmt::Debug for ValidatorFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValidatorFn(..)")
    }
}

/// A boolean condition over the whole form state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    #[default]
    Always,
    Never,
    /// The field holds exactly this text.
    Equals { field: String, value: String },
    /// The field does not hold exactly this text.
    NotEquals { field: String, value: String },
    /// The field is a non-empty string or a non-empty list.
    IsSet { field: String },
    /// A list field includes `value`, or a text field contains it as a substring.
    Contains { field: String, value: String },
    Not { predicate: Box<Predicate> },
    All { of: Vec<Predicate> },
    Any { of: Vec<Predicate> },
    #[serde(skip)]
    Custom(PredicateFn),
}

impl Predicate {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::NotEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_set(field: impl Into<String>) -> Self {
        Predicate::IsSet {
            field: field.into(),
        }
    }

    pub fn negate(predicate: Predicate) -> Self {
        Predicate::Not {
            predicate: Box::new(predicate),
        }
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Predicate::Always)
    }

    /// Evaluate against a state snapshot. Unknown fields read as unset.
    pub fn evaluate(&self, state: &FormState) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Never => false,
            Predicate::Equals { field, value } => state.text(field) == Some(value.as_str()),
            Predicate::NotEquals { field, value } => state.text(field) != Some(value.as_str()),
            Predicate::IsSet { field } => state.is_set(field),
            Predicate::Contains { field, value } => match state.get(field) {
                Some(v) => match v.as_list() {
                    Some(items) => items.iter().any(|i| i == value),
                    None => v.as_text().is_some_and(|s| s.contains(value.as_str())),
                },
                None => false,
            },
            Predicate::Not { predicate } => !predicate.evaluate(state),
            Predicate::All { of } => of.iter().all(|p| p.evaluate(state)),
            Predicate::Any { of } => of.iter().any(|p| p.evaluate(state)),
            Predicate::Custom(f) => (f.0)(state),
        }
    }

    /// Field names this predicate reads. Custom predicates report none.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Equals { field, .. }
            | Predicate::NotEquals { field, .. }
            | Predicate::IsSet { field }
            | Predicate::Contains { field, .. } => out.push(field),
            Predicate::Not { predicate } => predicate.collect_references(out),
            Predicate::All { of } | Predicate::Any { of } => {
                for p in of {
                    p.collect_references(out);
                }
            }
            Predicate::Always | Predicate::Never | Predicate::Custom(_) => {}
        }
    }
}

/// A validation rule attached to one field. Produces a message when the
/// current state violates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationRule {
    /// The owning field's text must not contain `substring`.
    ForbidSubstring { substring: String, message: String },
    /// The owning field must be set.
    NotEmpty { message: String },
    /// Fails whenever `when` holds.
    FailsWhen { when: Predicate, message: String },
    #[serde(skip)]
    Custom(ValidatorFn),
}

impl ValidationRule {
    pub fn forbid_substring(substring: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationRule::ForbidSubstring {
            substring: substring.into(),
            message: message.into(),
        }
    }

    pub fn fails_when(when: Predicate, message: impl Into<String>) -> Self {
        ValidationRule::FailsWhen {
            when,
            message: message.into(),
        }
    }

    /// Check the rule for the field named `owner`.
    pub fn check(&self, owner: &str, state: &FormState) -> Option<String> {
        match self {
            ValidationRule::ForbidSubstring { substring, message } => state
                .text(owner)
                .filter(|v| v.contains(substring.as_str()))
                .map(|_| message.clone()),
            ValidationRule::NotEmpty { message } => {
                (!state.is_set(owner)).then(|| message.clone())
            }
            ValidationRule::FailsWhen { when, message } => {
                when.evaluate(state).then(|| message.clone())
            }
            ValidationRule::Custom(f) => (f.0)(state).filter(|m| !m.is_empty()),
        }
    }

    /// Field names this rule reads besides its owner.
    pub fn references(&self) -> Vec<&str> {
        match self {
            ValidationRule::FailsWhen { when, .. } => when.references(),
            _ => Vec::new(),
        }
    }
}

//! Predicate evaluation: per-field visibility, enablement, and validation.
//!
//! Every rule sees the same state snapshot and rules never read each
//! other's results, so evaluation order cannot change the outcome.
//! Validation here is advisory; nothing in this module can stop a
//! document from being emitted.

use blockform_fields::{FieldDef, FieldValue, FormState, SchemaRegistry, Widget};
use serde::Serialize;
use tracing::trace;

use crate::sync::FieldEdit;

/// Derived status of one field for one state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldStatus {
    pub name: String,
    pub visible: bool,
    pub enabled: bool,
    pub validation_message: Option<String>,
}

/// An advisory validation failure on a visible field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

/// Evaluate one field against a state.
pub fn evaluate_field(def: &FieldDef, state: &FormState) -> FieldStatus {
    let visible = def.visible_when.evaluate(state);
    let enabled = def.enabled_when.evaluate(state);
    let validation_message = def
        .validate
        .iter()
        .find_map(|rule| rule.check(&def.name, state));
    trace!(field = %def.name, visible, enabled, invalid = validation_message.is_some(), "evaluated field");
    FieldStatus {
        name: def.name.clone(),
        visible,
        enabled,
        validation_message,
    }
}

/// Evaluate every field, in registry order.
pub fn evaluate(registry: &SchemaRegistry, state: &FormState) -> Vec<FieldStatus> {
    registry
        .fields_in_order()
        .iter()
        .map(|def| evaluate_field(def, state))
        .collect()
}

/// What the render layer needs to draw one visible field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub name: String,
    pub description: Option<String>,
    pub widget: Widget,
    pub options: Vec<String>,
    pub value: FieldValue,
    pub enabled: bool,
    pub validation_message: Option<String>,
}

impl FieldView {
    /// The edit that replaces this field's value.
    pub fn set(&self, value: impl Into<FieldValue>) -> FieldEdit {
        FieldEdit::Set {
            field: self.name.clone(),
            value: value.into(),
        }
    }

    /// The edit that flips one checkbox of a multi-select.
    pub fn toggle(&self, option: impl Into<String>) -> FieldEdit {
        FieldEdit::Toggle {
            field: self.name.clone(),
            option: option.into(),
        }
    }

    /// Whether a multi-select option is currently checked.
    pub fn is_checked(&self, option: &str) -> bool {
        self.value
            .as_list()
            .is_some_and(|items| items.iter().any(|i| i == option))
    }
}

/// The visible fields of one state, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderPlan {
    pub revision: u64,
    pub fields: Vec<FieldView>,
}

impl RenderPlan {
    pub fn field(&self, name: &str) -> Option<&FieldView> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validation messages of visible fields. Callers that need hard
    /// validation gate on this before trusting an emitted document.
    pub fn issues(&self) -> Vec<ValidationIssue> {
        self.fields
            .iter()
            .filter_map(|f| {
                f.validation_message.as_ref().map(|message| ValidationIssue {
                    field: f.name.clone(),
                    message: message.clone(),
                })
            })
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(|f| f.validation_message.is_none())
    }
}

/// Build the render plan. Hidden fields are left out; their values stay in `state`.
pub fn render_plan(registry: &SchemaRegistry, state: &FormState, revision: u64) -> RenderPlan {
    let fields = registry
        .fields_in_order()
        .iter()
        .filter_map(|def| {
            let status = evaluate_field(def, state);
            if !status.visible {
                return None;
            }
            let value = state.get(&def.name).cloned().unwrap_or_else(|| def.default.clone());
            Some(FieldView {
                name: status.name,
                description: def.caption().map(str::to_string),
                widget: def.widget(),
                options: def.kind.options().to_vec(),
                value,
                enabled: status.enabled,
                validation_message: status.validation_message,
            })
        })
        .collect();

    RenderPlan { revision, fields }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockform_fields::{Predicate, ValidationRule};

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builder()
            .field(FieldDef::text("title", "t").description(""))
            .field(FieldDef::select("mode", &["simple", "advanced"], "simple"))
            .field(
                FieldDef::text("extra", "")
                    .description("Only for advanced mode")
                    .visible_when(Predicate::equals("mode", "advanced")),
            )
            .field(
                FieldDef::text("locked", "x")
                    .enabled_when(Predicate::negate(Predicate::is_set("extra"))),
            )
            .field(
                FieldDef::text("slug", "ok")
                    .validate(ValidationRule::forbid_substring(" ", "no spaces"))
                    .validate(ValidationRule::NotEmpty {
                        message: "required".into(),
                    }),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn evaluates_every_field_in_order() {
        let registry = registry();
        let statuses = evaluate(&registry, &FormState::defaults(&registry));
        let names: Vec<_> = statuses.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["title", "mode", "extra", "locked", "slug"]);
        assert!(!statuses[2].visible);
        assert!(statuses[3].enabled);
    }

    #[test]
    fn hidden_fields_leave_the_plan_but_not_the_state() {
        let registry = registry();
        let state = FormState::defaults(&registry).with_value("extra", "kept".into());
        let plan = render_plan(&registry, &state, 1);
        assert!(plan.field("extra").is_none());
        assert_eq!(state.text("extra"), Some("kept"));

        let state = state.with_value("mode", "advanced".into());
        let plan = render_plan(&registry, &state, 2);
        assert_eq!(plan.field("extra").unwrap().value, FieldValue::from("kept"));
    }

    #[test]
    fn disabled_fields_are_still_rendered() {
        let registry = registry();
        let state = FormState::defaults(&registry).with_value("extra", "set".into());
        let plan = render_plan(&registry, &state, 1);
        let locked = plan.field("locked").unwrap();
        assert!(!locked.enabled);
    }

    #[test]
    fn first_failing_rule_wins() {
        let registry = registry();
        let state = FormState::defaults(&registry).with_value("slug", "a b".into());
        let plan = render_plan(&registry, &state, 1);
        assert_eq!(
            plan.field("slug").unwrap().validation_message.as_deref(),
            Some("no spaces")
        );

        let state = state.with_value("slug", "".into());
        let plan = render_plan(&registry, &state, 2);
        assert_eq!(
            plan.issues(),
            vec![ValidationIssue {
                field: "slug".into(),
                message: "required".into(),
            }]
        );
        assert!(!plan.is_valid());
    }

    #[test]
    fn hidden_fields_report_no_issues() {
        let registry = SchemaRegistry::builder()
            .field(FieldDef::select("mode", &["a", "b"], "a"))
            .field(
                FieldDef::text("x", "")
                    .visible_when(Predicate::equals("mode", "b"))
                    .validate(ValidationRule::NotEmpty {
                        message: "required".into(),
                    }),
            )
            .build()
            .unwrap();
        let state = FormState::defaults(&registry);
        assert!(render_plan(&registry, &state, 0).is_valid());
        assert!(evaluate(&registry, &state)[1].validation_message.is_some());
    }

    #[test]
    fn view_carries_widget_caption_and_options() {
        let registry = registry();
        let plan = render_plan(&registry, &FormState::defaults(&registry), 7);
        assert_eq!(plan.revision, 7);
        let title = plan.field("title").unwrap();
        assert_eq!(title.description, None);
        assert_eq!(title.widget, Widget::TextInput);
        let mode = plan.field("mode").unwrap();
        assert_eq!(mode.widget, Widget::Dropdown);
        assert_eq!(mode.options, vec!["simple", "advanced"]);
    }

    #[test]
    fn view_builds_edits() {
        let registry = registry();
        let plan = render_plan(&registry, &FormState::defaults(&registry), 0);
        let edit = plan.field("title").unwrap().set("new");
        assert_eq!(
            edit,
            FieldEdit::Set {
                field: "title".into(),
                value: FieldValue::from("new"),
            }
        );
    }
}

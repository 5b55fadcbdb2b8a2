//! Built-in schema for slash command configuration files.
//!
//! `slash_command_schema()` is the form for a `.yaml` file describing one
//! slash command: what the user types, where the command is offered, and
//! either a webhook or a markdown replacement.

use blockform_fields::{FieldDef, Predicate, Result, SchemaRegistry, ValidationRule};

pub const TITLE: &str = "title";
pub const DESCRIPTION: &str = "description";
pub const TYPE: &str = "type";
pub const SURFACES: &str = "surfaces";
pub const TRIGGER_ON: &str = "trigger-on";
pub const VALUE: &str = "value";
pub const VALUE_SOURCE: &str = "value_source";

pub const WEBHOOK: &str = "webhook";
pub const MD_SHORTCUT: &str = "md_shortcut";

pub const ALL_SURFACES: [&str; 4] = [
    "issue_description",
    "issue_comment",
    "pull_request_description",
    "pull_request_comment",
];

/// Replacement text and a replacement file are alternatives.
fn value_conflict() -> ValidationRule {
    ValidationRule::fails_when(
        Predicate::All {
            of: vec![Predicate::is_set(VALUE), Predicate::is_set(VALUE_SOURCE)],
        },
        "Cannot set both value and value_source",
    )
}

/// All slash command field definitions, in display order.
pub fn slash_command_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::text(TITLE, "My slash command").description(
            "When the slash command menu appears after typing \"/\" what should the title be? ",
        ),
        FieldDef::multiline(DESCRIPTION, "").description(""),
        FieldDef::select(TYPE, &[WEBHOOK, MD_SHORTCUT], WEBHOOK)
            .description("Type of slash command, can be Webhook or MD-Shortcut"),
        FieldDef::multi_select(SURFACES, &ALL_SURFACES, &ALL_SURFACES).description(
            "What surfaces the slash command should appear on when a user types \"/\"",
        ),
        FieldDef::text(TRIGGER_ON, "my-command")
            .description("What do users type to use this slash command")
            .validate(ValidationRule::forbid_substring(
                " ",
                "Trigger on cannot contain spaces",
            )),
        FieldDef::multiline(VALUE, "")
            .description(
                "What should your trigger word be replaced with after the user hits enter?",
            )
            .visible_when(Predicate::not_equals(TYPE, WEBHOOK))
            .validate(value_conflict()),
        FieldDef::text(VALUE_SOURCE, "file.md")
            .description("Same as above, except pull a .md file for the contents")
            .visible_when(Predicate::not_equals(TYPE, WEBHOOK))
            .validate(value_conflict()),
    ]
}

/// The slash command schema registry.
pub fn slash_command_schema() -> Result<SchemaRegistry> {
    SchemaRegistry::builder()
        .fields(slash_command_fields())
        .build()
}

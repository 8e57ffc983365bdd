//! Naming conventions for fields, enum values, and methods.

use crate::descriptor::DescriptorKind;
use crate::problem::Problem;
use crate::rule::{LintRule, RuleId};
use regex::Regex;
use std::sync::OnceLock;

fn lower_snake_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9]*(_[a-z0-9]+)*$").expect("static regex"))
}

fn upper_snake_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9]*(_[A-Z0-9]+)*$").expect("static regex"))
}

fn upper_camel_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").expect("static regex"))
}

/// Best-effort snake_case rendering used for fix suggestions.
fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else if c == '-' || c == ' ' {
            out.push('_');
            prev_lower = false;
        } else {
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c);
        }
    }
    out
}

/// `aep::0140::field-names`: field names use lower_snake_case.
pub fn field_names() -> LintRule {
    LintRule::new(
        RuleId::new("aep", "0140", "field-names"),
        &[DescriptorKind::Field],
        |set, node| {
            let name = &set.get(node).name;
            if lower_snake_re().is_match(name) {
                return Vec::new();
            }
            vec![Problem::new(
                set,
                node,
                RuleId::new("aep", "0140", "field-names"),
                format!("field name {:?} must use lower_snake_case", name),
            )
            .with_suggestion(to_snake_case(name))]
        },
    )
}

/// `aep::0126::enum-value-names`: enum values use UPPER_SNAKE_CASE.
pub fn enum_value_names() -> LintRule {
    LintRule::new(
        RuleId::new("aep", "0126", "enum-value-names"),
        &[DescriptorKind::EnumValue],
        |set, node| {
            let name = &set.get(node).name;
            if upper_snake_re().is_match(name) {
                return Vec::new();
            }
            vec![Problem::new(
                set,
                node,
                RuleId::new("aep", "0126", "enum-value-names"),
                format!("enum value {:?} must use UPPER_SNAKE_CASE", name),
            )
            .with_suggestion(to_snake_case(name).to_ascii_uppercase())]
        },
    )
}

/// `aep::0136::method-names`: method names use UpperCamelCase.
pub fn method_names() -> LintRule {
    LintRule::new(
        RuleId::new("aep", "0136", "method-names"),
        &[DescriptorKind::Method],
        |set, node| {
            let name = &set.get(node).name;
            if upper_camel_re().is_match(name) {
                return Vec::new();
            }
            vec![Problem::new(
                set,
                node,
                RuleId::new("aep", "0136", "method-names"),
                format!("method name {:?} must use UpperCamelCase", name),
            )]
        },
    )
}

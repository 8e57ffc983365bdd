//! Problem records: one reported violation, anchored to a descriptor.
//!
//! Problems are created inside a rule's `evaluate`, handed to the aggregator,
//! and never mutated afterwards. The serialized shape is the engine's output
//! contract to reporters.

use crate::descriptor::{DescriptorId, DescriptorSet};
use crate::rule::RuleId;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Source location of the offending declaration.
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Serialize)]
/// One violation. Equality for deduplication is (rule_id, descriptor_path,
/// message); see `aggregate`.
pub struct Problem {
    pub rule_id: RuleId,
    #[serde(skip)]
    pub descriptor: DescriptorId,
    /// Dotted full name of the anchored descriptor.
    pub descriptor_path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub location: Location,
    /// Set when the problem is a synthetic rule-execution fault rather than a
    /// schema violation.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub internal: bool,
    /// Declaration index within the file, used only for ordering.
    #[serde(skip)]
    pub(crate) decl_index: u32,
}

impl Problem {
    /// Create a problem anchored on `descriptor`, capturing its location and
    /// full name from the set.
    pub fn new(
        set: &DescriptorSet,
        descriptor: DescriptorId,
        rule_id: RuleId,
        message: impl Into<String>,
    ) -> Problem {
        let node = set.get(descriptor);
        Problem {
            rule_id,
            descriptor,
            descriptor_path: set.full_name(descriptor),
            message: message.into(),
            suggestion: None,
            location: Location {
                file: set.file_path(descriptor).to_string(),
                line: node.pos.line,
                column: node.pos.column,
            },
            internal: false,
            decl_index: node.decl_index,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Problem {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Synthetic problem for a rule that faulted while evaluating.
    pub(crate) fn internal_fault(
        set: &DescriptorSet,
        descriptor: DescriptorId,
        rule_id: RuleId,
        detail: &str,
    ) -> Problem {
        let mut p = Problem::new(
            set,
            descriptor,
            rule_id.clone(),
            format!("internal: rule {} failed to evaluate: {}", rule_id, detail),
        );
        p.internal = true;
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TreeBuilder;
    use crate::rule::RuleId;

    #[test]
    fn test_problem_captures_anchor() {
        let mut b = TreeBuilder::new();
        let f = b.file("a.proto", "pkg");
        let m = b.message(f, "Msg");
        let fld = b.field(m, "x", "string", &[]);
        b.set_pos(fld, 12, 3);
        let set = b.finish();

        let p = Problem::new(&set, fld, RuleId::new("aep", "0140", "field-names"), "bad")
            .with_suggestion("rename it");
        assert_eq!(p.descriptor_path, "pkg.Msg.x");
        assert_eq!(p.location.file, "a.proto");
        assert_eq!(p.location.line, 12);
        assert_eq!(p.suggestion.as_deref(), Some("rename it"));
        assert!(!p.internal);
    }

    #[test]
    fn test_internal_fault_is_marked() {
        let mut b = TreeBuilder::new();
        let f = b.file("a.proto", "");
        let set = b.finish();
        let p = Problem::internal_fault(&set, f, RuleId::new("aep", "0131", "x"), "panic");
        assert!(p.internal);
        assert!(p.message.starts_with("internal:"));
    }
}

//! Standard-method request checks: which fields a request may require.
//!
//! AEPs sanction a small set of required fields per operation kind (`parent`
//! on Create/List, `path` on Get/Delete, the resource payload on
//! Create/Update). Anything else marked required is a violation anchored on
//! the offending field.

use crate::descriptor::{DescriptorId, DescriptorKind, DescriptorSet, FieldBehavior};
use crate::problem::Problem;
use crate::rule::{LintRule, RuleId};
use regex::Regex;
use std::sync::OnceLock;

fn request_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(Get|List|Create|Update|Delete)([A-Z][A-Za-z0-9]*)?Request$")
            .expect("static regex")
    })
}

/// Verb of a standard-method request message name, if it is one.
pub fn request_verb(message_name: &str) -> Option<&str> {
    request_re()
        .captures(message_name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Whether a field's declared type resolves to a message carrying a resource
/// annotation anywhere in the set. Cross-file resolution is allowed; rules
/// only read.
fn is_resource_field(set: &DescriptorSet, field: DescriptorId) -> bool {
    let Some(meta) = set.get(field).field.as_ref() else {
        return false;
    };
    set.find_named(DescriptorKind::Message, &meta.type_name)
        .map(|m| set.get(m).resource.is_some())
        .unwrap_or(false)
}

fn required_fields_check(
    set: &DescriptorSet,
    node: DescriptorId,
    verb: &str,
    allowed: &[&str],
    allow_resource: bool,
    rule: RuleId,
) -> Vec<Problem> {
    if request_verb(&set.get(node).name) != Some(verb) {
        return Vec::new();
    }
    let mut problems = Vec::new();
    for &child in &set.get(node).children {
        let d = set.get(child);
        if d.kind != DescriptorKind::Field {
            continue;
        }
        let Some(meta) = d.field.as_ref() else {
            continue;
        };
        if !meta.has_behavior(FieldBehavior::Required) {
            continue;
        }
        if allowed.contains(&d.name.as_str()) {
            continue;
        }
        if allow_resource && is_resource_field(set, child) {
            continue;
        }
        problems.push(
            Problem::new(
                set,
                child,
                rule.clone(),
                format!(
                    "{} RPCs must only require fields explicitly described in AEPs, not {:?}",
                    verb, d.name
                ),
            )
            .with_suggestion(format!("mark {:?} as optional", d.name)),
        );
    }
    problems
}

pub fn get_request_required_fields() -> LintRule {
    LintRule::new(
        RuleId::new("aep", "0131", "request-required-fields"),
        &[DescriptorKind::Message],
        |set, node| {
            required_fields_check(
                set,
                node,
                "Get",
                &["path"],
                false,
                RuleId::new("aep", "0131", "request-required-fields"),
            )
        },
    )
}

pub fn list_request_required_fields() -> LintRule {
    LintRule::new(
        RuleId::new("aep", "0132", "request-required-fields"),
        &[DescriptorKind::Message],
        |set, node| {
            required_fields_check(
                set,
                node,
                "List",
                &["parent"],
                false,
                RuleId::new("aep", "0132", "request-required-fields"),
            )
        },
    )
}

pub fn create_request_required_fields() -> LintRule {
    LintRule::new(
        RuleId::new("aep", "0133", "request-required-fields"),
        &[DescriptorKind::Message],
        |set, node| {
            required_fields_check(
                set,
                node,
                "Create",
                &["parent", "id"],
                true,
                RuleId::new("aep", "0133", "request-required-fields"),
            )
        },
    )
}

pub fn update_request_required_fields() -> LintRule {
    LintRule::new(
        RuleId::new("aep", "0134", "request-required-fields"),
        &[DescriptorKind::Message],
        |set, node| {
            required_fields_check(
                set,
                node,
                "Update",
                &["update_mask"],
                true,
                RuleId::new("aep", "0134", "request-required-fields"),
            )
        },
    )
}

pub fn delete_request_required_fields() -> LintRule {
    LintRule::new(
        RuleId::new("aep", "0135", "request-required-fields"),
        &[DescriptorKind::Message],
        |set, node| {
            required_fields_check(
                set,
                node,
                "Delete",
                &["path"],
                false,
                RuleId::new("aep", "0135", "request-required-fields"),
            )
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DescriptorSet, ResourceMeta, TreeBuilder};
    use crate::diff::{ExpectedProblem, Expectation};
    use crate::rule::Rule;

    /// Build a create-request file mirroring the canonical shelf schema:
    /// `parent` and the resource field required, plus one extra field under
    /// test.
    fn create_shelf_file(extra: Option<(&str, &str, FieldBehavior)>) -> (DescriptorSet, DescriptorId) {
        let mut b = TreeBuilder::new();
        let f = b.file("library.proto", "library");
        let shelf = b.message(f, "BookShelf");
        b.set_resource(
            shelf,
            ResourceMeta {
                type_url: "library.example.com/BookShelf".into(),
                singular: "bookShelf".into(),
                patterns: vec!["publishers/{publisher}/bookShelves/{book_shelf}".into()],
            },
        );
        b.field(shelf, "name", "string", &[]);
        b.message(f, "Foo");
        let req = b.message(f, "CreateBookShelfRequest");
        b.field(req, "parent", "string", &[FieldBehavior::Required]);
        b.field(req, "book_shelf", "BookShelf", &[FieldBehavior::Required]);
        if let Some((name, type_name, behavior)) = extra {
            b.field(req, name, type_name, &[behavior]);
        }
        (b.finish(), req)
    }

    fn lint_message(rule: &dyn Rule, set: &DescriptorSet, msg: DescriptorId) -> Vec<Problem> {
        rule.evaluate(set, msg)
    }

    #[test]
    fn test_create_valid_no_extra_fields() {
        let (set, req) = create_shelf_file(None);
        let rule = create_request_required_fields();
        let actual = lint_message(&rule, &set, req);
        assert_eq!(Expectation::none().diff(&actual), "");
    }

    #[test]
    fn test_create_valid_optional_validate_only() {
        let (set, req) = create_shelf_file(Some(("validate_only", "string", FieldBehavior::Optional)));
        let rule = create_request_required_fields();
        assert_eq!(Expectation::none().diff(&lint_message(&rule, &set, req)), "");
    }

    #[test]
    fn test_create_invalid_required_validate_only() {
        let (set, req) = create_shelf_file(Some(("validate_only", "bool", FieldBehavior::Required)));
        let rule = create_request_required_fields();
        let actual = lint_message(&rule, &set, req);
        let field = set.find_field(req, "validate_only").unwrap();
        let exp = Expectation::new(vec![ExpectedProblem::new().message(
            r#"Create RPCs must only require fields explicitly described in AEPs, not "validate_only""#,
        )])
        .with_descriptor(field);
        assert_eq!(exp.diff(&actual), "");
    }

    #[test]
    fn test_create_invalid_required_unknown_field() {
        let (set, req) = create_shelf_file(Some(("create_iam", "bool", FieldBehavior::Required)));
        let rule = create_request_required_fields();
        let field = set.find_field(req, "create_iam").unwrap();
        let exp = Expectation::new(vec![ExpectedProblem::new().message(
            r#"Create RPCs must only require fields explicitly described in AEPs, not "create_iam""#,
        )])
        .with_descriptor(field);
        assert_eq!(exp.diff(&lint_message(&rule, &set, req)), "");
    }

    #[test]
    fn test_create_invalid_required_non_resource_message_field() {
        // Foo is a message but carries no resource annotation.
        let (set, req) = create_shelf_file(Some(("foo", "Foo", FieldBehavior::Required)));
        let rule = create_request_required_fields();
        let field = set.find_field(req, "foo").unwrap();
        let exp = Expectation::new(vec![ExpectedProblem::new().message(
            r#"Create RPCs must only require fields explicitly described in AEPs, not "foo""#,
        )])
        .with_descriptor(field);
        assert_eq!(exp.diff(&lint_message(&rule, &set, req)), "");
    }

    #[test]
    fn test_create_required_id_is_sanctioned() {
        let (set, req) = create_shelf_file(Some(("id", "string", FieldBehavior::Required)));
        let rule = create_request_required_fields();
        assert_eq!(Expectation::none().diff(&lint_message(&rule, &set, req)), "");
    }

    fn delete_book_file(extra: Option<(&str, FieldBehavior)>) -> (DescriptorSet, DescriptorId) {
        let mut b = TreeBuilder::new();
        let f = b.file("library.proto", "library");
        let req = b.message(f, "DeleteBookRequest");
        b.field(req, "path", "string", &[FieldBehavior::Required]);
        if let Some((name, behavior)) = extra {
            b.field(req, name, "bool", &[behavior]);
        }
        (b.finish(), req)
    }

    #[test]
    fn test_delete_valid_no_extra_fields() {
        let (set, req) = delete_book_file(None);
        let rule = delete_request_required_fields();
        assert_eq!(Expectation::none().diff(&lint_message(&rule, &set, req)), "");
    }

    #[test]
    fn test_delete_valid_optional_allow_missing() {
        let (set, req) = delete_book_file(Some(("allow_missing", FieldBehavior::Optional)));
        let rule = delete_request_required_fields();
        assert_eq!(Expectation::none().diff(&lint_message(&rule, &set, req)), "");
    }

    #[test]
    fn test_delete_invalid_required_allow_missing() {
        let (set, req) = delete_book_file(Some(("allow_missing", FieldBehavior::Required)));
        let rule = delete_request_required_fields();
        let field = set.find_field(req, "allow_missing").unwrap();
        let exp = Expectation::new(vec![ExpectedProblem::new().message(
            r#"Delete RPCs must only require fields explicitly described in AEPs, not "allow_missing""#,
        )])
        .with_descriptor(field);
        assert_eq!(exp.diff(&lint_message(&rule, &set, req)), "");
    }

    fn list_shelves_file(extra: Option<(&str, FieldBehavior)>) -> (DescriptorSet, DescriptorId) {
        let mut b = TreeBuilder::new();
        let f = b.file("library.proto", "library");
        let req = b.message(f, "ListBookShelvesRequest");
        b.field(req, "parent", "string", &[FieldBehavior::Required]);
        if let Some((name, behavior)) = extra {
            b.field(req, name, "string", &[behavior]);
        }
        (b.finish(), req)
    }

    #[test]
    fn test_list_required_parent_is_sanctioned() {
        let (set, req) = list_shelves_file(None);
        let rule = list_request_required_fields();
        assert_eq!(Expectation::none().diff(&lint_message(&rule, &set, req)), "");
    }

    #[test]
    fn test_list_valid_optional_filter() {
        let (set, req) = list_shelves_file(Some(("filter", FieldBehavior::Optional)));
        let rule = list_request_required_fields();
        assert_eq!(Expectation::none().diff(&lint_message(&rule, &set, req)), "");
    }

    #[test]
    fn test_list_invalid_required_filter() {
        let (set, req) = list_shelves_file(Some(("filter", FieldBehavior::Required)));
        let rule = list_request_required_fields();
        let field = set.find_field(req, "filter").unwrap();
        let exp = Expectation::new(vec![ExpectedProblem::new().message(
            r#"List RPCs must only require fields explicitly described in AEPs, not "filter""#,
        )])
        .with_descriptor(field);
        assert_eq!(exp.diff(&lint_message(&rule, &set, req)), "");
    }

    /// Update request with `update_mask` and the resource payload required,
    /// plus one extra field under test.
    fn update_book_file(extra: Option<(&str, &str, FieldBehavior)>) -> (DescriptorSet, DescriptorId) {
        let mut b = TreeBuilder::new();
        let f = b.file("library.proto", "library");
        let book = b.message(f, "Book");
        b.set_resource(
            book,
            ResourceMeta {
                type_url: "library.example.com/Book".into(),
                singular: "book".into(),
                patterns: vec!["publishers/{publisher}/books/{book}".into()],
            },
        );
        let req = b.message(f, "UpdateBookRequest");
        b.field(req, "update_mask", "FieldMask", &[FieldBehavior::Required]);
        b.field(req, "book", "Book", &[FieldBehavior::Required]);
        if let Some((name, type_name, behavior)) = extra {
            b.field(req, name, type_name, &[behavior]);
        }
        (b.finish(), req)
    }

    #[test]
    fn test_update_mask_and_payload_are_sanctioned() {
        let (set, req) = update_book_file(None);
        let rule = update_request_required_fields();
        assert_eq!(Expectation::none().diff(&lint_message(&rule, &set, req)), "");
    }

    #[test]
    fn test_update_invalid_required_validate_only() {
        let (set, req) = update_book_file(Some(("validate_only", "bool", FieldBehavior::Required)));
        let rule = update_request_required_fields();
        let field = set.find_field(req, "validate_only").unwrap();
        let exp = Expectation::new(vec![ExpectedProblem::new().message(
            r#"Update RPCs must only require fields explicitly described in AEPs, not "validate_only""#,
        )])
        .with_descriptor(field);
        assert_eq!(exp.diff(&lint_message(&rule, &set, req)), "");
    }

    #[test]
    fn test_get_required_path_sanctioned_extra_flagged() {
        let mut b = TreeBuilder::new();
        let f = b.file("library.proto", "library");
        let req = b.message(f, "GetBookRequest");
        b.field(req, "path", "string", &[FieldBehavior::Required]);
        let extra = b.field(req, "read_mask", "string", &[FieldBehavior::Required]);
        let set = b.finish();
        let rule = get_request_required_fields();
        let actual = lint_message(&rule, &set, req);
        let exp = Expectation::new(vec![ExpectedProblem::new().message(
            r#"Get RPCs must only require fields explicitly described in AEPs, not "read_mask""#,
        )])
        .with_descriptor(extra);
        assert_eq!(exp.diff(&actual), "");
    }

    #[test]
    fn test_non_request_messages_ignored() {
        let mut b = TreeBuilder::new();
        let f = b.file("library.proto", "library");
        let m = b.message(f, "BookShelf");
        b.field(m, "weird", "bool", &[FieldBehavior::Required]);
        let set = b.finish();
        for rule in [
            get_request_required_fields(),
            list_request_required_fields(),
            create_request_required_fields(),
            update_request_required_fields(),
            delete_request_required_fields(),
        ] {
            assert!(lint_message(&rule, &set, m).is_empty());
        }
    }

    #[test]
    fn test_request_verb_parsing() {
        assert_eq!(request_verb("CreateBookShelfRequest"), Some("Create"));
        assert_eq!(request_verb("DeleteBookRequest"), Some("Delete"));
        assert_eq!(request_verb("CreateRequest"), Some("Create"));
        assert_eq!(request_verb("BookShelf"), None);
        assert_eq!(request_verb("CreatedRequest"), None);
        assert_eq!(request_verb("RequestCreate"), None);
    }
}

//! Enablement resolution for a (rule, descriptor) pair.
//!
//! Precedence, most specific wins:
//! 1. inline directive on the descriptor itself or the nearest ancestor
//!    (ancestor directives apply only when subtree-scoped); at one node a
//!    rule-id directive beats a category directive;
//! 2. config entry whose path matches and whose target is the rule id;
//! 3. config entry whose path matches and whose target is the rule's
//!    category;
//! 4. the rule's own default (enabled).
//!
//! Within tiers 2 and 3, entries are scanned in config declaration order and
//! the last matching entry wins. Resolution is a pure function of the config
//! and the descriptor's ancestry; it does not depend on traversal order.

use crate::config::Config;
use crate::descriptor::{DescriptorId, DescriptorSet};
use crate::rule::{Rule, Target};

/// Decide whether `rule` is enabled for `node`.
pub fn enabled(config: &Config, set: &DescriptorSet, node: DescriptorId, rule: &dyn Rule) -> bool {
    if let Some(state) = inline_state(set, node, rule) {
        return state;
    }
    if let Some(state) = path_state(config, set, node, rule) {
        return state;
    }
    rule.enabled_by_default()
}

/// Tier 1: nearest applicable inline directive, walking from the node to the
/// file root. A directive on the node itself always applies; directives on
/// ancestors apply only when subtree-scoped, so a deeper directive can
/// re-enable a rule below a subtree suppression.
fn inline_state(set: &DescriptorSet, node: DescriptorId, rule: &dyn Rule) -> Option<bool> {
    let chain = std::iter::once(node).chain(set.ancestors(node));
    for (depth, cur) in chain.enumerate() {
        let directives = &set.get(cur).directives;
        let applicable = directives
            .iter()
            .filter(|d| (depth == 0 || d.subtree) && d.target.covers(rule.id()));
        // Rule-id directives beat category directives at the same node; among
        // equals the last declared wins.
        let mut by_rule: Option<bool> = None;
        let mut by_category: Option<bool> = None;
        for d in applicable {
            match &d.target {
                Target::Rule(_) => by_rule = Some(d.enabled),
                Target::Category(_) => by_category = Some(d.enabled),
            }
        }
        if let Some(s) = by_rule.or(by_category) {
            return Some(s);
        }
    }
    None
}

/// Tiers 2 and 3: last matching path-scoped entry, rule targets before
/// category targets.
fn path_state(
    config: &Config,
    set: &DescriptorSet,
    node: DescriptorId,
    rule: &dyn Rule,
) -> Option<bool> {
    let file = set.file_path(node);
    let package = set.package(node);
    let mut by_rule: Option<bool> = None;
    let mut by_category: Option<bool> = None;
    for entry in &config.overrides {
        if !entry.target.covers(rule.id()) || !entry.matches(file, package) {
            continue;
        }
        if entry.target.is_rule() {
            by_rule = Some(entry.enabled);
        } else {
            by_category = Some(entry.enabled);
        }
    }
    by_rule.or(by_category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, RawConfig, RawOverride};
    use crate::descriptor::{Directive, DescriptorKind, TreeBuilder};
    use crate::rule::{LintRule, RuleId, Target};

    fn test_rule() -> LintRule {
        LintRule::new(
            RuleId::new("aep", "0133", "request-required-fields"),
            &[DescriptorKind::Message],
            |_, _| Vec::new(),
        )
    }

    fn config(entries: &[(&str, &str, bool)]) -> Config {
        let raw = RawConfig {
            overrides: entries
                .iter()
                .map(|(path, target, enabled)| RawOverride {
                    path: path.to_string(),
                    target: target.to_string(),
                    enabled: *enabled,
                })
                .collect(),
        };
        Config::from_raw(&raw, "test").unwrap()
    }

    #[test]
    fn test_default_is_enabled() {
        let mut b = TreeBuilder::new();
        let f = b.file("a.proto", "pkg");
        let m = b.message(f, "M");
        let set = b.finish();
        assert!(enabled(&Config::default(), &set, m, &test_rule()));
    }

    #[test]
    fn test_path_entry_rule_beats_category() {
        let mut b = TreeBuilder::new();
        let f = b.file("a.proto", "pkg");
        let m = b.message(f, "M");
        let set = b.finish();
        let cfg = config(&[
            ("**", "aep::0133", false),
            ("**", "aep::0133::request-required-fields", true),
        ]);
        assert!(enabled(&cfg, &set, m, &test_rule()));
        // Category alone disables.
        let cfg = config(&[("**", "aep::0133", false)]);
        assert!(!enabled(&cfg, &set, m, &test_rule()));
    }

    #[test]
    fn test_equal_specificity_last_wins() {
        let mut b = TreeBuilder::new();
        let f = b.file("a.proto", "pkg");
        let m = b.message(f, "M");
        let set = b.finish();
        let cfg = config(&[
            ("**", "aep::0133::request-required-fields", false),
            ("a.*", "aep::0133::request-required-fields", true),
        ]);
        assert!(enabled(&cfg, &set, m, &test_rule()));
        let cfg = config(&[
            ("a.*", "aep::0133::request-required-fields", true),
            ("**", "aep::0133::request-required-fields", false),
        ]);
        assert!(!enabled(&cfg, &set, m, &test_rule()));
    }

    #[test]
    fn test_non_matching_path_is_ignored() {
        let mut b = TreeBuilder::new();
        let f = b.file("a.proto", "pkg");
        let m = b.message(f, "M");
        let set = b.finish();
        let cfg = config(&[("other/**", "aep::0133::request-required-fields", false)]);
        assert!(enabled(&cfg, &set, m, &test_rule()));
    }

    #[test]
    fn test_inline_on_node_overrides_path_entries() {
        let mut b = TreeBuilder::new();
        let f = b.file("a.proto", "pkg");
        let m = b.message(f, "M");
        b.add_directive(
            m,
            Directive {
                target: Target::parse("aep::0133::request-required-fields").unwrap(),
                enabled: true,
                subtree: true,
            },
        );
        let set = b.finish();
        let cfg = config(&[("**", "aep::0133::request-required-fields", false)]);
        assert!(enabled(&cfg, &set, m, &test_rule()));
    }

    #[test]
    fn test_subtree_suppression_scopes_to_descendants_only() {
        let mut b = TreeBuilder::new();
        let f = b.file("a.proto", "pkg");
        let parent = b.message(f, "Parent");
        let child = b.message(parent, "Child");
        let sibling = b.message(f, "Sibling");
        b.add_directive(
            parent,
            Directive {
                target: Target::parse("aep::0133").unwrap(),
                enabled: false,
                subtree: true,
            },
        );
        let set = b.finish();
        let cfg = Config::default();
        let rule = test_rule();
        assert!(!enabled(&cfg, &set, parent, &rule));
        assert!(!enabled(&cfg, &set, child, &rule));
        assert!(enabled(&cfg, &set, sibling, &rule));
        assert!(enabled(&cfg, &set, f, &rule));
    }

    #[test]
    fn test_node_scoped_directive_does_not_reach_children() {
        let mut b = TreeBuilder::new();
        let f = b.file("a.proto", "pkg");
        let parent = b.message(f, "Parent");
        let child = b.message(parent, "Child");
        b.add_directive(
            parent,
            Directive {
                target: Target::parse("aep::0133::request-required-fields").unwrap(),
                enabled: false,
                subtree: false,
            },
        );
        let set = b.finish();
        let rule = test_rule();
        assert!(!enabled(&Config::default(), &set, parent, &rule));
        assert!(enabled(&Config::default(), &set, child, &rule));
    }

    #[test]
    fn test_deeper_directive_reenables() {
        let mut b = TreeBuilder::new();
        let f = b.file("a.proto", "pkg");
        let parent = b.message(f, "Parent");
        let child = b.message(parent, "Child");
        let grandchild = b.message(child, "GrandChild");
        b.add_directive(
            parent,
            Directive {
                target: Target::parse("aep::0133").unwrap(),
                enabled: false,
                subtree: true,
            },
        );
        b.add_directive(
            child,
            Directive {
                target: Target::parse("aep::0133::request-required-fields").unwrap(),
                enabled: true,
                subtree: true,
            },
        );
        let set = b.finish();
        let rule = test_rule();
        assert!(!enabled(&Config::default(), &set, parent, &rule));
        assert!(enabled(&Config::default(), &set, child, &rule));
        assert!(enabled(&Config::default(), &set, grandchild, &rule));
    }

    #[test]
    fn test_rule_directive_beats_category_directive_same_node() {
        let mut b = TreeBuilder::new();
        let f = b.file("a.proto", "pkg");
        let m = b.message(f, "M");
        b.add_directive(
            m,
            Directive {
                target: Target::parse("aep::0133").unwrap(),
                enabled: false,
                subtree: true,
            },
        );
        b.add_directive(
            m,
            Directive {
                target: Target::parse("aep::0133::request-required-fields").unwrap(),
                enabled: true,
                subtree: true,
            },
        );
        let set = b.finish();
        assert!(enabled(&Config::default(), &set, m, &test_rule()));
    }
}

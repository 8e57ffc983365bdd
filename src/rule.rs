//! Rule contract and identifier types.
//!
//! A rule identifier is hierarchical: `<guide>::<section>::<kebab-name>`,
//! e.g. `aep::0133::request-required-fields`. The first two segments form the
//! rule's category (the style-guide chapter it enforces). Identifiers stay
//! strings at the config boundary and are parsed into these types internally
//! so a typo in a config target cannot silently match nothing.

use crate::descriptor::{DescriptorId, DescriptorKind, DescriptorSet};
use crate::problem::Problem;
use serde::Serialize;
use thiserror::Error;

/// AEP sections the built-in guide recognizes. Registration of an `aep::`
/// rule outside this list is rejected; other guide names are open for
/// downstream catalogs.
pub const KNOWN_AEP_SECTIONS: &[&str] = &[
    "0121", "0122", "0123", "0126", "0131", "0132", "0133", "0134", "0135", "0136", "0140",
    "0141", "0142", "0143", "0144", "0146", "0148", "0151", "0155", "0156", "0157", "0158",
    "0159", "0161", "0162", "0163", "0164", "0165", "0191", "0192", "0203", "0216", "0231",
    "0233", "0234", "0235",
];

#[derive(Debug, Error, PartialEq, Eq)]
/// Malformed identifier or target string.
pub enum IdError {
    #[error("invalid rule identifier {0:?}: expected <guide>::<section>::<name>")]
    InvalidRuleId(String),
    #[error("invalid target {0:?}: expected <guide>::<section> or <guide>::<section>::<name>")]
    InvalidTarget(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Style-guide chapter a rule enforces, e.g. `aep::0133`.
pub struct Category {
    pub guide: String,
    pub section: String,
}

impl Category {
    pub fn new(guide: &str, section: &str) -> Category {
        Category {
            guide: guide.to_string(),
            section: section.to_string(),
        }
    }

    /// A category is well formed when both segments are non-empty and, for
    /// the built-in `aep` guide, the section is a known chapter.
    pub fn is_known(&self) -> bool {
        if self.guide.is_empty() || self.section.is_empty() {
            return false;
        }
        self.guide != "aep" || KNOWN_AEP_SECTIONS.contains(&self.section.as_str())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.guide, self.section)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Globally-unique rule identifier: category plus kebab-case check name.
pub struct RuleId {
    pub category: Category,
    pub name: String,
}

impl RuleId {
    pub fn new(guide: &str, section: &str, name: &str) -> RuleId {
        RuleId {
            category: Category::new(guide, section),
            name: name.to_string(),
        }
    }

    pub fn parse(s: &str) -> Result<RuleId, IdError> {
        let parts: Vec<&str> = s.split("::").collect();
        match parts.as_slice() {
            [guide, section, name]
                if !guide.is_empty() && !section.is_empty() && !name.is_empty() =>
            {
                Ok(RuleId::new(guide, section, name))
            }
            _ => Err(IdError::InvalidRuleId(s.to_string())),
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.category, self.name)
    }
}

impl Serialize for RuleId {
    fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What a config entry or inline directive applies to: one rule or a whole
/// category.
pub enum Target {
    Rule(RuleId),
    Category(Category),
}

impl Target {
    /// Two segments name a category, three a rule.
    pub fn parse(s: &str) -> Result<Target, IdError> {
        let parts: Vec<&str> = s.split("::").collect();
        match parts.as_slice() {
            [guide, section] if !guide.is_empty() && !section.is_empty() => {
                Ok(Target::Category(Category::new(guide, section)))
            }
            [_, _, _] => RuleId::parse(s)
                .map(Target::Rule)
                .map_err(|_| IdError::InvalidTarget(s.to_string())),
            _ => Err(IdError::InvalidTarget(s.to_string())),
        }
    }

    /// Whether this target covers the given rule.
    pub fn covers(&self, rule: &RuleId) -> bool {
        match self {
            Target::Rule(id) => id == rule,
            Target::Category(cat) => *cat == rule.category,
        }
    }

    /// Rule targets are more specific than category targets.
    pub fn is_rule(&self) -> bool {
        matches!(self, Target::Rule(_))
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Rule(id) => id.fmt(f),
            Target::Category(cat) => cat.fmt(f),
        }
    }
}

/// A named, stateless check over descriptors of the accepted kinds.
///
/// `evaluate` must be deterministic and side-effect free: it may read the
/// whole set (for cross-file type resolution) but never mutate anything.
/// Problems it returns are anchored on descriptors of the set it was given.
pub trait Rule: Send + Sync {
    fn id(&self) -> &RuleId;

    /// Kinds this rule is dispatched on.
    fn kinds(&self) -> &[DescriptorKind];

    /// Default enabled state when no config entry or directive applies.
    fn enabled_by_default(&self) -> bool {
        true
    }

    fn evaluate(&self, set: &DescriptorSet, node: DescriptorId) -> Vec<Problem>;
}

/// Plain-function rule, enough for most of the catalog.
pub struct LintRule {
    pub id: RuleId,
    pub kinds: Vec<DescriptorKind>,
    pub default_enabled: bool,
    pub check: fn(&DescriptorSet, DescriptorId) -> Vec<Problem>,
}

impl LintRule {
    pub fn new(
        id: RuleId,
        kinds: &[DescriptorKind],
        check: fn(&DescriptorSet, DescriptorId) -> Vec<Problem>,
    ) -> LintRule {
        LintRule {
            id,
            kinds: kinds.to_vec(),
            default_enabled: true,
            check,
        }
    }
}

impl Rule for LintRule {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn kinds(&self) -> &[DescriptorKind] {
        &self.kinds
    }

    fn enabled_by_default(&self) -> bool {
        self.default_enabled
    }

    fn evaluate(&self, set: &DescriptorSet, node: DescriptorId) -> Vec<Problem> {
        (self.check)(set, node)
    }
}

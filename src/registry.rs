//! Rule registry: the catalog of all known rules.
//!
//! Built once at startup and threaded through the driver explicitly; there is
//! no process-global catalog. Registration order is preserved because
//! dispatch order feeds problem ordering before the aggregator's final sort.

use crate::descriptor::DescriptorKind;
use crate::rule::{Category, Rule, RuleId};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
/// Configuration-time fatal conditions. These abort the run; they are never
/// reported as problems.
pub enum RegistryError {
    #[error("duplicate rule registration: {0}")]
    DuplicateRule(RuleId),
    #[error("unknown category {0} for rule {1}")]
    UnknownCategory(Category, RuleId),
    #[error("no rule registered with id {0}")]
    NotFound(String),
}

#[derive(Default)]
/// Catalog of rules keyed by identifier, grouped by category.
pub struct Registry {
    rules: Vec<Arc<dyn Rule>>,
    by_id: HashMap<RuleId, usize>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Register a rule. Duplicate identifiers and unknown categories are
    /// fatal.
    pub fn register(&mut self, rule: Arc<dyn Rule>) -> Result<(), RegistryError> {
        let id = rule.id().clone();
        if !id.category.is_known() {
            return Err(RegistryError::UnknownCategory(id.category.clone(), id));
        }
        if self.by_id.contains_key(&id) {
            return Err(RegistryError::DuplicateRule(id));
        }
        self.by_id.insert(id, self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    pub fn lookup(&self, id: &RuleId) -> Result<&dyn Rule, RegistryError> {
        self.by_id
            .get(id)
            .map(|&i| self.rules[i].as_ref())
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &RuleId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Whether any registered rule belongs to the category.
    pub fn has_category(&self, category: &Category) -> bool {
        self.rules.iter().any(|r| r.id().category == *category)
    }

    /// Rules accepting `kind`, in registration order.
    pub fn rules_for_kind(&self, kind: DescriptorKind) -> Vec<&dyn Rule> {
        self.rules
            .iter()
            .filter(|r| r.kinds().contains(&kind))
            .map(|r| r.as_ref())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::LintRule;

    fn rule(section: &str, name: &str, kinds: &[DescriptorKind]) -> Arc<dyn Rule> {
        Arc::new(LintRule::new(
            RuleId::new("aep", section, name),
            kinds,
            |_, _| Vec::new(),
        ))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut reg = Registry::new();
        reg.register(rule("0131", "a", &[DescriptorKind::Message]))
            .unwrap();
        let id = RuleId::new("aep", "0131", "a");
        assert!(reg.lookup(&id).is_ok());
        assert!(reg.contains(&id));
        assert!(reg.has_category(&Category::new("aep", "0131")));
        assert!(!reg.has_category(&Category::new("aep", "0135")));
        assert!(matches!(
            reg.lookup(&RuleId::new("aep", "0131", "b")),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_is_fatal() {
        let mut reg = Registry::new();
        reg.register(rule("0131", "a", &[DescriptorKind::Message]))
            .unwrap();
        let err = reg
            .register(rule("0131", "a", &[DescriptorKind::Field]))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateRule(RuleId::new("aep", "0131", "a")));
    }

    #[test]
    fn test_unknown_category_is_fatal() {
        let mut reg = Registry::new();
        let err = reg
            .register(rule("9999", "a", &[DescriptorKind::Message]))
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownCategory(..)));
    }

    #[test]
    fn test_rules_for_kind_registration_order() {
        let mut reg = Registry::new();
        reg.register(rule("0131", "b", &[DescriptorKind::Field]))
            .unwrap();
        reg.register(rule("0131", "a", &[DescriptorKind::Field]))
            .unwrap();
        reg.register(rule("0132", "c", &[DescriptorKind::Message]))
            .unwrap();
        let fields: Vec<String> = reg
            .rules_for_kind(DescriptorKind::Field)
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(fields, vec!["aep::0131::b", "aep::0131::a"]);
    }
}

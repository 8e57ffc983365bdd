//! Structural comparison of expected vs. actual problem sets.
//!
//! This is the backbone of the rule-authoring test workflow: a test builds a
//! schema, states the problems it expects (possibly under-specified — just a
//! message, just a descriptor, or both), and asserts the diff against the
//! lint output is empty. It is exported so any consumer validating engine
//! output can reuse it.
//!
//! Matching semantics: every expected entry must be satisfied by exactly one
//! actual problem, and every actual problem must be claimed by some expected
//! entry unless the expectation is declared partial. An empty diff string
//! signals a pass.

use crate::descriptor::DescriptorId;
use crate::problem::Problem;
use crate::rule::RuleId;
use regex::Regex;
use std::fmt::Write as _;

#[derive(Debug, Clone)]
/// How an expected message is compared against an actual one.
pub enum MessageMatcher {
    Exact(String),
    Prefix(String),
    Contains(String),
    Pattern(Regex),
}

impl MessageMatcher {
    pub fn matches(&self, actual: &str) -> bool {
        match self {
            MessageMatcher::Exact(s) => actual == s,
            MessageMatcher::Prefix(s) => actual.starts_with(s),
            MessageMatcher::Contains(s) => actual.contains(s),
            MessageMatcher::Pattern(re) => re.is_match(actual),
        }
    }
}

impl std::fmt::Display for MessageMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageMatcher::Exact(s) => write!(f, "message == {:?}", s),
            MessageMatcher::Prefix(s) => write!(f, "message starts with {:?}", s),
            MessageMatcher::Contains(s) => write!(f, "message contains {:?}", s),
            MessageMatcher::Pattern(re) => write!(f, "message matches /{}/", re.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// One expected problem. Unset fields are not compared.
pub struct ExpectedProblem {
    pub descriptor: Option<DescriptorId>,
    pub message: Option<MessageMatcher>,
    pub rule: Option<RuleId>,
    pub suggestion: Option<String>,
}

impl ExpectedProblem {
    pub fn new() -> ExpectedProblem {
        ExpectedProblem::default()
    }

    pub fn message(mut self, m: impl Into<String>) -> ExpectedProblem {
        self.message = Some(MessageMatcher::Exact(m.into()));
        self
    }

    pub fn message_contains(mut self, m: impl Into<String>) -> ExpectedProblem {
        self.message = Some(MessageMatcher::Contains(m.into()));
        self
    }

    pub fn message_prefix(mut self, m: impl Into<String>) -> ExpectedProblem {
        self.message = Some(MessageMatcher::Prefix(m.into()));
        self
    }

    pub fn rule(mut self, id: RuleId) -> ExpectedProblem {
        self.rule = Some(id);
        self
    }

    pub fn descriptor(mut self, d: DescriptorId) -> ExpectedProblem {
        self.descriptor = Some(d);
        self
    }

    pub fn suggestion(mut self, s: impl Into<String>) -> ExpectedProblem {
        self.suggestion = Some(s.into());
        self
    }

    fn is_match(&self, actual: &Problem) -> bool {
        if let Some(d) = self.descriptor {
            if d != actual.descriptor {
                return false;
            }
        }
        if let Some(m) = &self.message {
            if !m.matches(&actual.message) {
                return false;
            }
        }
        if let Some(r) = &self.rule {
            if *r != actual.rule_id {
                return false;
            }
        }
        if let Some(s) = &self.suggestion {
            if actual.suggestion.as_deref() != Some(s.as_str()) {
                return false;
            }
        }
        true
    }

    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(d) = self.descriptor {
            parts.push(format!("descriptor #{:?}", d));
        }
        if let Some(r) = &self.rule {
            parts.push(format!("rule {}", r));
        }
        if let Some(m) = &self.message {
            parts.push(m.to_string());
        }
        if let Some(s) = &self.suggestion {
            parts.push(format!("suggestion {:?}", s));
        }
        if parts.is_empty() {
            "any problem".to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[derive(Debug, Clone, Default)]
/// A set of expected problems plus comparison mode.
pub struct Expectation {
    pub entries: Vec<ExpectedProblem>,
    pub partial: bool,
}

impl Expectation {
    pub fn new(entries: Vec<ExpectedProblem>) -> Expectation {
        Expectation {
            entries,
            partial: false,
        }
    }

    /// Expect no problems at all.
    pub fn none() -> Expectation {
        Expectation::new(Vec::new())
    }

    /// Allow unclaimed actual problems.
    pub fn partial(mut self) -> Expectation {
        self.partial = true;
        self
    }

    /// Fill the descriptor on entries that did not set one. Mirrors the
    /// common test shape where one descriptor anchors every expectation.
    pub fn with_descriptor(mut self, d: DescriptorId) -> Expectation {
        for e in &mut self.entries {
            if e.descriptor.is_none() {
                e.descriptor = Some(d);
            }
        }
        self
    }

    /// Compare against an actual problem list. Returns a human-readable diff;
    /// empty means match. Entries and actuals are paired one-to-one via a
    /// maximum assignment, so an entry releases a claim when another entry
    /// has no alternative; a satisfiable expectation always diffs empty.
    pub fn diff(&self, actual: &[Problem]) -> String {
        let candidates: Vec<Vec<usize>> = self
            .entries
            .iter()
            .map(|e| {
                actual
                    .iter()
                    .enumerate()
                    .filter(|&(_, p)| e.is_match(p))
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();
        let mut owner: Vec<Option<usize>> = vec![None; actual.len()];
        let mut out = String::new();
        for (entry, expected) in self.entries.iter().enumerate() {
            let mut seen = vec![false; actual.len()];
            if !claim_one(entry, &candidates, &mut owner, &mut seen) {
                let _ = writeln!(out, "missing problem: {}", expected.describe());
            }
        }
        if !self.partial {
            for (i, p) in actual.iter().enumerate() {
                if owner[i].is_none() {
                    let _ = writeln!(
                        out,
                        "unexpected problem: {} at {} ({:?})",
                        p.rule_id, p.descriptor_path, p.message
                    );
                }
            }
        }
        out
    }
}

/// Augmenting-path step: claim an actual problem for `entry`, displacing a
/// previous claimant when it can be re-seated elsewhere.
fn claim_one(
    entry: usize,
    candidates: &[Vec<usize>],
    owner: &mut [Option<usize>],
    seen: &mut [bool],
) -> bool {
    for &i in &candidates[entry] {
        if std::mem::replace(&mut seen[i], true) {
            continue;
        }
        let free = match owner[i] {
            None => true,
            Some(prev) => claim_one(prev, candidates, owner, seen),
        };
        if free {
            owner[i] = Some(entry);
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TreeBuilder;
    use crate::rule::RuleId;

    fn sample() -> (crate::descriptor::DescriptorSet, DescriptorId, DescriptorId) {
        let mut b = TreeBuilder::new();
        let f = b.file("a.proto", "pkg");
        let m = b.message(f, "M");
        let fld = b.field(m, "x", "string", &[]);
        (b.finish(), m, fld)
    }

    fn problem(
        set: &crate::descriptor::DescriptorSet,
        d: DescriptorId,
        msg: &str,
    ) -> Problem {
        Problem::new(set, d, RuleId::new("aep", "0140", "field-names"), msg)
    }

    #[test]
    fn test_empty_diff_on_match() {
        let (set, _, fld) = sample();
        let actual = vec![problem(&set, fld, "bad name")];
        let exp = Expectation::new(vec![ExpectedProblem::new().message("bad name")])
            .with_descriptor(fld);
        assert_eq!(exp.diff(&actual), "");
    }

    #[test]
    fn test_matchers() {
        assert!(MessageMatcher::Exact("abc".into()).matches("abc"));
        assert!(!MessageMatcher::Exact("abc".into()).matches("abcd"));
        assert!(MessageMatcher::Prefix("ab".into()).matches("abcd"));
        assert!(MessageMatcher::Contains("bc".into()).matches("abcd"));
        assert!(MessageMatcher::Pattern(Regex::new("^a.c$").unwrap()).matches("abc"));
    }

    #[test]
    fn test_missing_and_unexpected_reported() {
        let (set, m, fld) = sample();
        let actual = vec![problem(&set, fld, "present")];
        let exp = Expectation::new(vec![ExpectedProblem::new()
            .descriptor(m)
            .message("absent")]);
        let diff = exp.diff(&actual);
        assert!(diff.contains("missing problem"));
        assert!(diff.contains("unexpected problem"));
    }

    #[test]
    fn test_partial_allows_extras() {
        let (set, _, fld) = sample();
        let actual = vec![problem(&set, fld, "one"), problem(&set, fld, "two")];
        let exp = Expectation::new(vec![ExpectedProblem::new().message("one")]).partial();
        assert_eq!(exp.diff(&actual), "");
    }

    #[test]
    fn test_overlapping_matchers_find_valid_assignment() {
        let (set, _, fld) = sample();
        // The broad matcher could claim "ab" first; the exact matcher then
        // needs it, so the assignment must re-seat the broad one on "xaby".
        let actual = vec![problem(&set, fld, "ab"), problem(&set, fld, "xaby")];
        let exp = Expectation::new(vec![
            ExpectedProblem::new().message_contains("ab"),
            ExpectedProblem::new().message("ab"),
        ]);
        assert_eq!(exp.diff(&actual), "");
    }

    #[test]
    fn test_one_expected_claims_one_actual() {
        let (set, _, fld) = sample();
        let actual = vec![problem(&set, fld, "dup")];
        let exp = Expectation::new(vec![
            ExpectedProblem::new().message("dup"),
            ExpectedProblem::new().message("dup"),
        ]);
        let diff = exp.diff(&actual);
        assert!(diff.contains("missing problem"));
    }

    #[test]
    fn test_expect_none_flags_everything() {
        let (set, _, fld) = sample();
        let actual = vec![problem(&set, fld, "boom")];
        assert!(Expectation::none().diff(&actual).contains("unexpected"));
        assert_eq!(Expectation::none().diff(&[]), "");
    }

    #[test]
    fn test_descriptor_mismatch_is_missing() {
        let (set, m, fld) = sample();
        let actual = vec![problem(&set, fld, "msg")];
        let exp = Expectation::new(vec![ExpectedProblem::new().message("msg")])
            .with_descriptor(m)
            .partial();
        assert!(exp.diff(&actual).contains("missing problem"));
    }
}

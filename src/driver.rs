//! Traversal driver: walks descriptor trees and dispatches rules.
//!
//! Files are linted on the rayon pool with per-file problem buffers; the
//! aggregator's final sort restores determinism regardless of merge order.
//! Within a file the walk is depth-first pre-order in declaration order. At
//! each node the driver asks the registry for rules accepting the node's
//! kind, filters through the resolver, and invokes the survivors.
//!
//! A panic inside a rule's `evaluate` is caught and converted into a single
//! synthetic internal problem tagged with that rule's id, so one defective
//! rule never aborts the run. Fatal conditions (bad config, duplicate
//! registration, broken schema input) surface as `FatalError` before this
//! module is ever reached; nothing here fails.
//!
//! Cancellation is cooperative: the token is checked before each file starts,
//! in-flight files run to completion.

use crate::aggregate;
use crate::config::Config;
use crate::descriptor::{DescriptorId, DescriptorSet};
use crate::models::{LintResult, Summary};
use crate::problem::Problem;
use crate::registry::Registry;
use crate::resolver;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
/// Cooperative cancellation signal, checked between file traversals.
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Lint every file of every set. Problems come back deduplicated and in the
/// deterministic report order; config entries naming unknown rules come back
/// as warnings.
pub fn run_lint(sets: &[DescriptorSet], config: &Config, registry: &Registry) -> LintResult {
    run_lint_cancellable(sets, config, registry, &CancelToken::new())
}

/// `run_lint` with an external cancellation token. Files not yet started
/// when the token trips are skipped; their problems are simply absent.
pub fn run_lint_cancellable(
    sets: &[DescriptorSet],
    config: &Config,
    registry: &Registry,
    cancel: &CancelToken,
) -> LintResult {
    let units: Vec<(&DescriptorSet, DescriptorId)> = sets
        .iter()
        .flat_map(|set| set.files().iter().map(move |&f| (set, f)))
        .collect();

    let per_file: Vec<Option<Vec<Problem>>> = units
        .par_iter()
        .map(|&(set, file)| {
            if cancel.is_cancelled() {
                return None;
            }
            Some(lint_file(set, file, config, registry))
        })
        .collect();

    let files = per_file.iter().filter(|p| p.is_some()).count();
    let problems = aggregate::aggregate(per_file.into_iter().flatten().flatten().collect());
    let warnings = config.unknown_targets(registry);
    LintResult {
        summary: Summary {
            problems: problems.len(),
            files,
        },
        problems,
        warnings,
    }
}

/// Pre-order walk of one file, collecting problems into a local buffer.
fn lint_file(
    set: &DescriptorSet,
    file: DescriptorId,
    config: &Config,
    registry: &Registry,
) -> Vec<Problem> {
    let mut problems = Vec::new();
    visit(set, file, config, registry, &mut problems);
    for child in set.descendants(file) {
        visit(set, child, config, registry, &mut problems);
    }
    problems
}

fn visit(
    set: &DescriptorSet,
    node: DescriptorId,
    config: &Config,
    registry: &Registry,
    problems: &mut Vec<Problem>,
) {
    let kind = set.get(node).kind;
    for rule in registry.rules_for_kind(kind) {
        if !resolver::enabled(config, set, node, rule) {
            continue;
        }
        match catch_unwind(AssertUnwindSafe(|| rule.evaluate(set, node))) {
            Ok(found) => problems.extend(found),
            Err(payload) => {
                let detail = panic_detail(payload.as_ref());
                problems.push(Problem::internal_fault(
                    set,
                    node,
                    rule.id().clone(),
                    &detail,
                ));
            }
        }
    }
}

fn panic_detail(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

//! Problem aggregation: deduplication and deterministic ordering.
//!
//! The driver hands over an unordered multiset of problems collected from
//! per-file buffers in whatever order the worker pool finished. This pass
//! removes exact duplicates (same rule id, descriptor path, message) and
//! sorts by (file path, declaration index within file, rule id, message),
//! which makes output byte-identical across runs regardless of merge order.
//! The dedup key uses the dotted descriptor path, not the raw id: ids repeat
//! across descriptor sets, paths do not collide unless the declarations
//! really are the same.

use crate::problem::Problem;

/// Deduplicate and order a raw problem multiset.
pub fn aggregate(mut problems: Vec<Problem>) -> Vec<Problem> {
    problems.sort_by(|a, b| {
        a.location
            .file
            .cmp(&b.location.file)
            .then(a.decl_index.cmp(&b.decl_index))
            .then(a.rule_id.cmp(&b.rule_id))
            .then(a.message.cmp(&b.message))
            .then(a.descriptor_path.cmp(&b.descriptor_path))
    });
    problems.dedup_by(|a, b| {
        a.rule_id == b.rule_id && a.descriptor_path == b.descriptor_path && a.message == b.message
    });
    problems
}

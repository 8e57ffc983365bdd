//! Shared data models for lint output and serialized schema input.

pub mod schema;

use crate::problem::Problem;
use serde::Serialize;

#[derive(Serialize)]
/// Aggregated lint summary used by printers.
pub struct Summary {
    pub problems: usize,
    pub files: usize,
}

#[derive(Serialize)]
/// Lint results container: ordered problems, config warnings, summary.
pub struct LintResult {
    pub problems: Vec<Problem>,
    pub warnings: Vec<String>,
    pub summary: Summary,
}

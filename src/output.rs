//! Output rendering for lint results.
//!
//! Supports `human` (default) and `json` outputs. The JSON form serializes
//! the full `LintResult` including the summary; the human form prints one
//! line per problem plus suggestions and a summary footer.

use crate::models::LintResult;
use owo_colors::OwoColorize;
use serde_json::Value as JsonVal;
use std::path::Path;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Render a file path relative to the repo root when possible.
fn display_path(file: &str, repo_root: &Path) -> String {
    let p = Path::new(file);
    pathdiff::diff_paths(p, repo_root)
        .map(|d| d.to_string_lossy().to_string())
        .unwrap_or_else(|| file.to_string())
}

/// Print lint results in the requested format.
pub fn print_lint(res: &LintResult, output: &str, repo_root: &Path) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_lint_json(res)).unwrap()
        ),
        _ => {
            let color = use_colors(output);
            for w in &res.warnings {
                eprintln!("{} {}", crate::utils::warn_prefix(), w);
            }
            for p in &res.problems {
                let file = display_path(&p.location.file, repo_root);
                let site = format!("{}:{}:{}", file, p.location.line, p.location.column);
                let marker = if p.internal { "◆" } else { "✖" };
                if color {
                    println!(
                        "{} {} ❲{}❳ {} — {}",
                        marker.red(),
                        site.bold(),
                        p.rule_id,
                        p.descriptor_path,
                        p.message
                    );
                } else {
                    println!(
                        "{} {} ❲{}❳ {} — {}",
                        marker, site, p.rule_id, p.descriptor_path, p.message
                    );
                }
                if let Some(s) = &p.suggestion {
                    println!("    suggestion: {}", s);
                }
            }
            let summary = format!(
                "— Summary — problems={} files={} warnings={}",
                res.summary.problems,
                res.summary.files,
                res.warnings.len()
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Compose lint JSON object (pure) for testing/snapshot purposes.
pub fn compose_lint_json(res: &LintResult) -> JsonVal {
    serde_json::to_value(res).unwrap()
}

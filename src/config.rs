//! Configuration discovery and override resolution inputs.
//!
//! Aplint reads `aplint.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! The lint-relevant part is the ordered list of override entries:
//!
//! ```toml
//! [[override]]
//! path = "legacy/**"
//! target = "aep::0133::request-required-fields"
//! enabled = false
//! ```
//!
//! Entries are kept in declaration order; within one precedence tier the last
//! matching entry wins (see `resolver`). Malformed globs and targets are
//! fatal; targets that parse but match no registered rule are warnings.

use crate::registry::{Registry, RegistryError};
use crate::rule::{IdError, Target};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
/// Pre-traversal fatal conditions. Any of these aborts the run before any
/// rule is evaluated; they are reported separately from problems.
pub enum FatalError {
    #[error("cannot read config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config {path} is not valid {format}: {message}")]
    ConfigParse {
        path: String,
        format: &'static str,
        message: String,
    },
    #[error("config {path}: bad path pattern {pattern:?}: {source}")]
    BadPattern {
        path: String,
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("config {path}: {source}")]
    BadTarget {
        path: String,
        #[source]
        source: IdError,
    },
    #[error("schema input: {0}")]
    SchemaInput(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration file as written on disk.
pub struct RawConfig {
    #[serde(default, rename = "override")]
    pub overrides: Vec<RawOverride>,
}

#[derive(Debug, Deserialize, Clone)]
/// One override entry as written: a glob over file/package paths, a rule or
/// category target string, and the enabled state it forces.
pub struct RawOverride {
    #[serde(default = "default_path_pattern")]
    pub path: String,
    pub target: String,
    pub enabled: bool,
}

fn default_path_pattern() -> String {
    "**".to_string()
}

#[derive(Debug, Clone)]
/// Validated override entry with a compiled glob.
pub struct OverrideEntry {
    pub pattern: glob::Pattern,
    pub target: Target,
    pub enabled: bool,
}

impl OverrideEntry {
    /// An entry applies when its glob matches the descriptor's source file
    /// path or its package.
    pub fn matches(&self, file_path: &str, package: &str) -> bool {
        self.pattern.matches(file_path) || (!package.is_empty() && self.pattern.matches(package))
    }
}

#[derive(Debug, Clone, Default)]
/// Validated configuration used by the resolver. Entry order is declaration
/// order.
pub struct Config {
    pub overrides: Vec<OverrideEntry>,
}

impl Config {
    /// Validate a raw config. All entry errors are collected so a user sees
    /// every mistake in one run; any error is fatal.
    pub fn from_raw(raw: &RawConfig, origin: &str) -> Result<Config, Vec<FatalError>> {
        let mut overrides = Vec::new();
        let mut errors = Vec::new();
        for entry in &raw.overrides {
            let pattern = match glob::Pattern::new(&entry.path) {
                Ok(p) => Some(p),
                Err(e) => {
                    errors.push(FatalError::BadPattern {
                        path: origin.to_string(),
                        pattern: entry.path.clone(),
                        source: e,
                    });
                    None
                }
            };
            let target = match Target::parse(&entry.target) {
                Ok(t) => Some(t),
                Err(e) => {
                    errors.push(FatalError::BadTarget {
                        path: origin.to_string(),
                        source: e,
                    });
                    None
                }
            };
            if let (Some(pattern), Some(target)) = (pattern, target) {
                overrides.push(OverrideEntry {
                    pattern,
                    target,
                    enabled: entry.enabled,
                });
            }
        }
        if errors.is_empty() {
            Ok(Config { overrides })
        } else {
            Err(errors)
        }
    }

    /// Load and validate a config file (TOML or YAML by extension).
    pub fn load(path: &Path) -> Result<Config, Vec<FatalError>> {
        let display = path.to_string_lossy().to_string();
        let text = fs::read_to_string(path).map_err(|e| {
            vec![FatalError::ConfigIo {
                path: display.clone(),
                source: e,
            }]
        })?;
        let yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let raw: RawConfig = if yaml {
            serde_yaml::from_str(&text).map_err(|e| {
                vec![FatalError::ConfigParse {
                    path: display.clone(),
                    format: "YAML",
                    message: e.to_string(),
                }]
            })?
        } else {
            toml::from_str(&text).map_err(|e| {
                vec![FatalError::ConfigParse {
                    path: display.clone(),
                    format: "TOML",
                    message: e.to_string(),
                }]
            })?
        };
        Config::from_raw(&raw, &display)
    }

    /// Config entries whose target names no registered rule or category.
    /// These are warnings; linting proceeds with the remaining entries.
    pub fn unknown_targets(&self, registry: &Registry) -> Vec<String> {
        self.overrides
            .iter()
            .filter_map(|e| match &e.target {
                Target::Rule(id) if !registry.contains(id) => Some(format!(
                    "config target {:?} does not name a registered rule",
                    id.to_string()
                )),
                Target::Category(cat) if !registry.has_category(cat) => Some(format!(
                    "config target {:?} does not name a registered category",
                    cat.to_string()
                )),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
/// Fully-resolved settings used by the CLI after applying precedence
/// (CLI > config file > defaults).
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub output: String,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when an `aplint.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if config_file_in(cur).is_some() || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

fn config_file_in(dir: &Path) -> Option<PathBuf> {
    for name in ["aplint.toml", "aplint.yaml", "aplint.yml"] {
        let p = dir.join(name);
        if p.exists() {
            return Some(p);
        }
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config path, and
/// defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_config: Option<&str>,
    cli_output: Option<&str>,
) -> Effective {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let config_path = cli_config
        .map(PathBuf::from)
        .or_else(|| config_file_in(&repo_root));
    Effective {
        repo_root,
        config_path,
        output: cli_output.unwrap_or("human").to_string(),
    }
}

//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "aplint",
    version,
    about = "Lint protocol-schema API definitions against AEP design rules",
    long_about = "Aplint — validates already-parsed schema descriptor trees against a catalog of AEP design rules.\n\nConfiguration precedence: CLI > aplint.toml > defaults.",
    after_help = "Examples:\n  aplint lint api/descriptors.json\n  aplint lint api/*.json --output json\n  aplint lint api/descriptors.json --config aplint.toml",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current aplint version.")]
    Version,
    /// Lint descriptor trees
    #[command(
        about = "Run lint checks",
        long_about = "Validate serialized descriptor trees (JSON emitted by the schema-reflection layer) against the built-in rule catalog. Exit 1 when problems are found, 2 on fatal errors.",
        after_help = "Examples:\n  aplint lint api/descriptors.json\n  aplint lint api/descriptors.json --output json"
    )]
    Lint {
        #[arg(required = true, help = "Serialized descriptor tree files (JSON)")]
        schema: Vec<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Path to aplint.toml|yaml (default: discovered)")]
        config: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}

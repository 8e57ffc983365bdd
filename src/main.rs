//! Aplint CLI binary entry point.
//! Loads serialized descriptor trees, resolves config, runs the driver, and
//! prints results.

use aplint::cli::{Cli, Commands};
use aplint::config::{self, Config, FatalError};
use aplint::descriptor::DescriptorSet;
use aplint::models::schema::SchemaSet;
use aplint::{driver, output, rules, utils};
use clap::Parser;
use std::fs;

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Lint {
            schema,
            repo_root,
            config,
            output,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                config.as_deref(),
                output.as_deref(),
            );
            if eff.config_path.is_none() {
                eprintln!(
                    "{} {}",
                    utils::note_prefix(),
                    "No aplint.toml found; all rules use their defaults."
                );
            }
            let cfg = match eff.config_path.as_deref().map(Config::load) {
                Some(Ok(cfg)) => cfg,
                Some(Err(errors)) => fail(&errors),
                None => Config::default(),
            };
            let registry = match rules::default_registry() {
                Ok(reg) => reg,
                Err(e) => fail(&[FatalError::from(e)]),
            };
            let sets = match load_schemas(&schema) {
                Ok(sets) => sets,
                Err(errors) => fail(&errors),
            };
            let result = driver::run_lint(&sets, &cfg, &registry);
            output::print_lint(&result, &eff.output, &eff.repo_root);
            if result.summary.problems > 0 {
                std::process::exit(1);
            }
        }
    }
}

/// Read and rebuild every descriptor tree, collecting all fatal errors so a
/// user sees every broken input in one run.
fn load_schemas(paths: &[String]) -> Result<Vec<DescriptorSet>, Vec<FatalError>> {
    let mut sets = Vec::new();
    let mut errors = Vec::new();
    for path in paths {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                errors.push(FatalError::SchemaInput(format!("cannot read {}: {}", path, e)));
                continue;
            }
        };
        let schema: SchemaSet = match serde_json::from_str(&text) {
            Ok(s) => s,
            Err(e) => {
                errors.push(FatalError::SchemaInput(format!(
                    "{} is not a valid descriptor tree: {}",
                    path, e
                )));
                continue;
            }
        };
        match schema.into_descriptors() {
            Ok(set) => sets.push(set),
            Err(e) => errors.push(e),
        }
    }
    if errors.is_empty() {
        Ok(sets)
    } else {
        Err(errors)
    }
}

fn fail(errors: &[FatalError]) -> ! {
    for e in errors {
        eprintln!("{} {}", utils::error_prefix(), e);
    }
    std::process::exit(2);
}

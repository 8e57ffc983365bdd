//! Aplint core library.
//!
//! This crate exposes programmatic APIs for linting protocol-schema API
//! definitions (already-parsed descriptor trees) against a catalog of AEP
//! design rules.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery, override entries, and fatal error types.
//! - `descriptor`: Immutable descriptor tree and its builder.
//! - `rule`: Rule contract, identifiers, categories.
//! - `registry`: The rule catalog, keyed by identifier.
//! - `resolver`: Enablement precedence for (rule, descriptor) pairs.
//! - `driver`: Traversal, dispatch, fault isolation, cancellation.
//! - `aggregate`: Deduplication and deterministic report ordering.
//! - `problem`: The violation record handed to reporters.
//! - `diff`: Expected/actual problem comparison for rule tests.
//! - `rules`: The built-in rule catalog.
//! - `models`: Lint output structs and the serialized schema input model.
//! - `output`: Human/JSON printers.
//! - `utils`: Supporting helpers.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod diff;
pub mod driver;
pub mod models;
pub mod output;
pub mod problem;
pub mod registry;
pub mod resolver;
pub mod rule;
pub mod rules;
pub mod utils;

//! CLI support for fname-lang
//!
//! Provides programmatic access to the `fname` commands so that file
//! managers can embed the same checks and batch evaluation.

mod check;
mod docs;
mod eval;

pub use check::{CheckResult, execute_check};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use eval::{EvalOptions, EvalReport, Input, execute_eval};

use std::io;

use crate::{ConfigError, SyntaxError, context::disk::DiskError};

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("Invalid JSON context: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Disk(#[from] DiskError),

    #[error("No input provided. Pass files or pipe JSON contexts to stdin.")]
    NoInput,

    #[error("Unknown category: '{0}'\nRun 'fname docs' to see available categories.")]
    UnknownCategory(String),
}

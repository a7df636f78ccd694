//! Evaluate a formula over files or JSON contexts

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::CliError;
use crate::{
    BatchItem, Config, FileContext, Lexer, Parser,
    batch::Batch,
    context::disk::DiskFile,
};

/// Where the contexts come from
#[derive(Debug, Clone)]
pub enum Input {
    Files(Vec<PathBuf>),
    /// One JSON context object or an array of them
    Json(String),
}

#[derive(Debug, Clone)]
pub struct EvalOptions {
    pub formula: String,
    pub input: Input,
    pub config: Config,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonContexts {
    Many(Vec<FileContext>),
    One(FileContext),
}

/// An input file that could not be opened
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unreadable {
    pub source: String,
    pub error: String,
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonEntry<'a> {
    Item(&'a BatchItem),
    Unreadable(&'a Unreadable),
}

/// Per-item results of a batch evaluation
#[derive(Debug, Default)]
pub struct EvalReport {
    pub items: Vec<BatchItem>,
    pub unreadable: Vec<Unreadable>,
}

impl EvalReport {
    pub fn failed(&self) -> usize {
        self.unreadable.len() + self.items.iter().filter(|item| !item.is_ok()).count()
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            match &item.result {
                Ok(name) => out.push_str(&format!("{} -> {}\n", item.source, name)),
                Err(e) => out.push_str(&format!("{}: error: {}\n", item.source, e)),
            }
        }
        for input in &self.unreadable {
            out.push_str(&format!("{}: error: {}\n", input.source, input.error));
        }
        out
    }

    /// Results as a JSON array; unreadable inputs follow the evaluated ones.
    pub fn render_json(&self) -> Result<String, CliError> {
        let entries: Vec<JsonEntry<'_>> = self
            .items
            .iter()
            .map(JsonEntry::Item)
            .chain(self.unreadable.iter().map(JsonEntry::Unreadable))
            .collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }
}

/// Parses the formula once, then evaluates it for every input.
///
/// A syntax error fails the whole command; evaluation errors are recorded
/// per item.
pub fn execute_eval(options: &EvalOptions) -> Result<EvalReport, CliError> {
    let formula = Parser::new(Lexer::new(&options.formula))
        .with_max_depth(options.config.max_depth)
        .parse()?;
    let batch = Batch::new(&formula, &options.config);
    let mut report = EvalReport::default();

    match &options.input {
        Input::Files(paths) => {
            for (index, path) in paths.iter().enumerate() {
                match DiskFile::open(path) {
                    Ok(file) => report.items.push(batch.evaluate_item(index, &file)),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping input");
                        report.unreadable.push(Unreadable {
                            source: path.display().to_string(),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }
        Input::Json(text) => {
            let contexts = match serde_json::from_str(text)? {
                JsonContexts::Many(contexts) => contexts,
                JsonContexts::One(context) => vec![context],
            };
            report.items = batch.run(&contexts);
        }
    }

    Ok(report)
}

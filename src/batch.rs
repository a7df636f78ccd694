//! Evaluating one formula over many files.
//!
//! The batch owns the counter: item `i` sees `start + i * step`, assigned
//! before its evaluation, so items never observe each other. A failing item
//! is recorded and the run continues with the next one.

use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::{
    ast::Formula,
    config::{Config, CounterConfig},
    context::{Context, Counter, WithCounter},
    evaluator::{EvalError, evaluate},
};

const UNIX_INVALID: &[char] = &['/'];
const WINDOWS_INVALID: &[char] = &['/', '*', '\\', '<', '>', '?', ':', '"', '|'];

/// File-system naming rules to sanitize for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Unix,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    fn invalid_chars(self) -> &'static [char] {
        match self {
            Platform::Unix => UNIX_INVALID,
            Platform::Windows => WINDOWS_INVALID,
        }
    }
}

/// Removes characters that cannot appear in a file name on `platform`.
pub fn sanitize_file_name(name: &str, platform: Platform) -> String {
    let invalid = platform.invalid_chars();
    name.chars().filter(|c| !invalid.contains(c)).collect()
}

/// Outcome of one item of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    /// Path of the file, or its position when the context has no path
    pub source: String,
    /// Counter value assigned to this item, if the formula reads it
    pub counter: Option<u64>,
    pub result: Result<String, EvalError>,
}

impl BatchItem {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl Serialize for BatchItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut item = serializer.serialize_struct("BatchItem", 3)?;
        item.serialize_field("source", &self.source)?;
        item.serialize_field("counter", &self.counter)?;
        match &self.result {
            Ok(name) => item.serialize_field("name", name)?,
            Err(e) => item.serialize_field("error", &e.to_string())?,
        }
        item.end()
    }
}

/// A formula bound to batch settings.
pub struct Batch<'f> {
    formula: &'f Formula,
    counter: CounterConfig,
    keep_invalid_characters: bool,
    platform: Platform,
}

impl<'f> Batch<'f> {
    pub fn new(formula: &'f Formula, config: &Config) -> Self {
        Batch {
            formula,
            counter: config.counter,
            keep_invalid_characters: config.keep_invalid_characters,
            platform: Platform::current(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Evaluates the item at position `index` of the batch.
    pub fn evaluate_item<C: Context + ?Sized>(&self, index: usize, context: &C) -> BatchItem {
        let source = match context.path() {
            Some(path) => path.display().to_string(),
            None => format!("#{}", index + 1),
        };

        let (counter, result) = if self.formula.uses_counter() {
            let value = self.counter.value_at(index);
            let ctx = WithCounter::new(context, Counter::new(value, self.counter.width));
            (Some(value), evaluate(self.formula, &ctx))
        } else {
            (None, evaluate(self.formula, context))
        };

        let result = result.map(|name| {
            if self.keep_invalid_characters {
                name
            } else {
                sanitize_file_name(&name, self.platform)
            }
        });

        match &result {
            Ok(name) => tracing::info!(%source, %name, "evaluated"),
            Err(e) => tracing::warn!(%source, error = %e, "evaluation failed"),
        }

        BatchItem {
            source,
            counter,
            result,
        }
    }

    pub fn run<C: Context>(&self, contexts: &[C]) -> Vec<BatchItem> {
        contexts
            .iter()
            .enumerate()
            .map(|(i, ctx)| self.evaluate_item(i, ctx))
            .collect()
    }
}

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::{
    ast::{Formula, Node, Sequence},
    context::Context,
    registry::{DatePart, Keyword, TimePart},
    value::Value,
};

/// Errors that can occur while evaluating a parsed formula.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// The context has no value for the keyword (e.g. image size of a text file)
    #[error("keyword '{keyword}' is not available for this file")]
    KeywordUnavailable { keyword: String },

    #[error("{function}: position {index} is out of range, the value has {count} part(s)")]
    IndexOutOfRange {
        function: &'static str,
        index: i64,
        count: usize,
    },

    #[error("{function}: invalid pattern \"{pattern}\": {message}")]
    InvalidRegex {
        function: &'static str,
        pattern: String,
        message: String,
    },

    #[error("{function}: {message}")]
    InvalidArgument {
        function: &'static str,
        message: String,
    },

    /// Only reachable through trees built without the parser
    #[error("{function}: type error: {message}")]
    TypeError {
        function: &'static str,
        message: String,
    },

    #[error("{function}: expected {min} to {max} argument(s), got {found}")]
    ArgumentCount {
        function: &'static str,
        min: usize,
        max: usize,
        found: usize,
    },
}

impl EvalError {
    /// Name of the keyword or function that failed
    pub fn subject(&self) -> &str {
        match self {
            EvalError::KeywordUnavailable { keyword } => keyword,
            EvalError::IndexOutOfRange { function, .. }
            | EvalError::InvalidRegex { function, .. }
            | EvalError::InvalidArgument { function, .. }
            | EvalError::TypeError { function, .. }
            | EvalError::ArgumentCount { function, .. } => function,
        }
    }
}

/// Evaluates formulas against one context.
///
/// Evaluation is a post-order walk: arguments of a call are evaluated left
/// to right before the function runs, and the first error aborts the whole
/// evaluation.
pub struct Evaluator<'c, C: Context + ?Sized> {
    context: &'c C,
}

impl<'c, C: Context + ?Sized> Evaluator<'c, C> {
    pub fn new(context: &'c C) -> Self {
        Evaluator { context }
    }

    /// Evaluates a formula to the resulting file name.
    ///
    /// # Examples
    ///
    /// ```
    /// use fname_lang::{FileContext, Evaluator, parse};
    ///
    /// let formula = parse("{file:baseName}_[upper:{file:ext}]").unwrap();
    /// let ctx = FileContext::new("/photos/photo.jpg");
    ///
    /// let name = Evaluator::new(&ctx).evaluate(&formula).unwrap();
    /// assert_eq!(name, "photo_JPG");
    /// ```
    pub fn evaluate(&self, formula: &Formula) -> Result<String, EvalError> {
        self.eval_sequence(&formula.root)
    }

    fn eval_sequence(&self, sequence: &Sequence) -> Result<String, EvalError> {
        let mut out = String::new();
        for part in &sequence.parts {
            match self.eval_node(part)? {
                Value::String(s) => out.push_str(&s),
                Value::Integer(n) => out.push_str(&n.to_string()),
            }
        }
        Ok(out)
    }

    fn eval_node(&self, node: &Node) -> Result<Value, EvalError> {
        match node {
            Node::Text { value, .. } | Node::String { value, .. } => Ok(Value::from(value.as_str())),
            Node::Integer { value, .. } => Ok(Value::Integer(*value)),
            Node::Sequence(sequence) => self.eval_sequence(sequence).map(Value::String),
            Node::Keyword { keyword, .. } => self.eval_keyword(*keyword).map(Value::String),
            Node::Call { function, args, .. } => {
                let values = args
                    .iter()
                    .map(|arg| self.eval_node(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                (function.signature().apply)(&values)
            }
        }
    }

    fn eval_keyword(&self, keyword: Keyword) -> Result<String, EvalError> {
        let ctx = self.context;
        let value = match keyword {
            Keyword::Counter { padding } => ctx
                .counter()
                .map(|counter| zero_pad(counter.value, padding.unwrap_or(counter.width))),
            Keyword::ImageSize => ctx
                .image_size()
                .map(|size| format!("{}x{}", size.width, size.height)),
            Keyword::ImageWidth { padding } => ctx
                .image_size()
                .map(|size| zero_pad(size.width, padding.unwrap_or(0))),
            Keyword::ImageHeight { padding } => ctx
                .image_size()
                .map(|size| zero_pad(size.height, padding.unwrap_or(0))),
            Keyword::Date(part) => Some(format_date(ctx.now(), part)),
            Keyword::Time(part) => Some(format_time(ctx.now(), part)),
            Keyword::FileDate(part) => ctx.modified().map(|m| format_date(m, part)),
            Keyword::FileTime(part) => ctx.modified().map(|m| format_time(m, part)),
            Keyword::FilePath => ctx.directory(),
            Keyword::FileBaseName => ctx.base_name(),
            Keyword::FileExt => ctx.extension(),
            Keyword::FileFormat => ctx.format(),
            Keyword::FileHash(algorithm) => ctx.hash(algorithm),
        };

        value.ok_or_else(|| {
            let keyword = keyword.path();
            tracing::debug!(%keyword, "keyword unavailable");
            EvalError::KeywordUnavailable { keyword }
        })
    }
}

/// Left-pads the decimal digits of `value` with zeros up to `width`.
///
/// Built by hand: runtime widths from `#` runs are unbounded and the
/// formatter rejects widths above `u16::MAX`.
fn zero_pad(value: impl Into<u64>, width: usize) -> String {
    let digits = value.into().to_string();
    let mut out = "0".repeat(width.saturating_sub(digits.len()));
    out.push_str(&digits);
    out
}

fn format_date(at: NaiveDateTime, part: DatePart) -> String {
    match part {
        DatePart::Full => at.format("%Y%m%d").to_string(),
        DatePart::Year => format!("{:04}", at.year()),
        DatePart::Month => format!("{:02}", at.month()),
        DatePart::Day => format!("{:02}", at.day()),
    }
}

fn format_time(at: NaiveDateTime, part: TimePart) -> String {
    match part {
        TimePart::Full => at.format("%H%M%S").to_string(),
        TimePart::Hours => format!("{:02}", at.hour()),
        TimePart::Minutes => format!("{:02}", at.minute()),
        TimePart::Seconds => format!("{:02}", at.second()),
    }
}

/// Evaluates `formula` against `context`.
pub fn evaluate<C: Context + ?Sized>(formula: &Formula, context: &C) -> Result<String, EvalError> {
    Evaluator::new(context).evaluate(formula)
}

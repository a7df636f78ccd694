pub mod ast;
pub mod batch;
pub mod builtins;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod context;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod value;

pub use ast::{Formula, Node, Sequence, Span, Token, TokenKind};
pub use batch::{BatchItem, Platform, sanitize_file_name};
pub use config::{Config, ConfigError};
pub use context::{Context, Counter, FileContext, ImageSize, WithCounter};
pub use evaluator::{EvalError, Evaluator, evaluate};
pub use lexer::{Lexer, tokenize};
pub use parser::{Parser, SyntaxError, SyntaxErrorKind, parse, validate};
pub use registry::{Function, HashAlgorithm, Keyword};
pub use value::Value;

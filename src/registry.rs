//! Static catalog of the formula language.
//!
//! The parser asks the registry for the *shape* of a function (argument
//! kinds, which ones are optional) and for the keyword tree; the evaluator
//! asks it for the *behavior* of a function. Both sides read the same
//! table so they cannot disagree on arity.
pub mod functions;
pub mod keywords;

pub use functions::{ArgKind, Behavior, FUNCTIONS, Function, FunctionKind, Param, Signature};
pub use keywords::{DatePart, HashAlgorithm, KEYWORDS, Keyword, KeywordDoc, PathError, TimePart};

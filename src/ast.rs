//! # Formula syntax tree
//!
//! A formula is plain text mixed with two kinds of bracketed constructs:
//!
//! - **Keywords** `{...}` are replaced by a value taken from the file being
//!   renamed, the current date or the batch counter.
//! - **Functions** `[name:arg, ...]` transform the value of their arguments.
//!
//! ```text
//! {file:baseName}_[upper:{file:ext}]
//! [padding:{counter}, 4, "0"] - [sub:{file:baseName}, 0, 8]
//! ```
//!
//! Anything else is copied as is. Quoted strings (`"..."`, `'...'` or
//! `` `...` ``) are copied without their quotes, which is the way to write
//! literal brackets in a file name.
//!
//! The tree is built by [`crate::parser`] from the tokens of
//! [`crate::lexer`] and is immutable once built:
//!
//! - **[tokens]** - lexical tokens and byte spans
//! - **[nodes]** - [`Node`], [`Sequence`] and the owning [`Formula`]
pub mod nodes;
pub mod tokens;

pub use nodes::{Formula, Node, Sequence};
pub use tokens::{Span, Token, TokenKind};

use std::fmt;

use super::tokens::Span;
use crate::registry::{Function, FunctionKind, Keyword};

/// A node of a parsed formula.
///
/// Argument positions of a call are uniform: string positions always hold a
/// [`Node::Sequence`], integer positions hold a [`Node::Integer`] or an
/// integer-returning [`Node::Call`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Unquoted text outside any function or keyword
    ///
    /// # Examples
    /// ```text
    /// photo_
    /// ```
    Text { value: String, span: Span },

    /// Quoted string, content kept verbatim
    ///
    /// # Examples
    /// ```text
    /// "0"
    /// `[draft]`
    /// ```
    String {
        value: String,
        quote: char,
        span: Span,
    },

    /// Integer literal in an integer argument position
    Integer { value: i64, span: Span },

    /// Function call
    ///
    /// # Examples
    /// ```text
    /// [upper:{file:ext}]
    /// [sub:{file:baseName}, -4, 2]
    /// ```
    Call {
        function: Function,
        args: Vec<Node>,
        span: Span,
    },

    /// Context keyword
    ///
    /// # Examples
    /// ```text
    /// {file:baseName}
    /// {counter:####}
    /// ```
    Keyword { keyword: Keyword, span: Span },

    /// Ordered concatenation of nodes
    Sequence(Sequence),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Text { span, .. }
            | Node::String { span, .. }
            | Node::Integer { span, .. }
            | Node::Call { span, .. }
            | Node::Keyword { span, .. } => *span,
            Node::Sequence(seq) => seq.span,
        }
    }

    /// Whether this node evaluates to an integer
    pub fn is_integer(&self) -> bool {
        match self {
            Node::Integer { .. } => true,
            Node::Call { function, .. } => function.kind() == FunctionKind::IntFn,
            _ => false,
        }
    }

    /// Calls `visit` on this node and all of its descendants, parents first.
    pub fn walk<'n>(&'n self, visit: &mut impl FnMut(&'n Node)) {
        visit(self);
        match self {
            Node::Call { args, .. } => args.iter().for_each(|arg| arg.walk(visit)),
            Node::Sequence(seq) => seq.parts.iter().for_each(|part| part.walk(visit)),
            _ => {}
        }
    }
}

/// Concatenation of parts in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    pub parts: Vec<Node>,
    pub span: Span,
}

impl Sequence {
    pub fn new(parts: Vec<Node>, span: Span) -> Self {
        Sequence { parts, span }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// A parsed formula: the root sequence and everything beneath it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Formula {
    pub root: Sequence,
}

impl Formula {
    pub fn new(root: Sequence) -> Self {
        Formula { root }
    }

    /// Keywords referenced anywhere in the formula, in source order
    pub fn keywords(&self) -> Vec<Keyword> {
        let mut found = Vec::new();
        for part in &self.root.parts {
            part.walk(&mut |node| {
                if let Node::Keyword { keyword, .. } = node {
                    found.push(*keyword);
                }
            });
        }
        found
    }

    /// Whether evaluating this formula reads the counter
    pub fn uses_counter(&self) -> bool {
        self.keywords()
            .iter()
            .any(|k| matches!(k, Keyword::Counter { .. }))
    }

    /// Number of nodes in the tree, root sequence excluded
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        for part in &self.root.parts {
            part.walk(&mut |_| count += 1);
        }
        count
    }
}

// Display renders canonical formula text: parsing the output again yields
// a formula that displays identically.

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text { value, .. } => f.write_str(value),
            Node::String { value, quote, .. } => write!(f, "{quote}{value}{quote}"),
            Node::Integer { value, .. } => write!(f, "{value}"),
            Node::Call { function, args, .. } => {
                write!(f, "[{}:", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str("]")
            }
            Node::Keyword { keyword, .. } => write!(f, "{{{}}}", keyword.path()),
            Node::Sequence(seq) => write!(f, "{seq}"),
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.parts.iter().try_for_each(|part| write!(f, "{part}"))
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

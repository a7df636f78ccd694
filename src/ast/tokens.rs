use std::fmt;

/// Byte range of a token or node within the formula text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Smallest span covering both `self` and `other`
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unquoted literal text outside any function or keyword
    ///
    /// Inside a function or keyword this kind marks a stray character that
    /// the parser will reject.
    ///
    /// # Examples
    /// ```text
    /// photo_
    /// ]
    /// ```
    Text,

    /// String enclosed in matching `"`, `'` or `` ` `` quotes
    ///
    /// The content between the quotes is taken verbatim: there are no
    /// escape sequences. `terminated` is false when the input ended before
    /// the closing quote; the token then spans the rest of the input.
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'it"s'
    /// `[literal]`
    /// ```
    QuotedString { quote: char, terminated: bool },

    /// Decimal integer with an optional leading minus
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -3
    /// ```
    Integer,

    /// Function name or keyword segment
    ///
    /// A run of `#` characters (a padding width) is also an identifier.
    ///
    /// # Examples
    /// ```text
    /// upper
    /// baseName
    /// ####
    /// ```
    Identifier,

    /// One of `[ ] { } : ,`
    Punct(char),
}

/// A lexed token borrowing its raw text from the formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, text: &'a str, span: Span) -> Self {
        Token { kind, text, span }
    }

    pub fn is_punct(&self, ch: char) -> bool {
        self.kind == TokenKind::Punct(ch)
    }

    /// Content of a quoted string without its delimiters
    pub fn unquoted(&self) -> &'a str {
        match self.kind {
            TokenKind::QuotedString { quote, terminated } => {
                let inner = &self.text[quote.len_utf8()..];
                if terminated {
                    &inner[..inner.len() - quote.len_utf8()]
                } else {
                    inner
                }
            }
            _ => self.text,
        }
    }

    /// Short human description used in error messages
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Text => format!("text '{}'", self.text),
            TokenKind::QuotedString { .. } => format!("string {}", self.text),
            TokenKind::Integer => format!("number {}", self.text),
            TokenKind::Identifier => format!("'{}'", self.text),
            TokenKind::Punct(ch) => format!("'{}'", ch),
        }
    }
}

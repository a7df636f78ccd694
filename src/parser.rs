use crate::{
    ast::{Formula, Node, Sequence, Span, Token, TokenKind},
    lexer::Lexer,
    registry::{ArgKind, Function, Keyword, Param, PathError, Signature},
};

/// Maximum nesting of functions and keywords accepted by default.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Hard ceiling for configured depth limits; the parser and evaluator
/// recurse once per level.
pub const MAX_DEPTH_CEILING: usize = 128;

/// A syntax error and the byte offset it points at.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} (at offset {offset})")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxErrorKind {
    #[error("unterminated function: missing ']'")]
    UnterminatedFunction,

    #[error("unterminated keyword: missing '}}'")]
    UnterminatedKeyword,

    #[error("unterminated string: missing closing {quote}")]
    UnterminatedString { quote: char },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("unknown keyword '{{{path}}}'")]
    UnknownKeyword { path: String },

    #[error("incomplete keyword '{{{path}}}'")]
    IncompleteKeyword { path: String },

    #[error("function '{function}' takes {} argument(s), got {found}", arity(.min, .max))]
    ArgumentCount {
        function: &'static str,
        min: usize,
        max: usize,
        found: usize,
    },

    #[error("function '{function}' expects an integer for '{param}', got {found}")]
    ExpectedInteger {
        function: &'static str,
        param: &'static str,
        found: String,
    },

    #[error("function '{function}' expects a string for '{param}', got {found} (literal text must be quoted)")]
    ExpectedString {
        function: &'static str,
        param: &'static str,
        found: String,
    },

    #[error("'{param}' of function '{function}' must not be negative")]
    NegativeUnsigned {
        function: &'static str,
        param: &'static str,
    },

    #[error("expected a function name after '['")]
    ExpectedFunctionName,

    #[error("expected ':' after function name '{function}'")]
    ExpectedColon { function: &'static str },

    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken { found: String, expected: &'static str },

    #[error("integer {text} is out of range")]
    IntegerOutOfRange { text: String },

    #[error("functions and keywords are nested more than {max} levels deep")]
    NestingTooDeep { max: usize },
}

fn arity(min: &usize, max: &usize) -> String {
    match max - min {
        0 => min.to_string(),
        1 => format!("{min} or {max}"),
        _ => format!("{min} to {max}"),
    }
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, offset: usize) -> Self {
        SyntaxError { kind, offset }
    }

    /// Byte offset into the formula
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Two-line rendering: the formula, then a caret under the offset
    pub fn caret(&self, input: &str) -> String {
        let offset = self.offset.min(input.len());
        let column = input
            .char_indices()
            .take_while(|(i, _)| *i < offset)
            .count();
        format!("{input}\n{}^", " ".repeat(column))
    }
}

/// Where the arguments being parsed belong, for error reporting.
#[derive(Clone, Copy)]
struct CallSite {
    signature: &'static Signature,
    open: usize,
}

/// Recursive-descent parser over the token stream of one formula.
///
/// Parsing is all or nothing: the first error aborts and no tree is
/// returned.
pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    position: usize,
    end: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        let end = lexer.input().len();
        Parser {
            tokens: lexer.collect(),
            position: 0,
            end,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the nesting limit, clamped to [`MAX_DEPTH_CEILING`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.min(MAX_DEPTH_CEILING);
        self
    }

    fn current(&self) -> Option<Token<'a>> {
        self.tokens.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn check(&self, ch: char) -> bool {
        self.current().is_some_and(|t| t.is_punct(ch))
    }

    fn offset(&self) -> usize {
        self.current().map_or(self.end, |t| t.span.start)
    }

    fn enter(&self, depth: usize, offset: usize) -> Result<(), SyntaxError> {
        if depth > self.max_depth {
            return Err(SyntaxError::new(
                SyntaxErrorKind::NestingTooDeep {
                    max: self.max_depth,
                },
                offset,
            ));
        }
        Ok(())
    }

    /// Parses the whole formula.
    pub fn parse(mut self) -> Result<Formula, SyntaxError> {
        let mut parts: Vec<Node> = Vec::new();

        while let Some(token) = self.current() {
            match token.kind {
                TokenKind::Text => {
                    self.advance();
                    push_text(&mut parts, token);
                }
                TokenKind::QuotedString { .. } => {
                    parts.push(string_literal(token)?);
                    self.advance();
                }
                TokenKind::Punct('[') => parts.push(self.parse_call(1)?),
                TokenKind::Punct('{') => parts.push(self.parse_keyword(1)?),
                _ => {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnexpectedToken {
                            found: token.describe(),
                            expected: "text, a function or a keyword",
                        },
                        token.span.start,
                    ));
                }
            }
        }

        let formula = Formula::new(Sequence::new(parts, Span::new(0, self.end)));
        tracing::debug!(nodes = formula.node_count(), "formula parsed");
        Ok(formula)
    }

    fn parse_call(&mut self, depth: usize) -> Result<Node, SyntaxError> {
        let open = self.offset();
        self.enter(depth, open)?;
        self.advance(); // consume '['

        let name = match self.current() {
            Some(t) if t.kind == TokenKind::Identifier => t,
            Some(t) => {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::ExpectedFunctionName,
                    t.span.start,
                ));
            }
            None => {
                return Err(SyntaxError::new(SyntaxErrorKind::UnterminatedFunction, open));
            }
        };
        let function = Function::from_name(name.text).ok_or_else(|| {
            SyntaxError::new(
                SyntaxErrorKind::UnknownFunction {
                    name: name.text.to_string(),
                },
                name.span.start,
            )
        })?;
        self.advance();

        match self.current() {
            Some(t) if t.is_punct(':') => self.advance(),
            Some(t) => {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::ExpectedColon {
                        function: function.name(),
                    },
                    t.span.start,
                ));
            }
            None => {
                return Err(SyntaxError::new(SyntaxErrorKind::UnterminatedFunction, open));
            }
        }

        let site = CallSite {
            signature: function.signature(),
            open,
        };
        let args = self.parse_arguments(site, depth)?;

        match self.current() {
            Some(t) if t.is_punct(']') => {
                self.advance();
                Ok(Node::Call {
                    function,
                    args,
                    span: Span::new(open, t.span.end),
                })
            }
            Some(t) => Err(SyntaxError::new(
                SyntaxErrorKind::UnexpectedToken {
                    found: t.describe(),
                    expected: "']'",
                },
                t.span.start,
            )),
            None => Err(SyntaxError::new(SyntaxErrorKind::UnterminatedFunction, open)),
        }
    }

    fn parse_arguments(&mut self, site: CallSite, depth: usize) -> Result<Vec<Node>, SyntaxError> {
        let signature = site.signature;
        let mut args = Vec::with_capacity(signature.max_args());

        for (i, param) in signature.params.iter().enumerate() {
            if i > 0 {
                match self.current() {
                    Some(t) if t.is_punct(',') => self.advance(),
                    _ if param.optional => break,
                    Some(t) if t.is_punct(']') => {
                        return Err(SyntaxError::new(
                            SyntaxErrorKind::ArgumentCount {
                                function: signature.name,
                                min: signature.min_args(),
                                max: signature.max_args(),
                                found: i,
                            },
                            t.span.start,
                        ));
                    }
                    Some(t) => {
                        return Err(SyntaxError::new(
                            SyntaxErrorKind::UnexpectedToken {
                                found: t.describe(),
                                expected: "','",
                            },
                            t.span.start,
                        ));
                    }
                    None => {
                        return Err(SyntaxError::new(
                            SyntaxErrorKind::UnterminatedFunction,
                            site.open,
                        ));
                    }
                }
            }
            args.push(self.parse_argument(site, param, depth)?);
        }

        if self.check(',') {
            let offset = self.offset();
            return Err(SyntaxError::new(
                SyntaxErrorKind::ArgumentCount {
                    function: signature.name,
                    min: signature.min_args(),
                    max: signature.max_args(),
                    found: signature.max_args() + self.count_extra_arguments(),
                },
                offset,
            ));
        }

        Ok(args)
    }

    /// Counts top-level commas up to the closing `]` of the current call.
    fn count_extra_arguments(&self) -> usize {
        let mut nesting = 0usize;
        let mut commas = 0;
        for token in &self.tokens[self.position..] {
            match token.kind {
                TokenKind::Punct('[' | '{') => nesting += 1,
                TokenKind::Punct(']' | '}') if nesting == 0 => break,
                TokenKind::Punct(']' | '}') => nesting -= 1,
                TokenKind::Punct(',') if nesting == 0 => commas += 1,
                _ => {}
            }
        }
        commas
    }

    fn parse_argument(&mut self, site: CallSite, param: &'static Param, depth: usize) -> Result<Node, SyntaxError> {
        match param.kind {
            ArgKind::String => self
                .parse_string_expression(site, param, depth)
                .map(Node::Sequence),
            ArgKind::Integer | ArgKind::Unsigned => self.parse_integer_expression(site, param, depth),
        }
    }

    fn parse_string_expression(
        &mut self,
        site: CallSite,
        param: &'static Param,
        depth: usize,
    ) -> Result<Sequence, SyntaxError> {
        let start = self.offset();
        let mut parts = Vec::new();

        loop {
            let Some(token) = self.current() else {
                break;
            };
            match token.kind {
                TokenKind::Punct('[') => parts.push(self.parse_call(depth + 1)?),
                TokenKind::Punct('{') => parts.push(self.parse_keyword(depth + 1)?),
                TokenKind::QuotedString { .. } => {
                    parts.push(string_literal(token)?);
                    self.advance();
                }
                _ if !parts.is_empty() => break,
                _ => {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::ExpectedString {
                            function: site.signature.name,
                            param: param.name,
                            found: token.describe(),
                        },
                        token.span.start,
                    ));
                }
            }
        }

        if parts.is_empty() {
            return Err(SyntaxError::new(SyntaxErrorKind::UnterminatedFunction, site.open));
        }

        let end = parts.last().map_or(start, |p| p.span().end);
        Ok(Sequence::new(parts, Span::new(start, end)))
    }

    fn parse_integer_expression(
        &mut self,
        site: CallSite,
        param: &'static Param,
        depth: usize,
    ) -> Result<Node, SyntaxError> {
        let expected_integer = |found: String, offset: usize| {
            SyntaxError::new(
                SyntaxErrorKind::ExpectedInteger {
                    function: site.signature.name,
                    param: param.name,
                    found,
                },
                offset,
            )
        };

        match self.current() {
            Some(t) if t.kind == TokenKind::Integer => {
                let value: i64 = t.text.parse().map_err(|_| {
                    SyntaxError::new(
                        SyntaxErrorKind::IntegerOutOfRange {
                            text: t.text.to_string(),
                        },
                        t.span.start,
                    )
                })?;
                if param.kind == ArgKind::Unsigned && value < 0 {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::NegativeUnsigned {
                            function: site.signature.name,
                            param: param.name,
                        },
                        t.span.start,
                    ));
                }
                self.advance();
                Ok(Node::Integer {
                    value,
                    span: t.span,
                })
            }
            Some(t) if t.is_punct('[') => {
                let call = self.parse_call(depth + 1)?;
                if !call.is_integer() {
                    let found = match &call {
                        Node::Call { function, .. } => format!("string function '{function}'"),
                        _ => "a string".to_string(),
                    };
                    return Err(expected_integer(found, t.span.start));
                }
                Ok(call)
            }
            Some(t) => Err(expected_integer(t.describe(), t.span.start)),
            None => Err(SyntaxError::new(SyntaxErrorKind::UnterminatedFunction, site.open)),
        }
    }

    fn parse_keyword(&mut self, depth: usize) -> Result<Node, SyntaxError> {
        let open = self.offset();
        self.enter(depth, open)?;
        self.advance(); // consume '{'

        let mut segments: Vec<Token<'a>> = Vec::new();
        let close = loop {
            match self.current() {
                // digits are never a valid segment, but resolve reports them as unknown
                Some(t) if matches!(t.kind, TokenKind::Identifier | TokenKind::Integer) => {
                    segments.push(t);
                    self.advance();
                }
                Some(t) if t.is_punct('}') => {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::IncompleteKeyword {
                            path: join_segments(&segments),
                        },
                        t.span.start,
                    ));
                }
                Some(t) => {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnexpectedToken {
                            found: t.describe(),
                            expected: "a keyword name",
                        },
                        t.span.start,
                    ));
                }
                None => {
                    return Err(SyntaxError::new(SyntaxErrorKind::UnterminatedKeyword, open));
                }
            }

            match self.current() {
                Some(t) if t.is_punct(':') => self.advance(),
                Some(t) if t.is_punct('}') => {
                    self.advance();
                    break t;
                }
                Some(t) => {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnexpectedToken {
                            found: t.describe(),
                            expected: "':' or '}'",
                        },
                        t.span.start,
                    ));
                }
                None => {
                    return Err(SyntaxError::new(SyntaxErrorKind::UnterminatedKeyword, open));
                }
            }
        };

        let texts: Vec<&str> = segments.iter().map(|t| t.text).collect();
        match Keyword::resolve(&texts) {
            Ok(keyword) => Ok(Node::Keyword {
                keyword,
                span: Span::new(open, close.span.end),
            }),
            Err(PathError::Unknown { index }) => Err(SyntaxError::new(
                SyntaxErrorKind::UnknownKeyword {
                    path: texts[..=index].join(":"),
                },
                segments[index].span.start,
            )),
            Err(PathError::Incomplete) => Err(SyntaxError::new(
                SyntaxErrorKind::IncompleteKeyword {
                    path: texts.join(":"),
                },
                close.span.start,
            )),
        }
    }
}

fn join_segments(segments: &[Token<'_>]) -> String {
    segments.iter().map(|t| t.text).collect::<Vec<_>>().join(":")
}

fn string_literal(token: Token<'_>) -> Result<Node, SyntaxError> {
    match token.kind {
        TokenKind::QuotedString {
            quote,
            terminated: true,
        } => Ok(Node::String {
            value: token.unquoted().to_string(),
            quote,
            span: token.span,
        }),
        TokenKind::QuotedString { quote, .. } => Err(SyntaxError::new(
            SyntaxErrorKind::UnterminatedString { quote },
            token.span.start,
        )),
        _ => Err(SyntaxError::new(
            SyntaxErrorKind::UnexpectedToken {
                found: token.describe(),
                expected: "a quoted string",
            },
            token.span.start,
        )),
    }
}

/// Adjacent text tokens are merged into one text node.
fn push_text(parts: &mut Vec<Node>, token: Token<'_>) {
    if let Some(Node::Text { value, span }) = parts.last_mut() {
        if span.end == token.span.start {
            value.push_str(token.text);
            span.end = token.span.end;
            return;
        }
    }
    parts.push(Node::Text {
        value: token.text.to_string(),
        span: token.span,
    });
}

/// Parses a formula with the default limits.
pub fn parse(input: &str) -> Result<Formula, SyntaxError> {
    Parser::new(Lexer::new(input)).parse()
}

/// Validity check for live feedback while a formula is typed.
pub fn validate(input: &str) -> Result<(), SyntaxError> {
    parse(input).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(input: &str) -> SyntaxError {
        parse(input).unwrap_err()
    }

    #[test]
    fn adjacent_text_merges() {
        let formula = parse("a]b/c").unwrap();
        assert_eq!(formula.root.parts.len(), 1);
        assert_eq!(formula.to_string(), "a]b/c");
    }

    #[test]
    fn arity_wording() {
        let err = error("[replace:\"a\", \"b\"]");
        assert_eq!(
            err.message(),
            "function 'replace' takes 3 argument(s), got 2"
        );
        let err = error("[regex:\"a\"]");
        assert_eq!(err.message(), "function 'regex' takes 2 or 3 argument(s), got 1");
    }

    #[test]
    fn too_many_arguments_are_counted() {
        let err = error("[upper:\"a\", \"b\", [lower:\"c\"]]");
        assert_eq!(
            err.kind,
            SyntaxErrorKind::ArgumentCount {
                function: "upper",
                min: 1,
                max: 1,
                found: 3
            }
        );
        assert_eq!(err.offset, 10);
    }

    #[test]
    fn caret_points_at_offset() {
        let err = error("é{file:hash}");
        assert_eq!(err.offset, 12);
        assert_eq!(err.caret("é{file:hash}"), "é{file:hash}\n           ^");
    }

    #[test]
    fn depth_limit() {
        let deep = format!("{}\"x\"{}", "[upper:".repeat(5), "]".repeat(5));
        assert!(Parser::new(Lexer::new(&deep)).with_max_depth(5).parse().is_ok());
        let err = Parser::new(Lexer::new(&deep))
            .with_max_depth(4)
            .parse()
            .unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::NestingTooDeep { max: 4 });
    }

    #[test]
    fn depth_limit_is_clamped() {
        let deep = format!("{}\"x\"{}", "[upper:".repeat(200), "]".repeat(200));
        let err = Parser::new(Lexer::new(&deep))
            .with_max_depth(usize::MAX)
            .parse()
            .unwrap_err();
        assert_eq!(
            err.kind,
            SyntaxErrorKind::NestingTooDeep {
                max: MAX_DEPTH_CEILING
            }
        );
    }
}

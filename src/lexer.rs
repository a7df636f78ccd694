use crate::ast::{Span, Token, TokenKind};

/// Characters that never belong to an unquoted text run.
const SPECIAL_CHARS: [char; 9] = ['{', '}', '[', ']', '"', '\'', '`', '\\', '/'];

fn is_text_char(ch: char) -> bool {
    !SPECIAL_CHARS.contains(&ch)
}

fn is_quote(ch: char) -> bool {
    matches!(ch, '"' | '\'' | '`')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Text,
    Function,
    Keyword,
}

/// Context-sensitive tokenizer.
///
/// Outside brackets everything is literal text. `[` switches to function
/// lexing and `{` to keyword lexing until the matching closer; both nest.
/// The lexer never fails: problems such as an unterminated quote are encoded
/// in the token stream and reported by the parser.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    modes: Vec<Mode>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            modes: Vec::new(),
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    fn mode(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Text)
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input[self.position..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
        }
    }

    fn advance_while(&mut self, keep: impl Fn(char) -> bool) {
        while let Some(ch) = self.current_char() {
            if keep(ch) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        self.advance_while(char::is_whitespace);
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token<'a> {
        Token::new(
            kind,
            &self.input[start..self.position],
            Span::new(start, self.position),
        )
    }

    fn open(&mut self, ch: char, mode: Mode, start: usize) -> Token<'a> {
        self.advance();
        self.modes.push(mode);
        self.token(TokenKind::Punct(ch), start)
    }

    fn read_string(&mut self, quote: char) -> Token<'a> {
        let start = self.position;
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == quote {
                return self.token(
                    TokenKind::QuotedString {
                        quote,
                        terminated: true,
                    },
                    start,
                );
            }
        }

        self.token(
            TokenKind::QuotedString {
                quote,
                terminated: false,
            },
            start,
        )
    }

    fn read_number(&mut self) -> Token<'a> {
        let start = self.position;
        if self.current_char() == Some('-') {
            self.advance();
        }
        self.advance_while(|c| c.is_ascii_digit());
        self.token(TokenKind::Integer, start)
    }

    fn next_text_token(&mut self) -> Option<Token<'a>> {
        let start = self.position;
        let token = match self.current_char()? {
            '[' => self.open('[', Mode::Function, start),
            '{' => self.open('{', Mode::Keyword, start),
            ch if is_quote(ch) => self.read_string(ch),
            ch if is_text_char(ch) => {
                self.advance_while(is_text_char);
                self.token(TokenKind::Text, start)
            }
            // stray `]`, `}`, `\` or `/`: literal
            _ => {
                self.advance();
                self.token(TokenKind::Text, start)
            }
        };
        Some(token)
    }

    fn next_bracket_token(&mut self) -> Option<Token<'a>> {
        let start = self.position;
        let token = match self.current_char()? {
            '[' => self.open('[', Mode::Function, start),
            '{' => self.open('{', Mode::Keyword, start),
            ch @ (']' | '}') => {
                self.advance();
                let closes = matches!(
                    (self.mode(), ch),
                    (Mode::Function, ']') | (Mode::Keyword, '}')
                );
                if closes {
                    self.modes.pop();
                }
                self.token(TokenKind::Punct(ch), start)
            }
            ch @ (':' | ',') => {
                self.advance();
                self.token(TokenKind::Punct(ch), start)
            }
            ch if is_quote(ch) => self.read_string(ch),
            '-' if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            ch if ch.is_ascii_digit() => self.read_number(),
            '#' => {
                self.advance_while(|c| c == '#');
                self.token(TokenKind::Identifier, start)
            }
            ch if ch.is_alphabetic() || ch == '_' => {
                self.advance_while(|c| c.is_alphanumeric() || c == '_');
                self.token(TokenKind::Identifier, start)
            }
            _ => {
                self.advance();
                self.token(TokenKind::Text, start)
            }
        };
        Some(token)
    }

    pub fn next_token(&mut self) -> Option<Token<'a>> {
        match self.mode() {
            Mode::Text => self.next_text_token(),
            Mode::Function => {
                self.skip_whitespace();
                self.next_bracket_token()
            }
            Mode::Keyword => self.next_bracket_token(),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Splits a formula into tokens.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

#[test]
fn test_text_run_stops_at_specials() {
    let tokens = tokenize("a b/c");
    let texts: Vec<&str> = tokens.iter().map(|t| t.text).collect();
    assert_eq!(texts, vec!["a b", "/", "c"]);
    assert!(tokens.iter().all(|t| t.kind == TokenKind::Text));
}

#[test]
fn test_function_context() {
    let mut lexer = Lexer::new("[sub:{file:baseName}, -4]x");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Punct('['));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Identifier);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Punct(':'));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Punct('{'));
    assert_eq!(lexer.next_token().unwrap().text, "file");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Punct(':'));
    assert_eq!(lexer.next_token().unwrap().text, "baseName");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Punct('}'));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Punct(','));
    let number = lexer.next_token().unwrap();
    assert_eq!((number.kind, number.text), (TokenKind::Integer, "-4"));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Punct(']'));
    let text = lexer.next_token().unwrap();
    assert_eq!((text.kind, text.text), (TokenKind::Text, "x"));
    assert!(lexer.next_token().is_none());
}

//! Documentation content for the fname CLI
//!
//! The function and keyword pages are generated from the registry tables so
//! they always match what the parser accepts.

use std::fmt::Write;

use super::CliError;
use crate::registry::{ArgKind, FUNCTIONS, FunctionKind, KEYWORDS};

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Functions,
    Keywords,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "syntax" => Some(Self::Syntax),
            "functions" | "function" | "fn" => Some(Self::Functions),
            "keywords" | "keyword" | "kw" => Some(Self::Keywords),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"FNAME DOCUMENTATION

A formula describes a file name. Literal text is copied as is, keywords in
braces are replaced by values of the file, and functions in brackets
transform their arguments.

DOCUMENTATION CATEGORIES

  syntax            Text, quoting, keywords, functions and nesting
  functions         Every function with its arguments
  keywords          Every keyword path

QUICK REFERENCE

  photo_            Literal text
  {file:baseName}   Keyword
  [upper:"abc"]     Function call
  "text"  'text'    Quoted strings (also `text`), no escapes
  {counter:###}     Zero-padded counter

Run 'fname doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<String, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC.to_string()),
        Some(DocCategory::Functions) => Ok(functions_doc()),
        Some(DocCategory::Keywords) => Ok(keywords_doc()),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

fn kind_label(kind: ArgKind) -> &'static str {
    match kind {
        ArgKind::String => "string",
        ArgKind::Integer => "integer",
        ArgKind::Unsigned => "integer >= 0",
    }
}

fn functions_doc() -> String {
    let mut out = String::from("FUNCTIONS\n");
    for signature in &FUNCTIONS {
        let returns = match signature.kind {
            FunctionKind::StringFn => "string",
            FunctionKind::IntFn => "integer",
        };
        let _ = writeln!(out, "\n  {}  -> {}", signature.syntax(), returns);
        let _ = writeln!(out, "    {}", signature.summary);
        for param in signature.params {
            let optional = if param.optional { ", optional" } else { "" };
            let _ = writeln!(out, "      {:<12} {}{}", param.name, kind_label(param.kind), optional);
        }
        let _ = writeln!(out, "    Example: {}", signature.example);
    }
    out
}

fn keywords_doc() -> String {
    let width = KEYWORDS.iter().map(|k| k.syntax.len()).max().unwrap_or(0);
    let mut out = String::from("KEYWORDS\n\n");
    for keyword in KEYWORDS {
        let _ = writeln!(out, "  {:<width$}  {}", keyword.syntax, keyword.description);
    }
    out.push_str(
        "\n  Values that do not exist for a file (e.g. the size of a text file)\n  \
         make the evaluation fail for that file.\n",
    );
    out
}

const SYNTAX_DOC: &str = r#"SYNTAX - Formula Notation

LITERAL TEXT
  photo_2024
    Everything outside brackets and braces is copied verbatim, spaces
    included. A stray ']' or '}' is also literal.

    Example:
      File:    holiday.jpg
      Formula: IMG {file:baseName}
      Output:  IMG holiday

    Constraints:
      - '/' is removed from the result unless invalid characters are kept

KEYWORDS
  {segment:segment:...}
    Values of the file being named or of the batch. Segments ignore
    case and no spaces are allowed inside braces.

    Example:
      File:    /photos/holiday.jpg
      Formula: {file:path}/{file:ext}
      Output:  /photos/jpg (before sanitizing)

    Padding:
      {counter:####}          Counter on 4 digits: 0007
      {image:size:width:##}   Width on at least 2 digits

    Run 'fname doc keywords' for the full list.

FUNCTIONS
  [name:arg, arg, ...]
    Arguments are separated by commas; spaces around them are ignored.

    String arguments are built from quoted strings, keywords and calls
    written next to each other:
      [upper:"img_" {file:baseName}]

    Integer arguments are integer literals or integer functions:
      [sub:{file:baseName}, 0, [len:"abc"]]

    Constraints:
      - Literal text inside a function must be quoted
      - A string argument never accepts a bare number: use "3"
      - Functions and keywords nest at most 64 levels deep

QUOTED STRINGS
  "text"  'text'  `text`
    Content is taken verbatim until the same quote character; there are no
    escape sequences. Use another quote to include one:
      'say "hi"'

ERRORS
  A formula that does not parse is rejected as a whole, with the position
  of the problem. A formula that parses can still fail for a file whose
  data is missing, such as {image:size} for a text file.
"#;

//! Validate a formula without evaluating it

use crate::{Formula, Lexer, Parser, SyntaxError};

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    Valid(Formula),
    Invalid {
        error: SyntaxError,
        /// The formula with a caret under the offending position
        display: String,
    },
}

impl CheckResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, CheckResult::Valid(_))
    }
}

pub fn execute_check(formula: &str, max_depth: usize) -> CheckResult {
    let parser = Parser::new(Lexer::new(formula)).with_max_depth(max_depth);
    match parser.parse() {
        Ok(parsed) => CheckResult::Valid(parsed),
        Err(error) => CheckResult::Invalid {
            display: error.caret(formula),
            error,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_caret() {
        match execute_check("{file:hash}", 64) {
            CheckResult::Invalid { error, display } => {
                assert_eq!(error.offset(), 10);
                assert_eq!(display, "{file:hash}\n          ^");
            }
            CheckResult::Valid(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn valid_formula() {
        assert!(execute_check("{file:baseName}_[upper:{file:ext}]", 64).is_valid());
    }
}

// tests/evaluator_tests.rs

use chrono::{NaiveDate, NaiveDateTime};
use fname_lang::registry::{ArgKind, FUNCTIONS, KEYWORDS};
use fname_lang::{EvalError, FileContext, HashAlgorithm, evaluate, parse};
use proptest::prelude::*;
use rstest::rstest;

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

fn photo() -> FileContext {
    FileContext::new("/photos/2024/my_holiday.photo.JPG")
        .with_modified(at(2021, 1, 2, 3, 4, 5))
        .with_now(at(2024, 11, 30, 23, 1, 59))
        .with_image_size(4032, 3024)
        .with_hash(HashAlgorithm::Md5, "d41d8cd98f00b204e9800998ecf8427e")
        .with_counter(12, 0)
}

fn eval(formula: &str) -> Result<String, EvalError> {
    evaluate(&parse(formula).unwrap(), &photo())
}

fn ok(formula: &str) -> String {
    eval(formula).unwrap()
}

/// Quotes `s` for use as a formula string literal
fn quoted(s: &str) -> String {
    format!("`{s}`")
}

// ============================================================================
// Keywords
// ============================================================================

#[rstest]
#[case("{file:path}", "/photos/2024")]
#[case("{file:baseName}", "my_holiday.photo")]
#[case("{file:ext}", "JPG")]
#[case("{file:format}", "jpeg")]
#[case("{file:date}", "20210102")]
#[case("{file:time}", "030405")]
#[case("{file:time:hh}h{file:time:mm}", "03h04")]
#[case("{date:yyyy}{time:hh}", "202423")]
#[case("{image:size}", "4032x3024")]
#[case("{image:size:width:######}", "004032")]
#[case("{file:hash:md5}", "d41d8cd98f00b204e9800998ecf8427e")]
#[case("{counter}", "12")]
#[case("{counter:####}", "0012")]
fn test_keyword_values(#[case] formula: &str, #[case] expected: &str) {
    assert_eq!(ok(formula), expected);
}

#[test]
fn test_literal_text_is_copied() {
    assert_eq!(ok("IMG ] } {file:ext}"), "IMG ] } JPG");
}

#[rstest]
#[case("{file:hash:sha256}", "file:hash:sha256")]
#[case("{file:date}", "file:date")]
#[case("{image:size:height}", "image:size:height")]
#[case("{counter:##}", "counter:##")]
fn test_unavailable_keywords(#[case] formula: &str, #[case] keyword: &str) {
    let ctx = FileContext::new("notes");
    let err = evaluate(&parse(formula).unwrap(), &ctx).unwrap_err();
    assert_eq!(
        err,
        EvalError::KeywordUnavailable {
            keyword: keyword.to_string()
        }
    );
}

#[test]
fn test_context_without_path() {
    let ctx = FileContext::default();
    let err = evaluate(&parse("{file:ext}").unwrap(), &ctx).unwrap_err();
    assert!(matches!(err, EvalError::KeywordUnavailable { .. }));
}

// ============================================================================
// Functions
// ============================================================================

#[rstest]
#[case("[capitalize:{file:baseName}]", "My_holiday.photo")]
#[case("[camelize:{file:baseName}]", "myHolidayPhoto")]
#[case("[lower:{file:ext}]", "jpg")]
#[case("[upper:\"straße\"]", "STRASSE")]
#[case("[replace:{file:baseName}, \".\", \"-\"]", "my_holiday-photo")]
#[case("[replace:\"aaa\", \"aa\", \"b\"]", "ba")]
#[case("[replace:\"abc\", \"\", \"x\"]", "abc")]
#[case("[index:{file:path}, \"/\", 2]", "2024")]
#[case("[index:\"abc\", \"\", 0]", "abc")]
#[case("[sub:{file:baseName}, 3, 7]", "holiday")]
#[case("[sub:\"été\", -2]", "té")]
#[case("[padding:{counter}, 4, \"0\"]", "0012")]
#[case("[padding:\"ab\", 6, \"-=\", \"center\"]", "--ab--")]
#[case("[padding:\"ab\", 5, \".\", \"RIGHT\"]", "ab...")]
#[case("[len:{file:baseName}]", "16")]
#[case("[len:\"日本\", 1]", "6")]
fn test_functions(#[case] formula: &str, #[case] expected: &str) {
    assert_eq!(ok(formula), expected);
}

#[rstest]
#[case("[regex:{file:baseName}, \"[a-z]+\"]", "my")]
#[case("[regex:\"IMG_2041\", \"img\"]", "IMG")]
#[case("[regex:\"abc\", \"[0-9]\"]", "")]
#[case("[regex:\"abc\", \"\"]", "abc")]
#[case("[regex:\"a1b22\", \"[0-9]+\", \"#\"]", "a#b#")]
#[case("[regex:\"2024-11-30\", \"(?P<y>\\d+)-(\\d+)-(\\d+)\", \"$3.$2.${y}\"]", "30.11.2024")]
fn test_regex(#[case] formula: &str, #[case] expected: &str) {
    assert_eq!(ok(formula), expected);
}

#[test]
fn test_invalid_regex() {
    let err = eval("[regex:\"abc\", \"(\"]").unwrap_err();
    match err {
        EvalError::InvalidRegex { function, pattern, .. } => {
            assert_eq!(function, "regex");
            assert_eq!(pattern, "(");
        }
        other => panic!("expected InvalidRegex, got {other:?}"),
    }
}

#[test]
fn test_index_out_of_range() {
    let err = eval("[index:\"a_b\", \"_\", 2]").unwrap_err();
    assert_eq!(
        err,
        EvalError::IndexOutOfRange {
            function: "index",
            index: 2,
            count: 2
        }
    );
}

#[test]
fn test_padding_invalid_side_and_limit() {
    assert!(matches!(
        eval("[padding:\"a\", 3, \"0\", \"middle\"]"),
        Err(EvalError::InvalidArgument { function: "padding", .. })
    ));
    assert!(matches!(
        eval("[padding:\"a\", 100000]"),
        Err(EvalError::InvalidArgument { function: "padding", .. })
    ));
}

#[test]
fn test_negative_padding_length_is_noop() {
    assert_eq!(ok("[padding:\"abc\", -5]"), "abc");
}

#[test]
fn test_len_invalid_mode() {
    assert!(matches!(
        eval("[len:\"a\", 2]"),
        Err(EvalError::InvalidArgument { function: "len", .. })
    ));
    assert!(matches!(
        eval("[len:\"a\", -1]"),
        Err(EvalError::InvalidArgument { function: "len", .. })
    ));
}

#[test]
fn test_nested_composition() {
    assert_eq!(
        ok("[upper:[sub:{file:baseName}, 0, [len:\"abcd\"]]]_{counter:###}.[lower:{file:ext}]"),
        "MY_H_012.jpg"
    );
}

#[test]
fn test_error_in_argument_aborts_outer_call() {
    let err = eval("[upper:[index:\"a\", \",\", 3]]").unwrap_err();
    assert!(matches!(err, EvalError::IndexOutOfRange { .. }));
}

#[test]
fn test_error_messages() {
    let err = eval("[index:\"a_b\", \"_\", 5]").unwrap_err();
    assert_eq!(
        err.to_string(),
        "index: position 5 is out of range, the value has 2 part(s)"
    );
    assert_eq!(err.subject(), "index");
}

// ============================================================================
// Generated Formulas
// ============================================================================

const LITERALS: &[&str] = &["", "a", "x_y", "é", ",", "-", "(", "[0-9]+", "$1", "right", "center"];

/// Builds well-formed formulas from the function and keyword tables,
/// drawing every choice from a fixed pool of random numbers.
struct FormulaBuilder<'a> {
    entropy: std::slice::Iter<'a, u64>,
}

impl FormulaBuilder<'_> {
    fn raw(&mut self) -> u64 {
        self.entropy.next().copied().unwrap_or(0)
    }

    fn pick(&mut self, bound: usize) -> usize {
        (self.raw() % bound as u64) as usize
    }

    fn formula(&mut self) -> String {
        let mut out = String::new();
        for _ in 0..1 + self.pick(3) {
            match self.pick(3) {
                0 => out.push_str("IMG_"),
                1 => out.push_str(&self.keyword(true)),
                _ => out.push_str(&self.call(3)),
            }
        }
        out
    }

    /// `wide` allows `#` runs past the formatter's width limit; only used at
    /// the top level so nested functions keep working on short values.
    fn keyword(&mut self, wide: bool) -> String {
        let syntax = KEYWORDS[self.pick(KEYWORDS.len())].syntax;
        if !syntax.contains('#') {
            return syntax.to_string();
        }
        let width = if wide && self.pick(4) == 0 {
            65_536 + self.pick(5_000)
        } else {
            1 + self.pick(8)
        };
        syntax.replace("####", &"#".repeat(width))
    }

    fn integer(&mut self, unsigned: bool, depth: usize) -> String {
        if depth > 0 && self.pick(3) == 0 {
            return format!("[len:{}]", self.string(depth - 1));
        }
        let raw = self.raw();
        match (unsigned, self.pick(3)) {
            (true, 0) => (raw >> 1).to_string(),
            (false, 0) => (raw as i64).to_string(),
            (true, _) => (raw % 10).to_string(),
            (false, _) => ((raw % 21) as i64 - 10).to_string(),
        }
    }

    fn string(&mut self, depth: usize) -> String {
        let choices = if depth == 0 { 2 } else { 4 };
        match self.pick(choices) {
            0 => quoted(LITERALS[self.pick(LITERALS.len())]),
            1 => self.keyword(false),
            2 => self.call(depth - 1),
            _ => format!("{} {}", self.string(depth - 1), self.string(depth - 1)),
        }
    }

    fn call(&mut self, depth: usize) -> String {
        let signature = &FUNCTIONS[self.pick(FUNCTIONS.len())];
        let optional = signature.max_args() - signature.min_args();
        let count = signature.min_args() + self.pick(optional + 1);
        let args: Vec<String> = signature.params[..count]
            .iter()
            .map(|param| match param.kind {
                ArgKind::String => self.string(depth),
                ArgKind::Integer => self.integer(false, depth),
                ArgKind::Unsigned => self.integer(true, depth),
            })
            .collect();
        format!("[{}:{}]", signature.name, args.join(", "))
    }
}

fn generated_formula(entropy: &[u64]) -> String {
    FormulaBuilder {
        entropy: entropy.iter(),
    }
    .formula()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_upper_is_idempotent(s in "[a-zA-Z0-9 _.é-]{0,20}") {
        let once = ok(&format!("[upper:{}]", quoted(&s)));
        let twice = ok(&format!("[upper:[upper:{}]]", quoted(&s)));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_capitalize_is_idempotent(s in "[a-z0-9 _]{0,20}") {
        let once = ok(&format!("[capitalize:{}]", quoted(&s)));
        let twice = ok(&format!("[capitalize:[capitalize:{}]]", quoted(&s)));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_padding_length(s in "[a-zA-Zé ]{0,12}", len in 0i64..30) {
        let padded = ok(&format!("[padding:{}, {len}, \"*\"]", quoted(&s)));
        let expected = s.chars().count().max(len as usize);
        prop_assert_eq!(padded.chars().count(), expected);
    }

    #[test]
    fn prop_sub_never_fails(s in "[a-zé]{0,12}", start in -20i64..20, len in 0i64..20) {
        let formula = format!("[sub:{}, {start}, {len}]", quoted(&s));
        prop_assert!(eval(&formula).is_ok());
    }

    #[test]
    fn prop_index_fails_exactly_past_the_end(parts in 1usize..6, n in 0i64..10) {
        let value = vec!["x"; parts].join(",");
        let result = eval(&format!("[index:{}, \",\", {n}]", quoted(&value)));
        prop_assert_eq!(result.is_err(), n as usize >= parts);
    }

    #[test]
    fn prop_generated_formulas_evaluate(entropy in prop::collection::vec(any::<u64>(), 64)) {
        let text = generated_formula(&entropy);
        let formula = parse(&text);
        prop_assert!(formula.is_ok(), "{:?}", formula.err());
        let formula = formula.unwrap();
        let paths: Vec<String> = formula.keywords().iter().map(|k| k.path()).collect();
        for ctx in [photo(), FileContext::default()] {
            if let Err(EvalError::KeywordUnavailable { keyword }) = evaluate(&formula, &ctx) {
                prop_assert!(paths.contains(&keyword), "{} not in {:?}", keyword, paths);
            }
        }
    }
}

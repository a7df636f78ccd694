//! Behaviors of the formula functions.
//!
//! Each function receives its evaluated arguments in declaration order, as
//! listed in [`crate::registry::FUNCTIONS`]. The parser has already checked
//! arity and argument kinds; the checks here only protect hand-built trees.

use regex::RegexBuilder;

use crate::{evaluator::EvalError, value::Value};

/// Upper bound for `[padding]`; file names are far shorter.
pub const MAX_PADDING: i64 = 4096;

/// Typed access to evaluated arguments.
struct Args<'a> {
    function: &'static str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    fn new(function: &'static str, values: &'a [Value], min: usize, max: usize) -> Result<Self, EvalError> {
        if values.len() < min || values.len() > max {
            return Err(EvalError::ArgumentCount {
                function,
                min,
                max,
                found: values.len(),
            });
        }
        Ok(Args { function, values })
    }

    fn type_error(&self, index: usize, expected: &str) -> EvalError {
        EvalError::TypeError {
            function: self.function,
            message: format!(
                "argument {} must be {}, got {}",
                index + 1,
                expected,
                self.values[index].type_name()
            ),
        }
    }

    fn string(&self, index: usize) -> Result<&'a str, EvalError> {
        self.values[index]
            .as_str()
            .ok_or_else(|| self.type_error(index, "a string"))
    }

    fn integer(&self, index: usize) -> Result<i64, EvalError> {
        self.values[index]
            .as_int()
            .ok_or_else(|| self.type_error(index, "an integer"))
    }

    fn opt_string(&self, index: usize) -> Result<Option<&'a str>, EvalError> {
        if index < self.values.len() {
            self.string(index).map(Some)
        } else {
            Ok(None)
        }
    }

    fn opt_integer(&self, index: usize) -> Result<Option<i64>, EvalError> {
        if index < self.values.len() {
            self.integer(index).map(Some)
        } else {
            Ok(None)
        }
    }

    fn invalid(&self, message: String) -> EvalError {
        EvalError::InvalidArgument {
            function: self.function,
            message,
        }
    }
}

// ========================================
// Case
// ========================================

/// [capitalize:value] - upper-cases the first character only
pub fn capitalize(args: &[Value]) -> Result<Value, EvalError> {
    let args = Args::new("capitalize", args, 1, 1)?;
    let mut chars = args.string(0)?.chars();
    let result = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    Ok(Value::String(result))
}

/// [camelize:value] - `my_file__name01` becomes `myFileName01`
pub fn camelize(args: &[Value]) -> Result<Value, EvalError> {
    let args = Args::new("camelize", args, 1, 1)?;
    let mut result = String::new();
    let parts = args
        .string(0)?
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty());

    for (i, part) in parts.enumerate() {
        if i == 0 {
            result.push_str(part);
            continue;
        }
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    Ok(Value::String(result))
}

/// [upper:value] - converts value to upper case
pub fn upper(args: &[Value]) -> Result<Value, EvalError> {
    let args = Args::new("upper", args, 1, 1)?;
    Ok(Value::String(args.string(0)?.to_uppercase()))
}

/// [lower:value] - converts value to lower case
pub fn lower(args: &[Value]) -> Result<Value, EvalError> {
    let args = Args::new("lower", args, 1, 1)?;
    Ok(Value::String(args.string(0)?.to_lowercase()))
}

// ========================================
// Search and replace
// ========================================

/// [replace:value, search, replacement] - literal, non-overlapping
pub fn replace(args: &[Value]) -> Result<Value, EvalError> {
    let args = Args::new("replace", args, 3, 3)?;
    let value = args.string(0)?;
    let search = args.string(1)?;
    if search.is_empty() {
        return Ok(Value::from(value));
    }
    Ok(Value::String(value.replace(search, args.string(2)?)))
}

/// [regex:value, pattern[, replacement]] - extract the first match, or
/// substitute every match when a replacement is given
pub fn regex(args: &[Value]) -> Result<Value, EvalError> {
    let args = Args::new("regex", args, 2, 3)?;
    let value = args.string(0)?;
    let pattern = args.string(1)?;
    let replacement = args.opt_string(2)?;

    if pattern.is_empty() {
        return Ok(Value::from(value));
    }

    let re = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| EvalError::InvalidRegex {
            function: args.function,
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

    let result = match replacement {
        None => re.find(value).map(|m| m.as_str()).unwrap_or("").to_string(),
        Some(replacement) => re.replace_all(value, replacement).into_owned(),
    };
    Ok(Value::String(result))
}

// ========================================
// Slicing
// ========================================

/// [index:value, separator, position] - 0-based part of a split
pub fn index(args: &[Value]) -> Result<Value, EvalError> {
    let args = Args::new("index", args, 3, 3)?;
    let value = args.string(0)?;
    let separator = args.string(1)?;
    let position = args.integer(2)?;

    let parts: Vec<&str> = if separator.is_empty() {
        vec![value]
    } else {
        value.split(separator).collect()
    };

    usize::try_from(position)
        .ok()
        .and_then(|i| parts.get(i))
        .map(|part| Value::from(*part))
        .ok_or(EvalError::IndexOutOfRange {
            function: args.function,
            index: position,
            count: parts.len(),
        })
}

/// [sub:value, start[, length]] - character slice, bounds clamped
pub fn sub(args: &[Value]) -> Result<Value, EvalError> {
    let args = Args::new("sub", args, 2, 3)?;
    let chars: Vec<char> = args.string(0)?.chars().collect();
    let start = args.integer(1)?;
    let length = args.opt_integer(2)?;

    let count = chars.len() as i64;
    let begin = if start < 0 {
        count.saturating_add(start).max(0)
    } else {
        start.min(count)
    };
    let end = match length {
        Some(length) => begin.saturating_add(length.max(0)).min(count),
        None => count,
    };

    Ok(Value::String(chars[begin as usize..end as usize].iter().collect()))
}

// ========================================
// Padding and length
// ========================================

/// [padding:value, length[, char[, side]]] - never truncates
pub fn padding(args: &[Value]) -> Result<Value, EvalError> {
    let args = Args::new("padding", args, 2, 4)?;
    let value = args.string(0)?;
    let length = args.integer(1)?;
    let fill = args
        .opt_string(2)?
        .and_then(|s| s.chars().next())
        .unwrap_or(' ');
    let side = args.opt_string(3)?.unwrap_or("left");

    if length > MAX_PADDING {
        return Err(args.invalid(format!("length {length} exceeds {MAX_PADDING}")));
    }

    let current = value.chars().count();
    let target = usize::try_from(length).unwrap_or(0);
    let missing = target.saturating_sub(current);
    let pad = |n: usize| fill.to_string().repeat(n);

    let result = match side.to_lowercase().as_str() {
        "left" => format!("{}{value}", pad(missing)),
        "right" => format!("{value}{}", pad(missing)),
        "center" => {
            let left = missing / 2;
            format!("{}{value}{}", pad(left), pad(missing - left))
        }
        other => {
            return Err(args.invalid(format!(
                "side must be \"left\", \"right\" or \"center\", got \"{other}\""
            )));
        }
    };
    Ok(Value::String(result))
}

/// [len:value[, mode]] - characters (mode 0) or UTF-8 bytes (mode 1)
pub fn len(args: &[Value]) -> Result<Value, EvalError> {
    let args = Args::new("len", args, 1, 2)?;
    let value = args.string(0)?;
    let count = match args.opt_integer(1)?.unwrap_or(0) {
        0 => value.chars().count(),
        1 => value.len(),
        mode => return Err(args.invalid(format!("mode must be 0 or 1, got {mode}"))),
    };
    Ok(Value::Integer(count as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Value {
        Value::from(v)
    }

    fn call(f: fn(&[Value]) -> Result<Value, EvalError>, args: &[Value]) -> String {
        f(args).unwrap().into_string()
    }

    #[test]
    fn capitalize_leaves_rest() {
        assert_eq!(call(capitalize, &[s("my_FILE")]), "My_FILE");
        assert_eq!(call(capitalize, &[s("")]), "");
    }

    #[test]
    fn camelize_parts() {
        assert_eq!(call(camelize, &[s("my_file__name01")]), "myFileName01");
        assert_eq!(call(camelize, &[s("-hello world-")]), "helloWorld");
    }

    #[test]
    fn regex_extract_and_replace() {
        assert_eq!(call(regex, &[s("foo123"), s("[0-9]+")]), "123");
        assert_eq!(call(regex, &[s("foo"), s("[0-9]+")]), "");
        assert_eq!(
            call(regex, &[s("name01"), s("([a-z]+)(\\d+)"), s("${2}-$1")]),
            "01-name"
        );
        assert_eq!(call(regex, &[s("ABC"), s("b")]), "B");
    }

    #[test]
    fn regex_compile_failure() {
        let err = regex(&[s("x"), s("(")]).unwrap_err();
        assert!(matches!(err, EvalError::InvalidRegex { .. }));
    }

    #[test]
    fn sub_clamps() {
        assert_eq!(call(sub, &[s("my_file"), Value::Integer(3)]), "file");
        assert_eq!(call(sub, &[s("my_file"), Value::Integer(-4), Value::Integer(2)]), "fi");
        assert_eq!(call(sub, &[s("abc"), Value::Integer(10)]), "");
        assert_eq!(call(sub, &[s("abc"), Value::Integer(-10), Value::Integer(2)]), "ab");
        assert_eq!(call(sub, &[s("abc"), Value::Integer(i64::MIN), Value::Integer(i64::MAX)]), "abc");
    }

    #[test]
    fn padding_sides() {
        let p = |side: &str| call(padding, &[s("ab"), Value::Integer(5), s("*"), s(side)]);
        assert_eq!(p("left"), "***ab");
        assert_eq!(p("right"), "ab***");
        assert_eq!(p("center"), "*ab**");
        assert_eq!(call(padding, &[s("abcdef"), Value::Integer(3)]), "abcdef");
        assert_eq!(call(padding, &[s("7"), Value::Integer(3), s("")]), "  7");
    }

    #[test]
    fn padding_rejects_unknown_side() {
        let err = padding(&[s("a"), Value::Integer(3), s("0"), s("up")]).unwrap_err();
        assert!(matches!(err, EvalError::InvalidArgument { function: "padding", .. }));
    }

    #[test]
    fn len_modes() {
        assert_eq!(len(&[s("été")]).unwrap(), Value::Integer(3));
        assert_eq!(len(&[s("été"), Value::Integer(1)]).unwrap(), Value::Integer(5));
        assert!(len(&[s("x"), Value::Integer(2)]).is_err());
    }

    #[test]
    fn wrong_arity_is_an_error() {
        let err = upper(&[]).unwrap_err();
        assert_eq!(
            err,
            EvalError::ArgumentCount {
                function: "upper",
                min: 1,
                max: 1,
                found: 0
            }
        );
    }
}

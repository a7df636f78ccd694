use crate::{builtins, evaluator::EvalError, value::Value};

/// Identity of every function of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Capitalize,
    Camelize,
    Upper,
    Lower,
    Replace,
    Regex,
    Index,
    Sub,
    Padding,
    Len,
}

/// What a function returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    StringFn,
    IntFn,
}

/// What an argument position accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// A string expression: quoted strings, keywords and calls
    String,
    /// An integer literal or an integer-returning call
    Integer,
    /// Same as `Integer`, negative literals rejected
    Unsigned,
}

impl ArgKind {
    pub fn is_integer(self) -> bool {
        matches!(self, ArgKind::Integer | ArgKind::Unsigned)
    }
}

#[derive(Debug)]
pub struct Param {
    pub name: &'static str,
    pub kind: ArgKind,
    pub optional: bool,
}

/// Evaluation behavior: receives the evaluated arguments, in order.
pub type Behavior = fn(&[Value]) -> Result<Value, EvalError>;

/// Registry entry for one function.
pub struct Signature {
    pub function: Function,
    pub name: &'static str,
    pub kind: FunctionKind,
    /// Optional parameters are always trailing.
    pub params: &'static [Param],
    pub summary: &'static str,
    pub example: &'static str,
    pub apply: Behavior,
}

impl Signature {
    pub fn min_args(&self) -> usize {
        self.params.iter().filter(|p| !p.optional).count()
    }

    pub fn max_args(&self) -> usize {
        self.params.len()
    }

    /// Usage line, e.g. `[regex:value, pattern[, replacement]]`
    pub fn syntax(&self) -> String {
        let mut out = format!("[{}:", self.name);
        let mut open_optional = 0;
        for (i, param) in self.params.iter().enumerate() {
            if param.optional {
                out.push('[');
                open_optional += 1;
            }
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(param.name);
        }
        out.push_str(&"]".repeat(open_optional));
        out.push(']');
        out
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signature")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("params", &self.params)
            .finish()
    }
}

const fn required(name: &'static str, kind: ArgKind) -> Param {
    Param {
        name,
        kind,
        optional: false,
    }
}

const fn optional(name: &'static str, kind: ArgKind) -> Param {
    Param {
        name,
        kind,
        optional: true,
    }
}

const VALUE: Param = required("value", ArgKind::String);

/// Every function, indexed by `Function as usize`.
pub static FUNCTIONS: [Signature; 10] = [
    Signature {
        function: Function::Capitalize,
        name: "capitalize",
        kind: FunctionKind::StringFn,
        params: &[VALUE],
        summary: "Upper-case the first character of value, leave the rest unchanged",
        example: "[capitalize:\"my_file\"] => My_file",
        apply: builtins::capitalize,
    },
    Signature {
        function: Function::Camelize,
        name: "camelize",
        kind: FunctionKind::StringFn,
        params: &[VALUE],
        summary: "Split value on non-alphanumeric characters, upper-case the first letter of every part after the first and join the parts",
        example: "[camelize:\"my_file__name01\"] => myFileName01",
        apply: builtins::camelize,
    },
    Signature {
        function: Function::Upper,
        name: "upper",
        kind: FunctionKind::StringFn,
        params: &[VALUE],
        summary: "Convert value to upper case",
        example: "[upper:{file:ext}] => JPG",
        apply: builtins::upper,
    },
    Signature {
        function: Function::Lower,
        name: "lower",
        kind: FunctionKind::StringFn,
        params: &[VALUE],
        summary: "Convert value to lower case",
        example: "[lower:\"IMG_001\"] => img_001",
        apply: builtins::lower,
    },
    Signature {
        function: Function::Replace,
        name: "replace",
        kind: FunctionKind::StringFn,
        params: &[
            VALUE,
            required("search", ArgKind::String),
            required("replacement", ArgKind::String),
        ],
        summary: "Replace every occurrence of search in value with replacement",
        example: "[replace:\"my_file\", \"_\", \"-\"] => my-file",
        apply: builtins::replace,
    },
    Signature {
        function: Function::Regex,
        name: "regex",
        kind: FunctionKind::StringFn,
        params: &[
            VALUE,
            required("pattern", ArgKind::String),
            optional("replacement", ArgKind::String),
        ],
        summary: "Without replacement, return the first match of pattern in value (empty if none). \
                  With replacement, replace every match; use $1, $2 or ${name} for captured groups. \
                  Matching ignores case",
        example: "[regex:\"name01\", \"([a-z]+)(\\d+)\", \"$2-$1\"] => 01-name",
        apply: builtins::regex,
    },
    Signature {
        function: Function::Index,
        name: "index",
        kind: FunctionKind::StringFn,
        params: &[
            VALUE,
            required("separator", ArgKind::String),
            required("position", ArgKind::Unsigned),
        ],
        summary: "Split value on separator and return the part at position (first part is 0)",
        example: "[index:\"a_b_c\", \"_\", 1] => b",
        apply: builtins::index,
    },
    Signature {
        function: Function::Sub,
        name: "sub",
        kind: FunctionKind::StringFn,
        params: &[
            VALUE,
            required("start", ArgKind::Integer),
            optional("length", ArgKind::Unsigned),
        ],
        summary: "Substring of value from start (first character is 0, negative counts from the end), \
                  length characters or up to the end. Out of range bounds are clamped",
        example: "[sub:\"my_file\", -4] => file",
        apply: builtins::sub,
    },
    Signature {
        function: Function::Padding,
        name: "padding",
        kind: FunctionKind::StringFn,
        params: &[
            VALUE,
            required("length", ArgKind::Integer),
            optional("char", ArgKind::String),
            optional("side", ArgKind::String),
        ],
        summary: "Pad value with char (default space) up to length characters, on side \
                  \"left\" (default), \"right\" or \"center\". Never truncates. \
                  Length is at most 4096",
        example: "[padding:{counter}, 4, \"0\"] => 0007",
        apply: builtins::padding,
    },
    Signature {
        function: Function::Len,
        name: "len",
        kind: FunctionKind::IntFn,
        params: &[VALUE, optional("mode", ArgKind::Integer)],
        summary: "Length of value: number of characters (mode 0, default) or UTF-8 bytes (mode 1)",
        example: "[len:\"text\"] => 4",
        apply: builtins::len,
    },
];

impl Function {
    pub const ALL: [Function; 10] = [
        Function::Capitalize,
        Function::Camelize,
        Function::Upper,
        Function::Lower,
        Function::Replace,
        Function::Regex,
        Function::Index,
        Function::Sub,
        Function::Padding,
        Function::Len,
    ];

    pub fn signature(self) -> &'static Signature {
        &FUNCTIONS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.signature().name
    }

    pub fn kind(self) -> FunctionKind {
        self.signature().kind
    }

    /// Looks a function up by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Function> {
        FUNCTIONS
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .map(|s| s.function)
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

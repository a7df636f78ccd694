use std::fmt;

/// Result of evaluating a node.
///
/// Formula values are strings; integers only flow between integer argument
/// positions and integer functions. When an integer lands in a string
/// position it is formatted in decimal.
///
/// # Examples
///
/// ```
/// use fname_lang::Value;
///
/// assert_eq!(Value::Integer(-12).into_string(), "-12");
/// assert_eq!(Value::from("abc").as_int(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Integer(i64),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Integer(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::String(_) => None,
        }
    }

    /// String form, integers in decimal
    pub fn into_string(self) -> String {
        match self {
            Value::String(s) => s,
            Value::Integer(n) => n.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

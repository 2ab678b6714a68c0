//! Declarative task marks and the `stata` annotation built from them

pub mod merge;
pub mod normalize;
pub mod store;

pub use merge::merge_marks;
pub use normalize::{
    OPTIONS_KEY, SCRIPT_KEY, SCRIPT_SUFFIX, STATA_MARK, TaskAnnotation, normalize, normalize_options,
    parse_stata_mark,
};
pub use store::MarkStore;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Name of the mark that turns a definition into a task regardless of its name
pub const TASK_MARK: &str = "task";

/// A single scalar value carried by a mark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Path { path: PathBuf },
}

impl OptionValue {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        OptionValue::Path { path: path.into() }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(true) => f.write_str("True"),
            OptionValue::Bool(false) => f.write_str("False"),
            OptionValue::Integer(value) => write!(f, "{value}"),
            OptionValue::Float(value) => f.write_str(&format_float(*value)),
            OptionValue::Text(value) => f.write_str(value),
            OptionValue::Path { path } => write!(f, "{}", path.display()),
        }
    }
}

/// Shortest round-trip form of `value`, positional for exponents in `-4..16` and scientific
/// with a signed, two-digit exponent otherwise. Integral values keep a trailing `.0`.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..16).contains(&exponent) {
        let positional = value.to_string();
        if positional.contains('.') {
            positional
        } else {
            format!("{positional}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Integer(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

/// Argument of a mark: either one value or a sequence of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkArg {
    // Tried first: a one-element list would otherwise deserialize as `OptionValue::Path`.
    Many(Vec<OptionValue>),
    Single(OptionValue),
}

impl MarkArg {
    /// Flatten into a list, a single value becoming a one-element list
    pub fn to_list(&self) -> Vec<OptionValue> {
        match self {
            MarkArg::Single(value) => vec![value.clone()],
            MarkArg::Many(values) => values.clone(),
        }
    }
}

impl From<OptionValue> for MarkArg {
    fn from(value: OptionValue) -> Self {
        MarkArg::Single(value)
    }
}

impl From<&str> for MarkArg {
    fn from(value: &str) -> Self {
        MarkArg::Single(value.into())
    }
}

impl From<String> for MarkArg {
    fn from(value: String) -> Self {
        MarkArg::Single(value.into())
    }
}

impl From<i64> for MarkArg {
    fn from(value: i64) -> Self {
        MarkArg::Single(value.into())
    }
}

impl From<Vec<OptionValue>> for MarkArg {
    fn from(values: Vec<OptionValue>) -> Self {
        MarkArg::Many(values)
    }
}

impl From<Vec<&str>> for MarkArg {
    fn from(values: Vec<&str>) -> Self {
        MarkArg::Many(values.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for MarkArg {
    fn from(values: Vec<String>) -> Self {
        MarkArg::Many(values.into_iter().map(Into::into).collect())
    }
}

/// A named annotation attached to a task definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<MarkArg>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub kwargs: BTreeMap<String, MarkArg>,
}

impl Mark {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            kwargs: BTreeMap::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<MarkArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<MarkArg>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }
}

//! Runtime values supplied by collaborators.

use std::fmt;

use serde::Serialize;

use crate::types::ParameterKind;

/// A runtime value for one parameter.
///
/// Truthiness drives the suppression rule: `false`, `0`, `0.0` and the empty
/// string are falsy; everything else is truthy. Note that the text `"0"` is
/// truthy.
///
/// # Examples
///
/// ```
/// use command_args_core::ArgValue;
///
/// assert!(ArgValue::from("main.cpp").is_truthy());
/// assert!(!ArgValue::from("").is_truthy());
/// assert!(!ArgValue::Int(0).is_truthy());
/// assert!(ArgValue::from("0").is_truthy());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ArgValue {
    /// Returns `true` unless the value is `false`, zero, or empty text.
    pub fn is_truthy(&self) -> bool {
        match self {
            ArgValue::Bool(b) => *b,
            ArgValue::Int(i) => *i != 0,
            ArgValue::Float(f) => *f != 0.0,
            ArgValue::Text(s) => !s.is_empty(),
        }
    }

    /// Converts to a numeric value (`Int` or `Float`).
    ///
    /// Text is parsed after trimming whitespace, as an integer first and a
    /// float second. Booleans count as `0`/`1`. Non-finite floats are
    /// rejected.
    pub fn to_number(&self) -> Option<ArgValue> {
        match self {
            ArgValue::Bool(b) => Some(ArgValue::Int(i64::from(*b))),
            ArgValue::Int(i) => Some(ArgValue::Int(*i)),
            ArgValue::Float(f) if f.is_finite() => Some(ArgValue::Float(*f)),
            ArgValue::Float(_) => None,
            ArgValue::Text(s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i64>() {
                    return Some(ArgValue::Int(i));
                }
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(ArgValue::Float)
            }
        }
    }

    /// Integer view, truncating floats toward zero.
    pub fn as_i64(&self) -> Option<i64> {
        match self.to_number()? {
            ArgValue::Int(i) => Some(i),
            ArgValue::Float(f) => Some(f.trunc() as i64),
            _ => None,
        }
    }

    /// Floating-point view.
    pub fn as_f64(&self) -> Option<f64> {
        match self.to_number()? {
            ArgValue::Int(i) => Some(i as f64),
            ArgValue::Float(f) => Some(f),
            _ => None,
        }
    }

    /// Parses user-entered text into the value appropriate for `kind`.
    ///
    /// `bool` and `str` accept `y`, `yes`, `true`, `1` and `on` (case
    /// insensitive) as true and anything else as false. `num` parses a number
    /// and returns `None` for anything else except blank input, which becomes
    /// an empty (falsy) text value. Other kinds keep the text as is.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_args_core::{ArgValue, ParameterKind};
    ///
    /// assert_eq!(ArgValue::parse_for(ParameterKind::Bool, "Y"), Some(ArgValue::Bool(true)));
    /// assert_eq!(ArgValue::parse_for(ParameterKind::Num, "8"), Some(ArgValue::Int(8)));
    /// assert_eq!(ArgValue::parse_for(ParameterKind::Num, "eight"), None);
    /// assert_eq!(
    ///     ArgValue::parse_for(ParameterKind::FmtStr, "main.cpp"),
    ///     Some(ArgValue::Text("main.cpp".into()))
    /// );
    /// ```
    pub fn parse_for(kind: ParameterKind, text: &str) -> Option<ArgValue> {
        match kind {
            ParameterKind::Bool | ParameterKind::Str => Some(ArgValue::Bool(matches!(
                text.trim().to_ascii_lowercase().as_str(),
                "y" | "yes" | "true" | "1" | "on"
            ))),
            ParameterKind::Num if text.trim().is_empty() => Some(ArgValue::Text(String::new())),
            ParameterKind::Num => ArgValue::Text(text.to_string()).to_number(),
            _ => Some(ArgValue::Text(text.to_string())),
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(b) => write!(f, "{b}"),
            ArgValue::Int(i) => write!(f, "{i}"),
            // Whole floats keep one decimal so `3.0` does not read as an integer.
            ArgValue::Float(x) if x.fract() == 0.0 && x.abs() < 1e16 => write!(f, "{x:.1}"),
            ArgValue::Float(x) => write!(f, "{x}"),
            ArgValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        ArgValue::Int(i64::from(value))
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Float(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Text(value)
    }
}

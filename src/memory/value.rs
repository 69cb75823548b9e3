//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents all possible runtime values
//! of the script interpreter. Values follow the dynamic typing rules of the scripts
//! being visualised: numbers are IEEE doubles, arrays are references into the
//! [`Heap`](super::heap::Heap), and the instrumented wrapper array is the distinct
//! [`Value::Observed`] variant so every index access on it can be intercepted.

use std::fmt;

/// Handle of a script array stored in the heap
pub type ArrayRef = u64;

/// Runtime values in the interpreter
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Str(String),
    Array(ArrayRef),
    Observed, // The wrapper standing in for the visualised array
    Function(String),
    Null,
    #[default]
    Undefined,
}

impl Value {
    /// Truthiness used by conditions and logical operators
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
            Value::Array(_) | Value::Observed | Value::Function(_) => true,
            Value::Null | Value::Undefined => false,
        }
    }

    /// Get the number, returns None if not a Number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric coercion applied by arithmetic and relational operators
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Null => 0.0,
            Value::Str(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            Value::Array(_) | Value::Observed | Value::Function(_) | Value::Undefined => f64::NAN,
        }
    }

    /// Interpret the value as an array index (non-negative integer)
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 && n.is_finite() => Some(*n as usize),
            _ => None,
        }
    }

    /// Name of the value's type for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Array(_) | Value::Observed => "array",
            Value::Function(_) => "function",
            Value::Null => "null",
            Value::Undefined => "undefined",
        }
    }
}

/// Displays primitives; arrays need the heap and are rendered by the interpreter
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => f.write_str(s),
            Value::Array(r) => write!(f, "[array #{}]", r),
            Value::Observed => f.write_str("[array]"),
            Value::Function(name) => write!(f, "function {}()", name),
            Value::Null => f.write_str("null"),
            Value::Undefined => f.write_str("undefined"),
        }
    }
}

/// Format a number the way the playground prints it: integral values
/// without a fractional part, everything else in shortest round-trip form.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Render a numeric sequence as a compact JSON-style list, e.g. `[9,7,5]`
pub fn format_sequence(values: &[f64]) -> String {
    let items: Vec<String> = values.iter().map(|v| format_number(*v)).collect();
    format!("[{}]", items.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-1.0), "-1");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_sequence(&[9.0, 7.0, 0.5]), "[9,7,0.5]");
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Number(1.0).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(Value::Array(0).is_truthy());
        assert!(!Value::Undefined.is_truthy());
    }

    #[test]
    fn test_index_conversion() {
        assert_eq!(Value::Number(2.0).as_index(), Some(2));
        assert_eq!(Value::Number(-1.0).as_index(), None);
        assert_eq!(Value::Number(1.5).as_index(), None);
        assert_eq!(Value::Str("1".to_string()).as_index(), None);
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::Bool(true).to_number(), 1.0);
        assert_eq!(Value::Str(" 42 ".to_string()).to_number(), 42.0);
        assert!(Value::Undefined.to_number().is_nan());
        assert_eq!(Value::Null.to_number(), 0.0);
    }
}

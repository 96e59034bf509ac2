//! Expression operand values and their coercions.

use std::fmt;

use crate::interp::error::EvalError;

/// Operand of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit signed integer.
    Int(i64),
    /// Double-precision float.
    Double(f64),
    /// Any other string.
    Str(String),
}

impl Value {
    /// Interprets command or variable output, preferring numbers.
    ///
    /// - decimal or `0x` integers -> `Int`
    /// - anything `f64` accepts that looks numeric -> `Double`
    /// - otherwise the string unchanged
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if let Some(value) = parse_int(trimmed) {
            return Self::Int(value);
        }
        if looks_numeric(trimmed) {
            if let Ok(value) = trimmed.parse::<f64>() {
                return Self::Double(value);
            }
        }
        Self::Str(text.to_string())
    }

    /// Returns `true` for `Int` and `Double`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Double(_))
    }

    /// Coerces to `f64` for mixed arithmetic.
    pub fn as_double(&self, op: &str) -> Result<f64, EvalError> {
        match self {
            Self::Int(value) => Ok(*value as f64),
            Self::Double(value) => Ok(*value),
            Self::Str(text) => Err(EvalError::non_numeric(text, op)),
        }
    }

    /// Coerces to `i64` for integer-only operators.
    pub fn as_int(&self, op: &str) -> Result<i64, EvalError> {
        match self {
            Self::Int(value) => Ok(*value),
            Self::Double(_) => Err(EvalError::Expression(format!(
                "can't use floating-point value \"{self}\" as operand of \"{op}\""
            ))),
            Self::Str(text) => Err(EvalError::non_numeric(text, op)),
        }
    }

    /// Truthiness for `!`, `&&`, `||` and `?:`.
    pub fn as_bool(&self) -> Result<bool, EvalError> {
        match self {
            Self::Int(value) => Ok(*value != 0),
            Self::Double(value) => Ok(*value != 0.0),
            Self::Str(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" => Ok(true),
                "false" | "no" | "off" => Ok(false),
                _ => Err(EvalError::Expression(format!(
                    "expected boolean value but got \"{text}\""
                ))),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Int(i64::from(value))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Double(value) if value.is_finite() && value.fract() == 0.0 => {
                write!(f, "{value:.1}")
            }
            Self::Double(value) => write!(f, "{value}"),
            Self::Str(text) => f.write_str(text),
        }
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None if !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit()) => {
            digits.parse::<i64>().ok()?
        }
        None => return None,
    };
    Some(if negative { -magnitude } else { magnitude })
}

fn looks_numeric(text: &str) -> bool {
    text.bytes().any(|byte| byte.is_ascii_digit())
        && text
            .bytes()
            .all(|byte| byte.is_ascii_digit() || matches!(byte, b'.' | b'e' | b'E' | b'+' | b'-'))
}

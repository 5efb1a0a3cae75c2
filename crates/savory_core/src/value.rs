//! Plain resource values and declared-type coercion.
//!
//! # Responsibility
//! - Define the declared type of a mapped field (`ValueKind`).
//! - Coerce loosely typed input (request params, stored attributes) into
//!   the declared type.
//!
//! # Invariants
//! - `Value::Null` passes through every kind unchanged.
//! - Coercion never panics; unsupported conversions return `ConversionError`.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Declared type of a field or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Str,
    Int,
    Float,
    Bool,
    /// No coercion; the value is used as-is.
    Any,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Any => "any",
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value could not be converted to the requested kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionError {
    pub value: Value,
    pub expected: ValueKind,
}

impl Display for ConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot convert `{}` to {}", self.value, self.expected)
    }
}

impl Error for ConversionError {}

/// Coerces `value` into `kind`.
///
/// See module docs for the null passthrough rule.
pub fn coerce(value: Value, kind: ValueKind) -> Result<Value, ConversionError> {
    if value.is_null() {
        return Ok(value);
    }

    let converted = match kind {
        ValueKind::Any => Some(value.clone()),
        ValueKind::Str => to_str(&value).map(Value::String),
        ValueKind::Int => to_int(&value).map(Value::from),
        ValueKind::Float => to_float(&value).and_then(Number::from_f64).map(Value::Number),
        ValueKind::Bool => to_bool(&value).map(Value::Bool),
    };

    converted.ok_or(ConversionError {
        value,
        expected: kind,
    })
}

fn to_str(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Some(int);
            }
            // Unsigned above i64::MAX.
            if number.as_u64().is_some() {
                return None;
            }
            let float = number.as_f64()?;
            // `i64::MAX as f64` rounds up to 2^63, which is out of range.
            if float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 {
                Some(float as i64)
            } else {
                None
            }
        }
        Value::String(text) => text.trim().parse::<i64>().ok(),
        Value::Bool(flag) => Some(i64::from(*flag)),
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_f64().map(|float| float != 0.0),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Typed extraction from a plain value.
pub trait FromValue: Sized {
    const KIND: ValueKind;

    fn from_value(value: &Value) -> Result<Self, ConversionError>;
}

impl FromValue for Value {
    const KIND: ValueKind = ValueKind::Any;

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl FromValue for String {
    const KIND: ValueKind = ValueKind::Str;

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        to_str(value).ok_or_else(|| conversion_error(value, Self::KIND))
    }
}

impl FromValue for i64 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        to_int(value).ok_or_else(|| conversion_error(value, Self::KIND))
    }
}

impl FromValue for u32 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        to_int(value)
            .and_then(|int| u32::try_from(int).ok())
            .ok_or_else(|| conversion_error(value, Self::KIND))
    }
}

impl FromValue for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        to_float(value).ok_or_else(|| conversion_error(value, Self::KIND))
    }
}

impl FromValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        to_bool(value).ok_or_else(|| conversion_error(value, Self::KIND))
    }
}

fn conversion_error(value: &Value, expected: ValueKind) -> ConversionError {
    ConversionError {
        value: value.clone(),
        expected,
    }
}

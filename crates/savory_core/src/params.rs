//! Request parameter normalization.
//!
//! # Responsibility
//! - Present query strings, decoded maps and "no parameters" through one
//!   multi-valued access pattern.
//! - Coerce parameter values to the type a resource asks for.
//!
//! # Invariants
//! - Defaults apply exactly when a key is absent; present values are
//!   coerced, never replaced by the default.
//! - A key given with an empty list is still present; its value reads as
//!   the empty list.

use crate::value::{ConversionError, FromValue};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ParamResult<T> = Result<T, ParamError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    Conversion { key: String, source: ConversionError },
}

impl Display for ParamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conversion { key, source } => write!(f, "parameter `{key}`: {source}"),
        }
    }
}

impl Error for ParamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Conversion { source, .. } => Some(source),
        }
    }
}

/// Multi-valued request parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: BTreeMap<String, Vec<Value>>,
}

impl Params {
    /// Parameters with no keys; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds params from a decoded map. Arrays become the value list;
    /// any other value becomes a one-element list.
    pub fn from_map(map: Map<String, Value>) -> Self {
        let values = map
            .into_iter()
            .map(|(key, value)| {
                let list = match value {
                    Value::Array(items) => items,
                    other => vec![other],
                };
                (key, list)
            })
            .collect();
        Self { values }
    }

    /// Builds params from repeated `(key, value)` pairs, keeping order per key.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut values: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        for (key, value) in pairs {
            values.entry(key.into()).or_default().push(value.into());
        }
        Self { values }
    }

    /// Parses an `application/x-www-form-urlencoded` query string.
    /// All values are strings.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(
            form_urlencoded::parse(query.as_bytes())
                .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned()))),
        )
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).and_then(|list| list.first())
    }

    /// First value for `key`, or `default` when the key is absent.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.present(key).unwrap_or_else(|| default.into())
    }

    /// First value for `key` coerced to `T`, or `default` when absent.
    ///
    /// # Errors
    /// - `ParamError::Conversion` when the present value cannot become `T`.
    pub fn get_as<T: FromValue>(&self, key: &str, default: T) -> ParamResult<T> {
        match self.present(key) {
            Some(value) => convert(key, &value),
            None => Ok(default),
        }
    }

    /// Every value for `key`; empty when absent.
    pub fn get_list(&self, key: &str) -> Vec<Value> {
        self.values.get(key).cloned().unwrap_or_default()
    }

    /// Every value for `key` coerced to `T`; empty when absent.
    pub fn get_list_of<T: FromValue>(&self, key: &str) -> ParamResult<Vec<T>> {
        self.values
            .get(key)
            .map(|list| list.iter().map(|value| convert(key, value)).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    /// Single value of a present key: its first value, or the empty list.
    fn present(&self, key: &str) -> Option<Value> {
        self.values.get(key).map(|list| match list.first() {
            Some(value) => value.clone(),
            None => Value::Array(Vec::new()),
        })
    }
}

fn convert<T: FromValue>(key: &str, value: &Value) -> ParamResult<T> {
    T::from_value(value).map_err(|source| ParamError::Conversion {
        key: key.to_string(),
        source,
    })
}

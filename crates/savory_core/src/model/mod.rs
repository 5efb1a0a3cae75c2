//! Model contract consumed by the resource layer.
//!
//! # Responsibility
//! - Describe the host ORM object surface the resource layer relies on:
//!   attribute reads/writes, eagerly loaded related objects and a primary key.
//! - Provide `Record`, a dynamic model usable with any store.
//!
//! # Invariants
//! - Attribute access never panics; missing attributes are `None` or errors.
//! - Related objects are only visible when the store loaded them.

use serde_json::Value;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub mod path;
pub mod record;

pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by model attribute access.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    UnknownAttribute(String),
    /// Relation is not declared or was not loaded.
    MissingRelation(String),
    InvalidPath(String),
    InvalidValue { attribute: String, message: String },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownAttribute(name) => write!(f, "unknown attribute `{name}`"),
            Self::MissingRelation(name) => write!(f, "related object `{name}` is not loaded"),
            Self::InvalidPath(path) => write!(f, "invalid attribute path `{path}`"),
            Self::InvalidValue { attribute, message } => {
                write!(f, "invalid value for `{attribute}`: {message}")
            }
        }
    }
}

impl Error for ModelError {}

/// Attribute-level access to one model object.
///
/// Object safe so fields can walk related objects of a different type.
pub trait Attributes: Debug {
    fn attr(&self, name: &str) -> Option<Value>;
    fn set_attr(&mut self, name: &str, value: Value) -> ModelResult<()>;
    fn related(&self, name: &str) -> Option<&dyn Attributes>;
    fn related_mut(&mut self, name: &str) -> Option<&mut dyn Attributes>;
}

/// A persistable model type.
pub trait Model: Attributes + Clone + Default + 'static {
    /// `None` until the first save.
    fn pk(&self) -> Option<i64>;
    fn set_pk(&mut self, pk: i64);
}

//! Dynamic record model.
//!
//! # Responsibility
//! - Hold an attribute map plus eagerly loaded related records.
//! - Serve as the model type of stores that do not map structs.
//!
//! # Invariants
//! - `pk` is `None` until a store assigns it.
//! - `related` only contains relations a store loaded.

use super::{Attributes, Model, ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Attribute name reserved for the primary key.
pub const PK_ATTRIBUTE: &str = "pk";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub pk: Option<i64>,
    pub attrs: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub related: BTreeMap<String, Record>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an unsaved record from attribute pairs.
    pub fn from_attrs<I, K>(attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            pk: None,
            attrs: attrs.into_iter().map(|(key, value)| (key.into(), value)).collect(),
            related: BTreeMap::new(),
        }
    }

    pub fn with_pk(mut self, pk: i64) -> Self {
        self.pk = Some(pk);
        self
    }

    pub fn with_related(mut self, name: impl Into<String>, record: Record) -> Self {
        self.related.insert(name.into(), record);
        self
    }
}

impl Attributes for Record {
    fn attr(&self, name: &str) -> Option<Value> {
        if name == PK_ATTRIBUTE {
            return self.pk.map(Value::from);
        }
        self.attrs.get(name).cloned()
    }

    fn set_attr(&mut self, name: &str, value: Value) -> ModelResult<()> {
        if name == PK_ATTRIBUTE {
            self.pk = match value {
                Value::Null => None,
                other => Some(other.as_i64().ok_or_else(|| ModelError::InvalidValue {
                    attribute: PK_ATTRIBUTE.to_string(),
                    message: format!("expected integer, got `{other}`"),
                })?),
            };
            return Ok(());
        }
        self.attrs.insert(name.to_string(), value);
        Ok(())
    }

    fn related(&self, name: &str) -> Option<&dyn Attributes> {
        self.related.get(name).map(|record| record as &dyn Attributes)
    }

    fn related_mut(&mut self, name: &str) -> Option<&mut dyn Attributes> {
        self.related
            .get_mut(name)
            .map(|record| record as &mut dyn Attributes)
    }
}

impl Model for Record {
    fn pk(&self) -> Option<i64> {
        self.pk
    }

    fn set_pk(&mut self, pk: i64) {
        self.pk = Some(pk);
    }
}

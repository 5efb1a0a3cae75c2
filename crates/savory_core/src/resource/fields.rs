//! Declarative field mappings between plain maps and model attributes.
//!
//! # Responsibility
//! - Read declared attributes into resource maps (`to_api`).
//! - Write resource maps back into model attributes (`from_api`).
//! - Report the relations a field traverses so queries can eager-load them.
//!
//! # Invariants
//! - Values are coerced to the declared `ValueKind` in both directions.
//! - A relation that is not loaded reads as `null`.

use crate::model::path::AttrPath;
use crate::model::{Attributes, ModelError, ModelResult};
use crate::store::QuerySet;
use crate::value::{coerce, ConversionError, ValueKind};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub type FieldResult<T> = Result<T, FieldError>;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// Incoming map lacks the field's key.
    MissingKey(String),
    Conversion {
        field: String,
        source: ConversionError,
    },
    Model(ModelError),
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingKey(key) => write!(f, "missing key `{key}`"),
            Self::Conversion { field, source } => write!(f, "field `{field}`: {source}"),
            Self::Model(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FieldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingKey(_) => None,
            Self::Conversion { source, .. } => Some(source),
            Self::Model(err) => Some(err),
        }
    }
}

impl From<ModelError> for FieldError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

/// Mapping between one resource key and model state.
pub trait Field: Debug {
    /// Key used in plain maps.
    fn json_name(&self) -> &str;

    fn to_api(&self, model: &dyn Attributes, out: &mut Map<String, Value>) -> FieldResult<()>;

    fn from_api(&self, data: &Map<String, Value>, model: &mut dyn Attributes) -> FieldResult<()>;

    /// Relation paths this field reads through.
    fn relations(&self) -> Vec<String> {
        Vec::new()
    }

    /// Adds eager-loading hints for `relations()`.
    fn prepare(&self, query: QuerySet) -> QuerySet {
        query.select_related_all(self.relations())
    }
}

/// Field backed by one attribute of the model itself.
#[derive(Debug, Clone)]
pub struct PropertyField {
    path: AttrPath,
    json_name: String,
    kind: ValueKind,
}

impl PropertyField {
    /// `property` must be a single attribute name; use `FkPropertyField` for
    /// related objects.
    pub fn new(property: &str, kind: ValueKind) -> FieldResult<Self> {
        let path = AttrPath::parse(property)?;
        if path.relation().is_some() {
            return Err(ModelError::InvalidPath(property.to_string()).into());
        }
        Ok(Self {
            json_name: path.camel_case(),
            path,
            kind,
        })
    }

    pub fn with_json_name(mut self, json_name: impl Into<String>) -> Self {
        self.json_name = json_name.into();
        self
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }
}

impl Field for PropertyField {
    fn json_name(&self) -> &str {
        &self.json_name
    }

    fn to_api(&self, model: &dyn Attributes, out: &mut Map<String, Value>) -> FieldResult<()> {
        read_path(&self.path, self.kind, &self.json_name, model, out)
    }

    fn from_api(&self, data: &Map<String, Value>, model: &mut dyn Attributes) -> FieldResult<()> {
        write_path(&self.path, self.kind, &self.json_name, data, model)
    }
}

/// Field backed by an attribute of a related (foreign-key) object, e.g.
/// `group.name`.
#[derive(Debug, Clone)]
pub struct FkPropertyField {
    path: AttrPath,
    json_name: String,
    kind: ValueKind,
}

impl FkPropertyField {
    pub fn new(property: &str, kind: ValueKind) -> FieldResult<Self> {
        let path = AttrPath::parse(property)?;
        if path.relation().is_none() {
            return Err(ModelError::InvalidPath(property.to_string()).into());
        }
        Ok(Self {
            json_name: path.camel_case(),
            path,
            kind,
        })
    }

    pub fn with_json_name(mut self, json_name: impl Into<String>) -> Self {
        self.json_name = json_name.into();
        self
    }
}

impl Field for FkPropertyField {
    fn json_name(&self) -> &str {
        &self.json_name
    }

    fn to_api(&self, model: &dyn Attributes, out: &mut Map<String, Value>) -> FieldResult<()> {
        read_path(&self.path, self.kind, &self.json_name, model, out)
    }

    fn from_api(&self, data: &Map<String, Value>, model: &mut dyn Attributes) -> FieldResult<()> {
        write_path(&self.path, self.kind, &self.json_name, data, model)
    }

    fn relations(&self) -> Vec<String> {
        self.path.relation().into_iter().collect()
    }
}

type Getter = Box<dyn Fn(&dyn Attributes) -> Value>;
type Setter = Box<dyn Fn(&mut dyn Attributes, Value) -> ModelResult<()>>;

/// Field mapped through explicit accessor closures.
///
/// Read-only unless a setter is attached; read-only fields ignore incoming
/// data.
pub struct AccessorField {
    json_name: String,
    getter: Getter,
    setter: Option<Setter>,
    relations: Vec<String>,
}

impl AccessorField {
    pub fn new<G>(json_name: impl Into<String>, getter: G) -> Self
    where
        G: Fn(&dyn Attributes) -> Value + 'static,
    {
        Self {
            json_name: json_name.into(),
            getter: Box::new(getter),
            setter: None,
            relations: Vec::new(),
        }
    }

    pub fn with_setter<S>(mut self, setter: S) -> Self
    where
        S: Fn(&mut dyn Attributes, Value) -> ModelResult<()> + 'static,
    {
        self.setter = Some(Box::new(setter));
        self
    }

    /// Declares relations the getter reads through.
    pub fn with_relations<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations = relations.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.setter.is_none()
    }
}

impl Debug for AccessorField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessorField")
            .field("json_name", &self.json_name)
            .field("read_only", &self.is_read_only())
            .field("relations", &self.relations)
            .finish()
    }
}

impl Field for AccessorField {
    fn json_name(&self) -> &str {
        &self.json_name
    }

    fn to_api(&self, model: &dyn Attributes, out: &mut Map<String, Value>) -> FieldResult<()> {
        out.insert(self.json_name.clone(), (self.getter)(model));
        Ok(())
    }

    fn from_api(&self, data: &Map<String, Value>, model: &mut dyn Attributes) -> FieldResult<()> {
        let Some(setter) = &self.setter else {
            return Ok(());
        };
        let value = data
            .get(&self.json_name)
            .cloned()
            .ok_or_else(|| FieldError::MissingKey(self.json_name.clone()))?;
        setter(model, value)?;
        Ok(())
    }

    fn relations(&self) -> Vec<String> {
        self.relations.clone()
    }
}

fn read_path(
    path: &AttrPath,
    kind: ValueKind,
    json_name: &str,
    model: &dyn Attributes,
    out: &mut Map<String, Value>,
) -> FieldResult<()> {
    let raw = path.read(model).unwrap_or(Value::Null);
    let value = coerce(raw, kind).map_err(|source| FieldError::Conversion {
        field: json_name.to_string(),
        source,
    })?;
    out.insert(json_name.to_string(), value);
    Ok(())
}

fn write_path(
    path: &AttrPath,
    kind: ValueKind,
    json_name: &str,
    data: &Map<String, Value>,
    model: &mut dyn Attributes,
) -> FieldResult<()> {
    let raw = data
        .get(json_name)
        .cloned()
        .ok_or_else(|| FieldError::MissingKey(json_name.to_string()))?;
    let value = coerce(raw, kind).map_err(|source| FieldError::Conversion {
        field: json_name.to_string(),
        source,
    })?;
    path.write(model, value)?;
    Ok(())
}

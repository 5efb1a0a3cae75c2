//! Dictionary-like resources over models and query sets.
//!
//! # Responsibility
//! - Define the per-resource contract (`get`/`put`/`post`/`delete`/child
//!   lookup) callers dispatch into.
//! - Map declared fields between plain maps and model attributes.
//!
//! # Invariants
//! - Unsupported methods fail with `MethodNotAllowed`, never panic.
//! - Model and store errors are wrapped unchanged.
//! - A child lookup that matches nothing is `Ok(None)`, not an error.

use crate::context::ApiContext;
use crate::model::ModelError;
use crate::params::{ParamError, Params};
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod basic;
pub mod fields;
pub mod model_resource;
pub mod queryset_resource;

pub use basic::BasicResource;
pub use fields::{AccessorField, Field, FieldError, FieldResult, FkPropertyField, PropertyField};
pub use model_resource::{ModelResource, ResourceSchema};
pub use queryset_resource::QuerySetResource;

pub type ResourceResult<T> = Result<T, ResourceError>;

/// Boxed resource borrowing a store for `'s`.
pub type BoxedResource<'s> = Box<dyn Resource<'s> + 's>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum ResourceError {
    MethodNotAllowed(Method),
    MissingAttribute(String),
    InvalidPath(String),
    Field(FieldError),
    Model(ModelError),
    Store(StoreError),
    Param(ParamError),
}

impl Display for ResourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MethodNotAllowed(method) => write!(f, "method {method} not allowed"),
            Self::MissingAttribute(name) => write!(f, "resource has no attribute `{name}`"),
            Self::InvalidPath(path) => write!(f, "invalid resource path `{path}`"),
            Self::Field(err) => write!(f, "{err}"),
            Self::Model(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Param(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ResourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MethodNotAllowed(_) | Self::MissingAttribute(_) | Self::InvalidPath(_) => None,
            Self::Field(err) => Some(err),
            Self::Model(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Param(err) => Some(err),
        }
    }
}

impl From<FieldError> for ResourceError {
    fn from(value: FieldError) -> Self {
        Self::Field(value)
    }
}

impl From<ModelError> for ResourceError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

impl From<StoreError> for ResourceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ParamError> for ResourceError {
    fn from(value: ParamError) -> Self {
        Self::Param(value)
    }
}

/// Per-resource contract.
///
/// `'s` is the lifetime of the store a resource borrows; children returned
/// by `get_child_resource` and `post` outlive the parent borrow.
pub trait Resource<'s> {
    /// Path relative to the API base URI, without leading slash.
    fn resource_path(&self) -> String;

    fn allowed_methods(&self) -> BTreeSet<Method>;

    fn get(&self, _ctx: &ApiContext, _params: &Params) -> ResourceResult<Map<String, Value>> {
        Err(ResourceError::MethodNotAllowed(Method::Get))
    }

    fn put(&mut self, _ctx: &ApiContext, _data: &Map<String, Value>) -> ResourceResult<()> {
        Err(ResourceError::MethodNotAllowed(Method::Put))
    }

    fn post(
        &self,
        _ctx: &ApiContext,
        _data: &Map<String, Value>,
    ) -> ResourceResult<BoxedResource<'s>> {
        Err(ResourceError::MethodNotAllowed(Method::Post))
    }

    fn delete(&mut self, _ctx: &ApiContext) -> ResourceResult<()> {
        Err(ResourceError::MethodNotAllowed(Method::Delete))
    }

    fn get_child_resource(
        &self,
        _ctx: &ApiContext,
        _key: &str,
    ) -> ResourceResult<Option<BoxedResource<'s>>> {
        Ok(None)
    }
}

/// Fails with `MethodNotAllowed` unless `resource` declares `method`.
pub fn ensure_allowed<'s>(resource: &dyn Resource<'s>, method: Method) -> ResourceResult<()> {
    if resource.allowed_methods().contains(&method) {
        Ok(())
    } else {
        Err(ResourceError::MethodNotAllowed(method))
    }
}

//! Resource over a single model instance.
//!
//! # Responsibility
//! - Declare resource schemas (model type, path, field list).
//! - Translate `get`/`put`/`delete` into field reads/writes plus store
//!   `save`/`delete` calls.
//!
//! # Invariants
//! - `put` applies every field before saving; a field error leaves both
//!   the wrapped model and the store untouched.
//! - `prepare` hints are the union of every field's relations.

use super::fields::{Field, FieldResult};
use super::{Method, Resource, ResourceResult};
use crate::context::ApiContext;
use crate::model::Model;
use crate::params::Params;
use crate::store::{ModelStore, QuerySet};
use log::{debug, info};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

/// Declarative description of a model-backed resource.
pub trait ResourceSchema: 'static {
    type Model: Model;

    /// Collection path, e.g. `users`.
    const RESOURCE_PATH: &'static str;

    fn fields() -> FieldResult<Vec<Box<dyn Field>>>;

    /// Adds the eager-loading hints every field needs.
    fn prepare(query: QuerySet) -> FieldResult<QuerySet> {
        Ok(Self::fields()?
            .iter()
            .fold(query, |query, field| field.prepare(query)))
    }
}

/// Resource wrapping one model and the store it persists through.
pub struct ModelResource<'s, R: ResourceSchema> {
    model: R::Model,
    store: &'s dyn ModelStore<R::Model>,
    _schema: PhantomData<R>,
}

impl<'s, R: ResourceSchema> ModelResource<'s, R> {
    pub fn new(model: R::Model, store: &'s dyn ModelStore<R::Model>) -> Self {
        Self {
            model,
            store,
            _schema: PhantomData,
        }
    }

    pub fn model(&self) -> &R::Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut R::Model {
        &mut self.model
    }

    pub fn into_model(self) -> R::Model {
        self.model
    }

    /// Reads every declared field into a plain map.
    pub fn to_map(&self) -> ResourceResult<Map<String, Value>> {
        let mut out = Map::new();
        for field in R::fields()? {
            field.to_api(&self.model, &mut out)?;
        }
        Ok(out)
    }

    /// Writes every declared field from `data` without saving.
    ///
    /// Fields are written to a copy that replaces the model only once all
    /// of them succeed.
    pub fn apply(&mut self, data: &Map<String, Value>) -> ResourceResult<()> {
        let mut staged = self.model.clone();
        for field in R::fields()? {
            field.from_api(data, &mut staged)?;
        }
        self.model = staged;
        Ok(())
    }
}

impl<R: ResourceSchema> Debug for ModelResource<'_, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelResource")
            .field("path", &self.resource_path())
            .field("model", &self.model)
            .finish()
    }
}

impl<'s, R: ResourceSchema> Resource<'s> for ModelResource<'s, R> {
    fn resource_path(&self) -> String {
        match self.model.pk() {
            Some(pk) => format!("{}/{pk}", R::RESOURCE_PATH),
            None => R::RESOURCE_PATH.to_string(),
        }
    }

    fn allowed_methods(&self) -> BTreeSet<Method> {
        BTreeSet::from([Method::Get, Method::Put, Method::Delete])
    }

    fn get(&self, _ctx: &ApiContext, _params: &Params) -> ResourceResult<Map<String, Value>> {
        let out = self.to_map()?;
        debug!(
            "event=resource_get module=resource status=ok path={} fields={}",
            self.resource_path(),
            out.len()
        );
        Ok(out)
    }

    fn put(&mut self, _ctx: &ApiContext, data: &Map<String, Value>) -> ResourceResult<()> {
        self.apply(data)?;
        self.store.save(&mut self.model)?;
        info!(
            "event=resource_put module=resource status=ok model={} path={}",
            self.store.model_name(),
            self.resource_path()
        );
        Ok(())
    }

    fn delete(&mut self, _ctx: &ApiContext) -> ResourceResult<()> {
        self.store.delete(&self.model)?;
        info!(
            "event=resource_delete module=resource status=ok model={} path={}",
            self.store.model_name(),
            self.resource_path()
        );
        Ok(())
    }
}

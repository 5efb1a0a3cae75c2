//! Collection resource over a query set.
//!
//! # Responsibility
//! - List every model in the set as `{"objects": [...]}`.
//! - Create new models from plain maps.
//! - Resolve child resources by primary key.
//!
//! # Invariants
//! - The query is prepared with the schema's eager-loading hints once, at
//!   construction.
//! - A key that is not an integer, or matches no model, resolves to `None`.

use super::model_resource::{ModelResource, ResourceSchema};
use super::{BoxedResource, Method, Resource, ResourceResult};
use crate::context::ApiContext;
use crate::params::Params;
use crate::store::{ModelStore, QuerySet};
use log::{debug, info};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::marker::PhantomData;

/// Key of the listed objects in `get` output.
pub const OBJECTS_KEY: &str = "objects";
pub const LIMIT_PARAM: &str = "limit";
pub const OFFSET_PARAM: &str = "offset";

pub struct QuerySetResource<'s, R: ResourceSchema> {
    query: QuerySet,
    store: &'s dyn ModelStore<R::Model>,
    _schema: PhantomData<R>,
}

impl<'s, R: ResourceSchema> QuerySetResource<'s, R> {
    /// Resource over every model in `store`.
    pub fn new(store: &'s dyn ModelStore<R::Model>) -> ResourceResult<Self> {
        Self::with_query(store, QuerySet::new())
    }

    /// Resource over `query`, prepared with the schema's hints.
    pub fn with_query(store: &'s dyn ModelStore<R::Model>, query: QuerySet) -> ResourceResult<Self> {
        Ok(Self {
            query: R::prepare(query)?,
            store,
            _schema: PhantomData,
        })
    }

    pub fn query(&self) -> &QuerySet {
        &self.query
    }

    /// Wraps every model in the set.
    pub fn children(&self) -> ResourceResult<Vec<ModelResource<'s, R>>> {
        Ok(self
            .store
            .fetch(&self.query)?
            .into_iter()
            .map(|model| ModelResource::new(model, self.store))
            .collect())
    }

    /// Typed child lookup by primary key.
    pub fn child(&self, pk: i64) -> ResourceResult<Option<ModelResource<'s, R>>> {
        Ok(self
            .store
            .get(&self.query, pk)?
            .map(|model| ModelResource::new(model, self.store)))
    }

    /// Creates and saves a new model from `data`.
    pub fn create(
        &self,
        ctx: &ApiContext,
        data: &Map<String, Value>,
    ) -> ResourceResult<ModelResource<'s, R>> {
        let mut resource = ModelResource::new(R::Model::default(), self.store);
        resource.put(ctx, data)?;
        info!(
            "event=resource_post module=resource status=ok model={} path={}",
            self.store.model_name(),
            resource.resource_path()
        );
        Ok(resource)
    }
}

impl<'s, R: ResourceSchema> Resource<'s> for QuerySetResource<'s, R> {
    fn resource_path(&self) -> String {
        R::RESOURCE_PATH.to_string()
    }

    fn allowed_methods(&self) -> BTreeSet<Method> {
        BTreeSet::from([Method::Get, Method::Post])
    }

    fn get(&self, _ctx: &ApiContext, params: &Params) -> ResourceResult<Map<String, Value>> {
        let mut query = self.query.clone();
        if params.contains(LIMIT_PARAM) {
            query = query.limit(params.get_as(LIMIT_PARAM, 0)?);
        }
        query = query.offset(params.get_as(OFFSET_PARAM, 0)?);

        let mut objects = Vec::new();
        for model in self.store.fetch(&query)? {
            let child: ModelResource<'s, R> = ModelResource::new(model, self.store);
            objects.push(Value::Object(child.to_map()?));
        }
        debug!(
            "event=resource_get module=resource status=ok path={} objects={}",
            R::RESOURCE_PATH,
            objects.len()
        );

        let mut out = Map::new();
        out.insert(OBJECTS_KEY.to_string(), Value::Array(objects));
        Ok(out)
    }

    fn post(&self, ctx: &ApiContext, data: &Map<String, Value>) -> ResourceResult<BoxedResource<'s>> {
        Ok(Box::new(self.create(ctx, data)?))
    }

    fn get_child_resource(
        &self,
        _ctx: &ApiContext,
        key: &str,
    ) -> ResourceResult<Option<BoxedResource<'s>>> {
        let Ok(pk) = key.trim().parse::<i64>() else {
            return Ok(None);
        };
        Ok(self
            .child(pk)?
            .map(|resource| Box::new(resource) as BoxedResource<'s>))
    }
}

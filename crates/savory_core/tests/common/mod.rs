#![allow(dead_code)]

use savory_core::{
    Attributes, Model, ModelError, ModelResult, ModelStore, QuerySet, StoreError, StoreResult,
};
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub pk: Option<i64>,
    pub name: Option<String>,
}

impl Group {
    pub fn named(name: &str) -> Self {
        Self {
            pk: None,
            name: Some(name.to_string()),
        }
    }
}

impl Attributes for Group {
    fn attr(&self, name: &str) -> Option<Value> {
        match name {
            "pk" => self.pk.map(Value::from),
            "name" => Some(self.name.clone().map_or(Value::Null, Value::String)),
            _ => None,
        }
    }

    fn set_attr(&mut self, name: &str, value: Value) -> ModelResult<()> {
        match name {
            "name" => {
                self.name = string_value(name, value)?;
                Ok(())
            }
            other => Err(ModelError::UnknownAttribute(other.to_string())),
        }
    }

    fn related(&self, _name: &str) -> Option<&dyn Attributes> {
        None
    }

    fn related_mut(&mut self, _name: &str) -> Option<&mut dyn Attributes> {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub pk: Option<i64>,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub group: Option<Group>,
    pub domain: Option<Group>,
}

impl User {
    pub fn new(name: &str, age: i64) -> Self {
        Self {
            name: Some(name.to_string()),
            age: Some(age),
            ..Self::default()
        }
    }

    pub fn with_pk(mut self, pk: i64) -> Self {
        self.pk = Some(pk);
        self
    }
}

impl Attributes for User {
    fn attr(&self, name: &str) -> Option<Value> {
        match name {
            "pk" => self.pk.map(Value::from),
            "name" => Some(self.name.clone().map_or(Value::Null, Value::String)),
            "age" => Some(self.age.map_or(Value::Null, Value::from)),
            _ => None,
        }
    }

    fn set_attr(&mut self, name: &str, value: Value) -> ModelResult<()> {
        match name {
            "name" => self.name = string_value(name, value)?,
            "age" => {
                self.age = match value {
                    Value::Null => None,
                    other => Some(other.as_i64().ok_or_else(|| ModelError::InvalidValue {
                        attribute: name.to_string(),
                        message: format!("expected integer, got `{other}`"),
                    })?),
                }
            }
            other => return Err(ModelError::UnknownAttribute(other.to_string())),
        }
        Ok(())
    }

    fn related(&self, name: &str) -> Option<&dyn Attributes> {
        match name {
            "group" => self.group.as_ref().map(|group| group as &dyn Attributes),
            "domain" => self.domain.as_ref().map(|domain| domain as &dyn Attributes),
            _ => None,
        }
    }

    fn related_mut(&mut self, name: &str) -> Option<&mut dyn Attributes> {
        match name {
            "group" => self.group.as_mut().map(|group| group as &mut dyn Attributes),
            "domain" => self.domain.as_mut().map(|domain| domain as &mut dyn Attributes),
            _ => None,
        }
    }
}

impl Model for User {
    fn pk(&self) -> Option<i64> {
        self.pk
    }

    fn set_pk(&mut self, pk: i64) {
        self.pk = Some(pk);
    }
}

fn string_value(name: &str, value: Value) -> ModelResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        other => Err(ModelError::InvalidValue {
            attribute: name.to_string(),
            message: format!("expected string, got `{other}`"),
        }),
    }
}

/// In-memory store that records how it was called.
#[derive(Debug, Default)]
pub struct MemoryStore<M: Model> {
    rows: RefCell<Vec<M>>,
    next_pk: Cell<i64>,
    saves: Cell<usize>,
    deletes: Cell<usize>,
    last_query: RefCell<Option<QuerySet>>,
}

impl<M: Model> MemoryStore<M> {
    pub fn with_rows(rows: Vec<M>) -> Self {
        let next_pk = rows.iter().filter_map(Model::pk).max().unwrap_or(0);
        Self {
            rows: RefCell::new(rows),
            next_pk: Cell::new(next_pk),
            ..Self::default()
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.get()
    }

    pub fn deletes(&self) -> usize {
        self.deletes.get()
    }

    pub fn rows(&self) -> Vec<M> {
        self.rows.borrow().clone()
    }

    pub fn last_query(&self) -> Option<QuerySet> {
        self.last_query.borrow().clone()
    }
}

impl<M: Model> ModelStore<M> for MemoryStore<M> {
    fn model_name(&self) -> &str {
        "memory"
    }

    fn fetch(&self, query: &QuerySet) -> StoreResult<Vec<M>> {
        *self.last_query.borrow_mut() = Some(query.clone());
        let rows = self.rows.borrow();
        let matching = rows
            .iter()
            .filter(|row| query.pk_filter().map_or(true, |pk| row.pk() == Some(pk)))
            .skip(query.offset_value() as usize)
            .take(query.limit_value().map_or(usize::MAX, |limit| limit as usize))
            .cloned()
            .collect();
        Ok(matching)
    }

    fn save(&self, model: &mut M) -> StoreResult<()> {
        self.saves.set(self.saves.get() + 1);
        let mut rows = self.rows.borrow_mut();
        match model.pk() {
            Some(pk) => match rows.iter_mut().find(|row| row.pk() == Some(pk)) {
                Some(row) => *row = model.clone(),
                None => rows.push(model.clone()),
            },
            None => {
                let pk = self.next_pk.get() + 1;
                self.next_pk.set(pk);
                model.set_pk(pk);
                rows.push(model.clone());
            }
        }
        Ok(())
    }

    fn delete(&self, model: &M) -> StoreResult<()> {
        self.deletes.set(self.deletes.get() + 1);
        let pk = model
            .pk()
            .ok_or_else(|| StoreError::Unsaved(self.model_name().to_string()))?;
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|row| row.pk() != Some(pk));
        if rows.len() == before {
            return Err(StoreError::NotFound {
                model: self.model_name().to_string(),
                pk,
            });
        }
        Ok(())
    }
}

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected JSON object, got {other}"),
    }
}

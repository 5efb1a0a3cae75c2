//! Persistence boundary: query descriptions and the store contract.
//!
//! # Responsibility
//! - Describe queries explicitly (`QuerySet`) so stores can consume
//!   eager-loading hints without dynamic query mutation.
//! - Define the `ModelStore` contract the resource layer saves, deletes and
//!   iterates through.
//!
//! # Invariants
//! - Store errors reach resource callers unchanged (wrapped, never
//!   translated).
//! - `fetch` orders results by primary key ascending.

use crate::db::DbError;
use crate::model::Model;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod query;
pub mod sqlite_store;

pub use query::QuerySet;
pub use sqlite_store::SqliteRecordStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound { model: String, pk: i64 },
    UnknownRelation { model: String, relation: String },
    /// Delete or lookup on a model that was never saved.
    Unsaved(String),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { model, pk } => write!(f, "{model} not found: {pk}"),
            Self::UnknownRelation { model, relation } => {
                write!(f, "{model} has no relation `{relation}`")
            }
            Self::Unsaved(model) => write!(f, "{model} has no primary key yet"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. }
            | Self::UnknownRelation { .. }
            | Self::Unsaved(_)
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Host persistence handle for one model type.
pub trait ModelStore<M: Model> {
    /// Model name used in logs and errors.
    fn model_name(&self) -> &str;

    /// Evaluates the query set.
    fn fetch(&self, query: &QuerySet) -> StoreResult<Vec<M>>;

    /// Primary-key lookup inside the query set.
    fn get(&self, query: &QuerySet, pk: i64) -> StoreResult<Option<M>> {
        let lookup = query.clone().unpaginated().with_pk(pk);
        Ok(self.fetch(&lookup)?.into_iter().next())
    }

    /// Inserts (assigning a primary key) or updates the model.
    fn save(&self, model: &mut M) -> StoreResult<()>;

    fn delete(&self, model: &M) -> StoreResult<()>;
}

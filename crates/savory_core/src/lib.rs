//! Dictionary-like REST resources over persisted models.
//!
//! Resources translate `get`/`put`/`post`/`delete` into attribute reads and
//! writes plus store `save`/`delete` calls, driven by declarative field
//! mappings. The host ORM is reached only through the `model` and `store`
//! contracts.

pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod params;
pub mod resource;
pub mod store;
pub mod value;

pub use context::ApiContext;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::path::AttrPath;
pub use model::record::Record;
pub use model::{Attributes, Model, ModelError, ModelResult};
pub use params::{ParamError, ParamResult, Params};
pub use resource::{
    ensure_allowed, AccessorField, BasicResource, BoxedResource, Field, FieldError, FieldResult,
    FkPropertyField, Method, ModelResource, PropertyField, QuerySetResource, Resource,
    ResourceError, ResourceResult, ResourceSchema,
};
pub use store::{ModelStore, QuerySet, SqliteRecordStore, StoreError, StoreResult};
pub use value::{coerce, ConversionError, FromValue, ValueKind};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

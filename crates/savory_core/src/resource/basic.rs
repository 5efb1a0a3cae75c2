//! Map-backed resource without a model.

use super::{Method, Resource, ResourceError, ResourceResult};
use crate::context::ApiContext;
use crate::params::Params;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Entry whose value becomes the resource key.
pub const ID_KEY: &str = "id";

/// Resource holding its state as a plain map under a fixed collection path.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicResource {
    path: String,
    data: Map<String, Value>,
}

impl BasicResource {
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_data(path, Map::new())
    }

    pub fn with_data(path: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    /// The `id` entry as a string; empty when absent or null.
    pub fn key(&self) -> String {
        match self.data.get(ID_KEY) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    pub fn field(&self, name: &str) -> ResourceResult<&Value> {
        self.data
            .get(name)
            .ok_or_else(|| ResourceError::MissingAttribute(name.to_string()))
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(name.into(), value.into());
    }

    pub fn remove_field(&mut self, name: &str) -> ResourceResult<Value> {
        self.data
            .remove(name)
            .ok_or_else(|| ResourceError::MissingAttribute(name.to_string()))
    }
}

impl Resource<'_> for BasicResource {
    fn resource_path(&self) -> String {
        let key = self.key();
        if key.is_empty() {
            self.path.clone()
        } else {
            format!("{}/{key}", self.path)
        }
    }

    fn allowed_methods(&self) -> BTreeSet<Method> {
        BTreeSet::from([Method::Get])
    }

    fn get(&self, _ctx: &ApiContext, _params: &Params) -> ResourceResult<Map<String, Value>> {
        Ok(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::BasicResource;
    use crate::context::ApiContext;
    use crate::params::Params;
    use crate::resource::{Method, Resource, ResourceError};
    use serde_json::{json, Map, Value};
    use std::collections::BTreeSet;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn empty_resource_uses_collection_path() {
        let ctx = ApiContext::new("http://localhost/api");
        let resource = BasicResource::new("test");

        assert_eq!(resource.key(), "");
        assert_eq!(resource.resource_path(), "test");
        assert_eq!(resource.allowed_methods(), BTreeSet::from([Method::Get]));
        assert!(resource.get_child_resource(&ctx, "x").unwrap().is_none());
    }

    #[test]
    fn data_is_returned_unchanged() {
        let ctx = ApiContext::new("http://localhost/api");
        let data = map(json!({
            "stringKey": "stringValue",
            "numberKey": 1,
            "arrayKey": ["value1", "value2", "value3"],
            "objectKey": {"key": "value"}
        }));
        let resource = BasicResource::with_data("test", data.clone());

        assert_eq!(resource.get(&ctx, &Params::empty()).unwrap(), data);
        assert_eq!(resource.key(), "");
        assert_eq!(resource.resource_path(), "test");
    }

    #[test]
    fn id_entry_becomes_key() {
        let resource = BasicResource::with_data("test", map(json!({"id": "12335"})));
        assert_eq!(resource.key(), "12335");
        assert_eq!(resource.resource_path(), "test/12335");

        let numeric = BasicResource::with_data("test", map(json!({"id": 7})));
        assert_eq!(numeric.resource_path(), "test/7");
    }

    #[test]
    fn fields_can_be_set_read_and_removed() {
        let mut resource = BasicResource::new("test");
        resource.set_field("field", "string");
        assert_eq!(resource.field("field").unwrap(), &json!("string"));

        assert_eq!(resource.remove_field("field").unwrap(), json!("string"));
        assert!(!resource.contains("field"));
    }

    #[test]
    fn missing_fields_are_errors() {
        let mut resource = BasicResource::new("test");
        assert!(matches!(
            resource.field("field"),
            Err(ResourceError::MissingAttribute(name)) if name == "field"
        ));
        assert!(matches!(
            resource.remove_field("path"),
            Err(ResourceError::MissingAttribute(name)) if name == "path"
        ));
    }
}

//! Per-request API context.
//!
//! # Responsibility
//! - Build absolute resource URIs from the configured base URI.
//! - Resolve slash-separated resource paths against a root resource.
//!
//! # Invariants
//! - `base_uri` always ends with `/`.

use crate::resource::{BoxedResource, Resource, ResourceError, ResourceResult};
use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiContext {
    base_uri: String,
}

impl ApiContext {
    pub fn new(base_uri: impl Into<String>) -> Self {
        let mut base_uri = base_uri.into();
        if !base_uri.ends_with('/') {
            base_uri.push('/');
        }
        Self { base_uri }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn build_resource_uri<'s>(&self, resource: &dyn Resource<'s>) -> String {
        format!(
            "{}{}",
            self.base_uri,
            resource.resource_path().trim_start_matches('/')
        )
    }

    /// Walks `path` segment by segment from `root` through
    /// `get_child_resource`.
    ///
    /// Returns `Ok(None)` as soon as a segment has no child.
    ///
    /// # Errors
    /// - `ResourceError::InvalidPath` for an empty path.
    /// - Any error raised by a child lookup.
    pub fn resolve_resource_path<'s>(
        &self,
        root: &dyn Resource<'s>,
        path: &str,
    ) -> ResourceResult<Option<BoxedResource<'s>>> {
        let mut segments = path
            .trim_matches('/')
            .split('/')
            .filter(|segment| !segment.is_empty());

        let Some(first) = segments.next() else {
            return Err(ResourceError::InvalidPath(path.to_string()));
        };
        let Some(mut current) = root.get_child_resource(self, first)? else {
            debug!("event=resolve_path module=context status=miss depth=1");
            return Ok(None);
        };

        for (index, segment) in segments.enumerate() {
            match current.get_child_resource(self, segment)? {
                Some(child) => current = child,
                None => {
                    debug!(
                        "event=resolve_path module=context status=miss depth={}",
                        index + 2
                    );
                    return Ok(None);
                }
            }
        }

        Ok(Some(current))
    }
}

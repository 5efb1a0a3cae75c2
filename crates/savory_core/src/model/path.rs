//! Dotted attribute paths (`name`, `group.name`).
//!
//! # Invariants
//! - Every segment is a plain identifier.
//! - A path has at least one segment; all but the last name relations.

use super::{Attributes, ModelError, ModelResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt::{Display, Formatter};

static SEGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid segment regex"));

/// Validated attribute path, optionally through related objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttrPath {
    segments: Vec<String>,
}

impl AttrPath {
    /// Parses a dotted path.
    ///
    /// # Errors
    /// - `ModelError::InvalidPath` when empty or when a segment is not an
    ///   identifier.
    pub fn parse(path: &str) -> ModelResult<Self> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(|segment| !SEGMENT_RE.is_match(segment)) {
            return Err(ModelError::InvalidPath(path.to_string()));
        }
        Ok(Self { segments })
    }

    /// Final attribute name.
    pub fn attribute(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Relation segments leading to the attribute owner.
    pub fn relation_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// Dotted relation path (`group` for `group.name`), `None` for plain
    /// attributes.
    pub fn relation(&self) -> Option<String> {
        let relations = self.relation_segments();
        if relations.is_empty() {
            None
        } else {
            Some(relations.join("."))
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Reads the attribute, returning `None` when any relation on the way is
    /// not loaded or the attribute is absent.
    pub fn read(&self, model: &dyn Attributes) -> Option<Value> {
        let mut owner = model;
        for relation in self.relation_segments() {
            owner = owner.related(relation)?;
        }
        owner.attr(self.attribute())
    }

    /// Writes the attribute through loaded relations.
    ///
    /// # Errors
    /// - `ModelError::MissingRelation` when a relation on the way is absent.
    /// - Any error returned by the owner's `set_attr`.
    pub fn write(&self, model: &mut dyn Attributes, value: Value) -> ModelResult<()> {
        let mut owner = model;
        for relation in self.relation_segments() {
            owner = owner
                .related_mut(relation)
                .ok_or_else(|| ModelError::MissingRelation(relation.clone()))?;
        }
        owner.set_attr(self.attribute(), value)
    }

    /// camelCase key for plain maps: `first_name` → `firstName`,
    /// `group.name` → `groupName`.
    pub fn camel_case(&self) -> String {
        let mut out = String::new();
        for word in self.segments.iter().flat_map(|segment| segment.split('_')) {
            if word.is_empty() {
                continue;
            }
            if out.is_empty() {
                out.push_str(word);
                continue;
            }
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
        out
    }
}

impl Display for AttrPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

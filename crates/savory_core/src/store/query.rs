//! Explicit query description handed to stores.

use std::collections::BTreeSet;

/// Query set over one model type.
///
/// Eager-loading hints are a plain set of relation names; stores decide how
/// to load them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySet {
    select_related: BTreeSet<String>,
    pk: Option<i64>,
    limit: Option<u32>,
    offset: u32,
}

impl QuerySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an eager-loading hint. Repeated names collapse.
    pub fn select_related(mut self, relation: impl Into<String>) -> Self {
        self.select_related.insert(relation.into());
        self
    }

    pub fn select_related_all<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select_related
            .extend(relations.into_iter().map(Into::into));
        self
    }

    pub fn related_hints(&self) -> &BTreeSet<String> {
        &self.select_related
    }

    pub fn with_pk(mut self, pk: i64) -> Self {
        self.pk = Some(pk);
        self
    }

    pub fn pk_filter(&self) -> Option<i64> {
        self.pk
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Drops limit and offset, keeping hints and filters.
    pub fn unpaginated(mut self) -> Self {
        self.limit = None;
        self.offset = 0;
        self
    }

    pub fn limit_value(&self) -> Option<u32> {
        self.limit
    }

    pub fn offset_value(&self) -> u32 {
        self.offset
    }
}

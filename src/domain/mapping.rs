//! Caller-supplied mapping overrides
//!
//! A [`BundleMapping`] overrides the automatic existence detection for
//! individual bundle members. Members without an entry are auto-detected.

use std::collections::HashMap;

use super::EntityCategory;

/// What to do with one bundle member instead of auto-detecting it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingAction {
    /// Skip the member; references to it are resolved against the target
    Ignore,
    /// Drop the member from the install set; references to it stay unresolved
    Delete,
    /// Map the member onto an entity that already exists on the target
    ///
    /// The value is the category's reference currency: the GUID for
    /// policies and encapsulated assertions, the connection name for JDBC
    /// connections and the target id otherwise.
    UseExisting(String),
}

/// Mapping overrides keyed by (category, source identifier)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleMapping {
    entries: HashMap<(EntityCategory, String), MappingAction>,
}

impl BundleMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        category: EntityCategory,
        source: impl Into<String>,
        action: MappingAction,
    ) -> Option<MappingAction> {
        self.entries.insert((category, source.into()), action)
    }

    #[must_use]
    pub fn with(
        mut self,
        category: EntityCategory,
        source: impl Into<String>,
        action: MappingAction,
    ) -> Self {
        self.insert(category, source, action);
        self
    }

    /// The override for the first of `keys` that has one
    ///
    /// Members are looked up by source id first and GUID second, so callers
    /// pass `[id, guid]` for GUID-carrying categories.
    pub fn action(&self, category: EntityCategory, keys: &[&str]) -> Option<&MappingAction> {
        keys.iter()
            .find_map(|key| self.entries.get(&(category, (*key).to_string())))
    }

    pub fn is_deleted(&self, category: EntityCategory, keys: &[&str]) -> bool {
        matches!(self.action(category, keys), Some(MappingAction::Delete))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Source to target identifier bookkeeping
//!
//! The [`IdentifierMap`] is the only state carried from one install stage to
//! the next. For every category it maps the identifiers a bundle declares to
//! the identifiers the target assigned, plus GUID and name maps for the
//! categories other entities reference by GUID or name.
//!
//! A stage gets write access to its own category only, through
//! [`IdentifierMap::stage`]; everything recorded by earlier stages stays
//! readable. Entries are never removed.

pub mod prefix;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::EntityCategory;

type Table = BTreeMap<String, String>;

/// Accumulated source to target identifiers of one install attempt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentifierMap {
    ids: BTreeMap<EntityCategory, Table>,
    guids: BTreeMap<EntityCategory, Table>,
    names: BTreeMap<EntityCategory, Table>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target identifier recorded for a source identifier
    pub fn id(&self, category: EntityCategory, source: &str) -> Option<&str> {
        lookup(&self.ids, category, source)
    }

    /// Target GUID recorded for a source GUID
    pub fn guid(&self, category: EntityCategory, source_guid: &str) -> Option<&str> {
        lookup(&self.guids, category, source_guid)
    }

    /// Target name recorded for a source name
    pub fn name(&self, category: EntityCategory, source_name: &str) -> Option<&str> {
        lookup(&self.names, category, source_name)
    }

    /// All source to target identifier pairs of a category, sorted by source
    pub fn ids(&self, category: EntityCategory) -> impl Iterator<Item = (&str, &str)> {
        self.ids
            .get(&category)
            .into_iter()
            .flat_map(|table| table.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn len(&self, category: EntityCategory) -> usize {
        self.ids.get(&category).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.values().all(BTreeMap::is_empty)
            && self.guids.values().all(BTreeMap::is_empty)
            && self.names.values().all(BTreeMap::is_empty)
    }

    /// Writable handle for the category currently installing
    pub fn stage(&mut self, category: EntityCategory) -> StageIdentifiers<'_> {
        StageIdentifiers {
            map: self,
            category,
        }
    }
}

fn lookup<'a>(
    tables: &'a BTreeMap<EntityCategory, Table>,
    category: EntityCategory,
    key: &str,
) -> Option<&'a str> {
    tables
        .get(&category)
        .and_then(|table| table.get(key))
        .map(String::as_str)
}

fn record(
    tables: &mut BTreeMap<EntityCategory, Table>,
    category: EntityCategory,
    source: &str,
    target: &str,
) {
    let previous = tables
        .entry(category)
        .or_default()
        .insert(source.to_string(), target.to_string());
    if let Some(previous) = previous.filter(|p| p != target) {
        tracing::warn!(%category, source, from = %previous, to = target, "identifier remapped");
    }
}

/// Write access to one category of an [`IdentifierMap`]
pub struct StageIdentifiers<'a> {
    map: &'a mut IdentifierMap,
    category: EntityCategory,
}

impl StageIdentifiers<'_> {
    pub fn category(&self) -> EntityCategory {
        self.category
    }

    /// Read access to every category, including the one being written
    pub fn read(&self) -> &IdentifierMap {
        self.map
    }

    pub fn record_id(&mut self, source: &str, target: &str) {
        record(&mut self.map.ids, self.category, source, target);
    }

    pub fn record_guid(&mut self, source_guid: &str, target_guid: &str) {
        record(&mut self.map.guids, self.category, source_guid, target_guid);
    }

    pub fn record_name(&mut self, source_name: &str, target_name: &str) {
        record(&mut self.map.names, self.category, source_name, target_name);
    }
}

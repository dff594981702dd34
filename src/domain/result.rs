//! Outcome of one install or dry-run attempt

use std::collections::BTreeMap;
use std::fmt;

use super::EntityCategory;
use crate::identifiers::IdentifierMap;

/// A reference that resolves neither to a target entity nor to a bundle member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    /// Category of the entity that is missing
    pub category: EntityCategory,
    /// The GUID or name found in the referencing body
    pub reference: String,
    /// Display name of the entity holding the reference
    pub referenced_by: String,
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' (referenced by {})",
            self.category, self.reference, self.referenced_by
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedKind {
    Create,
    SetVersionComment,
}

/// A mutating call a dry run would have made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction {
    pub kind: PlannedKind,
    pub category: EntityCategory,
    pub name: String,
}

/// What an install attempt did, or would do in a dry run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstallResult {
    pub bundle_id: String,
    pub dry_run: bool,
    /// Names of created entities per category
    pub created: BTreeMap<EntityCategory, Vec<String>>,
    /// Names of entities that already existed and were mapped instead
    pub reused: BTreeMap<EntityCategory, Vec<String>>,
    pub missing_dependencies: Vec<MissingDependency>,
    /// Would-be mutating calls, recorded only in dry runs
    pub planned: Vec<PlannedAction>,
    /// Source to target identifiers accumulated over all stages
    pub identifiers: IdentifierMap,
}

impl InstallResult {
    pub fn new(bundle_id: impl Into<String>, dry_run: bool) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            dry_run,
            ..Self::default()
        }
    }

    pub fn record_created(&mut self, category: EntityCategory, name: impl Into<String>) {
        self.created.entry(category).or_default().push(name.into());
    }

    pub fn record_reused(&mut self, category: EntityCategory, name: impl Into<String>) {
        self.reused.entry(category).or_default().push(name.into());
    }

    /// Record a missing dependency once per (category, reference, holder)
    pub fn record_missing(&mut self, missing: MissingDependency) {
        if !self.missing_dependencies.contains(&missing) {
            self.missing_dependencies.push(missing);
        }
    }

    pub fn created_count(&self, category: EntityCategory) -> usize {
        self.created.get(&category).map_or(0, Vec::len)
    }

    pub fn reused_count(&self, category: EntityCategory) -> usize {
        self.reused.get(&category).map_or(0, Vec::len)
    }

    pub fn total_created(&self) -> usize {
        self.created.values().map(Vec::len).sum()
    }

    /// Distinct GUIDs or names of encapsulated assertions referenced but absent
    pub fn missing_assertions(&self) -> Vec<String> {
        let mut assertions: Vec<String> = Vec::new();
        for missing in &self.missing_dependencies {
            if missing.category == EntityCategory::EncapsulatedAssertion
                && !assertions.contains(&missing.reference)
            {
                assertions.push(missing.reference.clone());
            }
        }
        assertions
    }
}

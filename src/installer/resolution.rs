//! Resolving and rewriting the references inside policy bodies
//!
//! Before an encapsulated assertion, policy or service is sent to the
//! target, every reference in its body is resolved to the identifier the
//! target knows:
//!
//! - JDBC connections through the connection names the connection stage
//!   recorded
//! - encapsulated assertions and included policies through the GUID and name
//!   maps of earlier stages, then through target lookups
//!
//! A reference that resolves nowhere is a missing dependency in a dry run and
//! an error in a real run.

use std::fmt;

use super::remote::Remote;
use crate::domain::{
    BundleContents, EncapsulatedAssertionDefinition, EntityCategory, InstallResult,
    MappingAction, MissingDependency, PolicyDefinition,
};
use crate::error::{self, Result};
use crate::identifiers::IdentifierMap;
use crate::identifiers::prefix::{prefixed_guid, prefixed_name};
use crate::management::{EntitySummary, Selector};
use crate::references::{Reference, ReferenceRewriter, ReferenceScanner, ReferenceSlot, Rewrites};

/// The entity whose body is being prepared
#[derive(Debug, Clone, Copy)]
pub(crate) struct Owner<'b> {
    pub category: EntityCategory,
    pub name: &'b str,
}

impl fmt::Display for Owner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.category, self.name)
    }
}

/// How includes of bundle policies resolve before the policy stage ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PolicyIncludes {
    /// Bundle policies are installed already; only the GUID map counts
    Installed,
    /// Bundle policies are still to come; use the GUID they will receive
    Predicted,
}

/// Target identity of a referenced encapsulated assertion
struct AssertionTarget {
    guid: Option<String>,
    name: String,
}

pub(crate) struct ReferenceEngine<'a> {
    remote: &'a Remote<'a>,
    contents: &'a BundleContents,
    scanner: &'a dyn ReferenceScanner,
    rewriter: &'a dyn ReferenceRewriter,
}

impl<'a> ReferenceEngine<'a> {
    pub(crate) fn new(
        remote: &'a Remote<'a>,
        contents: &'a BundleContents,
        scanner: &'a dyn ReferenceScanner,
        rewriter: &'a dyn ReferenceRewriter,
    ) -> Self {
        Self {
            remote,
            contents,
            scanner,
            rewriter,
        }
    }

    pub(crate) fn scanner(&self) -> &'a dyn ReferenceScanner {
        self.scanner
    }

    pub(crate) fn scan(&self, owner: Owner<'_>, body: &str) -> Result<Vec<Reference>> {
        self.scanner
            .scan(body)
            .map_err(|e| error::reference::parse_failed(owner.to_string(), e.to_string()))
    }

    /// `body` with every reference replaced by its target identifier
    pub(crate) fn prepare_body(
        &self,
        ids: &IdentifierMap,
        owner: Owner<'_>,
        body: &str,
        includes: PolicyIncludes,
        result: &mut InstallResult,
    ) -> Result<String> {
        let mut rewrites = Rewrites::new();

        for reference in self.scan(owner, body)? {
            match reference {
                Reference::JdbcConnection { name } => {
                    match ids.id(EntityCategory::JdbcConnection, &name) {
                        Some(target) => {
                            rewrites.insert(ReferenceSlot::ConnectionName, name.as_str(), target);
                        }
                        None => {
                            self.unresolved(owner, EntityCategory::JdbcConnection, &name, result)?;
                        }
                    }
                }
                Reference::PolicyInclude { guid } => match self.resolve_policy(ids, &guid, includes)? {
                    Some(target) => rewrites.insert(ReferenceSlot::PolicyGuid, guid, target),
                    None => self.unresolved(owner, EntityCategory::Policy, &guid, result)?,
                },
                Reference::EncapsulatedAssertion { guid, name } => {
                    match self.resolve_assertion(ids, guid.as_deref(), name.as_deref())? {
                        Some(target) => {
                            if let (Some(guid), Some(target_guid)) = (guid, target.guid) {
                                rewrites.insert(ReferenceSlot::EncapsulatedGuid, guid, target_guid);
                            }
                            if let Some(name) = name {
                                rewrites.insert(ReferenceSlot::EncapsulatedName, name, target.name);
                            }
                        }
                        None => {
                            let reference = guid.or(name).unwrap_or_default();
                            self.unresolved(
                                owner,
                                EntityCategory::EncapsulatedAssertion,
                                &reference,
                                result,
                            )?;
                        }
                    }
                }
            }
        }

        if rewrites.is_empty() {
            return Ok(body.to_string());
        }
        tracing::debug!(owner = %owner, rewrites = rewrites.len(), "rewriting references");
        self.rewriter
            .rewrite(body, &rewrites)
            .map_err(|e| error::reference::parse_failed(owner.to_string(), e.to_string()))
    }

    /// Record `reference` as missing in a dry run, fail a real run
    pub(crate) fn unresolved(
        &self,
        owner: Owner<'_>,
        category: EntityCategory,
        reference: &str,
        result: &mut InstallResult,
    ) -> Result<()> {
        if self.remote.is_dry_run() {
            tracing::debug!(owner = %owner, %category, reference, "missing dependency");
            result.record_missing(MissingDependency {
                category,
                reference: reference.to_string(),
                referenced_by: owner.to_string(),
            });
            return Ok(());
        }
        Err(error::install::unresolved(
            owner.to_string(),
            category.label(),
            reference,
        ))
    }

    fn prefix(&self) -> Option<&str> {
        self.remote.ctx().prefix()
    }

    fn mapping_action(&self, category: EntityCategory, keys: &[&str]) -> Option<&MappingAction> {
        self.remote.ctx().mapping().action(category, keys)
    }

    /// Target entity holding one of `guid`'s forms, then one of `name`'s forms
    fn lookup_external(
        &self,
        category: EntityCategory,
        guid: Option<&str>,
        name: Option<&str>,
    ) -> Result<Option<EntitySummary>> {
        let mut selectors = Vec::new();
        if let Some(guid) = guid {
            for candidate in [prefixed_guid(self.prefix(), guid), guid.to_string()] {
                let selector = Selector::Guid { guid: candidate };
                if !selectors.contains(&selector) {
                    selectors.push(selector);
                }
            }
        }
        if let Some(name) = name {
            for candidate in [prefixed_name(self.prefix(), name), name.to_string()] {
                let selector = Selector::Name { name: candidate };
                if !selectors.contains(&selector) {
                    selectors.push(selector);
                }
            }
        }
        self.remote.find_any(category, selectors)
    }

    fn bundle_policy(&self, guid: &str) -> Option<&'a PolicyDefinition> {
        self.contents.policies.iter().find(|p| p.guid == guid)
    }

    fn bundle_assertion(
        &self,
        guid: Option<&str>,
        name: Option<&str>,
    ) -> Option<&'a EncapsulatedAssertionDefinition> {
        let assertions = &self.contents.encapsulated_assertions;
        guid.and_then(|g| assertions.iter().find(|e| e.guid == g))
            .or_else(|| name.and_then(|n| assertions.iter().find(|e| e.name == n)))
    }

    fn resolve_policy(
        &self,
        ids: &IdentifierMap,
        guid: &str,
        includes: PolicyIncludes,
    ) -> Result<Option<String>> {
        if let Some(target) = ids.guid(EntityCategory::Policy, guid) {
            return Ok(Some(target.to_string()));
        }

        if let Some(member) = self.bundle_policy(guid) {
            match self.mapping_action(EntityCategory::Policy, &[&member.id, &member.guid]) {
                Some(MappingAction::Delete) => return Ok(None),
                Some(MappingAction::UseExisting(target)) => return Ok(Some(target.clone())),
                Some(MappingAction::Ignore) => {}
                None if includes == PolicyIncludes::Predicted => {
                    let name = prefixed_name(self.prefix(), &member.name);
                    let existing = self
                        .remote
                        .find(EntityCategory::Policy, Selector::Name { name })?;
                    let target = existing
                        .and_then(|e| e.guid)
                        .unwrap_or_else(|| prefixed_guid(self.prefix(), guid));
                    return Ok(Some(target));
                }
                None => {}
            }
        }

        Ok(self
            .lookup_external(EntityCategory::Policy, Some(guid), None)?
            .map(|found| found.guid.unwrap_or_else(|| guid.to_string())))
    }

    fn resolve_assertion(
        &self,
        ids: &IdentifierMap,
        guid: Option<&str>,
        name: Option<&str>,
    ) -> Result<Option<AssertionTarget>> {
        let category = EntityCategory::EncapsulatedAssertion;

        if let Some(member) = self.bundle_assertion(guid, name) {
            if let Some(target_guid) = ids.guid(category, &member.guid) {
                let target_name = ids
                    .name(category, &member.name)
                    .map_or_else(|| prefixed_name(self.prefix(), &member.name), str::to_string);
                return Ok(Some(AssertionTarget {
                    guid: Some(target_guid.to_string()),
                    name: target_name,
                }));
            }
            if self
                .remote
                .ctx()
                .mapping()
                .is_deleted(category, &[&member.id, &member.guid])
            {
                return Ok(None);
            }
        }

        Ok(self
            .lookup_external(category, guid, name)?
            .map(|found| AssertionTarget {
                guid: found.guid.or_else(|| guid.map(str::to_string)),
                name: found.name,
            }))
    }
}

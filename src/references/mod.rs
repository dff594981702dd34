//! References embedded in policy bodies
//!
//! Policy bodies are opaque documents that reference other entities by GUID
//! or by name. Installers never parse them into the domain model; they only
//! ask a [`ReferenceScanner`] which references a body holds and hand a
//! [`ReferenceRewriter`] the replacements to apply.
//!
//! [`PolicyXml`] implements both for XML policy documents.

pub mod policy_xml;
pub mod variables;

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

pub use policy_xml::PolicyXml;

/// One reference found in a policy body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Include of another policy fragment, by GUID
    PolicyInclude { guid: String },
    /// Invocation of an encapsulated assertion, by GUID and/or name
    EncapsulatedAssertion {
        guid: Option<String>,
        name: Option<String>,
    },
    /// Use of a JDBC connection, by name
    JdbcConnection { name: String },
}

/// A location inside a policy body that holds a reference value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceSlot {
    PolicyGuid,
    EncapsulatedGuid,
    EncapsulatedName,
    ConnectionName,
}

impl ReferenceSlot {
    const ALL: [ReferenceSlot; 4] = [
        ReferenceSlot::PolicyGuid,
        ReferenceSlot::EncapsulatedGuid,
        ReferenceSlot::EncapsulatedName,
        ReferenceSlot::ConnectionName,
    ];

    /// Local name of the element that encloses the slot element
    pub fn parent(self) -> &'static str {
        match self {
            ReferenceSlot::PolicyGuid => "Include",
            ReferenceSlot::EncapsulatedGuid | ReferenceSlot::EncapsulatedName => "Encapsulated",
            ReferenceSlot::ConnectionName => "JdbcQuery",
        }
    }

    /// Local name of the element carrying the value
    pub fn element(self) -> &'static str {
        match self {
            ReferenceSlot::PolicyGuid => "PolicyGuid",
            ReferenceSlot::EncapsulatedGuid => "EncapsulatedAssertionConfigGuid",
            ReferenceSlot::EncapsulatedName => "EncapsulatedAssertionConfigName",
            ReferenceSlot::ConnectionName => "ConnectionName",
        }
    }

    /// The slot an element with this local name under this parent represents
    pub fn locate(parent: &str, element: &str) -> Option<ReferenceSlot> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.parent() == parent && slot.element() == element)
    }
}

/// Replacement values keyed by slot and current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewrites {
    replacements: HashMap<(ReferenceSlot, String), String>,
}

impl Rewrites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `from` with `to` wherever it appears in `slot`; no-op pairs are dropped
    pub fn insert(&mut self, slot: ReferenceSlot, from: impl Into<String>, to: impl Into<String>) {
        let from = from.into();
        let to = to.into();
        if from != to {
            self.replacements.insert((slot, from), to);
        }
    }

    pub fn get(&self, slot: ReferenceSlot, value: &str) -> Option<&str> {
        self.replacements
            .get(&(slot, value.to_string()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }
}

/// A policy body that could not be read
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct DocumentError {
    reason: String,
}

impl DocumentError {
    pub(crate) fn from_display(err: impl fmt::Display) -> Self {
        Self {
            reason: err.to_string(),
        }
    }
}

/// Finds the references a policy body holds
pub trait ReferenceScanner {
    /// References in document order
    fn scan(&self, body: &str) -> Result<Vec<Reference>, DocumentError>;
}

/// Substitutes reference values inside a policy body
pub trait ReferenceRewriter {
    /// Apply `rewrites`, returning `body` unchanged when nothing matches
    fn rewrite(&self, body: &str, rewrites: &Rewrites) -> Result<String, DocumentError>;
}

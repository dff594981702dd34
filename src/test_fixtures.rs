//! Test fixtures and utilities for reducing test setup duplication.
//!
//! This module provides:
//! - [`StaticBundleResolver`]: bundles held in memory instead of on disk
//! - [`BundleBuilder`]: fluent construction of bundle definitions
//! - policy body snippets carrying each kind of reference
//! - temp directories with bundle files
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{BundleBuilder, StaticBundleResolver, policy_body, include};
//!
//! let (info, contents) = BundleBuilder::new("oauth")
//!     .policy("p1", GUID, "Token", "/OAuth", &policy_body(&[include(OTHER)]))
//!     .build();
//! let resolver = StaticBundleResolver::new().with(info.clone(), contents);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use tempfile::TempDir;

use crate::domain::{
    BundleContents, BundleInfo, BundleItem, CertificateDefinition, EncapsulatedAssertionDefinition,
    EntityCategory, PolicyDefinition, ServiceDefinition,
};
use crate::error::{self, Result};
use crate::resolver::BundleResolver;

/// Bundle resolver over definitions built in memory
#[derive(Debug, Default)]
pub struct StaticBundleResolver {
    bundles: BTreeMap<String, (BundleInfo, BundleContents)>,
}

impl StaticBundleResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, info: BundleInfo, contents: BundleContents) -> Self {
        self.insert(info, contents);
        self
    }

    pub fn insert(&mut self, info: BundleInfo, contents: BundleContents) {
        self.bundles.insert(info.id.clone(), (info, contents));
    }
}

impl BundleResolver for StaticBundleResolver {
    fn get_bundle_item(
        &self,
        bundle_id: &str,
        category: EntityCategory,
    ) -> Result<Option<Arc<BundleItem>>> {
        let (_, contents) = self
            .bundles
            .get(bundle_id)
            .ok_or_else(|| error::bundle::not_found(bundle_id))?;
        Ok(contents.item(category).map(Arc::new))
    }

    fn get_result_list(&self) -> Vec<BundleInfo> {
        self.bundles.values().map(|(info, _)| info.clone()).collect()
    }
}

/// Fluent builder for a bundle's descriptor and definitions
#[derive(Debug)]
pub struct BundleBuilder {
    info: BundleInfo,
    contents: BundleContents,
}

impl BundleBuilder {
    /// Version 1.0.0 bundle named after its id
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            info: BundleInfo::new(id, id, semver::Version::new(1, 0, 0)),
            contents: BundleContents::default(),
        }
    }

    #[must_use]
    pub fn prerequisite_folders(mut self, folders: &[&str]) -> Self {
        self.info = self.info.with_prerequisite_folders(folders.iter().copied());
        self
    }

    #[must_use]
    pub fn folder(mut self, path: &str) -> Self {
        self.contents.folders.push(path.to_string());
        self
    }

    #[must_use]
    pub fn certificate(mut self, id: &str, name: &str, issuer: &str, serial: &str) -> Self {
        self.contents.certificates.push(CertificateDefinition {
            id: id.to_string(),
            name: name.to_string(),
            issuer: issuer.to_string(),
            serial: serial.to_string(),
            pem: None,
        });
        self
    }

    #[must_use]
    pub fn encass(mut self, id: &str, guid: &str, name: &str, folder: &str, body: &str) -> Self {
        self.contents
            .encapsulated_assertions
            .push(EncapsulatedAssertionDefinition {
                id: id.to_string(),
                guid: guid.to_string(),
                name: name.to_string(),
                folder: folder.to_string(),
                body: body.to_string(),
            });
        self
    }

    #[must_use]
    pub fn policy(mut self, id: &str, guid: &str, name: &str, folder: &str, body: &str) -> Self {
        self.contents.policies.push(PolicyDefinition {
            id: id.to_string(),
            guid: guid.to_string(),
            name: name.to_string(),
            folder: folder.to_string(),
            body: body.to_string(),
        });
        self
    }

    #[must_use]
    pub fn service(
        mut self,
        id: &str,
        name: &str,
        folder: &str,
        uri: Option<&str>,
        body: &str,
    ) -> Self {
        self.contents.services.push(ServiceDefinition {
            id: id.to_string(),
            name: name.to_string(),
            folder: folder.to_string(),
            uri: uri.map(str::to_string),
            body: body.to_string(),
        });
        self
    }

    #[must_use]
    pub fn build(self) -> (BundleInfo, BundleContents) {
        (self.info, self.contents)
    }
}

/// A policy document holding `assertions` in its top-level `All`
#[must_use]
pub fn policy_body(assertions: &[String]) -> String {
    format!(
        "<wsp:Policy xmlns:L7p=\"http://www.layer7tech.com/ws/policy\" xmlns:wsp=\"http://schemas.xmlsoap.org/ws/2002/12/policy\">\n  <wsp:All wsp:Usage=\"Required\">\n{}  </wsp:All>\n</wsp:Policy>\n",
        assertions.concat()
    )
}

/// Include of the policy with `guid`
#[must_use]
pub fn include(guid: &str) -> String {
    format!("    <L7p:Include>\n      <L7p:PolicyGuid stringValue=\"{guid}\"/>\n    </L7p:Include>\n")
}

/// Invocation of an encapsulated assertion by GUID and name
#[must_use]
pub fn encass_ref(guid: &str, name: &str) -> String {
    format!(
        "    <L7p:Encapsulated>\n      <L7p:EncapsulatedAssertionConfigGuid stringValue=\"{guid}\"/>\n      <L7p:EncapsulatedAssertionConfigName stringValue=\"{name}\"/>\n    </L7p:Encapsulated>\n"
    )
}

/// Query through the JDBC connection `name`
#[must_use]
pub fn jdbc_ref(name: &str) -> String {
    format!(
        "    <L7p:JdbcQuery>\n      <L7p:ConnectionName stringValue=\"{name}\"/>\n      <L7p:SqlQuery stringValue=\"SELECT 1\"/>\n    </L7p:JdbcQuery>\n"
    )
}

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Create test files in a directory.
///
/// Takes a list of (path, content) tuples and creates those files.
/// Paths are relative to the provided base directory.
///
/// # Panics
///
/// Panics if any file cannot be created.
pub fn create_test_files(temp: &TempDir, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = temp.path().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&full_path, content).expect("Failed to write test file");
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::references::{PolicyXml, Reference, ReferenceScanner};

    #[test]
    fn test_create_test_files() {
        let temp = create_temp_dir();
        create_test_files(&temp, &[("a/bundle.yaml", "id: a"), ("a/p.xml", "<Policy/>")]);
        assert!(temp.path().join("a/bundle.yaml").exists());
        assert!(temp.path().join("a/p.xml").exists());
    }

    #[test]
    fn test_static_resolver_hands_out_items() {
        let (info, contents) = BundleBuilder::new("b")
            .policy("p1", "g1", "P", "/", "<Policy/>")
            .build();
        let resolver = StaticBundleResolver::new().with(info, contents);

        let item = resolver
            .get_bundle_item("b", EntityCategory::Policy)
            .unwrap()
            .unwrap();
        assert_eq!(item.len(), 1);
        assert!(resolver.get_bundle_item("nope", EntityCategory::Policy).is_err());
    }

    #[test]
    fn test_snippets_are_scannable() {
        let body = policy_body(&[include("g1"), encass_ref("g2", "Lookup"), jdbc_ref("OAuth")]);
        let references = PolicyXml.scan(&body).unwrap();
        assert_eq!(
            references,
            vec![
                Reference::PolicyInclude {
                    guid: "g1".to_string()
                },
                Reference::EncapsulatedAssertion {
                    guid: Some("g2".to_string()),
                    name: Some("Lookup".to_string())
                },
                Reference::JdbcConnection {
                    name: "OAuth".to_string()
                },
            ]
        );
    }
}

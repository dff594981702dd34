//! `bundle.yaml` manifest format
//!
//! ```yaml
//! id: oauth-manager
//! name: OAuth Manager
//! version: 1.2.0
//! prerequisite_folders: [/Shared]
//! folders: [/OAuth]
//! certificates:
//!   - { id: c1, name: Root CA, issuer: "CN=Root", serial: "1001" }
//! encapsulated_assertions:
//!   - { id: e1, guid: ..., name: Client Lookup, folder: /Shared, policy: policies/lookup.xml }
//! policies:
//!   - { id: p1, guid: ..., name: Token Utility, folder: /OAuth, policy: policies/token.xml }
//! services:
//!   - { id: s1, name: Token, folder: /OAuth, uri: /oauth/v2/token, body: "<Policy/>" }
//! ```
//!
//! Policy bodies come from a file relative to the bundle directory
//! (`policy`) or inline (`body`), never both.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::bundle::normalize_folder_path;
use crate::domain::{
    BundleContents, BundleInfo, CertificateDefinition, EncapsulatedAssertionDefinition,
    PolicyDefinition, ServiceDefinition,
};
use crate::error::{self, Result};

/// Manifest file name
pub const MANIFEST_FILE: &str = "bundle.yaml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleManifest {
    pub id: String,
    pub name: String,
    pub version: semver::Version,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prerequisite_folders: Vec<String>,
    #[serde(default)]
    pub folders: Vec<String>,
    #[serde(default)]
    pub certificates: Vec<CertificateEntry>,
    #[serde(default)]
    pub encapsulated_assertions: Vec<PolicyEntry>,
    #[serde(default)]
    pub policies: Vec<PolicyEntry>,
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertificateEntry {
    pub id: String,
    pub name: String,
    pub issuer: String,
    pub serial: String,
    #[serde(default)]
    pub pem: Option<String>,
}

/// A policy or the backing policy of an encapsulated assertion
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyEntry {
    pub id: String,
    pub guid: String,
    pub name: String,
    #[serde(default = "root_folder")]
    pub folder: String,
    #[serde(default)]
    pub policy: Option<PathBuf>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceEntry {
    pub id: String,
    pub name: String,
    #[serde(default = "root_folder")]
    pub folder: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub policy: Option<PathBuf>,
    #[serde(default)]
    pub body: Option<String>,
}

fn root_folder() -> String {
    "/".to_string()
}

impl BundleManifest {
    /// Parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| error::fs::read_failed(path.display().to_string(), e.to_string()))?;
        Self::from_yaml(&content).map_err(|e| match e {
            error::GatebundleError::ConfigParseFailed { reason, .. } => {
                error::config::parse_failed(path.display().to_string(), reason)
            }
            other => other,
        })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn info(&self) -> BundleInfo {
        let mut info = BundleInfo::new(&self.id, &self.name, self.version.clone())
            .with_prerequisite_folders(
                self.prerequisite_folders
                    .iter()
                    .map(|f| normalize_folder_path(f)),
            );
        info.description.clone_from(&self.description);
        info
    }

    /// Resolve policy files against `bundle_dir` and validate the definitions
    pub fn into_contents(self, bundle_dir: &Path) -> Result<BundleContents> {
        let bundle = self.id.clone();
        let load_body = |owner: &str, policy: Option<PathBuf>, inline: Option<String>| {
            read_body(&bundle, bundle_dir, owner, policy, inline)
        };

        let mut encapsulated_assertions = Vec::new();
        for e in self.encapsulated_assertions {
            let body = load_body(&e.name, e.policy, e.body)?;
            encapsulated_assertions.push(EncapsulatedAssertionDefinition {
                id: e.id,
                guid: e.guid,
                name: e.name,
                folder: normalize_folder_path(&e.folder),
                body,
            });
        }

        let mut policies = Vec::new();
        for p in self.policies {
            let body = load_body(&p.name, p.policy, p.body)?;
            policies.push(PolicyDefinition {
                id: p.id,
                guid: p.guid,
                name: p.name,
                folder: normalize_folder_path(&p.folder),
                body,
            });
        }

        let mut services = Vec::new();
        for s in self.services {
            let body = load_body(&s.name, s.policy, s.body)?;
            services.push(ServiceDefinition {
                id: s.id,
                name: s.name,
                folder: normalize_folder_path(&s.folder),
                uri: s.uri,
                body,
            });
        }

        let contents = BundleContents {
            folders: self
                .folders
                .iter()
                .map(|f| normalize_folder_path(f))
                .collect(),
            certificates: self
                .certificates
                .into_iter()
                .map(|c| CertificateDefinition {
                    id: c.id,
                    name: c.name,
                    issuer: c.issuer,
                    serial: c.serial,
                    pem: c.pem,
                })
                .collect(),
            encapsulated_assertions,
            policies,
            services,
        };
        validate(&bundle, &contents)?;
        Ok(contents)
    }
}

fn read_body(
    bundle: &str,
    bundle_dir: &Path,
    owner: &str,
    policy: Option<PathBuf>,
    inline: Option<String>,
) -> Result<String> {
    match (policy, inline) {
        (Some(path), None) => {
            let full_path = bundle_dir.join(&path);
            std::fs::read_to_string(&full_path).map_err(|e| {
                error::fs::read_failed(full_path.display().to_string(), e.to_string())
            })
        }
        (None, Some(body)) => Ok(body),
        (Some(_), Some(_)) => Err(error::bundle::invalid(
            bundle,
            format!("'{owner}' declares both 'policy' and 'body'"),
        )),
        (None, None) => Err(error::bundle::invalid(
            bundle,
            format!("'{owner}' declares neither 'policy' nor 'body'"),
        )),
    }
}

fn ensure_unique<'a>(
    bundle: &str,
    what: &str,
    values: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for value in values {
        if value.trim().is_empty() {
            return Err(error::bundle::invalid(bundle, format!("empty {what}")));
        }
        if !seen.insert(value) {
            return Err(error::bundle::invalid(
                bundle,
                format!("duplicate {what} '{value}'"),
            ));
        }
    }
    Ok(())
}

/// Every member must be identifiable and GUID-referenced members must be unambiguous
fn validate(bundle: &str, contents: &BundleContents) -> Result<()> {
    ensure_unique(
        bundle,
        "certificate id",
        contents.certificates.iter().map(|c| c.id.as_str()),
    )?;
    ensure_unique(
        bundle,
        "encapsulated assertion id",
        contents.encapsulated_assertions.iter().map(|e| e.id.as_str()),
    )?;
    ensure_unique(
        bundle,
        "encapsulated assertion GUID",
        contents.encapsulated_assertions.iter().map(|e| e.guid.as_str()),
    )?;
    ensure_unique(
        bundle,
        "encapsulated assertion name",
        contents.encapsulated_assertions.iter().map(|e| e.name.as_str()),
    )?;
    ensure_unique(
        bundle,
        "policy id",
        contents.policies.iter().map(|p| p.id.as_str()),
    )?;
    ensure_unique(
        bundle,
        "policy GUID",
        contents.policies.iter().map(|p| p.guid.as_str()),
    )?;
    ensure_unique(
        bundle,
        "policy name",
        contents.policies.iter().map(|p| p.name.as_str()),
    )?;
    ensure_unique(
        bundle,
        "service id",
        contents.services.iter().map(|s| s.id.as_str()),
    )?;
    ensure_unique(
        bundle,
        "service URI",
        contents.services.iter().filter_map(|s| s.uri.as_deref()),
    )
}

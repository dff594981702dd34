//! Bundle domain types
//!
//! Contains the bundle descriptor and the per-category entity definitions a
//! bundle declares.

use serde::{Deserialize, Serialize};

use super::EntityCategory;

/// Descriptor of an installable bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleInfo {
    /// Stable bundle id
    pub id: String,

    /// Display name
    pub name: String,

    /// Bundle version
    pub version: semver::Version,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Folders owned by other bundles that this bundle installs into
    #[serde(default)]
    pub prerequisite_folders: Vec<String>,

    /// Content digest of the bundle as stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl BundleInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: semver::Version) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version,
            description: None,
            prerequisite_folders: Vec::new(),
            digest: None,
        }
    }

    #[must_use]
    pub fn with_prerequisite_folders<I, S>(mut self, folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisite_folders = folders.into_iter().map(Into::into).collect();
        self
    }

    /// Text stored as the version comment of every entity this bundle creates
    pub fn version_comment(&self) -> String {
        format!("Bundle {} ({}) version {}", self.name, self.id, self.version)
    }
}

/// A trusted certificate declared by a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDefinition {
    pub id: String,
    pub name: String,
    pub issuer: String,
    pub serial: String,
    pub pem: Option<String>,
}

/// An encapsulated assertion declared by a bundle, with its backing policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncapsulatedAssertionDefinition {
    pub id: String,
    pub guid: String,
    pub name: String,
    pub folder: String,
    pub body: String,
}

/// A reusable policy fragment declared by a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDefinition {
    pub id: String,
    pub guid: String,
    pub name: String,
    pub folder: String,
    pub body: String,
}

/// A published service declared by a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub id: String,
    pub name: String,
    pub folder: String,
    /// Custom resolution URI, if the service declares one
    pub uri: Option<String>,
    pub body: String,
}

/// The definitions of one category, as handed out by a bundle resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleItem {
    Folders(Vec<String>),
    Certificates(Vec<CertificateDefinition>),
    EncapsulatedAssertions(Vec<EncapsulatedAssertionDefinition>),
    Policies(Vec<PolicyDefinition>),
    Services(Vec<ServiceDefinition>),
}

impl BundleItem {
    pub fn category(&self) -> EntityCategory {
        match self {
            BundleItem::Folders(_) => EntityCategory::Folder,
            BundleItem::Certificates(_) => EntityCategory::TrustedCertificate,
            BundleItem::EncapsulatedAssertions(_) => EntityCategory::EncapsulatedAssertion,
            BundleItem::Policies(_) => EntityCategory::Policy,
            BundleItem::Services(_) => EntityCategory::Service,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            BundleItem::Folders(items) => items.len(),
            BundleItem::Certificates(items) => items.len(),
            BundleItem::EncapsulatedAssertions(items) => items.len(),
            BundleItem::Policies(items) => items.len(),
            BundleItem::Services(items) => items.len(),
        }
    }
}

/// Everything a bundle declares, one vector per category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleContents {
    pub folders: Vec<String>,
    pub certificates: Vec<CertificateDefinition>,
    pub encapsulated_assertions: Vec<EncapsulatedAssertionDefinition>,
    pub policies: Vec<PolicyDefinition>,
    pub services: Vec<ServiceDefinition>,
}

impl BundleContents {
    /// The definitions of one category, or `None` for categories a bundle
    /// never declares (JDBC connections are only ever referenced)
    pub fn item(&self, category: EntityCategory) -> Option<BundleItem> {
        match category {
            EntityCategory::Folder => Some(BundleItem::Folders(self.folders.clone())),
            EntityCategory::TrustedCertificate => {
                Some(BundleItem::Certificates(self.certificates.clone()))
            }
            EntityCategory::JdbcConnection => None,
            EntityCategory::EncapsulatedAssertion => Some(BundleItem::EncapsulatedAssertions(
                self.encapsulated_assertions.clone(),
            )),
            EntityCategory::Policy => Some(BundleItem::Policies(self.policies.clone())),
            EntityCategory::Service => Some(BundleItem::Services(self.services.clone())),
        }
    }

    /// Replace the definitions of the item's category
    pub fn set_item(&mut self, item: BundleItem) {
        match item {
            BundleItem::Folders(items) => self.folders = items,
            BundleItem::Certificates(items) => self.certificates = items,
            BundleItem::EncapsulatedAssertions(items) => self.encapsulated_assertions = items,
            BundleItem::Policies(items) => self.policies = items,
            BundleItem::Services(items) => self.services = items,
        }
    }

    /// Every folder path the bundle needs, normalized, de-duplicated and in
    /// first-seen order: declared folders first, then entity folders
    pub fn folder_paths(&self) -> Vec<String> {
        let entity_folders = self
            .encapsulated_assertions
            .iter()
            .map(|e| e.folder.as_str())
            .chain(self.policies.iter().map(|p| p.folder.as_str()))
            .chain(self.services.iter().map(|s| s.folder.as_str()));

        let mut paths: Vec<String> = Vec::new();
        for path in self.folders.iter().map(String::as_str).chain(entity_folders) {
            let path = normalize_folder_path(path);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    /// Policy bodies of every entity that carries one, with a display owner
    pub fn bodies(&self) -> Vec<(EntityCategory, &str, &str)> {
        let mut bodies = Vec::new();
        for e in &self.encapsulated_assertions {
            bodies.push((
                EntityCategory::EncapsulatedAssertion,
                e.name.as_str(),
                e.body.as_str(),
            ));
        }
        for p in &self.policies {
            bodies.push((EntityCategory::Policy, p.name.as_str(), p.body.as_str()));
        }
        for s in &self.services {
            bodies.push((EntityCategory::Service, s.name.as_str(), s.body.as_str()));
        }
        bodies
    }

    pub fn count(&self, category: EntityCategory) -> usize {
        self.item(category).map_or(0, |item| item.len())
    }
}

/// Normalize a folder path to `/a/b` form
///
/// Empty segments are dropped, so `a//b/` becomes `/a/b` and an empty path
/// becomes the root `/`.
pub fn normalize_folder_path(path: &str) -> String {
    let segments: Vec<&str> = folder_segments(path).collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Non-empty segments of a folder path
pub fn folder_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').map(str::trim).filter(|s| !s.is_empty())
}

/// Whether `path` equals `ancestor` or lies beneath it
pub fn is_within_folder(path: &str, ancestor: &str) -> bool {
    let path = normalize_folder_path(path);
    let ancestor = normalize_folder_path(ancestor);
    ancestor == "/" || path == ancestor || path.starts_with(&format!("{ancestor}/"))
}

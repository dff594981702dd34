//! Mapping-override file
//!
//! ```yaml
//! mappings:
//!   - category: jdbc_connection
//!     source: OAuth
//!     action: use_existing
//!     target: OAuthProd
//!   - category: policy
//!     source: 506589b0-eba5-4b3f-81b5-be7809817623
//!     action: ignore
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::domain::{BundleMapping, EntityCategory, MappingAction};
use crate::error::{self, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MappingFile {
    #[serde(default)]
    mappings: Vec<MappingEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MappingEntry {
    category: EntityCategory,
    /// Source id, or source GUID for GUID-carrying categories
    source: String,
    action: ActionKind,
    #[serde(default)]
    target: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ActionKind {
    Ignore,
    Delete,
    UseExisting,
}

impl MappingEntry {
    fn action(&self) -> Result<MappingAction> {
        let invalid = |message: &str| {
            error::mapping::invalid(self.category.label(), &self.source, message)
        };
        match (self.action, &self.target) {
            (ActionKind::UseExisting, Some(target)) if !target.trim().is_empty() => {
                Ok(MappingAction::UseExisting(target.trim().to_string()))
            }
            (ActionKind::UseExisting, _) => Err(invalid("use_existing requires a target")),
            (ActionKind::Ignore | ActionKind::Delete, Some(_)) => {
                Err(invalid("only use_existing takes a target"))
            }
            (ActionKind::Ignore, None) => Ok(MappingAction::Ignore),
            (ActionKind::Delete, None) => Ok(MappingAction::Delete),
        }
    }
}

/// Parse mapping overrides from YAML string
pub fn parse_mapping(yaml: &str) -> Result<BundleMapping> {
    if yaml.trim().is_empty() {
        return Ok(BundleMapping::new());
    }
    let file: MappingFile = serde_yaml::from_str(yaml)?;

    let mut mapping = BundleMapping::new();
    for entry in &file.mappings {
        if entry.source.trim().is_empty() {
            return Err(error::mapping::invalid(
                entry.category.label(),
                &entry.source,
                "source may not be empty",
            ));
        }
        if mapping
            .insert(entry.category, entry.source.trim(), entry.action()?)
            .is_some()
        {
            return Err(error::mapping::invalid(
                entry.category.label(),
                &entry.source,
                "mapped more than once",
            ));
        }
    }
    Ok(mapping)
}

/// Load a mapping-override file
pub fn load_mapping(path: &Path) -> Result<BundleMapping> {
    let display = path.display().to_string();
    if !path.is_file() {
        return Err(error::fs::not_found(display));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| error::fs::read_failed(&display, e.to_string()))?;
    let mapping = parse_mapping(&content).map_err(|e| match e {
        error::GatebundleError::ConfigParseFailed { reason, .. } => {
            error::config::parse_failed(&display, reason)
        }
        other => other,
    })?;
    tracing::debug!(path = %path.display(), entries = mapping.len(), "loaded mapping overrides");
    Ok(mapping)
}

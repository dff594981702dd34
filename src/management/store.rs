//! File-backed management target
//!
//! Persists an [`InMemoryGateway`] as a JSON document so that successive
//! CLI runs install against the same target. A missing file is an empty
//! target.

use std::io::Write;
use std::path::{Path, PathBuf};

use super::memory::GatewayState;
use super::{InMemoryGateway, ManagementInvoker, ManagementRequest, ManagementResponse};
use crate::error::{self, Result};

/// A gateway loaded from, and saved back to, a JSON file
#[derive(Debug)]
pub struct TargetStore {
    path: PathBuf,
    gateway: InMemoryGateway,
}

impl TargetStore {
    /// Load the target at `path`, or start an empty one rooted at `root_folder_id`
    pub fn open(path: &Path, root_folder_id: &str) -> Result<Self> {
        let state = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| error::fs::read_failed(path.display().to_string(), e.to_string()))?;
            serde_json::from_str(&content).map_err(|e| {
                error::config::parse_failed(path.display().to_string(), e.to_string())
            })?
        } else {
            tracing::debug!(path = %path.display(), "target store does not exist yet");
            GatewayState::new(root_folder_id)
        };

        Ok(Self {
            path: path.to_path_buf(),
            gateway: InMemoryGateway::from_state(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn gateway(&self) -> &InMemoryGateway {
        &self.gateway
    }

    /// Write the current state atomically
    pub fn save(&self) -> Result<()> {
        let write_failed =
            |reason: String| error::fs::write_failed(self.path.display().to_string(), reason);

        let json = serde_json::to_string_pretty(&self.gateway.state())?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| write_failed(e.to_string()))?;

        let mut file =
            tempfile::NamedTempFile::new_in(&dir).map_err(|e| write_failed(e.to_string()))?;
        file.write_all(json.as_bytes())
            .map_err(|e| write_failed(e.to_string()))?;
        file.persist(&self.path)
            .map_err(|e| write_failed(e.to_string()))?;

        tracing::debug!(path = %self.path.display(), "target store saved");
        Ok(())
    }
}

impl ManagementInvoker for TargetStore {
    fn execute(&self, request: &ManagementRequest) -> Result<ManagementResponse> {
        self.gateway.execute(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityCategory;
    use crate::management::EntityPayload;

    #[test]
    fn test_missing_file_is_empty_target() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = TargetStore::open(&temp.path().join("gateway.json"), "root").unwrap();
        assert_eq!(store.gateway().root_folder_id(), "root");
        assert_eq!(store.gateway().count(EntityCategory::Folder), 0);
    }

    #[test]
    fn test_save_and_reopen() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("state/gateway.json");

        let store = TargetStore::open(&path, "root").unwrap();
        store
            .execute(&ManagementRequest::create(EntityPayload::Folder {
                parent_id: "root".to_string(),
                name: "OAuth".to_string(),
            }))
            .unwrap();
        store.save().unwrap();

        let reopened = TargetStore::open(&path, "ignored").unwrap();
        assert_eq!(reopened.gateway().root_folder_id(), "root");
        assert_eq!(reopened.gateway().count(EntityCategory::Folder), 1);
        assert_eq!(reopened.gateway().state(), store.gateway().state());
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("gateway.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = TargetStore::open(&path, "root").unwrap_err();
        assert!(matches!(
            err,
            crate::error::GatebundleError::ConfigParseFailed { .. }
        ));
    }
}

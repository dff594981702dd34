//! Installer configuration (gatebundle.yaml)
//!
//! Every field is optional. Values missing from the file fall back to
//! command line flags and then to built-in defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{self, Result};
use crate::management::DEFAULT_ROOT_FOLDER_ID;
use crate::references::variables::is_valid_name;

/// Config filename looked up in the current directory
pub const CONFIG_FILE: &str = "gatebundle.yaml";

/// Config filename inside the user's config directory
pub const USER_CONFIG_FILE: &str = "config.yaml";

/// Directory scanned for bundles when nothing else is configured
pub const DEFAULT_BUNDLES_DIR: &str = "bundles";

/// Target store used when nothing else is configured
pub const DEFAULT_TARGET: &str = "gateway.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallerConfig {
    /// Directory holding one sub-directory per bundle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundles_dir: Option<PathBuf>,

    /// JSON file holding the target's state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder_id: Option<String>,

    /// Folder path under the root that receives every bundle folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_folder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Mapping-override file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<PathBuf>,

    /// Deadline after which a running install is cancelled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Values of the `${install.NAME}` placeholders in policy bodies
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

impl InstallerConfig {
    /// Parse installer configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(Self::parse(yaml)?)
    }

    fn parse(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Load and validate a config file
    ///
    /// Relative paths inside the file are resolved against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        if !path.is_file() {
            return Err(error::config::not_found(display));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| error::config::read_failed(&display, e.to_string()))?;
        let config = Self::parse(&content)
            .map_err(|e| error::config::parse_failed(&display, e.to_string()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let config = config.relative_to(base);
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Find and load the config that applies to this invocation
    ///
    /// An explicit path must exist. Otherwise `./gatebundle.yaml` is tried,
    /// then the user's config directory, then defaults are used.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let user_config = dirs::config_dir().map(|dir| dir.join("gatebundle").join(USER_CONFIG_FILE));
        Self::discover_in(explicit, &cwd, user_config.as_deref())
    }

    fn discover_in(
        explicit: Option<&Path>,
        cwd: &Path,
        user_config: Option<&Path>,
    ) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = cwd.join(CONFIG_FILE);
        if local.is_file() {
            return Self::load(&local);
        }
        if let Some(user_config) = user_config.filter(|p| p.is_file()) {
            return Self::load(user_config);
        }

        tracing::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    fn relative_to(mut self, base: &Path) -> Self {
        for path in [&mut self.bundles_dir, &mut self.target, &mut self.mapping]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// `self` with every field `overrides` sets replaced
    ///
    /// Variables are merged name by name.
    #[must_use]
    pub fn overridden_by(self, overrides: InstallerConfig) -> Self {
        let mut variables = self.variables;
        variables.extend(overrides.variables);
        Self {
            bundles_dir: overrides.bundles_dir.or(self.bundles_dir),
            target: overrides.target.or(self.target),
            root_folder_id: overrides.root_folder_id.or(self.root_folder_id),
            install_folder: overrides.install_folder.or(self.install_folder),
            prefix: overrides.prefix.or(self.prefix),
            mapping: overrides.mapping.or(self.mapping),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
            variables,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(prefix) = &self.prefix {
            if prefix.contains('/') || prefix.chars().any(char::is_whitespace) {
                return Err(error::config::invalid(format!(
                    "prefix '{prefix}' may not contain '/' or whitespace"
                )));
            }
        }
        if self.timeout_secs == Some(0) {
            return Err(error::config::invalid("timeout_secs must be positive"));
        }
        if let Some(folder) = &self.install_folder {
            if !folder.starts_with('/') {
                return Err(error::config::invalid(format!(
                    "install_folder '{folder}' must be an absolute folder path"
                )));
            }
        }
        if self.root_folder_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(error::config::invalid("root_folder_id may not be empty"));
        }
        if let Some(name) = self.variables.keys().find(|name| !is_valid_name(name)) {
            return Err(error::config::invalid(format!(
                "variable name '{name}' may only contain letters, digits, '_', '-' and '.'"
            )));
        }
        Ok(())
    }

    pub fn bundles_dir(&self) -> PathBuf {
        self.bundles_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUNDLES_DIR))
    }

    pub fn target(&self) -> PathBuf {
        self.target
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET))
    }

    pub fn root_folder_id(&self) -> &str {
        self.root_folder_id.as_deref().unwrap_or(DEFAULT_ROOT_FOLDER_ID)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

//! Error types and handling for gatebundle
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`bundle`]: Bundle lookup and definition errors
//! - [`config`]: Configuration errors
//! - [`mapping`]: Mapping-override errors
//! - [`management`]: Management protocol errors
//! - [`install`]: Installation errors (resolution, folders, cancellation)
//! - [`reference`]: Policy document errors
//! - [`fs`]: File system errors

pub mod bundle;
pub mod config;
pub mod fs;
pub mod install;
pub mod management;
pub mod mapping;
pub mod reference;

#[cfg(test)]
mod tests;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for gatebundle operations
#[derive(Error, Diagnostic, Debug)]
pub enum GatebundleError {
    // Bundle errors
    #[error("Bundle '{name}' not found")]
    #[diagnostic(
        code(gatebundle::bundle::not_found),
        help("Run 'gatebundle list' to see the bundles available in the bundles directory")
    )]
    BundleNotFound { name: String },

    #[error("Invalid bundle '{bundle}': {message}")]
    #[diagnostic(code(gatebundle::bundle::invalid))]
    InvalidBundle { bundle: String, message: String },

    #[error("Circular reference between {category} definitions: {chain}")]
    #[diagnostic(
        code(gatebundle::bundle::circular),
        help("Break the cycle so that every reference points at a definition installed earlier")
    )]
    CircularReference { category: String, chain: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(gatebundle::config::not_found))]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(gatebundle::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(gatebundle::config::invalid))]
    ConfigInvalid { message: String },

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(gatebundle::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    // Mapping errors
    #[error("Invalid mapping for {category} '{source_id}': {message}")]
    #[diagnostic(
        code(gatebundle::mapping::invalid),
        help("'use_existing' needs a target; 'ignore' and 'delete' take none")
    )]
    InvalidMapping {
        category: String,
        source_id: String,
        message: String,
    },

    // Management protocol errors
    #[error("Management operation '{operation}' failed: {reason}")]
    #[diagnostic(code(gatebundle::management::fault))]
    ManagementFault { operation: String, reason: String },

    #[error("Unexpected response to '{operation}': {message}")]
    #[diagnostic(code(gatebundle::management::unexpected_response))]
    UnexpectedResponse { operation: String, message: String },

    #[error("Failed to reach target: {reason}")]
    #[diagnostic(code(gatebundle::management::transport))]
    TransportFailed { reason: String },

    // Installation errors
    #[error("{owner} references {category} '{reference}' which cannot be resolved")]
    #[diagnostic(
        code(gatebundle::install::unresolved_reference),
        help(
            "Install the bundle providing it first, add a 'use_existing' mapping, or run with --dry-run to list every missing dependency"
        )
    )]
    UnresolvedReference {
        owner: String,
        category: String,
        reference: String,
    },

    #[error("Failed to create folder '{path}': {reason}")]
    #[diagnostic(code(gatebundle::install::folder_failed))]
    FolderCreateFailed { path: String, reason: String },

    #[error("Installation cancelled during {stage}")]
    #[diagnostic(
        code(gatebundle::install::cancelled),
        help("Entities created before cancellation were kept; re-running the install reuses them")
    )]
    Cancelled { stage: String },

    #[error("{owner} was rejected before saving: {reason}")]
    #[diagnostic(
        code(gatebundle::install::pre_save_rejected),
        help("Define the missing value in the `variables` section of gatebundle.yaml or pass --var NAME=VALUE")
    )]
    PreSaveRejected { owner: String, reason: String },

    // Policy document errors
    #[error("Failed to parse policy document of {owner}: {reason}")]
    #[diagnostic(code(gatebundle::reference::parse_failed))]
    PolicyParseFailed { owner: String, reason: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(gatebundle::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}")]
    #[diagnostic(code(gatebundle::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(gatebundle::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(gatebundle::fs::io_error))]
    IoError { message: String },
}

impl GatebundleError {
    /// Whether this error reports a cooperative cancellation rather than a fault
    pub fn is_cancellation(&self) -> bool {
        matches!(self, GatebundleError::Cancelled { .. })
    }
}

impl From<std::io::Error> for GatebundleError {
    fn from(err: std::io::Error) -> Self {
        GatebundleError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for GatebundleError {
    fn from(err: serde_yaml::Error) -> Self {
        GatebundleError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for GatebundleError {
    fn from(err: serde_json::Error) -> Self {
        GatebundleError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, GatebundleError>;

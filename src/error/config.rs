//! Configuration-related errors

use super::GatebundleError;

/// Creates a configuration not found error
pub fn not_found(path: impl Into<String>) -> GatebundleError {
    GatebundleError::ConfigNotFound { path: path.into() }
}

/// Creates a configuration parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> GatebundleError {
    GatebundleError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid configuration error
pub fn invalid(message: impl Into<String>) -> GatebundleError {
    GatebundleError::ConfigInvalid {
        message: message.into(),
    }
}

/// Creates a configuration read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> GatebundleError {
    GatebundleError::ConfigReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

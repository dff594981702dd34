//! File system errors

use super::GatebundleError;

/// Creates a file not found error
pub fn not_found(path: impl Into<String>) -> GatebundleError {
    GatebundleError::FileNotFound { path: path.into() }
}

/// Creates a file read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> GatebundleError {
    GatebundleError::FileReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a file write failed error
pub fn write_failed(path: impl Into<String>, reason: impl Into<String>) -> GatebundleError {
    GatebundleError::FileWriteFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

//! Bundle-related errors

use super::GatebundleError;

/// Creates a bundle not found error
pub fn not_found(name: impl Into<String>) -> GatebundleError {
    GatebundleError::BundleNotFound { name: name.into() }
}

/// Creates an invalid bundle error
pub fn invalid(bundle: impl Into<String>, message: impl Into<String>) -> GatebundleError {
    GatebundleError::InvalidBundle {
        bundle: bundle.into(),
        message: message.into(),
    }
}

/// Creates a circular reference error
pub fn circular(category: impl Into<String>, chain: impl Into<String>) -> GatebundleError {
    GatebundleError::CircularReference {
        category: category.into(),
        chain: chain.into(),
    }
}

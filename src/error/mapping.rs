//! Mapping-override errors

use super::GatebundleError;

/// Creates an invalid mapping error
pub fn invalid(
    category: impl Into<String>,
    source_id: impl Into<String>,
    message: impl Into<String>,
) -> GatebundleError {
    GatebundleError::InvalidMapping {
        category: category.into(),
        source_id: source_id.into(),
        message: message.into(),
    }
}

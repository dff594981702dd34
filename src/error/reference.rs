//! Policy document errors

use super::GatebundleError;

/// Creates a policy document parse failed error
pub fn parse_failed(owner: impl Into<String>, reason: impl Into<String>) -> GatebundleError {
    GatebundleError::PolicyParseFailed {
        owner: owner.into(),
        reason: reason.into(),
    }
}

//! Installation errors

use super::GatebundleError;

/// Creates an unresolved reference error
pub fn unresolved(
    owner: impl Into<String>,
    category: impl Into<String>,
    reference: impl Into<String>,
) -> GatebundleError {
    GatebundleError::UnresolvedReference {
        owner: owner.into(),
        category: category.into(),
        reference: reference.into(),
    }
}

/// Creates a folder creation failed error
pub fn folder_failed(path: impl Into<String>, reason: impl Into<String>) -> GatebundleError {
    GatebundleError::FolderCreateFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a cancellation error
pub fn cancelled(stage: impl Into<String>) -> GatebundleError {
    GatebundleError::Cancelled {
        stage: stage.into(),
    }
}

/// Creates an error for a body refused right before it was saved
pub fn pre_save_rejected(owner: impl Into<String>, reason: impl Into<String>) -> GatebundleError {
    GatebundleError::PreSaveRejected {
        owner: owner.into(),
        reason: reason.into(),
    }
}

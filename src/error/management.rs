//! Management protocol errors

use super::GatebundleError;

/// Creates an error for a request the target answered with a fault status
pub fn fault(operation: impl Into<String>, reason: impl Into<String>) -> GatebundleError {
    GatebundleError::ManagementFault {
        operation: operation.into(),
        reason: reason.into(),
    }
}

/// Creates an error for a response document that does not fit the request
pub fn unexpected_response(
    operation: impl Into<String>,
    message: impl Into<String>,
) -> GatebundleError {
    GatebundleError::UnexpectedResponse {
        operation: operation.into(),
        message: message.into(),
    }
}

/// Creates a transport failure error
pub fn transport(reason: impl Into<String>) -> GatebundleError {
    GatebundleError::TransportFailed {
        reason: reason.into(),
    }
}

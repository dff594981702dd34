//! Management protocol boundary
//!
//! The installer talks to the target exclusively through a
//! [`ManagementInvoker`]: it sends typed request documents (enumerate by
//! key, create, set version comment) and reads back a status plus a response
//! document. How requests travel to the target is up to the invoker.
//!
//! - [`memory`]: an in-process gateway with the uniqueness rules of a real one
//! - [`store`]: a JSON file that persists such a gateway between runs

pub mod memory;
pub mod store;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::EntityCategory;
use crate::error::Result;

pub use memory::{FaultRule, InMemoryGateway, StoredEntity};
pub use store::TargetStore;

/// Id of the root folder of a freshly created target
pub const DEFAULT_ROOT_FOLDER_ID: &str = "root";

/// Natural key used to look an entity up on the target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Selector {
    FolderChild { parent_id: String, name: String },
    Name { name: String },
    Guid { guid: String },
    IssuerSerial { issuer: String, serial: String },
    ResolutionUri { uri: String },
}

/// Everything the target needs to create one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum EntityPayload {
    Folder {
        parent_id: String,
        name: String,
    },
    TrustedCertificate {
        name: String,
        issuer: String,
        serial: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pem: Option<String>,
    },
    JdbcConnection {
        name: String,
    },
    EncapsulatedAssertion {
        name: String,
        guid: String,
        folder_id: String,
        policy: String,
    },
    Policy {
        name: String,
        guid: String,
        folder_id: String,
        policy: String,
    },
    Service {
        name: String,
        folder_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
        policy: String,
    },
}

impl EntityPayload {
    pub fn category(&self) -> EntityCategory {
        match self {
            EntityPayload::Folder { .. } => EntityCategory::Folder,
            EntityPayload::TrustedCertificate { .. } => EntityCategory::TrustedCertificate,
            EntityPayload::JdbcConnection { .. } => EntityCategory::JdbcConnection,
            EntityPayload::EncapsulatedAssertion { .. } => EntityCategory::EncapsulatedAssertion,
            EntityPayload::Policy { .. } => EntityCategory::Policy,
            EntityPayload::Service { .. } => EntityCategory::Service,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EntityPayload::Folder { name, .. }
            | EntityPayload::TrustedCertificate { name, .. }
            | EntityPayload::JdbcConnection { name }
            | EntityPayload::EncapsulatedAssertion { name, .. }
            | EntityPayload::Policy { name, .. }
            | EntityPayload::Service { name, .. } => name,
        }
    }

    pub fn guid(&self) -> Option<&str> {
        match self {
            EntityPayload::EncapsulatedAssertion { guid, .. }
            | EntityPayload::Policy { guid, .. } => Some(guid),
            _ => None,
        }
    }

    pub fn uri(&self) -> Option<&str> {
        match self {
            EntityPayload::Service { uri, .. } => uri.as_deref(),
            _ => None,
        }
    }

    /// Folder the entity lives in, or the parent of a folder
    pub fn folder_id(&self) -> Option<&str> {
        match self {
            EntityPayload::Folder { parent_id, .. } => Some(parent_id),
            EntityPayload::EncapsulatedAssertion { folder_id, .. }
            | EntityPayload::Policy { folder_id, .. }
            | EntityPayload::Service { folder_id, .. } => Some(folder_id),
            EntityPayload::TrustedCertificate { .. } | EntityPayload::JdbcConnection { .. } => {
                None
            }
        }
    }

    /// The key the target keeps unique for this category, if any
    pub fn natural_key(&self) -> Option<Selector> {
        match self {
            EntityPayload::Folder { parent_id, name } => Some(Selector::FolderChild {
                parent_id: parent_id.clone(),
                name: name.clone(),
            }),
            EntityPayload::TrustedCertificate { issuer, serial, .. } => {
                Some(Selector::IssuerSerial {
                    issuer: issuer.clone(),
                    serial: serial.clone(),
                })
            }
            EntityPayload::JdbcConnection { name }
            | EntityPayload::EncapsulatedAssertion { name, .. }
            | EntityPayload::Policy { name, .. } => Some(Selector::Name { name: name.clone() }),
            EntityPayload::Service { uri, .. } => uri
                .as_ref()
                .map(|uri| Selector::ResolutionUri { uri: uri.clone() }),
        }
    }
}

/// One management operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Enumerate {
        category: EntityCategory,
        selector: Selector,
    },
    Create {
        payload: EntityPayload,
    },
    SetVersionComment {
        category: EntityCategory,
        id: String,
        comment: String,
    },
}

impl Operation {
    /// Short description used in logs and error messages
    pub fn describe(&self) -> String {
        match self {
            Operation::Enumerate { category, .. } => format!("enumerate {}", category.plural()),
            Operation::Create { payload } => {
                format!("create {} '{}'", payload.category(), payload.name())
            }
            Operation::SetVersionComment { category, id, .. } => {
                format!("set version comment of {category} {id}")
            }
        }
    }

    pub fn is_mutating(&self) -> bool {
        !matches!(self, Operation::Enumerate { .. })
    }
}

/// A request document with its message id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementRequest {
    pub message_id: Uuid,
    pub operation: Operation,
}

impl ManagementRequest {
    pub fn new(operation: Operation) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            operation,
        }
    }

    pub fn enumerate(category: EntityCategory, selector: Selector) -> Self {
        Self::new(Operation::Enumerate { category, selector })
    }

    pub fn create(payload: EntityPayload) -> Self {
        Self::new(Operation::Create { payload })
    }

    pub fn set_version_comment(
        category: EntityCategory,
        id: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self::new(Operation::SetVersionComment {
            category,
            id: id.into(),
            comment: comment.into(),
        })
    }
}

/// What the target reports back about one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    /// A create collided with an entity holding the same natural key
    AlreadyExists,
    Fault {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "document", content = "body", rename_all = "snake_case")]
pub enum ResponseDocument {
    NoResults,
    Entities(Vec<EntitySummary>),
    Created(EntitySummary),
    Acknowledged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementResponse {
    pub status: ResponseStatus,
    pub document: ResponseDocument,
}

impl ManagementResponse {
    pub fn success(document: ResponseDocument) -> Self {
        Self {
            status: ResponseStatus::Success,
            document,
        }
    }

    pub fn already_exists() -> Self {
        Self {
            status: ResponseStatus::AlreadyExists,
            document: ResponseDocument::NoResults,
        }
    }

    pub fn fault(reason: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Fault {
                reason: reason.into(),
            },
            document: ResponseDocument::NoResults,
        }
    }
}

/// Executes management requests against a target
///
/// Retries and timeouts belong to implementations. An `Err` means the
/// request never got an answer; an answered request that failed comes back
/// as a [`ResponseStatus::Fault`].
pub trait ManagementInvoker {
    fn execute(&self, request: &ManagementRequest) -> Result<ManagementResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_keys() {
        let folder = EntityPayload::Folder {
            parent_id: "root".to_string(),
            name: "A".to_string(),
        };
        assert_eq!(
            folder.natural_key(),
            Some(Selector::FolderChild {
                parent_id: "root".to_string(),
                name: "A".to_string()
            })
        );

        let service = EntityPayload::Service {
            name: "s".to_string(),
            folder_id: "root".to_string(),
            uri: None,
            policy: String::new(),
        };
        assert_eq!(service.natural_key(), None);
    }

    #[test]
    fn test_requests_get_unique_message_ids() {
        let a = ManagementRequest::enumerate(
            EntityCategory::Policy,
            Selector::Name {
                name: "x".to_string(),
            },
        );
        let b = a.clone();
        let c = ManagementRequest::new(a.operation.clone());
        assert_eq!(a, b);
        assert_ne!(a.message_id, c.message_id);
    }

    #[test]
    fn test_operation_descriptions() {
        let op = Operation::Create {
            payload: EntityPayload::Policy {
                name: "Token".to_string(),
                guid: "g".to_string(),
                folder_id: "1".to_string(),
                policy: String::new(),
            },
        };
        assert_eq!(op.describe(), "create policy 'Token'");
        assert!(op.is_mutating());
        assert!(
            !Operation::Enumerate {
                category: EntityCategory::Folder,
                selector: Selector::Name {
                    name: "A".to_string()
                },
            }
            .is_mutating()
        );
    }

    #[test]
    fn test_request_serializes_to_json() {
        let request = ManagementRequest::set_version_comment(EntityCategory::Service, "7", "c");
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"op\":\"set_version_comment\""));
        let parsed: ManagementRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, request);
    }
}

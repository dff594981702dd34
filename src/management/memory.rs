//! In-process management target
//!
//! [`InMemoryGateway`] answers management requests the way a gateway does:
//! it keeps natural keys unique, rejects entities placed in unknown folders
//! and numbers new entities sequentially. Every executed operation is kept
//! in a journal, and [`FaultRule`]s make selected requests fail.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    DEFAULT_ROOT_FOLDER_ID, EntityPayload, EntitySummary, ManagementInvoker, ManagementRequest,
    ManagementResponse, Operation, ResponseDocument, Selector,
};
use crate::domain::EntityCategory;
use crate::error::Result;

/// An entity held by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntity {
    pub id: String,
    pub entity: EntityPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_comment: Option<String>,
}

impl StoredEntity {
    fn summary(&self) -> EntitySummary {
        EntitySummary {
            id: self.id.clone(),
            name: self.entity.name().to_string(),
            guid: self.entity.guid().map(str::to_string),
            uri: self.entity.uri().map(str::to_string),
        }
    }

    fn matches(&self, category: EntityCategory, selector: &Selector) -> bool {
        if self.entity.category() != category {
            return false;
        }
        match selector {
            Selector::FolderChild { parent_id, name } => {
                self.entity.folder_id() == Some(parent_id.as_str()) && self.entity.name() == name
            }
            Selector::Name { name } => self.entity.name() == name,
            Selector::Guid { guid } => self.entity.guid() == Some(guid.as_str()),
            Selector::IssuerSerial { issuer, serial } => matches!(
                &self.entity,
                EntityPayload::TrustedCertificate { issuer: i, serial: s, .. }
                    if i == issuer && s == serial
            ),
            Selector::ResolutionUri { uri } => self.entity.uri() == Some(uri.as_str()),
        }
    }
}

/// Serializable contents of a gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayState {
    pub root_folder_id: String,
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub entities: Vec<StoredEntity>,
}

impl GatewayState {
    pub fn new(root_folder_id: impl Into<String>) -> Self {
        Self {
            root_folder_id: root_folder_id.into(),
            next_id: 1,
            entities: Vec::new(),
        }
    }

    fn is_folder(&self, id: &str) -> bool {
        id == self.root_folder_id
            || self
                .entities
                .iter()
                .any(|e| e.id == id && e.entity.category() == EntityCategory::Folder)
    }

    fn insert(&mut self, mut entity: EntityPayload) -> EntitySummary {
        if let EntityPayload::EncapsulatedAssertion { guid, .. } | EntityPayload::Policy { guid, .. } =
            &mut entity
        {
            if guid.is_empty() {
                *guid = Uuid::new_v4().to_string();
            }
        }
        let stored = StoredEntity {
            id: self.next_id.max(1).to_string(),
            entity,
            version_comment: None,
        };
        self.next_id = self.next_id.max(1) + 1;
        let summary = stored.summary();
        self.entities.push(stored);
        summary
    }
}

impl Default for GatewayState {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_FOLDER_ID)
    }
}

/// Requests the gateway should fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultRule {
    /// Answer creates of this category with a fault
    Create(EntityCategory),
    /// Answer every version comment update with a fault
    VersionComment,
    /// Let a concurrent writer create the entity first, then report the collision
    ConcurrentCreate(EntityCategory),
    /// Fail every request without answering
    Transport,
}

/// Management target held in memory
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: RefCell<GatewayState>,
    journal: RefCell<Vec<Operation>>,
    faults: RefCell<Vec<FaultRule>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: GatewayState) -> Self {
        Self {
            state: RefCell::new(state),
            ..Self::default()
        }
    }

    pub fn root_folder_id(&self) -> String {
        self.state.borrow().root_folder_id.clone()
    }

    pub fn state(&self) -> GatewayState {
        self.state.borrow().clone()
    }

    /// Add an entity directly, as if someone else had created it
    pub fn seed(&self, entity: EntityPayload) -> EntitySummary {
        self.state.borrow_mut().insert(entity)
    }

    pub fn inject(&self, rule: FaultRule) {
        self.faults.borrow_mut().push(rule);
    }

    pub fn clear_faults(&self) {
        self.faults.borrow_mut().clear();
    }

    /// Stored entities of one category, in creation order
    pub fn entities(&self, category: EntityCategory) -> Vec<StoredEntity> {
        self.state
            .borrow()
            .entities
            .iter()
            .filter(|e| e.entity.category() == category)
            .cloned()
            .collect()
    }

    pub fn count(&self, category: EntityCategory) -> usize {
        self.entities(category).len()
    }

    /// Every operation executed so far
    pub fn journal(&self) -> Vec<Operation> {
        self.journal.borrow().clone()
    }

    /// Number of create operations executed so far
    pub fn create_calls(&self) -> usize {
        self.journal
            .borrow()
            .iter()
            .filter(|op| matches!(op, Operation::Create { .. }))
            .count()
    }

    pub fn mutating_calls(&self) -> usize {
        self.journal.borrow().iter().filter(|op| op.is_mutating()).count()
    }

    fn has_fault(&self, rule: &FaultRule) -> bool {
        self.faults.borrow().contains(rule)
    }

    fn enumerate(&self, category: EntityCategory, selector: &Selector) -> ManagementResponse {
        let found: Vec<EntitySummary> = self
            .state
            .borrow()
            .entities
            .iter()
            .filter(|e| e.matches(category, selector))
            .map(StoredEntity::summary)
            .collect();
        if found.is_empty() {
            ManagementResponse::success(ResponseDocument::NoResults)
        } else {
            ManagementResponse::success(ResponseDocument::Entities(found))
        }
    }

    fn create(&self, payload: &EntityPayload) -> ManagementResponse {
        let category = payload.category();
        if self.has_fault(&FaultRule::Create(category)) {
            return ManagementResponse::fault(format!("creating {category} is not permitted"));
        }

        let mut state = self.state.borrow_mut();
        if let Some(folder_id) = payload.folder_id() {
            if !state.is_folder(folder_id) {
                return ManagementResponse::fault(format!("folder {folder_id} does not exist"));
            }
        }

        if let Some(key) = payload.natural_key() {
            if self.has_fault(&FaultRule::ConcurrentCreate(category)) {
                state.insert(payload.clone());
                return ManagementResponse::already_exists();
            }
            if state.entities.iter().any(|e| e.matches(category, &key)) {
                return ManagementResponse::already_exists();
            }
        }

        ManagementResponse::success(ResponseDocument::Created(state.insert(payload.clone())))
    }

    fn set_version_comment(
        &self,
        category: EntityCategory,
        id: &str,
        comment: &str,
    ) -> ManagementResponse {
        if self.has_fault(&FaultRule::VersionComment) {
            return ManagementResponse::fault("version comments are read-only");
        }
        let mut state = self.state.borrow_mut();
        match state
            .entities
            .iter_mut()
            .find(|e| e.id == id && e.entity.category() == category)
        {
            Some(entity) => {
                entity.version_comment = Some(comment.to_string());
                ManagementResponse::success(ResponseDocument::Acknowledged)
            }
            None => ManagementResponse::fault(format!("no {category} with id {id}")),
        }
    }
}

impl ManagementInvoker for InMemoryGateway {
    fn execute(&self, request: &ManagementRequest) -> Result<ManagementResponse> {
        if self.has_fault(&FaultRule::Transport) {
            return Err(crate::error::management::transport("gateway unreachable"));
        }
        self.journal.borrow_mut().push(request.operation.clone());

        let response = match &request.operation {
            Operation::Enumerate { category, selector } => self.enumerate(*category, selector),
            Operation::Create { payload } => self.create(payload),
            Operation::SetVersionComment {
                category,
                id,
                comment,
            } => self.set_version_comment(*category, id, comment),
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::management::ResponseStatus;

    fn folder(parent: &str, name: &str) -> EntityPayload {
        EntityPayload::Folder {
            parent_id: parent.to_string(),
            name: name.to_string(),
        }
    }

    fn create(gateway: &InMemoryGateway, payload: EntityPayload) -> ManagementResponse {
        gateway.execute(&ManagementRequest::create(payload)).unwrap()
    }

    #[test]
    fn test_create_then_enumerate() {
        let gateway = InMemoryGateway::new();
        let response = create(&gateway, folder("root", "A"));
        let ResponseDocument::Created(created) = response.document else {
            panic!("expected a created document");
        };
        assert_eq!(created.id, "1");

        let found = gateway
            .execute(&ManagementRequest::enumerate(
                EntityCategory::Folder,
                Selector::FolderChild {
                    parent_id: "root".to_string(),
                    name: "A".to_string(),
                },
            ))
            .unwrap();
        assert_eq!(found.document, ResponseDocument::Entities(vec![created]));
    }

    #[test]
    fn test_enumerate_without_match_returns_no_results() {
        let gateway = InMemoryGateway::new();
        let response = gateway
            .execute(&ManagementRequest::enumerate(
                EntityCategory::Policy,
                Selector::Name {
                    name: "missing".to_string(),
                },
            ))
            .unwrap();
        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(response.document, ResponseDocument::NoResults);
    }

    #[test]
    fn test_duplicate_natural_key_is_already_exists() {
        let gateway = InMemoryGateway::new();
        create(&gateway, folder("root", "A"));
        let response = create(&gateway, folder("root", "A"));
        assert_eq!(response.status, ResponseStatus::AlreadyExists);
        assert_eq!(gateway.count(EntityCategory::Folder), 1);
    }

    #[test]
    fn test_unknown_parent_is_a_fault() {
        let gateway = InMemoryGateway::new();
        let response = create(&gateway, folder("42", "A"));
        assert!(matches!(response.status, ResponseStatus::Fault { .. }));
    }

    #[test]
    fn test_policy_without_guid_gets_one() {
        let gateway = InMemoryGateway::new();
        let response = create(
            &gateway,
            EntityPayload::Policy {
                name: "p".to_string(),
                guid: String::new(),
                folder_id: "root".to_string(),
                policy: "<Policy/>".to_string(),
            },
        );
        let ResponseDocument::Created(created) = response.document else {
            panic!("expected a created document");
        };
        assert_eq!(created.guid.map(|g| g.len()), Some(36));
    }

    #[test]
    fn test_fault_rules() {
        let gateway = InMemoryGateway::new();
        gateway.inject(FaultRule::Create(EntityCategory::Folder));
        assert!(matches!(
            create(&gateway, folder("root", "A")).status,
            ResponseStatus::Fault { .. }
        ));

        gateway.clear_faults();
        gateway.inject(FaultRule::ConcurrentCreate(EntityCategory::Folder));
        assert_eq!(
            create(&gateway, folder("root", "A")).status,
            ResponseStatus::AlreadyExists
        );
        assert_eq!(gateway.count(EntityCategory::Folder), 1);

        gateway.clear_faults();
        gateway.inject(FaultRule::Transport);
        assert!(
            gateway
                .execute(&ManagementRequest::create(folder("root", "B")))
                .is_err()
        );
    }

    #[test]
    fn test_version_comment() {
        let gateway = InMemoryGateway::new();
        create(&gateway, folder("root", "A"));
        let response = gateway
            .execute(&ManagementRequest::set_version_comment(
                EntityCategory::Folder,
                "1",
                "Bundle x",
            ))
            .unwrap();
        assert_eq!(response.document, ResponseDocument::Acknowledged);
        assert_eq!(
            gateway.entities(EntityCategory::Folder)[0]
                .version_comment
                .as_deref(),
            Some("Bundle x")
        );
        assert_eq!(gateway.mutating_calls(), 2);
        assert_eq!(gateway.create_calls(), 1);
    }
}

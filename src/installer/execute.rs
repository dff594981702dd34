//! Mutating calls, performed or planned
//!
//! The installers share one pipeline for real runs and dry runs. The only
//! difference is the [`Execute`] capability they are handed: [`LiveExecute`]
//! sends creates and version comments to the target, [`DryRunExecute`]
//! records what it would have sent and answers with synthesized ids.
//!
//! A create that collides with an existing natural key is answered with
//! [`CreateResponse::Duplicate`]; looking up the holder is a separate remote
//! call, made by the caller.

use std::cell::{Cell, RefCell};

use crate::domain::{EntityCategory, PlannedAction, PlannedKind};
use crate::error::{self, Result};
use crate::management::{
    EntityPayload, EntitySummary, ManagementInvoker, ManagementRequest, ResponseDocument,
    ResponseStatus, Selector,
};

/// Prefix of every id a dry run synthesizes
pub const PLANNED_ID_PREFIX: &str = "dry-run:";

/// How a create call ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Creation {
    Created(EntitySummary),
    /// The target already held the natural key; the existing entity is reused
    Existing(EntitySummary),
}

/// What the target answered to a create
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateResponse {
    Created(EntitySummary),
    /// Another entity already holds this natural key
    Duplicate(Selector),
}

/// Performs or plans the mutating calls of an install
pub trait Execute {
    /// Create one entity; `label` names it in plans and logs
    fn create(
        &self,
        invoker: &dyn ManagementInvoker,
        payload: EntityPayload,
        label: &str,
    ) -> Result<CreateResponse>;

    fn set_version_comment(
        &self,
        invoker: &dyn ManagementInvoker,
        category: EntityCategory,
        id: &str,
        comment: &str,
        label: &str,
    ) -> Result<()>;

    /// Whether `id` was synthesized instead of assigned by the target
    fn is_planned(&self, id: &str) -> bool {
        let _ = id;
        false
    }

    /// The mutating calls recorded so far, oldest first
    fn take_planned(&self) -> Vec<PlannedAction> {
        Vec::new()
    }
}

/// Sends every call to the target
#[derive(Debug, Default)]
pub struct LiveExecute;

impl Execute for LiveExecute {
    fn create(
        &self,
        invoker: &dyn ManagementInvoker,
        payload: EntityPayload,
        _label: &str,
    ) -> Result<CreateResponse> {
        let natural_key = payload.natural_key();
        let request = ManagementRequest::create(payload);
        let operation = request.operation.describe();
        tracing::debug!(message_id = %request.message_id, %operation, "management request");

        let response = invoker.execute(&request)?;
        match (response.status, response.document) {
            (ResponseStatus::Success, ResponseDocument::Created(summary)) => {
                Ok(CreateResponse::Created(summary))
            }
            (ResponseStatus::AlreadyExists, _) => natural_key
                .map(CreateResponse::Duplicate)
                .ok_or_else(|| {
                    error::management::unexpected_response(
                        operation,
                        "duplicate reported for an entity without a natural key",
                    )
                }),
            (ResponseStatus::Fault { reason }, _) => Err(error::management::fault(operation, reason)),
            (ResponseStatus::Success, document) => Err(error::management::unexpected_response(
                operation,
                format!("expected the created entity, got {document:?}"),
            )),
        }
    }

    fn set_version_comment(
        &self,
        invoker: &dyn ManagementInvoker,
        category: EntityCategory,
        id: &str,
        comment: &str,
        _label: &str,
    ) -> Result<()> {
        let request = ManagementRequest::set_version_comment(category, id, comment);
        let operation = request.operation.describe();
        tracing::debug!(message_id = %request.message_id, %operation, "management request");

        let response = invoker.execute(&request)?;
        match response.status {
            ResponseStatus::Success => Ok(()),
            ResponseStatus::Fault { reason } => Err(error::management::fault(operation, reason)),
            ResponseStatus::AlreadyExists => Err(error::management::unexpected_response(
                operation,
                "duplicate reported for a metadata update",
            )),
        }
    }
}

/// Records every mutating call instead of sending it
#[derive(Debug, Default)]
pub struct DryRunExecute {
    planned: RefCell<Vec<PlannedAction>>,
    next_id: Cell<usize>,
}

impl DryRunExecute {
    pub fn new() -> Self {
        Self::default()
    }

    fn synthesize_id(&self, category: EntityCategory) -> String {
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        let category = category.label().to_lowercase().replace(' ', "_");
        format!("{PLANNED_ID_PREFIX}{category}:{n}")
    }

    fn plan(&self, kind: PlannedKind, category: EntityCategory, label: &str) {
        self.planned.borrow_mut().push(PlannedAction {
            kind,
            category,
            name: label.to_string(),
        });
    }
}

impl Execute for DryRunExecute {
    fn create(
        &self,
        _invoker: &dyn ManagementInvoker,
        payload: EntityPayload,
        label: &str,
    ) -> Result<CreateResponse> {
        let category = payload.category();
        self.plan(PlannedKind::Create, category, label);
        Ok(CreateResponse::Created(EntitySummary {
            id: self.synthesize_id(category),
            name: payload.name().to_string(),
            guid: payload.guid().map(str::to_string),
            uri: payload.uri().map(str::to_string),
        }))
    }

    fn set_version_comment(
        &self,
        _invoker: &dyn ManagementInvoker,
        category: EntityCategory,
        _id: &str,
        _comment: &str,
        label: &str,
    ) -> Result<()> {
        self.plan(PlannedKind::SetVersionComment, category, label);
        Ok(())
    }

    fn is_planned(&self, id: &str) -> bool {
        id.starts_with(PLANNED_ID_PREFIX)
    }

    fn take_planned(&self) -> Vec<PlannedAction> {
        self.planned.take()
    }
}

//! The installer's side of the management session
//!
//! Every remote call of an install goes through [`Remote`], which polls the
//! cancellation predicate right before the call and turns response
//! documents into lookups and creations.

use std::cell::Cell;

use super::context::InstallationContext;
use super::execute::{CreateResponse, Creation, Execute};
use super::stage::InstallStage;
use crate::domain::EntityCategory;
use crate::error::{self, Result};
use crate::management::{
    EntityPayload, EntitySummary, ManagementInvoker, ManagementRequest, ResponseDocument,
    ResponseStatus, Selector,
};

/// Entities of `category` matching `selector`
pub(crate) fn enumerate(
    invoker: &dyn ManagementInvoker,
    category: EntityCategory,
    selector: &Selector,
) -> Result<Vec<EntitySummary>> {
    let request = ManagementRequest::enumerate(category, selector.clone());
    let operation = request.operation.describe();
    tracing::debug!(message_id = %request.message_id, %operation, ?selector, "management request");

    let response = invoker.execute(&request)?;
    match (response.status, response.document) {
        (ResponseStatus::Success, ResponseDocument::NoResults) => Ok(Vec::new()),
        (ResponseStatus::Success, ResponseDocument::Entities(found)) => Ok(found),
        (ResponseStatus::Fault { reason }, _) => Err(error::management::fault(operation, reason)),
        (status, document) => Err(error::management::unexpected_response(
            operation,
            format!("{status:?} with {document:?}"),
        )),
    }
}

pub(crate) struct Remote<'a> {
    ctx: &'a InstallationContext<'a>,
    executor: &'a dyn Execute,
    stage: Cell<InstallStage>,
}

impl<'a> Remote<'a> {
    pub(crate) fn new(ctx: &'a InstallationContext<'a>, executor: &'a dyn Execute) -> Self {
        Self {
            ctx,
            executor,
            stage: Cell::new(InstallStage::Idle),
        }
    }

    pub(crate) fn ctx(&self) -> &'a InstallationContext<'a> {
        self.ctx
    }

    pub(crate) fn enter(&self, stage: InstallStage) {
        self.stage.set(stage);
    }

    pub(crate) fn stage(&self) -> InstallStage {
        self.stage.get()
    }

    pub(crate) fn is_dry_run(&self) -> bool {
        self.ctx.is_dry_run()
    }

    /// Whether `id` belongs to an entity a dry run only planned
    pub(crate) fn is_planned(&self, id: &str) -> bool {
        self.executor.is_planned(id)
    }

    fn checkpoint(&self) -> Result<()> {
        if self.ctx.is_cancelled() {
            let stage = self.stage();
            tracing::info!(%stage, "cancellation requested");
            return Err(error::install::cancelled(stage.describe()));
        }
        Ok(())
    }

    /// The first entity matching `selector`, if any
    ///
    /// Children of a planned folder cannot exist yet, so those lookups are
    /// answered without asking the target.
    pub(crate) fn find(
        &self,
        category: EntityCategory,
        selector: Selector,
    ) -> Result<Option<EntitySummary>> {
        if matches!(&selector, Selector::FolderChild { parent_id, .. } if self.is_planned(parent_id))
        {
            return Ok(None);
        }
        self.checkpoint()?;

        let mut found = enumerate(self.ctx.invoker(), category, &selector)?;
        if found.len() > 1 {
            tracing::warn!(%category, ?selector, matches = found.len(), "lookup is ambiguous, using the first match");
        }
        Ok((!found.is_empty()).then(|| found.swap_remove(0)))
    }

    /// First match of the first selector that matches anything
    pub(crate) fn find_any(
        &self,
        category: EntityCategory,
        selectors: impl IntoIterator<Item = Selector>,
    ) -> Result<Option<EntitySummary>> {
        for selector in selectors {
            if let Some(found) = self.find(category, selector)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Create `payload`, or reuse the entity a concurrent writer created first
    pub(crate) fn create(&self, payload: EntityPayload, label: &str) -> Result<Creation> {
        self.checkpoint()?;
        let category = payload.category();
        let creation = match self.executor.create(self.ctx.invoker(), payload, label)? {
            CreateResponse::Created(summary) => Creation::Created(summary),
            CreateResponse::Duplicate(key) => {
                tracing::debug!(%category, name = label, "create lost a race, looking up the winner");
                let found = self.find(category, key)?.ok_or_else(|| {
                    error::management::unexpected_response(
                        format!("create {category} '{label}'"),
                        "duplicate reported but no entity holds the key",
                    )
                })?;
                Creation::Existing(found)
            }
        };
        match &creation {
            Creation::Created(summary) => {
                tracing::info!(%category, name = label, id = %summary.id, dry_run = self.is_dry_run(), "created");
            }
            Creation::Existing(summary) => {
                tracing::debug!(%category, name = label, id = %summary.id, "reused after concurrent create");
            }
        }
        Ok(creation)
    }

    /// Stamp a created entity with the bundle's version comment
    ///
    /// Only cancellation is returned as an error; a failed update is logged.
    pub(crate) fn set_version_comment(
        &self,
        category: EntityCategory,
        id: &str,
        label: &str,
    ) -> Result<()> {
        self.checkpoint()?;
        let comment = self.ctx.bundle().version_comment();
        if let Err(e) =
            self.executor
                .set_version_comment(self.ctx.invoker(), category, id, &comment, label)
        {
            tracing::warn!(%category, name = label, error = %e, "failed to set version comment");
        }
        Ok(())
    }
}

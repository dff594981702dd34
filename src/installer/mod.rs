//! Bundle installation
//!
//! This module handles:
//! - Running the per-category installers in dependency order
//! - Threading the [`IdentifierMap`] from one stage to the next
//! - Resolving and rewriting references inside policy bodies
//! - Dry runs, which plan mutating calls instead of sending them
//! - Cooperative cancellation, polled before every remote call
//!
//! ## Stages
//!
//! ```text
//! Idle -> ResolvingPrerequisites -> InstallingFolders -> InstallingCertificates
//!      -> InstallingConnections -> InstallingEncapsulatedAssertions
//!      -> InstallingPolicies -> InstallingServices -> Done
//! ```
//!
//! Any stage can end the install as failed or cancelled. Entities created
//! up to that point stay on the target and are reported in the partial
//! result of the [`InstallFailure`].

mod certificate;
pub mod context;
mod encass;
pub mod execute;
mod folder;
pub mod jdbc;
mod ordering;
mod policy;
mod remote;
mod resolution;
mod service;
pub mod stage;


use miette::Diagnostic;
use thiserror::Error;

use crate::domain::{BundleContents, EntityCategory, InstallResult};
use crate::error::{self, GatebundleError, Result};
use crate::identifiers::{IdentifierMap, StageIdentifiers};
use crate::references::PolicyXml;
use crate::ui::StageReporter;

pub use context::{InstallationContext, PendingBody};
pub use execute::{CreateResponse, DryRunExecute, Execute, LiveExecute};
pub use stage::{InstallOutcome, InstallStage};

use remote::Remote;
use resolution::{Owner, PolicyIncludes, ReferenceEngine};

/// An install that stopped before [`InstallStage::Done`]
#[derive(Debug, Error)]
#[error("Install of bundle '{}' {outcome} during {stage}: {error}", .partial.bundle_id)]
pub struct InstallFailure {
    pub outcome: InstallOutcome,
    pub stage: InstallStage,
    pub error: GatebundleError,
    /// Everything committed before the install stopped
    pub partial: Box<InstallResult>,
}

impl InstallFailure {
    fn new(stage: InstallStage, error: GatebundleError, partial: InstallResult) -> Self {
        let outcome = if error.is_cancellation() {
            InstallOutcome::Cancelled
        } else {
            InstallOutcome::Failed
        };
        Self {
            outcome,
            stage,
            error,
            partial: Box::new(partial),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.outcome == InstallOutcome::Cancelled
    }
}

impl Diagnostic for InstallFailure {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.error.code()
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.error.help()
    }
}

/// Shared state of the stage that is running
pub(crate) struct StageRun<'s> {
    remote: &'s Remote<'s>,
    engine: &'s ReferenceEngine<'s>,
    contents: &'s BundleContents,
    ids: StageIdentifiers<'s>,
    result: &'s mut InstallResult,
}

impl<'s> StageRun<'s> {
    fn ctx(&self) -> &'s InstallationContext<'s> {
        self.remote.ctx()
    }

    fn prepare_body(
        &mut self,
        owner: Owner<'_>,
        body: &str,
        includes: PolicyIncludes,
    ) -> Result<String> {
        let body = self
            .engine
            .prepare_body(self.ids.read(), owner, body, includes, self.result)?;
        match owner.category {
            EntityCategory::Policy | EntityCategory::Service => {
                self.ctx().pre_save(owner.category, owner.name, body)
            }
            _ => Ok(body),
        }
    }

    /// Target id of a bundle folder installed by an earlier stage
    fn folder_id(&self, path: &str, owner: Owner<'_>) -> Result<String> {
        self.ids
            .read()
            .id(EntityCategory::Folder, path)
            .map(str::to_string)
            .ok_or_else(|| {
                error::bundle::invalid(
                    &self.ctx().bundle().id,
                    format!("folder '{path}' of {owner} was not installed"),
                )
            })
    }
}

/// Runs the install stages of one bundle
#[derive(Default)]
pub struct BundleInstaller<'r> {
    reporter: Option<&'r mut dyn StageReporter>,
}

impl<'r> BundleInstaller<'r> {
    pub fn new() -> Self {
        Self { reporter: None }
    }

    pub fn with_reporter(reporter: &'r mut dyn StageReporter) -> Self {
        Self {
            reporter: Some(reporter),
        }
    }

    /// Install the bundle of `ctx`, or plan its install when it is a dry run
    ///
    /// # Errors
    ///
    /// Returns an [`InstallFailure`] naming the stage that failed or was
    /// cancelled, with the partial result committed up to then.
    pub fn install(
        &mut self,
        ctx: &InstallationContext<'_>,
    ) -> std::result::Result<InstallResult, InstallFailure> {
        let bundle = ctx.bundle();
        tracing::info!(
            bundle = %bundle.id,
            version = %bundle.version,
            prefix = ?ctx.prefix(),
            dry_run = ctx.is_dry_run(),
            "starting install"
        );

        let live = LiveExecute;
        let planner = DryRunExecute::new();
        let executor: &dyn Execute = if ctx.is_dry_run() { &planner } else { &live };

        let mut result = InstallResult::new(&bundle.id, ctx.is_dry_run());
        let mut identifiers = IdentifierMap::new();

        let contents = match ctx.resolver().writable_contents(&bundle.id) {
            Ok(contents) => contents,
            Err(e) => {
                self.abandon();
                return Err(InstallFailure::new(InstallStage::Idle, e, result));
            }
        };

        let remote = Remote::new(ctx, executor);
        let engine = ReferenceEngine::new(&remote, &contents, &PolicyXml, &PolicyXml);

        let mut stage = InstallStage::Idle;
        while let Some(next) = stage.next() {
            stage = next;
            remote.enter(stage);
            let Some(category) = stage.category() else {
                break;
            };
            if let Some(reporter) = self.reporter.as_deref_mut() {
                reporter.stage_started(stage);
            }
            tracing::info!(bundle = %bundle.id, %stage, "stage started");

            let mut run = StageRun {
                remote: &remote,
                engine: &engine,
                contents: &contents,
                ids: identifiers.stage(category),
                result: &mut result,
            };
            if let Err(e) = run_stage(stage, &mut run) {
                tracing::info!(bundle = %bundle.id, %stage, error = %e, "install stopped");
                self.abandon();
                result.planned = executor.take_planned();
                result.identifiers = identifiers;
                return Err(InstallFailure::new(stage, e, result));
            }
        }

        result.planned = executor.take_planned();
        result.identifiers = identifiers;
        tracing::info!(
            bundle = %bundle.id,
            created = result.total_created(),
            missing = result.missing_dependencies.len(),
            "install finished"
        );
        if let Some(reporter) = self.reporter.as_deref_mut() {
            reporter.finish_bundle(&result);
        }
        Ok(result)
    }

    fn abandon(&mut self) {
        if let Some(reporter) = self.reporter.as_deref_mut() {
            reporter.abandon();
        }
    }
}

fn run_stage(stage: InstallStage, run: &mut StageRun<'_>) -> Result<()> {
    match stage {
        InstallStage::ResolvingPrerequisites => folder::install_prerequisites(run),
        InstallStage::InstallingFolders => folder::install(run),
        InstallStage::InstallingCertificates => certificate::install(run),
        InstallStage::InstallingConnections => jdbc::install(run),
        InstallStage::InstallingEncapsulatedAssertions => encass::install(run),
        InstallStage::InstallingPolicies => policy::install(run),
        InstallStage::InstallingServices => service::install(run),
        InstallStage::Idle | InstallStage::Done => Ok(()),
    }
}

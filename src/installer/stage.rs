//! Install stages and terminal outcomes

use std::fmt;

use crate::domain::EntityCategory;

/// Position of the orchestrator in the install sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstallStage {
    Idle,
    ResolvingPrerequisites,
    InstallingFolders,
    InstallingCertificates,
    /// Reference scan only; connections are never created
    InstallingConnections,
    InstallingEncapsulatedAssertions,
    InstallingPolicies,
    InstallingServices,
    Done,
}

impl InstallStage {
    /// Every stage that does work, in execution order
    pub const SEQUENCE: [InstallStage; 7] = [
        InstallStage::ResolvingPrerequisites,
        InstallStage::InstallingFolders,
        InstallStage::InstallingCertificates,
        InstallStage::InstallingConnections,
        InstallStage::InstallingEncapsulatedAssertions,
        InstallStage::InstallingPolicies,
        InstallStage::InstallingServices,
    ];

    /// The stage after this one; `None` once done
    pub fn next(self) -> Option<InstallStage> {
        match self {
            InstallStage::Idle => Some(InstallStage::ResolvingPrerequisites),
            InstallStage::ResolvingPrerequisites => Some(InstallStage::InstallingFolders),
            InstallStage::InstallingFolders => Some(InstallStage::InstallingCertificates),
            InstallStage::InstallingCertificates => Some(InstallStage::InstallingConnections),
            InstallStage::InstallingConnections => {
                Some(InstallStage::InstallingEncapsulatedAssertions)
            }
            InstallStage::InstallingEncapsulatedAssertions => {
                Some(InstallStage::InstallingPolicies)
            }
            InstallStage::InstallingPolicies => Some(InstallStage::InstallingServices),
            InstallStage::InstallingServices => Some(InstallStage::Done),
            InstallStage::Done => None,
        }
    }

    /// Category whose identifiers the stage writes
    pub fn category(self) -> Option<EntityCategory> {
        match self {
            InstallStage::ResolvingPrerequisites | InstallStage::InstallingFolders => {
                Some(EntityCategory::Folder)
            }
            InstallStage::InstallingCertificates => Some(EntityCategory::TrustedCertificate),
            InstallStage::InstallingConnections => Some(EntityCategory::JdbcConnection),
            InstallStage::InstallingEncapsulatedAssertions => {
                Some(EntityCategory::EncapsulatedAssertion)
            }
            InstallStage::InstallingPolicies => Some(EntityCategory::Policy),
            InstallStage::InstallingServices => Some(EntityCategory::Service),
            InstallStage::Idle | InstallStage::Done => None,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            InstallStage::Idle => "idle",
            InstallStage::ResolvingPrerequisites => "resolving prerequisites",
            InstallStage::InstallingFolders => "installing folders",
            InstallStage::InstallingCertificates => "installing trusted certificates",
            InstallStage::InstallingConnections => "resolving JDBC connections",
            InstallStage::InstallingEncapsulatedAssertions => {
                "installing encapsulated assertions"
            }
            InstallStage::InstallingPolicies => "installing policies",
            InstallStage::InstallingServices => "installing services",
            InstallStage::Done => "done",
        }
    }
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// How an install that did not reach [`InstallStage::Done`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Failed,
    Cancelled,
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallOutcome::Failed => f.write_str("failed"),
            InstallOutcome::Cancelled => f.write_str("was cancelled"),
        }
    }
}

//! Domain models for gatebundle
//!
//! This module contains pure domain objects representing the installer's core entities.
//! These types carry no knowledge of the target system or of how bundles are stored.

pub mod bundle;
pub mod category;
pub mod mapping;
pub mod result;

pub use bundle::{
    BundleContents, BundleInfo, BundleItem, CertificateDefinition,
    EncapsulatedAssertionDefinition, PolicyDefinition, ServiceDefinition,
};
pub use category::EntityCategory;
pub use mapping::{BundleMapping, MappingAction};
pub use result::{InstallResult, MissingDependency, PlannedAction, PlannedKind};

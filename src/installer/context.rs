//! Everything one install attempt needs
//!
//! An [`InstallationContext`] is built by the caller for a single install or
//! dry-run attempt and is read-only from then on.

use std::fmt;

use crate::domain::{BundleInfo, BundleMapping, EntityCategory};
use crate::domain::bundle::normalize_folder_path;
use crate::error::Result;
use crate::identifiers::prefix::normalize_prefix;
use crate::management::{DEFAULT_ROOT_FOLDER_ID, ManagementInvoker};
use crate::resolver::BundleResolver;

/// A policy or service body about to be saved
#[derive(Debug, Clone, Copy)]
pub struct PendingBody<'b> {
    pub bundle: &'b BundleInfo,
    pub category: EntityCategory,
    /// Name the entity is saved under, prefix applied
    pub name: &'b str,
    /// Body with every reference already rewritten
    pub body: &'b str,
}

impl fmt::Display for PendingBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.category, self.name)
    }
}

type PreSaveHook<'a> = Box<dyn Fn(PendingBody<'_>) -> Result<String> + 'a>;

/// Inputs of one install attempt
pub struct InstallationContext<'a> {
    bundle: BundleInfo,
    mapping: BundleMapping,
    prefix: Option<String>,
    root_folder_id: String,
    install_folder: Option<String>,
    dry_run: bool,
    cancelled: Box<dyn Fn() -> bool + 'a>,
    pre_save: Option<PreSaveHook<'a>>,
    invoker: &'a dyn ManagementInvoker,
    resolver: &'a dyn BundleResolver,
}

impl<'a> InstallationContext<'a> {
    /// A real run of `bundle` with no overrides, no prefix and no cancellation
    pub fn new(
        bundle: BundleInfo,
        invoker: &'a dyn ManagementInvoker,
        resolver: &'a dyn BundleResolver,
    ) -> Self {
        Self {
            bundle,
            mapping: BundleMapping::default(),
            prefix: None,
            root_folder_id: DEFAULT_ROOT_FOLDER_ID.to_string(),
            install_folder: None,
            dry_run: false,
            cancelled: Box::new(|| false),
            pre_save: None,
            invoker,
            resolver,
        }
    }

    #[must_use]
    pub fn with_mapping(mut self, mapping: BundleMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Instance prefix; blank prefixes mean no prefixing
    #[must_use]
    pub fn with_prefix(mut self, prefix: Option<&str>) -> Self {
        self.prefix = normalize_prefix(prefix).map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_root_folder_id(mut self, root_folder_id: impl Into<String>) -> Self {
        self.root_folder_id = root_folder_id.into();
        self
    }

    /// Folder below the root that receives every bundle folder
    #[must_use]
    pub fn with_install_folder(mut self, install_folder: Option<&str>) -> Self {
        self.install_folder = install_folder
            .map(normalize_folder_path)
            .filter(|path| path != "/");
        self
    }

    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Predicate polled before every remote call; `true` stops the install
    #[must_use]
    pub fn with_cancellation(mut self, cancelled: impl Fn() -> bool + 'a) -> Self {
        self.cancelled = Box::new(cancelled);
        self
    }

    /// Edit applied to every policy and service body right before it is saved
    ///
    /// The hook returns the body to save. An error fails the entity, and with
    /// it the running stage.
    #[must_use]
    pub fn with_pre_save(
        mut self,
        hook: impl Fn(PendingBody<'_>) -> Result<String> + 'a,
    ) -> Self {
        self.pre_save = Some(Box::new(hook));
        self
    }

    pub fn bundle(&self) -> &BundleInfo {
        &self.bundle
    }

    pub fn mapping(&self) -> &BundleMapping {
        &self.mapping
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn root_folder_id(&self) -> &str {
        &self.root_folder_id
    }

    pub fn install_folder(&self) -> Option<&str> {
        self.install_folder.as_deref()
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn is_cancelled(&self) -> bool {
        (self.cancelled)()
    }

    /// `body` after the pre-save hook, if one is set
    pub(crate) fn pre_save(
        &self,
        category: EntityCategory,
        name: &str,
        body: String,
    ) -> Result<String> {
        let Some(hook) = &self.pre_save else {
            return Ok(body);
        };
        hook(PendingBody {
            bundle: &self.bundle,
            category,
            name,
            body: &body,
        })
    }

    pub fn invoker(&self) -> &'a dyn ManagementInvoker {
        self.invoker
    }

    pub fn resolver(&self) -> &'a dyn BundleResolver {
        self.resolver
    }
}

impl fmt::Debug for InstallationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallationContext")
            .field("bundle", &self.bundle.id)
            .field("mapping", &self.mapping.len())
            .field("prefix", &self.prefix)
            .field("root_folder_id", &self.root_folder_id)
            .field("install_folder", &self.install_folder)
            .field("dry_run", &self.dry_run)
            .field("pre_save", &self.pre_save.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::management::InMemoryGateway;
    use crate::test_fixtures::StaticBundleResolver;

    #[test]
    fn test_blank_prefix_and_root_install_folder_are_dropped() {
        let gateway = InMemoryGateway::new();
        let resolver = StaticBundleResolver::new();
        let bundle = BundleInfo::new("b", "B", semver::Version::new(1, 0, 0));

        let ctx = InstallationContext::new(bundle, &gateway, &resolver)
            .with_prefix(Some("  "))
            .with_install_folder(Some("/"));
        assert_eq!(ctx.prefix(), None);
        assert_eq!(ctx.install_folder(), None);
        assert_eq!(ctx.root_folder_id(), "root");
        assert!(!ctx.is_cancelled());
    }

    #[test]
    fn test_cancellation_predicate_is_polled() {
        let gateway = InMemoryGateway::new();
        let resolver = StaticBundleResolver::new();
        let bundle = BundleInfo::new("b", "B", semver::Version::new(1, 0, 0));
        let flag = std::cell::Cell::new(false);

        let ctx = InstallationContext::new(bundle, &gateway, &resolver)
            .with_prefix(Some(" v2 "))
            .with_install_folder(Some("Integrations/"))
            .with_cancellation(|| flag.get());
        assert_eq!(ctx.prefix(), Some("v2"));
        assert_eq!(ctx.install_folder(), Some("/Integrations"));
        assert!(!ctx.is_cancelled());
        flag.set(true);
        assert!(ctx.is_cancelled());
    }
}

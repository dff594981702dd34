//! Bundle resolution
//!
//! A [`BundleResolver`] supplies bundle descriptors and their definitions,
//! one category at a time. Shared items are read-only; installers that
//! rewrite definitions ask for a writable item, which is a private copy.
//!
//! [`DirectoryBundleResolver`] loads bundles from `bundle.yaml` manifests on
//! disk.

pub mod directory;
pub mod manifest;

use std::sync::Arc;

use crate::domain::{BundleContents, BundleInfo, BundleItem, EntityCategory};
use crate::error::{self, Result};

pub use directory::DirectoryBundleResolver;

/// Source of bundle descriptors and definitions
pub trait BundleResolver {
    /// Shared definitions of one category, `None` if the category is never declared
    ///
    /// # Errors
    ///
    /// Returns a bundle-not-found error for unknown bundle ids.
    fn get_bundle_item(
        &self,
        bundle_id: &str,
        category: EntityCategory,
    ) -> Result<Option<Arc<BundleItem>>>;

    /// Private copy of one category's definitions that the caller may rewrite
    fn get_writable_bundle_item(
        &self,
        bundle_id: &str,
        category: EntityCategory,
    ) -> Result<Option<BundleItem>> {
        Ok(self
            .get_bundle_item(bundle_id, category)?
            .map(|item| (*item).clone()))
    }

    /// Every bundle this resolver knows, sorted by id
    fn get_result_list(&self) -> Vec<BundleInfo>;

    /// Bundle whose id or display name equals `key`, id matches first
    fn find(&self, key: &str) -> Result<BundleInfo> {
        let bundles = self.get_result_list();
        bundles
            .iter()
            .find(|b| b.id == key)
            .or_else(|| bundles.iter().find(|b| b.name == key))
            .cloned()
            .ok_or_else(|| error::bundle::not_found(key))
    }

    /// Writable copies of every category of a bundle
    fn writable_contents(&self, bundle_id: &str) -> Result<BundleContents> {
        let mut contents = BundleContents::default();
        for category in EntityCategory::ALL {
            if let Some(item) = self.get_writable_bundle_item(bundle_id, category)? {
                contents.set_item(item);
            }
        }
        Ok(contents)
    }
}

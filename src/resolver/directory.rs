//! Bundles stored as directories on disk
//!
//! Every directory below the bundles root that contains a `bundle.yaml` is a
//! bundle. All manifests are loaded up front; items are then handed out as
//! shared, immutable values.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use super::BundleResolver;
use super::manifest::{BundleManifest, MANIFEST_FILE};
use crate::domain::{BundleInfo, BundleItem, EntityCategory};
use crate::error::{self, Result};
use crate::hash;

#[derive(Debug)]
struct LoadedBundle {
    info: BundleInfo,
    dir: PathBuf,
    items: HashMap<EntityCategory, Arc<BundleItem>>,
}

/// Resolver over a directory tree of bundle manifests
#[derive(Debug)]
pub struct DirectoryBundleResolver {
    root: PathBuf,
    bundles: BTreeMap<String, LoadedBundle>,
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

impl DirectoryBundleResolver {
    /// Load every bundle below `root`
    ///
    /// # Errors
    ///
    /// Fails if `root` is not a directory, a manifest cannot be read or is
    /// invalid, or two bundles share an id.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(error::fs::not_found(root.display().to_string()));
        }

        let mut manifests: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file() && e.file_name() == MANIFEST_FILE)
            .map(|e| e.path().to_path_buf())
            .collect();
        manifests.sort();

        let mut bundles: BTreeMap<String, LoadedBundle> = BTreeMap::new();
        for manifest_path in manifests {
            let dir = manifest_path
                .parent()
                .map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            let loaded = Self::load_bundle(&manifest_path, &dir)?;

            if let Some(existing) = bundles.get(&loaded.info.id) {
                return Err(error::bundle::invalid(
                    loaded.info.id.clone(),
                    format!(
                        "declared by both {} and {}",
                        existing.dir.display(),
                        loaded.dir.display()
                    ),
                ));
            }
            tracing::debug!(bundle = %loaded.info.id, dir = %loaded.dir.display(), "loaded bundle");
            bundles.insert(loaded.info.id.clone(), loaded);
        }

        Ok(Self {
            root: root.to_path_buf(),
            bundles,
        })
    }

    fn load_bundle(manifest_path: &Path, dir: &Path) -> Result<LoadedBundle> {
        let manifest = BundleManifest::load(manifest_path)?;
        let mut info = manifest.info();
        info.digest = Some(hash::hash_directory(dir)?);
        let contents = manifest.into_contents(dir)?;

        let items = EntityCategory::ALL
            .into_iter()
            .filter_map(|category| contents.item(category).map(|item| (category, Arc::new(item))))
            .collect();

        Ok(LoadedBundle {
            info,
            dir: dir.to_path_buf(),
            items,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a bundle was loaded from
    pub fn bundle_dir(&self, bundle_id: &str) -> Option<&Path> {
        self.bundles.get(bundle_id).map(|b| b.dir.as_path())
    }
}

impl BundleResolver for DirectoryBundleResolver {
    fn get_bundle_item(
        &self,
        bundle_id: &str,
        category: EntityCategory,
    ) -> Result<Option<Arc<BundleItem>>> {
        let bundle = self
            .bundles
            .get(bundle_id)
            .ok_or_else(|| error::bundle::not_found(bundle_id))?;
        Ok(bundle.items.get(&category).cloned())
    }

    fn get_result_list(&self) -> Vec<BundleInfo> {
        self.bundles.values().map(|b| b.info.clone()).collect()
    }
}

//! Folder hierarchy
//!
//! Paths are materialized segment by segment from the install base: the
//! configured root folder, or the install folder below it. Each segment is
//! looked up by name under its resolved parent and created when missing.
//! Every ancestor gets its own entry in the identifier map, keyed by its
//! bundle path, so `/A/B/C` yields entries for `/A`, `/A/B` and `/A/B/C`.
//! Folders are never prefixed.

use super::StageRun;
use super::execute::Creation;
use crate::domain::EntityCategory;
use crate::domain::bundle::{folder_segments, normalize_folder_path};
use crate::error::{self, Result};
use crate::management::{EntityPayload, Selector};

const ROOT_PATH: &str = "/";

/// Folders owned by other bundles that this bundle installs into
pub(crate) fn install_prerequisites(run: &mut StageRun<'_>) -> Result<()> {
    let folders = run.ctx().bundle().prerequisite_folders.clone();
    for path in folders {
        materialize(run, &normalize_folder_path(&path))?;
    }
    Ok(())
}

/// Every folder the bundle declares or places an entity in
pub(crate) fn install(run: &mut StageRun<'_>) -> Result<()> {
    for path in run.contents.folder_paths() {
        materialize(run, &path)?;
    }
    Ok(())
}

fn split_parent(path: &str) -> Option<(&str, &str)> {
    if path == ROOT_PATH {
        return None;
    }
    path.rsplit_once('/').map(|(parent, name)| {
        if parent.is_empty() {
            (ROOT_PATH, name)
        } else {
            (parent, name)
        }
    })
}

/// Target id of the folder at a normalized bundle path
fn materialize(run: &mut StageRun<'_>, path: &str) -> Result<String> {
    if let Some(id) = run.ids.read().id(EntityCategory::Folder, path) {
        return Ok(id.to_string());
    }

    let id = match split_parent(path) {
        None => install_base(run)?,
        Some((parent, name)) => {
            let parent_id = materialize(run, parent)?;
            find_or_create(run, &parent_id, name, path)?
        }
    };
    run.ids.record_id(path, &id);
    Ok(id)
}

fn install_base(run: &mut StageRun<'_>) -> Result<String> {
    let ctx = run.ctx();
    let mut parent_id = ctx.root_folder_id().to_string();
    let Some(install_folder) = ctx.install_folder() else {
        return Ok(parent_id);
    };

    let mut label = String::new();
    for segment in folder_segments(install_folder) {
        label.push('/');
        label.push_str(segment);
        parent_id = find_or_create(run, &parent_id, segment, &label)?;
    }
    Ok(parent_id)
}

fn find_or_create(
    run: &mut StageRun<'_>,
    parent_id: &str,
    name: &str,
    label: &str,
) -> Result<String> {
    let existing = run.remote.find(
        EntityCategory::Folder,
        Selector::FolderChild {
            parent_id: parent_id.to_string(),
            name: name.to_string(),
        },
    )?;
    if let Some(found) = existing {
        tracing::debug!(path = label, id = %found.id, "folder exists");
        run.result.record_reused(EntityCategory::Folder, label);
        return Ok(found.id);
    }

    let payload = EntityPayload::Folder {
        parent_id: parent_id.to_string(),
        name: name.to_string(),
    };
    match run.remote.create(payload, label) {
        Ok(Creation::Created(summary)) => {
            run.result.record_created(EntityCategory::Folder, label);
            Ok(summary.id)
        }
        Ok(Creation::Existing(summary)) => {
            run.result.record_reused(EntityCategory::Folder, label);
            Ok(summary.id)
        }
        Err(e) if e.is_cancellation() => Err(e),
        Err(e) => Err(error::install::folder_failed(label, e.to_string())),
    }
}

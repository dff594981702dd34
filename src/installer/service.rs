//! Published services
//!
//! A service is identified by its resolution URI, which receives the prefix
//! as a leading path segment. Services without a URI cannot be matched
//! against the target and are always created.

use super::StageRun;
use super::execute::Creation;
use super::resolution::{Owner, PolicyIncludes};
use crate::domain::{EntityCategory, MappingAction};
use crate::error::Result;
use crate::identifiers::prefix::{prefixed_name, prefixed_uri};
use crate::management::{EntityPayload, Selector};

const CATEGORY: EntityCategory = EntityCategory::Service;

pub(crate) fn install(run: &mut StageRun<'_>) -> Result<()> {
    let contents = run.contents;
    for service in &contents.services {
        let ctx = run.ctx();
        match ctx.mapping().action(CATEGORY, &[&service.id]) {
            Some(MappingAction::Ignore | MappingAction::Delete) => {
                tracing::debug!(service = %service.name, "skipped by mapping");
                continue;
            }
            Some(MappingAction::UseExisting(target)) => {
                run.ids.record_id(&service.id, target);
                run.result.record_reused(CATEGORY, &service.name);
                continue;
            }
            None => {}
        }

        let name = prefixed_name(ctx.prefix(), &service.name);
        let uri = service
            .uri
            .as_deref()
            .map(|uri| prefixed_uri(ctx.prefix(), uri));
        let owner = Owner {
            category: CATEGORY,
            name: &name,
        };
        let body = run.prepare_body(owner, &service.body, PolicyIncludes::Installed)?;

        match &uri {
            Some(uri) => {
                let existing = run
                    .remote
                    .find(CATEGORY, Selector::ResolutionUri { uri: uri.clone() })?;
                if let Some(found) = existing {
                    tracing::debug!(service = %name, %uri, id = %found.id, "service exists");
                    run.ids.record_id(&service.id, &found.id);
                    run.result.record_reused(CATEGORY, &name);
                    continue;
                }
            }
            None => {
                tracing::info!(service = %name, "service has no resolution URI, creating without a duplicate check");
            }
        }

        let folder_id = run.folder_id(&service.folder, owner)?;
        let payload = EntityPayload::Service {
            name: name.clone(),
            folder_id,
            uri,
            policy: body,
        };
        match run.remote.create(payload, &name)? {
            Creation::Created(summary) => {
                run.ids.record_id(&service.id, &summary.id);
                run.result.record_created(CATEGORY, &name);
                run.remote
                    .set_version_comment(CATEGORY, &summary.id, &name)?;
            }
            Creation::Existing(summary) => {
                run.ids.record_id(&service.id, &summary.id);
                run.result.record_reused(CATEGORY, &name);
            }
        }
    }
    Ok(())
}

//! Policy fragments
//!
//! Policies reference each other through Include elements carrying the
//! included policy's GUID, so a policy is installed after every sibling it
//! includes. Each policy is then found on the target by its prefixed name
//! or created with its prefixed name and GUID; either way its source GUID
//! ends up mapped to the GUID the target holds.

use super::StageRun;
use super::execute::Creation;
use super::ordering::dependency_order;
use super::resolution::{Owner, PolicyIncludes};
use crate::domain::{EntityCategory, MappingAction, PolicyDefinition};
use crate::error::{self, Result};
use crate::identifiers::prefix::{prefixed_guid, prefixed_name};
use crate::management::{EntityPayload, Selector};
use crate::references::Reference;

const CATEGORY: EntityCategory = EntityCategory::Policy;

pub(crate) fn install(run: &mut StageRun<'_>) -> Result<()> {
    let contents = run.contents;
    let policies = &contents.policies;
    let names: Vec<String> = policies.iter().map(|p| p.name.clone()).collect();

    let mut deps = Vec::with_capacity(policies.len());
    for policy in policies {
        let owner = Owner {
            category: CATEGORY,
            name: &policy.name,
        };
        let included: Vec<usize> = run
            .engine
            .scan(owner, &policy.body)?
            .iter()
            .filter_map(|reference| match reference {
                Reference::PolicyInclude { guid } => policies.iter().position(|p| &p.guid == guid),
                _ => None,
            })
            .collect();
        deps.push(included);
    }

    for index in dependency_order(CATEGORY, &names, &deps)? {
        install_one(run, &policies[index])?;
    }
    Ok(())
}

fn install_one(run: &mut StageRun<'_>, policy: &PolicyDefinition) -> Result<()> {
    let ctx = run.ctx();
    match ctx.mapping().action(CATEGORY, &[&policy.id, &policy.guid]) {
        Some(MappingAction::Ignore | MappingAction::Delete) => {
            tracing::debug!(policy = %policy.name, "skipped by mapping");
            return Ok(());
        }
        Some(MappingAction::UseExisting(target_guid)) => {
            run.ids.record_guid(&policy.guid, target_guid);
            run.result.record_reused(CATEGORY, &policy.name);
            return Ok(());
        }
        None => {}
    }

    let name = prefixed_name(ctx.prefix(), &policy.name);
    let guid = prefixed_guid(ctx.prefix(), &policy.guid);
    let owner = Owner {
        category: CATEGORY,
        name: &name,
    };
    let body = run.prepare_body(owner, &policy.body, PolicyIncludes::Installed)?;

    let existing = run
        .remote
        .find(CATEGORY, Selector::Name { name: name.clone() })?;
    if let Some(found) = existing {
        let target_guid = found.guid.ok_or_else(|| {
            error::management::unexpected_response(
                format!("enumerate {}", CATEGORY.plural()),
                format!("policy '{name}' has no GUID"),
            )
        })?;
        tracing::debug!(policy = %name, id = %found.id, guid = %target_guid, "policy exists");
        run.ids.record_id(&policy.id, &found.id);
        run.ids.record_guid(&policy.guid, &target_guid);
        run.result.record_reused(CATEGORY, &name);
        return Ok(());
    }

    let folder_id = run.folder_id(&policy.folder, owner)?;
    let payload = EntityPayload::Policy {
        name: name.clone(),
        guid: guid.clone(),
        folder_id,
        policy: body,
    };
    match run.remote.create(payload, &name)? {
        Creation::Created(summary) => {
            run.ids.record_id(&policy.id, &summary.id);
            run.ids
                .record_guid(&policy.guid, summary.guid.as_deref().unwrap_or(&guid));
            run.result.record_created(CATEGORY, &name);
            run.remote
                .set_version_comment(CATEGORY, &summary.id, &name)?;
        }
        Creation::Existing(summary) => {
            run.ids.record_id(&policy.id, &summary.id);
            run.ids
                .record_guid(&policy.guid, summary.guid.as_deref().unwrap_or(&guid));
            run.result.record_reused(CATEGORY, &name);
        }
    }
    Ok(())
}

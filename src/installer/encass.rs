//! Encapsulated assertions
//!
//! An encapsulated assertion is found on the target by its prefixed name.
//! Missing ones are created with the prefixed name and GUID and a backing
//! policy whose own references were resolved first. Assertions in
//! prerequisite folders are installed before the rest, as a separate pass
//! over the same identifier map.

use super::StageRun;
use super::execute::Creation;
use super::ordering::dependency_order;
use super::resolution::{Owner, PolicyIncludes};
use crate::domain::bundle::is_within_folder;
use crate::domain::{EncapsulatedAssertionDefinition, EntityCategory, MappingAction};
use crate::error::Result;
use crate::identifiers::prefix::{prefixed_guid, prefixed_name};
use crate::management::{EntityPayload, EntitySummary, Selector};
use crate::references::Reference;

const CATEGORY: EntityCategory = EntityCategory::EncapsulatedAssertion;

pub(crate) fn install(run: &mut StageRun<'_>) -> Result<()> {
    let contents = run.contents;
    let prerequisites = &run.ctx().bundle().prerequisite_folders;
    let (first, rest): (Vec<_>, Vec<_>) =
        contents.encapsulated_assertions.iter().partition(|e| {
            prerequisites
                .iter()
                .any(|folder| is_within_folder(&e.folder, folder))
        });

    if !first.is_empty() {
        tracing::debug!(count = first.len(), "installing prerequisite-folder assertions first");
    }
    install_subset(run, &first)?;
    install_subset(run, &rest)
}

/// Install `subset` with every assertion after the siblings it invokes
fn install_subset(
    run: &mut StageRun<'_>,
    subset: &[&EncapsulatedAssertionDefinition],
) -> Result<()> {
    let names: Vec<String> = subset.iter().map(|e| e.name.clone()).collect();
    let mut deps = Vec::with_capacity(subset.len());
    for assertion in subset {
        let owner = Owner {
            category: CATEGORY,
            name: &assertion.name,
        };
        let invoked: Vec<usize> = run
            .engine
            .scan(owner, &assertion.body)?
            .iter()
            .filter_map(|reference| match reference {
                Reference::EncapsulatedAssertion { guid, name } => subset.iter().position(|e| {
                    guid.as_deref() == Some(e.guid.as_str())
                        || name.as_deref() == Some(e.name.as_str())
                }),
                _ => None,
            })
            .collect();
        deps.push(invoked);
    }

    for index in dependency_order(CATEGORY, &names, &deps)? {
        install_one(run, subset[index])?;
    }
    Ok(())
}

fn record(
    run: &mut StageRun<'_>,
    assertion: &EncapsulatedAssertionDefinition,
    found: &EntitySummary,
    fallback_guid: &str,
) {
    run.ids.record_id(&assertion.id, &found.id);
    run.ids
        .record_guid(&assertion.guid, found.guid.as_deref().unwrap_or(fallback_guid));
    run.ids.record_name(&assertion.name, &found.name);
}

/// Map `assertion` onto the target assertion holding `target_guid`
///
/// Dependent bodies reference assertions by GUID and by name, so both come
/// from the target entity.
fn use_existing(
    run: &mut StageRun<'_>,
    assertion: &EncapsulatedAssertionDefinition,
    target_guid: &str,
) -> Result<()> {
    let found = run.remote.find(
        CATEGORY,
        Selector::Guid {
            guid: target_guid.to_string(),
        },
    )?;
    match found {
        Some(found) => {
            tracing::debug!(assertion = %assertion.name, target = %found.name, "encapsulated assertion mapped");
            record(run, assertion, &found, target_guid);
            run.result.record_reused(CATEGORY, &found.name);
            Ok(())
        }
        None => {
            let owner = Owner {
                category: CATEGORY,
                name: &assertion.name,
            };
            run.engine.unresolved(owner, CATEGORY, target_guid, run.result)
        }
    }
}

fn install_one(run: &mut StageRun<'_>, assertion: &EncapsulatedAssertionDefinition) -> Result<()> {
    let ctx = run.ctx();
    match ctx.mapping().action(CATEGORY, &[&assertion.id, &assertion.guid]) {
        Some(MappingAction::Ignore | MappingAction::Delete) => {
            tracing::debug!(assertion = %assertion.name, "skipped by mapping");
            return Ok(());
        }
        Some(MappingAction::UseExisting(target_guid)) => {
            return use_existing(run, assertion, target_guid);
        }
        None => {}
    }

    let name = prefixed_name(ctx.prefix(), &assertion.name);
    let guid = prefixed_guid(ctx.prefix(), &assertion.guid);
    let owner = Owner {
        category: CATEGORY,
        name: &name,
    };
    let body = run.prepare_body(owner, &assertion.body, PolicyIncludes::Predicted)?;

    let existing = run
        .remote
        .find(CATEGORY, Selector::Name { name: name.clone() })?;
    if let Some(found) = existing {
        tracing::debug!(assertion = %name, id = %found.id, "encapsulated assertion exists");
        record(run, assertion, &found, &guid);
        run.result.record_reused(CATEGORY, &name);
        return Ok(());
    }

    let folder_id = run.folder_id(&assertion.folder, owner)?;
    let payload = EntityPayload::EncapsulatedAssertion {
        name: name.clone(),
        guid: guid.clone(),
        folder_id,
        policy: body,
    };
    match run.remote.create(payload, &name)? {
        Creation::Created(summary) => {
            record(run, assertion, &summary, &guid);
            run.result.record_created(CATEGORY, &name);
        }
        Creation::Existing(summary) => {
            record(run, assertion, &summary, &guid);
            run.result.record_reused(CATEGORY, &name);
        }
    }
    Ok(())
}

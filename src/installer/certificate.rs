//! Trusted certificates
//!
//! Issuer and serial number identify a certificate; the declared name is
//! informational. A certificate already on the target under another name is
//! reused as it is.

use super::StageRun;
use super::execute::Creation;
use crate::domain::{EntityCategory, MappingAction};
use crate::error::Result;
use crate::management::{EntityPayload, Selector};

const CATEGORY: EntityCategory = EntityCategory::TrustedCertificate;

pub(crate) fn install(run: &mut StageRun<'_>) -> Result<()> {
    let contents = run.contents;
    for cert in &contents.certificates {
        match run.ctx().mapping().action(CATEGORY, &[&cert.id]) {
            Some(MappingAction::Ignore | MappingAction::Delete) => {
                tracing::debug!(certificate = %cert.name, "skipped by mapping");
                continue;
            }
            Some(MappingAction::UseExisting(target)) => {
                run.ids.record_id(&cert.id, target);
                run.result.record_reused(CATEGORY, &cert.name);
                continue;
            }
            None => {}
        }

        let existing = run.remote.find(
            CATEGORY,
            Selector::IssuerSerial {
                issuer: cert.issuer.clone(),
                serial: cert.serial.clone(),
            },
        )?;
        if let Some(found) = existing {
            if found.name != cert.name {
                tracing::debug!(declared = %cert.name, existing = %found.name, "certificate exists under another name");
            }
            run.ids.record_id(&cert.id, &found.id);
            run.result.record_reused(CATEGORY, &cert.name);
            continue;
        }

        let payload = EntityPayload::TrustedCertificate {
            name: cert.name.clone(),
            issuer: cert.issuer.clone(),
            serial: cert.serial.clone(),
            pem: cert.pem.clone(),
        };
        match run.remote.create(payload, &cert.name)? {
            Creation::Created(summary) => {
                run.ids.record_id(&cert.id, &summary.id);
                run.result.record_created(CATEGORY, &cert.name);
            }
            Creation::Existing(summary) => {
                run.ids.record_id(&cert.id, &summary.id);
                run.result.record_reused(CATEGORY, &cert.name);
            }
        }
    }
    Ok(())
}

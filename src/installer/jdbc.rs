//! JDBC connection references
//!
//! Connections are never created by an install. This stage collects the
//! connection names the bundle's bodies use and records, for each, the name
//! the bodies should carry on the target:
//!
//! - a `use_existing` mapping renames the connection
//! - an `ignore` mapping keeps the name without checking the target
//! - otherwise the connection has to exist on the target under its own name
//!
//! Names left unrecorded make the bodies referencing them fail to resolve.

use std::collections::BTreeSet;

use super::StageRun;
use super::resolution::Owner;
use crate::domain::{EntityCategory, MappingAction};
use crate::error::Result;
use crate::management::Selector;
use crate::references::{DocumentError, Reference, ReferenceScanner};

const CATEGORY: EntityCategory = EntityCategory::JdbcConnection;

/// Distinct connection names referenced by one body
pub fn referenced_connections(
    scanner: &dyn ReferenceScanner,
    body: &str,
) -> std::result::Result<BTreeSet<String>, DocumentError> {
    Ok(scanner
        .scan(body)?
        .into_iter()
        .filter_map(|reference| match reference {
            Reference::JdbcConnection { name } => Some(name),
            _ => None,
        })
        .collect())
}

pub(crate) fn install(run: &mut StageRun<'_>) -> Result<()> {
    let mut names = BTreeSet::new();
    for (category, name, body) in run.contents.bodies() {
        let owner = Owner { category, name };
        names.extend(
            referenced_connections(run.engine.scanner(), body).map_err(|e| {
                crate::error::reference::parse_failed(owner.to_string(), e.to_string())
            })?,
        );
    }

    for name in &names {
        match run.ctx().mapping().action(CATEGORY, &[name]) {
            Some(MappingAction::UseExisting(target)) => {
                tracing::debug!(connection = %name, target = %target, "connection mapped");
                run.ids.record_id(name, target);
                run.result.record_reused(CATEGORY, name);
            }
            Some(MappingAction::Ignore) => {
                run.ids.record_id(name, name);
            }
            Some(MappingAction::Delete) => {
                tracing::debug!(connection = %name, "connection removed by mapping");
            }
            None => {
                let existing = run
                    .remote
                    .find(CATEGORY, Selector::Name { name: name.clone() })?;
                match existing {
                    Some(found) => {
                        run.ids.record_id(name, &found.name);
                        run.result.record_reused(CATEGORY, name);
                    }
                    None => {
                        tracing::warn!(connection = %name, "referenced connection does not exist on the target");
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::references::PolicyXml;

    #[test]
    fn test_single_connection_reference() {
        let body = r#"<wsp:Policy xmlns:L7p="http://www.layer7tech.com/ws/policy">
  <wsp:All>
    <L7p:JdbcQuery>
      <L7p:ConnectionName stringValue="OAuth"/>
      <L7p:SqlQuery stringValue="SELECT 1"/>
    </L7p:JdbcQuery>
  </wsp:All>
</wsp:Policy>"#;
        let names = referenced_connections(&PolicyXml, body).unwrap();
        assert_eq!(names, BTreeSet::from(["OAuth".to_string()]));
    }

    #[test]
    fn test_no_connection_reference() {
        let body = r#"<wsp:Policy xmlns:L7p="http://www.layer7tech.com/ws/policy">
  <wsp:All>
    <L7p:Include>
      <L7p:PolicyGuid stringValue="506589b0-eba5-4b3f-81b5-be7809817623"/>
    </L7p:Include>
  </wsp:All>
</wsp:Policy>"#;
        assert!(referenced_connections(&PolicyXml, body).unwrap().is_empty());
    }

    #[test]
    fn test_repeated_connection_is_reported_once() {
        let body = r#"<Policy>
  <JdbcQuery><ConnectionName stringValue="OAuth"/></JdbcQuery>
  <JdbcQuery><ConnectionName stringValue="OAuth"/></JdbcQuery>
  <JdbcQuery><ConnectionName stringValue="Audit"/></JdbcQuery>
</Policy>"#;
        let names = referenced_connections(&PolicyXml, body).unwrap();
        assert_eq!(names.len(), 2);
    }
}

//! Entity categories handled by the installer

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the configuration entity categories a bundle can carry
///
/// Variants are declared in install order, so the derived `Ord` doubles as
/// the stage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Folder,
    TrustedCertificate,
    JdbcConnection,
    EncapsulatedAssertion,
    Policy,
    Service,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 6] = [
        EntityCategory::Folder,
        EntityCategory::TrustedCertificate,
        EntityCategory::JdbcConnection,
        EntityCategory::EncapsulatedAssertion,
        EntityCategory::Policy,
        EntityCategory::Service,
    ];

    /// Human-readable singular label
    pub fn label(self) -> &'static str {
        match self {
            EntityCategory::Folder => "folder",
            EntityCategory::TrustedCertificate => "trusted certificate",
            EntityCategory::JdbcConnection => "JDBC connection",
            EntityCategory::EncapsulatedAssertion => "encapsulated assertion",
            EntityCategory::Policy => "policy",
            EntityCategory::Service => "service",
        }
    }

    /// Human-readable plural label
    pub fn plural(self) -> &'static str {
        match self {
            EntityCategory::Folder => "folders",
            EntityCategory::TrustedCertificate => "trusted certificates",
            EntityCategory::JdbcConnection => "JDBC connections",
            EntityCategory::EncapsulatedAssertion => "encapsulated assertions",
            EntityCategory::Policy => "policies",
            EntityCategory::Service => "services",
        }
    }

    /// Whether other entities reference members of this category by GUID
    pub fn is_guid_referenced(self) -> bool {
        matches!(
            self,
            EntityCategory::EncapsulatedAssertion | EntityCategory::Policy
        )
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_matches_install_order() {
        let mut sorted = EntityCategory::ALL;
        sorted.sort();
        assert_eq!(sorted, EntityCategory::ALL);
        assert!(EntityCategory::Folder < EntityCategory::Service);
    }

    #[test]
    fn test_serde_names() {
        let yaml = serde_yaml::to_string(&EntityCategory::JdbcConnection).unwrap();
        assert_eq!(yaml.trim(), "jdbc_connection");
        let parsed: EntityCategory = serde_yaml::from_str("encapsulated_assertion").unwrap();
        assert_eq!(parsed, EntityCategory::EncapsulatedAssertion);
    }

    #[test]
    fn test_guid_referenced_categories() {
        assert!(EntityCategory::Policy.is_guid_referenced());
        assert!(EntityCategory::EncapsulatedAssertion.is_guid_referenced());
        assert!(!EntityCategory::Service.is_guid_referenced());
        assert!(!EntityCategory::JdbcConnection.is_guid_referenced());
    }
}

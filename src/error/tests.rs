//! Error type tests
//!
//! Tests for GatebundleError and its conversions.

#![allow(clippy::unwrap_used)]

use crate::error::GatebundleError;
use crate::error::{bundle, config, fs, install, management, mapping, reference};
use miette::Diagnostic;

macro_rules! test_error_contains {
    ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
        #[test]
        fn $test_name() {
            let err = $err;
            let error_string = err.to_string();
            $(
                assert!(error_string.contains($contains),
                    "Error message should contain '{}', got: {}",
                    $contains,
                    error_string
                );
            )+
        }
    };
}

#[test]
fn test_error_display() {
    let err = GatebundleError::BundleNotFound {
        name: "oauth-manager".to_string(),
    };
    assert_eq!(err.to_string(), "Bundle 'oauth-manager' not found");
}

#[test]
fn test_error_code() {
    let err = bundle::not_found("test");
    assert_eq!(
        err.code().map(|c| c.to_string()),
        Some("gatebundle::bundle::not_found".to_string())
    );
}

#[test]
fn test_unresolved_reference_has_help() {
    let err = install::unresolved("policy 'Token'", "encapsulated assertion", "abc");
    assert!(err.help().is_some());
    assert_eq!(
        err.code().map(|c| c.to_string()),
        Some("gatebundle::install::unresolved_reference".to_string())
    );
}

#[test]
fn test_pre_save_rejection_names_the_entity() {
    let err = install::pre_save_rejected("policy 'Token'", "unknown install variable 'host'");
    assert_eq!(
        err.to_string(),
        "policy 'Token' was rejected before saving: unknown install variable 'host'"
    );
    assert_eq!(
        err.code().map(|c| c.to_string()),
        Some("gatebundle::install::pre_save_rejected".to_string())
    );
    assert!(!err.is_cancellation());
}

#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: GatebundleError = io_err.into();
    assert!(matches!(err, GatebundleError::IoError { .. }));
}

#[test]
fn test_yaml_error_conversion() {
    let parse_result: std::result::Result<serde_yaml::Value, _> =
        serde_yaml::from_str("invalid: yaml: content: [unclosed");
    let err: GatebundleError = parse_result.unwrap_err().into();
    assert!(matches!(err, GatebundleError::ConfigParseFailed { .. }));
}

#[test]
fn test_json_error_conversion() {
    let parse_result: std::result::Result<serde_json::Value, _> =
        serde_json::from_str("invalid json content");
    let err: GatebundleError = parse_result.unwrap_err().into();
    assert!(matches!(err, GatebundleError::ConfigParseFailed { .. }));
}

#[test]
fn test_cancellation_is_distinguished() {
    assert!(install::cancelled("installing policies").is_cancellation());
    assert!(!install::folder_failed("/A", "boom").is_cancellation());
}

test_error_contains!(
    test_invalid_bundle_error,
    bundle::invalid("oauth", "duplicate policy name"),
    "oauth",
    "duplicate policy name"
);

test_error_contains!(
    test_circular_error,
    bundle::circular("policy", "a -> b -> a"),
    "a -> b -> a"
);

test_error_contains!(
    test_config_errors,
    config::parse_failed("gatebundle.yaml", "bad"),
    "gatebundle.yaml"
);

test_error_contains!(
    test_config_invalid_error,
    config::invalid("prefix may not contain '/'"),
    "prefix may not contain"
);

test_error_contains!(
    test_config_not_found_error,
    config::not_found("/nope.yaml"),
    "/nope.yaml"
);

test_error_contains!(
    test_config_read_failed_error,
    config::read_failed("/etc/gatebundle.yaml", "denied"),
    "/etc/gatebundle.yaml"
);

test_error_contains!(
    test_mapping_error,
    mapping::invalid("policy", "p1", "missing target"),
    "policy",
    "p1",
    "missing target"
);

test_error_contains!(
    test_management_fault_error,
    management::fault("create folder", "denied"),
    "create folder",
    "denied"
);

test_error_contains!(
    test_unexpected_response_error,
    management::unexpected_response("enumerate", "no entities"),
    "enumerate"
);

test_error_contains!(
    test_transport_error,
    management::transport("connection reset"),
    "connection reset"
);

test_error_contains!(
    test_folder_failed_error,
    install::folder_failed("/A/B", "denied"),
    "/A/B",
    "denied"
);

test_error_contains!(
    test_cancelled_error,
    install::cancelled("installing services"),
    "cancelled during installing services"
);

test_error_contains!(
    test_policy_parse_error,
    reference::parse_failed("policy 'Token'", "unexpected EOF"),
    "policy 'Token'",
    "unexpected EOF"
);

test_error_contains!(
    test_file_errors,
    fs::read_failed("/tmp/x.xml", "denied"),
    "/tmp/x.xml"
);

test_error_contains!(
    test_file_write_error,
    fs::write_failed("/tmp/gateway.json", "read-only"),
    "/tmp/gateway.json"
);

test_error_contains!(
    test_file_not_found_error,
    fs::not_found("/tmp/missing.xml"),
    "/tmp/missing.xml"
);

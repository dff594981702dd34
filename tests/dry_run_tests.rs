//! Tests for `install --dry-run`

mod common;

use common::TestWorkspace;
use predicates::prelude::*;

const TARGET: &str = "gateway.json";

#[test]
fn test_dry_run_reports_creations_without_saving() {
    let workspace = TestWorkspace::new();
    workspace.create_token_bundle();

    workspace
        .cmd()
        .args(["install", "oauth", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[DRY RUN] Would install bundle 'oauth'"))
        .stdout(predicate::str::contains("[DRY RUN] Would create folder"))
        .stdout(predicate::str::contains(
            "[DRY RUN] Would create policy 'Token Utility'",
        ))
        .stdout(predicate::str::contains("[DRY RUN] Would create service 'Token'"))
        .stdout(predicate::str::contains("policies: 1 to create, 0 existing"))
        .stdout(predicate::str::contains("Installed bundle").not());

    assert!(!workspace.file_exists(TARGET));
}

#[test]
fn test_dry_run_leaves_existing_target_untouched() {
    let workspace = TestWorkspace::new();
    workspace.create_token_bundle();

    workspace.cmd().args(["install", "oauth"]).assert().success();
    let before = workspace.read_file(TARGET);

    workspace
        .cmd()
        .args(["install", "oauth", "--dry-run", "--prefix", "v2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("folders: 0 to create, 2 existing"))
        .stdout(predicate::str::contains(
            "[DRY RUN] Would create policy 'v2 Token Utility'",
        ));

    assert_eq!(workspace.read_file(TARGET), before);
}

#[test]
fn test_dry_run_of_installed_bundle_creates_nothing() {
    let workspace = TestWorkspace::new();
    workspace.create_token_bundle();

    workspace.cmd().args(["install", "oauth"]).assert().success();

    workspace
        .cmd()
        .args(["install", "oauth", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("policies: 0 to create, 1 existing"))
        .stdout(predicate::str::contains("Would create").not());
}

#[test]
fn test_dry_run_lists_missing_connection() {
    let workspace = TestWorkspace::new();
    workspace.create_client_bundle();

    workspace
        .cmd()
        .args(["install", "clients", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Missing dependencies (1):"))
        .stdout(predicate::str::contains("OAuth"))
        .stdout(predicate::str::contains("Missing encapsulated assertions").not());

    assert!(!workspace.file_exists(TARGET));
}

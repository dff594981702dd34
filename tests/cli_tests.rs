//! CLI surface tests: help, version, completions and argument errors

mod common;

use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let workspace = common::TestWorkspace::new();
    workspace
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_install_help_shows_examples() {
    let workspace = common::TestWorkspace::new();
    workspace
        .cmd()
        .args(["install", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--prefix"))
        .stdout(predicate::str::contains("EXAMPLES"));
}

#[test]
fn test_version_command() {
    let workspace = common::TestWorkspace::new();
    workspace
        .cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!(
            "gatebundle ",
            env!("CARGO_PKG_VERSION")
        )))
        .stdout(predicate::str::contains("Installs, in order:"))
        .stdout(predicate::str::contains("  encapsulated assertion"))
        .stdout(predicate::str::contains("Rust version"));
}

#[test]
fn test_version_flag() {
    let workspace = common::TestWorkspace::new();
    workspace
        .cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_completions_bash() {
    let workspace = common::TestWorkspace::new();
    workspace
        .cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_gatebundle"));
}

#[test]
fn test_completions_unknown_shell_fails() {
    let workspace = common::TestWorkspace::new();
    workspace
        .cmd()
        .args(["completions", "tcsh"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("unknown shell 'tcsh'"));
}

#[test]
fn test_install_without_bundle_is_usage_error() {
    let workspace = common::TestWorkspace::new();
    workspace.cmd().arg("install").assert().failure().code(2);
}

#[test]
fn test_unknown_command_fails() {
    let workspace = common::TestWorkspace::new();
    workspace.cmd().arg("uninstall").assert().failure();
}

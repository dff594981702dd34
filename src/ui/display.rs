//! Display functions for bundles and install results
//!
//! This module renders bundle listings, bundle details and the summary of
//! an install or dry run. Rendering and printing are split so the text can
//! be checked without a terminal.

use console::Style;

use crate::domain::{
    BundleContents, BundleInfo, EntityCategory, InstallResult, PlannedAction, PlannedKind,
};
use crate::installer::InstallFailure;

macro_rules! display_opt_field {
    ($lines:expr, $label:expr, $value:expr) => {
        if let Some(ref v) = $value {
            $lines.push(format!("    {} {}", Style::new().bold().apply_to($label), v));
        }
    };
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

/// Display every known bundle, one per line
pub fn display_bundle_list(bundles: &[BundleInfo]) {
    print_lines(&bundle_list_lines(bundles));
}

fn bundle_list_lines(bundles: &[BundleInfo]) -> Vec<String> {
    if bundles.is_empty() {
        return vec!["No bundles found.".to_string()];
    }

    let mut lines = vec![format!(
        "{} ({}):",
        Style::new().bold().apply_to("Bundles"),
        bundles.len()
    )];
    for info in bundles {
        let mut line = format!(
            "  {} {}",
            Style::new().bold().yellow().apply_to(&info.id),
            Style::new().dim().apply_to(format!("v{}", info.version))
        );
        if info.name != info.id {
            line.push_str(&format!(" - {}", info.name));
        }
        lines.push(line);
    }
    lines
}

/// Display a bundle's metadata and definitions
pub fn display_bundle(info: &BundleInfo, contents: &BundleContents) {
    print_lines(&bundle_lines(info, contents));
}

fn bundle_lines(info: &BundleInfo, contents: &BundleContents) -> Vec<String> {
    let mut lines = vec![format!(
        "  {}",
        Style::new().bold().yellow().apply_to(&info.name)
    )];
    lines.push(format!("    {} {}", Style::new().bold().apply_to("Id:"), info.id));
    lines.push(format!(
        "    {} {}",
        Style::new().bold().apply_to("Version:"),
        info.version
    ));
    display_opt_field!(lines, "Description:", info.description);
    display_opt_field!(lines, "Digest:", info.digest);
    if !info.prerequisite_folders.is_empty() {
        lines.push(format!(
            "    {} {}",
            Style::new().bold().apply_to("Prerequisite folders:"),
            info.prerequisite_folders.join(", ")
        ));
    }

    lines.push(format!("    {}", Style::new().bold().apply_to("Contents:")));
    let folders = contents.folder_paths();
    push_group(&mut lines, EntityCategory::Folder, folders.iter().map(String::as_str));
    push_group(
        &mut lines,
        EntityCategory::TrustedCertificate,
        contents.certificates.iter().map(|c| c.name.as_str()),
    );
    push_group(
        &mut lines,
        EntityCategory::EncapsulatedAssertion,
        contents.encapsulated_assertions.iter().map(|e| e.name.as_str()),
    );
    push_group(
        &mut lines,
        EntityCategory::Policy,
        contents.policies.iter().map(|p| p.name.as_str()),
    );
    if !contents.services.is_empty() {
        lines.push(format!(
            "      {} ({})",
            Style::new().cyan().apply_to(EntityCategory::Service.plural()),
            contents.services.len()
        ));
        for service in &contents.services {
            match &service.uri {
                Some(uri) => lines.push(format!(
                    "        {} {}",
                    service.name,
                    Style::new().dim().apply_to(uri)
                )),
                None => lines.push(format!("        {}", service.name)),
            }
        }
    }
    lines
}

fn push_group<'a>(
    lines: &mut Vec<String>,
    category: EntityCategory,
    names: impl ExactSizeIterator<Item = &'a str>,
) {
    if names.len() == 0 {
        return;
    }
    lines.push(format!(
        "      {} ({})",
        Style::new().cyan().apply_to(category.plural()),
        names.len()
    ));
    for name in names {
        lines.push(format!("        {name}"));
    }
}

/// Display the summary of a finished install or dry run
pub fn display_install_result(result: &InstallResult) {
    print_lines(&install_result_lines(result));
}

fn planned_line(action: &PlannedAction) -> String {
    match action.kind {
        PlannedKind::Create => format!(
            "[DRY RUN] Would create {} '{}'",
            action.category, action.name
        ),
        PlannedKind::SetVersionComment => format!(
            "[DRY RUN] Would set version comment of {} '{}'",
            action.category, action.name
        ),
    }
}

fn install_result_lines(result: &InstallResult) -> Vec<String> {
    let mut lines = Vec::new();

    if result.dry_run {
        lines.push(format!(
            "[DRY RUN] Would install bundle '{}'",
            result.bundle_id
        ));
        lines.extend(result.planned.iter().map(planned_line));
    } else {
        lines.push(format!(
            "{} bundle '{}'",
            Style::new().green().bold().apply_to("Installed"),
            result.bundle_id
        ));
    }

    for category in EntityCategory::ALL {
        let created = result.created_count(category);
        let reused = result.reused_count(category);
        if created == 0 && reused == 0 {
            continue;
        }
        let verb = if result.dry_run { "to create" } else { "created" };
        lines.push(format!(
            "  {}: {created} {verb}, {reused} existing",
            Style::new().cyan().apply_to(category.plural())
        ));
    }

    if !result.missing_dependencies.is_empty() {
        lines.push(format!(
            "{} ({}):",
            Style::new().yellow().bold().apply_to("Missing dependencies"),
            result.missing_dependencies.len()
        ));
        for missing in &result.missing_dependencies {
            lines.push(format!("  - {missing}"));
        }
    }

    let assertions = result.missing_assertions();
    if !assertions.is_empty() {
        lines.push(format!(
            "{} ({}):",
            Style::new().yellow().bold().apply_to("Missing encapsulated assertions"),
            assertions.len()
        ));
        for assertion in assertions {
            lines.push(format!("  - {assertion}"));
        }
    }
    lines
}

/// Display what a failed or cancelled install left behind
pub fn display_install_failure(failure: &InstallFailure) {
    for line in failure_lines(failure) {
        eprintln!("{line}");
    }
}

fn failure_lines(failure: &InstallFailure) -> Vec<String> {
    let partial = &failure.partial;
    let mut lines = vec![format!(
        "{} bundle '{}' {} during {}",
        Style::new().red().bold().apply_to("Install of"),
        partial.bundle_id,
        failure.outcome,
        failure.stage
    )];
    let kept = partial.total_created();
    if kept > 0 && !partial.dry_run {
        lines.push(format!("  {kept} entities created before stopping remain on the target:"));
        for (category, names) in &partial.created {
            for name in names {
                lines.push(format!("    {category} '{name}'"));
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MissingDependency;

    fn plain(lines: &[String]) -> String {
        console::strip_ansi_codes(&lines.join("\n")).to_string()
    }

    #[test]
    fn test_empty_bundle_list() {
        assert_eq!(bundle_list_lines(&[]), vec!["No bundles found.".to_string()]);
    }

    #[test]
    fn test_bundle_list_shows_version_and_name() {
        let bundles = vec![
            BundleInfo::new("oauth", "OAuth Manager", semver::Version::new(1, 2, 0)),
            BundleInfo::new("shared", "shared", semver::Version::new(0, 1, 0)),
        ];
        let text = plain(&bundle_list_lines(&bundles));
        assert!(text.contains("Bundles (2):"));
        assert!(text.contains("oauth v1.2.0 - OAuth Manager"));
        assert!(text.contains("shared v0.1.0"));
        assert!(!text.contains("shared v0.1.0 -"));
    }

    #[test]
    fn test_dry_run_summary() {
        let mut result = InstallResult::new("oauth", true);
        result.record_created(EntityCategory::Policy, "Token");
        result.planned.push(PlannedAction {
            kind: PlannedKind::Create,
            category: EntityCategory::Policy,
            name: "Token".to_string(),
        });
        result.record_missing(MissingDependency {
            category: EntityCategory::EncapsulatedAssertion,
            reference: "Lookup".to_string(),
            referenced_by: "policy 'Token'".to_string(),
        });

        let text = plain(&install_result_lines(&result));
        assert!(text.contains("[DRY RUN] Would create policy 'Token'"));
        assert!(text.contains("policies: 1 to create, 0 existing"));
        assert!(text.contains("Missing dependencies (1):"));
        assert!(text.contains("Missing encapsulated assertions (1):"));
        assert!(text.contains("  - Lookup"));
    }

    #[test]
    fn test_install_summary_skips_empty_categories() {
        let mut result = InstallResult::new("oauth", false);
        result.record_created(EntityCategory::Folder, "/A");
        result.record_reused(EntityCategory::Folder, "/B");

        let text = plain(&install_result_lines(&result));
        assert!(text.starts_with("Installed bundle 'oauth'"));
        assert!(text.contains("folders: 1 created, 1 existing"));
        assert!(!text.contains("services"));
        assert!(!text.contains("[DRY RUN]"));
    }
}

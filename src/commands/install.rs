//! Install command implementation
//!
//! This command installs one or more bundles onto the target store:
//! - Bundles are installed in the order given, each as its own attempt
//! - A later bundle sees the earlier ones through target lookups
//! - `--dry-run` reports what would be created and never saves the target
//! - `--timeout` cancels the running install once the deadline passes
//! - `${install.NAME}` placeholders in policy and service bodies are filled
//!   from the configured variables before each body is saved
//!
//! The target store is saved after every bundle of a real run, including a
//! bundle that failed part way, so entities already created are not lost.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use crate::cli::InstallArgs;
use crate::config::{InstallerConfig, load_mapping};
use crate::domain::{BundleInfo, BundleMapping};
use crate::error::{self, Result};
use crate::installer::{BundleInstaller, InstallationContext, PendingBody};
use crate::management::TargetStore;
use crate::references::variables;
use crate::resolver::{BundleResolver, DirectoryBundleResolver};
use crate::ui::display::{display_install_failure, display_install_result};
use crate::ui::{InteractiveStageReporter, SilentStageReporter, StageReporter};

/// Run install command
pub fn run(config: Option<PathBuf>, args: InstallArgs) -> Result<()> {
    let config = InstallerConfig::discover(config.as_deref())?.overridden_by(args.overrides());
    config.validate()?;

    let resolver = DirectoryBundleResolver::open(&config.bundles_dir())?;
    let bundles = select_bundles(&resolver, &args.bundles)?;
    let mapping = match &config.mapping {
        Some(path) => load_mapping(path)?,
        None => BundleMapping::new(),
    };
    let store = TargetStore::open(&config.target(), config.root_folder_id())?;

    let mut reporter: Box<dyn StageReporter> = if console::user_attended_stderr() {
        Box::new(InteractiveStageReporter::new())
    } else {
        Box::new(SilentStageReporter)
    };

    let deadline = config.timeout().map(|timeout| Instant::now() + timeout);
    let total = bundles.len();
    for (index, info) in bundles.into_iter().enumerate() {
        reporter.start_bundle(&info.name, index + 1, total);

        let ctx = InstallationContext::new(info, &store, &resolver)
            .with_mapping(mapping.clone())
            .with_prefix(config.prefix.as_deref())
            .with_root_folder_id(config.root_folder_id())
            .with_install_folder(config.install_folder.as_deref())
            .with_pre_save(|pending| expand_variables(pending, &config.variables))
            .dry_run(args.dry_run);
        let ctx = match deadline {
            Some(deadline) => ctx.with_cancellation(move || Instant::now() >= deadline),
            None => ctx,
        };

        let outcome = BundleInstaller::with_reporter(reporter.as_mut()).install(&ctx);
        if !args.dry_run {
            store.save()?;
        }
        match outcome {
            Ok(result) => display_install_result(&result),
            Err(failure) => {
                display_install_failure(&failure);
                return Err(failure.error);
            }
        }
    }

    Ok(())
}

fn expand_variables(pending: PendingBody<'_>, values: &BTreeMap<String, String>) -> Result<String> {
    variables::expand(pending.body, values)
        .map_err(|e| error::install::pre_save_rejected(pending.to_string(), e.to_string()))
}

/// Bundles named on the command line, in command line order
fn select_bundles(resolver: &dyn BundleResolver, keys: &[String]) -> Result<Vec<BundleInfo>> {
    let mut selected: Vec<BundleInfo> = Vec::with_capacity(keys.len());
    for key in keys {
        let info = resolver.find(key)?;
        if selected.iter().any(|b| b.id == info.id) {
            tracing::warn!(bundle = %info.id, "bundle named more than once, installing it once");
            continue;
        }
        selected.push(info);
    }
    Ok(selected)
}

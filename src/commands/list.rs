//! List command implementation
//!
//! This command lists every bundle found below the bundles directory with
//! its version and display name.

use std::path::PathBuf;

use crate::cli::ListArgs;
use crate::config::InstallerConfig;
use crate::error::Result;
use crate::resolver::{BundleResolver, DirectoryBundleResolver};
use crate::ui::display::display_bundle_list;

/// Run list command
pub fn run(config: Option<PathBuf>, args: ListArgs) -> Result<()> {
    let config = InstallerConfig::discover(config.as_deref())?.overridden_by(InstallerConfig {
        bundles_dir: args.bundles_dir,
        ..InstallerConfig::default()
    });

    let resolver = DirectoryBundleResolver::open(&config.bundles_dir())?;
    display_bundle_list(&resolver.get_result_list());
    Ok(())
}

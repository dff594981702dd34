//! Show command implementation

use std::path::PathBuf;

use crate::cli::ShowArgs;
use crate::config::InstallerConfig;
use crate::error::Result;
use crate::resolver::{BundleResolver, DirectoryBundleResolver};
use crate::ui::display::display_bundle;

pub fn run(config: Option<PathBuf>, args: ShowArgs) -> Result<()> {
    let config = InstallerConfig::discover(config.as_deref())?.overridden_by(InstallerConfig {
        bundles_dir: args.bundles_dir,
        ..InstallerConfig::default()
    });

    let resolver = DirectoryBundleResolver::open(&config.bundles_dir())?;
    let info = resolver.find(&args.name)?;
    let contents = resolver.writable_contents(&info.id)?;

    display_bundle(&info, &contents);
    if let Some(dir) = resolver.bundle_dir(&info.id) {
        tracing::debug!(bundle = %info.id, dir = %dir.display(), "bundle directory");
    }
    Ok(())
}

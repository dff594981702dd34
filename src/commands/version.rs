//! Version command implementation
//!
//! Prints the release, the categories this build installs and build info.

use std::io::Write;

use crate::domain::EntityCategory;
use crate::error::Result;

/// Run version command
pub fn run() -> Result<()> {
    let mut out = std::io::stdout().lock();
    write_version(&mut out)?;
    Ok(())
}

fn write_version(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))?;
    writeln!(out)?;
    writeln!(out, "Installs, in order:")?;
    for category in EntityCategory::ALL {
        writeln!(out, "  {category}")?;
    }
    writeln!(out)?;
    writeln!(out, "Build info:")?;
    writeln!(out, "  Rust version: {}", env!("CARGO_PKG_RUST_VERSION"))?;
    writeln!(
        out,
        "  Profile: {}",
        if cfg!(debug_assertions) { "debug" } else { "release" }
    )
}

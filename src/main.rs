//! gatebundle - declarative configuration bundle installer
//!
//! Installs bundles of folders, trusted certificates, encapsulated assertions,
//! policies and services onto a gateway through its management protocol,
//! reusing entities the gateway already holds and rewriting references to
//! the identifiers it assigns.

use clap::Parser;

mod cli;
mod commands;
mod config;
mod domain;
mod error;
mod hash;
mod identifiers;
mod installer;
mod logging;
mod management;
mod references;
mod resolver;
mod ui;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};
use error::GatebundleError;

/// Exit code of an install stopped by its deadline
const EXIT_CANCELLED: i32 = 2;

fn exit_code(error: &GatebundleError) -> i32 {
    if error.is_cancellation() {
        EXIT_CANCELLED
    } else {
        1
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Install(args) => commands::install::run(cli.config, args),
        Commands::List(args) => commands::list::run(cli.config, args),
        Commands::Show(args) => commands::show::run(cli.config, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code(&e));
    }
}

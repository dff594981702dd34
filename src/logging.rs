//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set. Otherwise gatebundle logs at `debug` with
//! `--verbose` and at `warn` without. Logs go to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "gatebundle=debug,warn"
    } else {
        "gatebundle=warn"
    }
}

/// Install the global subscriber; later calls are ignored
pub fn init(verbose: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directives(verbose).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives(true), "gatebundle=debug,warn");
        assert_eq!(default_directives(false), "gatebundle=warn");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}

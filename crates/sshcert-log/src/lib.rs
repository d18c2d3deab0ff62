// ABOUTME: Shared logging setup for sshcert binaries
// ABOUTME: Crate-prefixed EnvFilter on stderr so stdout stays free for command output

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// Build the filter used by sshcert binaries.
///
/// WARN for everything, INFO for targets starting with `prefix` (DEBUG when
/// `verbose`). Directives in `RUST_LOG` are applied first and can widen it.
pub fn filter_for(prefix: &str, verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "info" };

    EnvFilter::from_default_env()
        .add_directive(Level::WARN.into())
        .add_directive(crate_directive(prefix, level))
}

fn crate_directive(prefix: &str, level: &str) -> Directive {
    format!("{prefix}={level}")
        .parse()
        .unwrap_or_else(|_| Level::INFO.into())
}

/// Install the stderr subscriber. Safe to call more than once; later calls are ignored.
pub fn init_for(prefix: &str, verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(prefix, verbose))
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}

//! Diagnostic logging setup.
//!
//! User-facing progress goes through `output`; this is the `tracing` side
//! channel for debugging, written to stderr so it never mixes with stdout.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects `debug` for this
/// crate and everything else stays at `warn`. Safe to call more than once.
pub fn init(verbose: bool) {
    let default = if verbose {
        "warn,pitunnel_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

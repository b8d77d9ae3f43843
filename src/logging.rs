use std::io;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs always go to stderr so stdout only
/// ever carries program output. `RUST_LOG` wins over `verbose` when set.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "brfucky=debug" } else { "brfucky=warn" })
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

//! Log output setup.
//!
//! Progress lines from every stage go through `tracing`. The CLI's
//! `-q`/`-v` flags pick the default level; `RUST_LOG` overrides it.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Default filter directive for the given flags.
pub fn default_directive(quiet: bool, verbose: u8) -> &'static str {
    if quiet {
        return "warn";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global stderr subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(quiet: bool, verbose: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(quiet, verbose)));

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose >= 2)
                .without_time(),
        )
        .try_init();

    if let Err(e) = result {
        tracing::debug!("logging already initialized: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_levels() {
        assert_eq!(default_directive(false, 0), "info");
        assert_eq!(default_directive(false, 1), "debug");
        assert_eq!(default_directive(false, 2), "trace");
        assert_eq!(default_directive(false, 9), "trace");
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        assert_eq!(default_directive(true, 2), "warn");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(true, 0);
        init(false, 1);
    }
}

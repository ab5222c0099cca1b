//! Logging setup for the `sama` binary.
//!
//! Log lines go to stderr so that list and status output on stdout stays
//! parseable. `RUST_LOG` always wins over the level picked here.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Map a `-v` count to a default filter level
///
/// No flag only shows warnings and errors (bad rows, failed saves).
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber for the given `-v` count
pub fn init(verbosity: u8) {
    init_with_level(level_for(verbosity))
}

/// Install the global subscriber with `default_level` unless `RUST_LOG` is set
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(9), "trace");
    }
}

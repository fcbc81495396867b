//! Logging setup for the binary.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! caller's choice. The binary calls [`init_tracing`] once at startup.
//!
//! `TAXOCLUST_LOG` takes precedence, then `RUST_LOG`, then a level derived
//! from the `-v` count. Output goes to stderr so stdout stays machine
//! readable.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV_VAR: &str = "TAXOCLUST_LOG";

static INIT: Once = Once::new();

/// Default filter directive for a `-v` count
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "taxoclust=warn",
        1 => "taxoclust=info",
        2 => "taxoclust=debug",
        _ => "taxoclust=trace",
    }
}

fn build_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_tracing(verbosity: u8) {
    INIT.call_once(|| {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(verbosity > 1);

        // another subscriber may already be installed by an embedding program
        let _ = tracing_subscriber::registry()
            .with(layer)
            .with(build_filter(verbosity))
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(default_directive(0), "taxoclust=warn");
        assert_eq!(default_directive(2), "taxoclust=debug");
        assert_eq!(default_directive(9), "taxoclust=trace");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_tracing(0);
        init_tracing(3);
    }
}

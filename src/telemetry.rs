//! Logging setup for binaries and demos
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the program embedding it.

use tracing_subscriber::EnvFilter;

/// Install a formatted `tracing` subscriber.
///
/// `RUST_LOG` takes precedence; `default_filter` (e.g. `"info"` or
/// `"credit_sweep=debug"`) applies when it is unset or invalid. Calling this
/// again after a subscriber is installed does nothing.
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init("warn");
        init("debug");
        tracing::info!("still logging after repeated init");
    }
}

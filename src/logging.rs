//! `tracing` subscriber setup for binaries and tests embedding this crate.
//!
//! The library only emits events. Nothing is printed until a subscriber is
//! installed, e.g. with [`init_logging`]. `RUST_LOG` overrides the default
//! filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{DataError, Result};

fn filter(verbose: bool) -> EnvFilter {
    let default = if verbose {
        "docalist_data=debug,info"
    } else {
        "docalist_data=info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install a compact stderr subscriber.
///
/// With `verbose`, this crate's debug events (writer counts, registrations)
/// are shown too.
///
/// # Errors
///
/// Returns [`DataError::InvalidConfiguration`] if a global subscriber is
/// already installed.
pub fn init_logging(verbose: bool) -> Result<()> {
    tracing_subscriber::registry()
        .with(filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| DataError::InvalidConfiguration(format!("logging already initialized: {e}")))
}

/// Install a subscriber writing through the test harness, so output is only
/// shown for failing tests. Safe to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::registry()
        .with(filter(true))
        .with(
            tracing_subscriber::fmt::layer()
                .with_test_writer()
                .with_target(false)
                .compact(),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails_without_panicking() {
        init_test_logging();
        init_test_logging();
        assert!(matches!(
            init_logging(false),
            Err(DataError::InvalidConfiguration(_))
        ));
    }
}

//! Shared test-only logging setup.
//!
//! Mirrors the teacher's `utils::logging::init_logging`, trimmed to
//! stderr-only: integration tests have no application temp directory to
//! write a log file into, and only need `RUST_LOG` to work.

use std::sync::Once;

static INIT: Once = Once::new();

/// Install a stderr-only `tracing` subscriber. Respects `RUST_LOG`, default
/// `info`. Safe to call from every test; only the first call does anything.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

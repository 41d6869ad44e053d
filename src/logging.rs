use std::io;

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,parcel_tracker=debug";

/// Install a compact stdout subscriber.
///
/// Honors `RUST_LOG`, falling back to `info,parcel_tracker=debug`. Calling it
/// again after a subscriber is installed is a no-op.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

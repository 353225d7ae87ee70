//! Logging setup for the safedi binary.

use tracing_subscriber::EnvFilter;

/// Initializes the global subscriber. The `SAFEDI_LOG` environment variable
/// controls the filter; the default only surfaces warnings.
pub fn init() {
    let filter = EnvFilter::try_from_env("SAFEDI_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

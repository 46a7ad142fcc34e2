//! `tracing-subscriber` setup shared by the binaries.
//!
//! Log output goes to stderr so it never interleaves with the chat
//! transcript on stdout. `RUST_LOG` overrides the default filter.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install a stderr fmt subscriber filtered by `RUST_LOG`, or by
/// `default_directive` (e.g. `"warn"`) when the variable is unset or invalid.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

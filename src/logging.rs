//! Log output setup
//!
//! The library only emits `tracing` events. Hosts that want them on stderr call
//! [`init_logging`] once; the CLI does so at startup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "cheez_bridge=info";

/// Install a fmt subscriber. `filter` takes precedence over `RUST_LOG`.
///
/// Returns `false` when a global subscriber is already installed.
pub fn init_logging(filter: Option<&str>) -> bool {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}

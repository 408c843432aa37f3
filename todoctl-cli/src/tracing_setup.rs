//! Console logging for the todoctl binary
//!
//! Usage:
//!   todoctl --debug serve              # Debug logging to console
//!   RUST_LOG=todoctl_core=info todoctl # Fine-grained log control

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Enable debug logging (used when RUST_LOG is not set)
    pub debug: bool,
}

fn fallback_directive(config: &TracingConfig) -> &'static str {
    if config.debug {
        "debug"
    } else {
        "info"
    }
}

/// Install the compact fmt subscriber; `RUST_LOG` wins over `--debug`.
pub fn init(config: &TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback_directive(config)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

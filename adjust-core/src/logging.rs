#![forbid(unsafe_code)]

//! Diagnostics go to stderr; stdout belongs to the protocol.

use crate::config::RuntimeConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
/// Returns false when a subscriber was already installed.
pub fn init(cfg: &RuntimeConfig) -> bool {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(cfg.log_ansi)
		.with_target(false)
		.try_init()
		.is_ok()
}

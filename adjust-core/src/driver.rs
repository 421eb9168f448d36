#![forbid(unsafe_code)]

//! The trait a concrete driver implements.

use crate::cancel::{CancelContext, CancelToken};
use crate::error::Result;
use crate::types::{AdjustRequest, SettingsDocument};

/// What a concrete driver supplies. The runtime owns argv, stdin, stdout
/// and exit codes; implementations only talk to their platform.
pub trait Driver: Send + Sync + 'static {
	/// Current state of `app_id`'s adjustable settings.
	fn query(&self, app_id: &str) -> Result<SettingsDocument>;

	/// Apply `request` to `app_id`. Unknown settings, bad values and
	/// unreachable targets are reported by returning an error. Long-running
	/// implementations should poll `cancel` at safe points.
	fn adjust(&self, app_id: &str, request: AdjustRequest, cancel: &CancelToken) -> Result<()>;

	/// Runs on the signal-watch thread after the cancel flag is already set.
	fn handle_cancel(&self, ctx: &CancelContext) {
		tracing::warn!(signal = ctx.signal, "Received cancel signal");
	}
}

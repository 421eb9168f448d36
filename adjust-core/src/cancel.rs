#![forbid(unsafe_code)]

//! Cooperative cancellation. The signal wakes a watch thread that flips
//! the token and then calls the driver hook; `adjust` decides when to look
//! at the token.

use crate::error::{AdjustError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Shared flag handed to `Driver::adjust`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
	flag: Arc<AtomicBool>,
}

impl CancelToken {
	/// Fresh, not cancelled.
	pub fn new() -> Self { Self::default() }

	/// Request cancellation. Idempotent.
	pub fn cancel(&self) { self.flag.store(true, Ordering::SeqCst); }

	/// Whether cancellation was requested.
	pub fn is_cancelled(&self) -> bool { self.flag.load(Ordering::SeqCst) }

	/// `Err(Cancelled)` once cancellation was requested.
	pub fn check(&self) -> Result<()> {
		if self.is_cancelled() { Err(AdjustError::Cancelled) } else { Ok(()) }
	}

	/// Sleep for `total`, waking every few milliseconds to honor cancellation.
	pub fn pause(&self, total: Duration) -> Result<()> {
		let deadline = Instant::now() + total;
		loop {
			self.check()?;
			let now = Instant::now();
			if now >= deadline {
				return Ok(());
			}
			std::thread::sleep(POLL_INTERVAL.min(deadline - now));
		}
	}
}

/// Passed to `Driver::handle_cancel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelContext {
	/// Signal number that triggered cancellation.
	pub signal: i32,
}

/// Called on the watch thread for each delivered signal.
pub type CancelHook = Box<dyn Fn(&CancelContext) + Send + 'static>;

#[cfg(unix)]
pub use imp::CancelRegistration;

#[cfg(unix)]
mod imp {
	use super::{CancelContext, CancelHook, CancelToken};
	use signal_hook::consts::SIGUSR1;
	use signal_hook::iterator::{Handle, Signals};
	use std::io;
	use std::thread::JoinHandle;

	/// Live `SIGUSR1` registration. Dropping it stops the watch thread after
	/// any hook already in flight has returned.
	pub struct CancelRegistration {
		handle: Handle,
		watcher: Option<JoinHandle<()>>,
	}

	impl CancelRegistration {
		pub(crate) fn install(token: &CancelToken, hook: CancelHook) -> io::Result<Self> {
			let mut signals = Signals::new([SIGUSR1])?;
			let handle = signals.handle();
			let token = token.clone();
			let watcher = std::thread::Builder::new().name("adjust-cancel".into()).spawn(move || {
				for signal in signals.forever() {
					token.cancel();
					hook(&CancelContext { signal });
				}
			});
			match watcher {
				Ok(w) => Ok(Self { handle, watcher: Some(w) }),
				Err(e) => {
					handle.close();
					Err(e)
				}
			}
		}
	}

	impl Drop for CancelRegistration {
		fn drop(&mut self) {
			self.handle.close();
			if let Some(w) = self.watcher.take() {
				let _ = w.join();
			}
		}
	}
}

/// Register the cancel signal for the duration of the returned guard.
#[cfg(unix)]
pub fn install(token: &CancelToken, hook: CancelHook) -> std::io::Result<Option<CancelRegistration>> {
	CancelRegistration::install(token, hook).map(Some)
}

/// No cancel signal on this platform; nothing is registered.
#[cfg(not(unix))]
pub fn install(_token: &CancelToken, _hook: CancelHook) -> std::io::Result<Option<()>> {
	tracing::warn!("cancel signal is not available on this platform");
	Ok(None)
}

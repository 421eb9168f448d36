#![forbid(unsafe_code)]

//! Process entry point: config, logging, argv, one mode, exit code.

use crate::cancel::{self, CancelContext, CancelToken};
use crate::cli::Invocation;
use crate::config::RuntimeConfig;
use crate::driver::Driver;
use crate::error::Result;
use crate::logging;
use crate::protocol::{emit_error, write_line, InfoEnvelope, QueryEnvelope, StatusEnvelope};
use crate::types::AdjustRequest;
use std::io::{self, Read, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drives one invocation of a driver executable.
pub struct Runtime<D: Driver> {
	driver: Arc<D>,
	name: String,
	description: String,
	version: String,
	has_cancel: bool,
}

impl<D: Driver> Runtime<D> {
	/// Runtime for `driver`, reporting `version` from `--version` and `--info`.
	pub fn new(driver: D, version: impl Into<String>) -> Self {
		Self {
			driver: Arc::new(driver),
			name: "adjust".into(),
			description: String::new(),
			version: version.into(),
			has_cancel: false,
		}
	}

	/// Program name shown in usage text.
	pub fn name(mut self, name: impl Into<String>) -> Self { self.name = name.into(); self }

	/// One-line description shown by `--help`.
	pub fn description(mut self, description: impl Into<String>) -> Self { self.description = description.into(); self }

	/// Advertise cancellation through `--info` and listen for the cancel signal during adjust.
	pub fn with_cancel(mut self, has_cancel: bool) -> Self { self.has_cancel = has_cancel; self }

	/// Version string given to [`Runtime::new`].
	pub fn version(&self) -> &str { &self.version }
	/// Whether cancellation is advertised and honored.
	pub fn has_cancel(&self) -> bool { self.has_cancel }
	/// The wrapped driver.
	pub fn driver(&self) -> &D { &self.driver }

	/// Process entry point: config, logging, argv, then one mode against
	/// the real stdin/stdout. Usage errors exit here with clap's status.
	pub fn run(self) -> ExitCode {
		match RuntimeConfig::discover() {
			Ok(cfg) => {
				logging::init(&cfg);
			}
			Err(e) => {
				logging::init(&RuntimeConfig::default());
				warn!("ignoring runtime config: {e}");
			}
		}
		let invocation = match Invocation::try_parse_from(&self.name, &self.description, std::env::args_os()) {
			Ok(i) => i,
			Err(e) => e.exit(),
		};
		let stdin = io::stdin();
		let stdout = io::stdout();
		match self.execute(&invocation, stdin.lock(), &mut stdout.lock()) {
			Ok(()) => ExitCode::SUCCESS,
			Err(_) => ExitCode::FAILURE,
		}
	}

	/// Run `invocation` against the given streams. On failure the error
	/// envelope has already been written to `out` when this returns `Err`.
	pub fn execute<R: Read, W: Write>(&self, invocation: &Invocation, input: R, out: &mut W) -> Result<()> {
		let span = tracing::debug_span!("invocation", mode = invocation.mode(), app_id = invocation.app_id().unwrap_or_default());
		let _enter = span.enter();
		let res: Result<()> = match invocation {
			Invocation::Version => writeln!(out, "{}", self.version()).and_then(|()| out.flush()).map_err(Into::into),
			Invocation::Info => write_line(out, &InfoEnvelope { version: self.version(), has_cancel: self.has_cancel() }),
			Invocation::Query { app_id } => self.query(app_id, out),
			Invocation::Adjust { app_id } => self.adjust(app_id, input, out),
		};
		if let Err(e) = &res {
			emit_error(out, e);
		}
		res
	}

	fn query<W: Write>(&self, app_id: &str, out: &mut W) -> Result<()> {
		let document = self.driver.query(app_id)?;
		debug!(settings = document.len(), "query complete");
		write_line(out, &QueryEnvelope { application: &document })
	}

	fn adjust<R: Read, W: Write>(&self, app_id: &str, mut input: R, out: &mut W) -> Result<()> {
		let token = CancelToken::new();
		let _registration = if self.has_cancel() {
			let driver = Arc::clone(&self.driver);
			match cancel::install(&token, Box::new(move |ctx: &CancelContext| driver.handle_cancel(ctx))) {
				Ok(r) => r,
				Err(e) => {
					warn!("failed to register cancel signal: {e}");
					None
				}
			}
		} else {
			None
		};

		let mut raw = String::new();
		input.read_to_string(&mut raw)?;
		let request = AdjustRequest::parse(&raw)?;
		debug!(bytes = raw.len(), "adjust request parsed");

		self.driver.adjust(app_id, request, &token)?;
		info!(cancelled = token.is_cancelled(), "adjust complete");
		write_line(out, &StatusEnvelope::OK)
	}
}

#![forbid(unsafe_code)]

//! Adjust driver for settings kept in a JSON state file.
//!
//! State path: `ADJUST_FILE_STATE` (default `./adjust-state.json`).
//! `ADJUST_FILE_DELAY_MS` holds an adjust before it applies, which is
//! where `SIGUSR1` cancellation gets a chance to land.

mod state;

use adjust_core::Runtime;
use state::FileDriver;
use std::process::ExitCode;

fn main() -> ExitCode {
	Runtime::new(FileDriver::from_env(), env!("CARGO_PKG_VERSION"))
		.name("adjust-file")
		.description("Adjust driver for application settings stored in a JSON state file")
		.with_cancel(true)
		.run()
}

#![forbid(unsafe_code)]

//! Adjust driver runtime
//!
//! A driver executable is invoked by a supervising control loop in one of
//! four modes (`--version`, `--info`, `--query <app>`, or adjust `<app>`
//! with a JSON request on stdin) and answers with exactly one line on
//! stdout. This crate owns that contract; a driver only implements
//! [`Driver`]:
//!
//! ```no_run
//! use adjust_core::{AdjustRequest, CancelToken, Driver, Result, Runtime, Setting, SettingsDocument};
//!
//! struct Noop;
//!
//! impl Driver for Noop {
//!     fn query(&self, _app_id: &str) -> Result<SettingsDocument> {
//!         let mut doc = SettingsDocument::new();
//!         doc.insert_setting("replicas", Setting::new(1));
//!         Ok(doc)
//!     }
//!     fn adjust(&self, _app_id: &str, _req: AdjustRequest, cancel: &CancelToken) -> Result<()> {
//!         cancel.check()
//!     }
//! }
//!
//! fn main() -> std::process::ExitCode {
//!     Runtime::new(Noop, "0.1.0").description("no-op driver").with_cancel(true).run()
//! }
//! ```
//!
//! Diagnostics go through `tracing` to stderr; see [`logging`] and [`config`].

pub mod cancel;
pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod runtime;
pub mod types;

pub use cancel::{CancelContext, CancelToken};
pub use cli::Invocation;
pub use config::RuntimeConfig;
pub use driver::Driver;
pub use error::{AdjustError, Result};
pub use protocol::ErrorEnvelope;
pub use runtime::Runtime;
pub use types::{AdjustRequest, Setting, SettingsDocument, SettingsNode};

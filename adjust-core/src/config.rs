#![forbid(unsafe_code)]

//! Runtime configuration: an optional TOML file plus env overrides.

use crate::error::{AdjustError, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Names the TOML file `RuntimeConfig::discover` starts from.
pub const CONFIG_ENV: &str = "ADJUST_CONFIG";
/// Overrides `log_level`.
pub const LOG_LEVEL_ENV: &str = "ADJUST_LOG_LEVEL";
/// Overrides `log_ansi` (`1` or `true`).
pub const LOG_ANSI_ENV: &str = "ADJUST_LOG_ANSI";

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Ambient runtime settings. None of these change what goes on stdout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuntimeConfig {
	/// One of trace, debug, info, warn, error.
	#[serde(default = "RuntimeConfig::default_log_level")]
	pub log_level: String,
	/// Colored stderr output.
	#[serde(default)]
	pub log_ansi: bool,
}

impl Default for RuntimeConfig {
	fn default() -> Self {
		Self { log_level: Self::default_log_level(), log_ansi: false }
	}
}

impl RuntimeConfig {
	/// `warn`, so a successful run is silent.
	pub fn default_log_level() -> String { "warn".into() }

	/// Read and validate a TOML file.
	pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
		let data = fs::read_to_string(path)?;
		let cfg: Self = toml::from_str(&data).map_err(|e| AdjustError::config(format!("toml parse error: {e}")))?;
		cfg.validate()?;
		Ok(cfg)
	}

	/// Write as TOML.
	pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
		let data = toml::to_string_pretty(self).map_err(|e| AdjustError::config(format!("toml encode error: {e}")))?;
		fs::write(path, data)?;
		Ok(())
	}

	/// Defaults plus env overrides.
	pub fn from_env() -> Result<Self> {
		let mut cfg = Self::default();
		cfg.apply_env();
		cfg.validate()?;
		Ok(cfg)
	}

	/// File named by `ADJUST_CONFIG` (if any), then env overrides.
	pub fn discover() -> Result<Self> {
		let mut cfg = match std::env::var(CONFIG_ENV) {
			Ok(p) if !p.trim().is_empty() => Self::load_from_file(p.trim())?,
			_ => Self::default(),
		};
		cfg.apply_env();
		cfg.validate()?;
		Ok(cfg)
	}

	fn apply_env(&mut self) {
		if let Ok(v) = std::env::var(LOG_LEVEL_ENV) {
			let v = v.trim();
			if !v.is_empty() { self.log_level = v.to_ascii_lowercase(); }
		}
		if let Ok(v) = std::env::var(LOG_ANSI_ENV) {
			self.log_ansi = v == "1" || v.eq_ignore_ascii_case("true");
		}
	}

	/// Reject unknown log levels.
	pub fn validate(&self) -> Result<()> {
		if !LEVELS.contains(&self.log_level.as_str()) {
			return Err(AdjustError::config(format!("invalid log_level: {}", self.log_level)));
		}
		Ok(())
	}
}

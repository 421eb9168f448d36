#![forbid(unsafe_code)]

//! Error type shared by the runtime and drivers.

use serde_json::error::Category;
use thiserror::Error;

/// Result alias defaulting to [`AdjustError`].
pub type Result<T, E = AdjustError> = core::result::Result<T, E>;

/// Every failure the runtime can surface through the error envelope.
#[derive(Debug, Error)]
pub enum AdjustError {
	/// Failure chosen by a driver implementation; `kind` goes on the wire verbatim.
	#[error("{message}")]
	Driver {
		/// Wire identifier.
		kind: String,
		/// Human-readable message.
		message: String,
	},
	/// Stdin or a document did not parse.
	#[error("{0}")]
	Input(#[from] serde_json::Error),
	/// Reading stdin or writing stdout failed.
	#[error("{0}")]
	Io(#[from] std::io::Error),
	/// The request names a setting the application does not have.
	#[error("unknown setting: {0}")]
	UnknownSetting(String),
	/// A requested value fails the setting's constraints.
	#[error("invalid value for {setting}: {reason}")]
	InvalidValue {
		/// Dotted setting name.
		setting: String,
		/// What was wrong.
		reason: String,
	},
	/// The cancel signal arrived before the adjust finished.
	#[error("cancelled")]
	Cancelled,
	/// Runtime or driver configuration is unusable.
	#[error("config: {0}")]
	Config(String),
}

impl AdjustError {
	/// Driver-defined failure with its own wire `kind`.
	pub fn driver(kind: impl Into<String>, message: impl Into<String>) -> Self {
		Self::Driver { kind: kind.into(), message: message.into() }
	}
	/// `ResourceNotFound`.
	pub fn not_found(message: impl Into<String>) -> Self { Self::driver("ResourceNotFound", message) }
	/// `InvalidRequest`: the payload does not have the expected shape.
	pub fn invalid_request(message: impl Into<String>) -> Self { Self::driver("InvalidRequest", message) }
	/// See [`AdjustError::UnknownSetting`].
	pub fn unknown_setting(name: impl Into<String>) -> Self { Self::UnknownSetting(name.into()) }
	/// See [`AdjustError::InvalidValue`].
	pub fn invalid_value(setting: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::InvalidValue { setting: setting.into(), reason: reason.into() }
	}
	/// See [`AdjustError::Config`].
	pub fn config(msg: impl Into<String>) -> Self { Self::Config(msg.into()) }

	/// Short identifier written to the `error` and `class` envelope fields.
	pub fn kind(&self) -> &str {
		match self {
			Self::Driver { kind, .. } => kind.as_str(),
			Self::Input(e) => match e.classify() {
				Category::Syntax => "JsonSyntaxError",
				Category::Eof => "JsonEofError",
				Category::Data => "JsonDataError",
				Category::Io => "IoError",
			},
			Self::Io(_) => "IoError",
			Self::UnknownSetting(_) => "UnknownSetting",
			Self::InvalidValue { .. } => "InvalidValue",
			Self::Cancelled => "Cancelled",
			Self::Config(_) => "ConfigError",
		}
	}

	/// True for [`AdjustError::Cancelled`].
	pub fn is_cancelled(&self) -> bool { matches!(self, Self::Cancelled) }
}

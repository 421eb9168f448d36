#![forbid(unsafe_code)]

//! Stdout envelopes. Every invocation writes exactly one line.

use crate::error::{AdjustError, Result};
use crate::types::SettingsDocument;
use serde::Serialize;
use std::io::Write;

/// `--info` output.
#[derive(Debug, Serialize)]
pub struct InfoEnvelope<'a> {
	/// Driver version.
	pub version: &'a str,
	/// Whether the driver honors the cancel signal.
	pub has_cancel: bool,
}

/// `--query` output.
#[derive(Debug, Serialize)]
pub struct QueryEnvelope<'a> {
	/// Settings of the queried application.
	pub application: &'a SettingsDocument,
}

/// Adjust success line.
#[derive(Debug, Serialize)]
pub struct StatusEnvelope {
	/// Always `ok` today.
	pub status: &'static str,
}

impl StatusEnvelope {
	/// `{"status":"ok"}`
	pub const OK: Self = Self { status: "ok" };
}

/// `{error, class, message}`. `class` carries the same identifier as `error`.
#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorEnvelope {
	/// Error kind.
	pub error: String,
	/// Same as `error`.
	pub class: String,
	/// Human-readable detail.
	pub message: String,
}

impl From<&AdjustError> for ErrorEnvelope {
	fn from(e: &AdjustError) -> Self {
		let kind = e.kind().to_owned();
		Self { class: kind.clone(), error: kind, message: e.to_string() }
	}
}

/// Serialize `doc` as one JSON line and flush.
pub fn write_line<W: Write, T: Serialize + ?Sized>(out: &mut W, doc: &T) -> Result<()> {
	serde_json::to_writer(&mut *out, doc)?;
	out.write_all(b"\n")?;
	out.flush()?;
	Ok(())
}

/// Write the error envelope for `err`. The caller still exits non-zero;
/// a failed write is only logged since there is no channel left to report it on.
pub fn emit_error<W: Write>(out: &mut W, err: &AdjustError) {
	let envelope = ErrorEnvelope::from(err);
	tracing::debug!(error = %envelope.error, message = %envelope.message, "reporting failure");
	if let Err(e) = write_line(out, &envelope) {
		tracing::error!("failed to write error envelope: {e}");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::Setting;

	fn line<T: Serialize>(doc: &T) -> String {
		let mut buf = Vec::new();
		write_line(&mut buf, doc).unwrap();
		String::from_utf8(buf).unwrap()
	}

	#[test]
	fn envelope_shapes() {
		assert_eq!(line(&InfoEnvelope { version: "1.2.0", has_cancel: true }), "{\"version\":\"1.2.0\",\"has_cancel\":true}\n");
		assert_eq!(line(&StatusEnvelope::OK), "{\"status\":\"ok\"}\n");
		let mut doc = SettingsDocument::new();
		doc.insert_setting("replicas", Setting::new(3));
		assert_eq!(line(&QueryEnvelope { application: &doc }), "{\"application\":{\"replicas\":{\"value\":3}}}\n");
	}

	#[test]
	fn error_envelope_mirrors_kind_into_class() {
		let mut buf = Vec::new();
		emit_error(&mut buf, &AdjustError::driver("ResourceNotFound", "Resource not found"));
		assert_eq!(
			String::from_utf8(buf).unwrap(),
			"{\"error\":\"ResourceNotFound\",\"class\":\"ResourceNotFound\",\"message\":\"Resource not found\"}\n"
		);
	}
}

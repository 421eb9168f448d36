#![forbid(unsafe_code)]

use adjust_core::{AdjustError, AdjustRequest, CancelToken, Driver, Result, SettingsDocument, SettingsNode};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use std::{env, fs};
use tracing::{debug, info};

pub const STATE_ENV: &str = "ADJUST_FILE_STATE";
pub const DELAY_ENV: &str = "ADJUST_FILE_DELAY_MS";
const DEFAULT_STATE: &str = "adjust-state.json";

/// Kept as raw JSON so an adjust rewrites only the `value` fields it targets.
type State = Map<String, Value>;

/// Driver over `{ "<app_id>": <settings document>, ... }` stored as JSON.
#[derive(Debug, Clone)]
pub struct FileDriver {
	path: PathBuf,
	/// Raw `ADJUST_FILE_DELAY_MS`; parsed when an adjust needs it.
	delay_ms: Option<String>,
}

impl FileDriver {
	pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into(), delay_ms: None } }

	pub fn from_env() -> Self {
		let path = env::var(STATE_ENV).ok().filter(|p| !p.trim().is_empty()).unwrap_or_else(|| DEFAULT_STATE.into());
		let mut driver = Self::new(path);
		driver.delay_ms = env::var(DELAY_ENV).ok();
		driver
	}

	#[cfg(test)]
	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay_ms = Some(delay.as_millis().to_string());
		self
	}

	#[cfg(test)]
	pub fn path(&self) -> &std::path::Path { &self.path }

	fn delay(&self) -> Result<Duration> {
		match self.delay_ms.as_deref().map(str::trim) {
			None | Some("") => Ok(Duration::ZERO),
			Some(raw) => raw
				.parse::<u64>()
				.map(Duration::from_millis)
				.map_err(|_| AdjustError::config(format!("invalid {DELAY_ENV}: {raw}"))),
		}
	}

	fn load(&self) -> Result<State> {
		let data = match fs::read_to_string(&self.path) {
			Ok(d) => d,
			Err(e) if e.kind() == ErrorKind::NotFound => return Err(AdjustError::not_found("Resource not found")),
			Err(e) => return Err(e.into()),
		};
		serde_json::from_str(&data)
			.map_err(|e| AdjustError::driver("InvalidState", format!("{}: {e}", self.path.display())))
	}

	fn store(&self, state: &State) -> Result<()> {
		let mut tmp = self.path.clone().into_os_string();
		tmp.push(".tmp");
		let tmp = PathBuf::from(tmp);
		fs::write(&tmp, serde_json::to_string_pretty(state)?)?;
		fs::rename(&tmp, &self.path)?;
		Ok(())
	}
}

fn app_not_found(app_id: &str) -> AdjustError { AdjustError::not_found(format!("application {app_id} not found")) }

fn invalid_state(app_id: &str, e: impl std::fmt::Display) -> AdjustError {
	AdjustError::driver("InvalidState", format!("settings of {app_id}: {e}"))
}

fn document(app_id: &str, raw: Value) -> Result<SettingsDocument> {
	serde_json::from_value(raw).map_err(|e| invalid_state(app_id, e))
}

fn qualify(scope: &str, name: &str) -> String {
	if scope.is_empty() { name.to_owned() } else { format!("{scope}.{name}") }
}

/// Reject the whole request before anything is written.
fn validate(doc: &SettingsDocument, req: &Map<String, Value>, scope: &str) -> Result<()> {
	for (name, value) in req {
		let qualified = qualify(scope, name);
		match (doc.get(name), value) {
			(Some(SettingsNode::Setting(s)), v) => s.check(&qualified, v)?,
			(Some(SettingsNode::Group(g)), Value::Object(m)) => validate(g, m, &qualified)?,
			(Some(SettingsNode::Group(_)), _) => {
				return Err(AdjustError::invalid_value(qualified, "expected an object of settings"))
			}
			(None, _) => return Err(AdjustError::unknown_setting(qualified)),
		}
	}
	Ok(())
}

/// Write validated values into the raw tree. Keys the request does not name
/// are left exactly as loaded.
fn apply(node: &mut Map<String, Value>, req: &Map<String, Value>) {
	for (name, value) in req {
		let Some(Value::Object(child)) = node.get_mut(name) else { continue };
		if SettingsNode::is_leaf(child) {
			child.insert("value".into(), value.clone());
		} else if let Value::Object(m) = value {
			apply(child, m);
		}
	}
}

impl Driver for FileDriver {
	fn query(&self, app_id: &str) -> Result<SettingsDocument> {
		let mut state = self.load()?;
		let raw = state.remove(app_id).ok_or_else(|| app_not_found(app_id))?;
		document(app_id, raw)
	}

	fn adjust(&self, app_id: &str, request: AdjustRequest, cancel: &CancelToken) -> Result<()> {
		let delay = self.delay()?;
		let mut state = self.load()?;
		let raw = match state.get_mut(app_id) {
			Some(Value::Object(raw)) => raw,
			Some(_) => return Err(invalid_state(app_id, "expected an object")),
			None => return Err(app_not_found(app_id)),
		};
		let req = request
			.settings_for(app_id)
			.ok_or_else(|| AdjustError::invalid_request(format!("request has no settings for {app_id}")))?;
		validate(&document(app_id, Value::Object(raw.clone()))?, req, "")?;

		if !delay.is_zero() {
			debug!(?delay, "waiting before apply");
			cancel.pause(delay)?;
		}
		cancel.check()?;

		apply(raw, req);
		self.store(&state)?;
		info!(app_id, changed = req.len(), path = %self.path.display(), "settings written");
		Ok(())
	}
}

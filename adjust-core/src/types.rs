#![forbid(unsafe_code)]

//! Settings documents produced by `query` and adjust requests consumed by `adjust`.

use crate::error::{AdjustError, Result};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Step alignment tolerance for float settings.
const STEP_EPSILON: f64 = 1e-9;

/// One adjustable setting: its current value plus optional constraints.
///
/// `value` is never a JSON object; an object under `value` makes the node
/// a group (see [`SettingsNode::is_leaf`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Setting {
	/// Current value.
	pub value: Value,
	/// Inclusive lower bound.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min: Option<Number>,
	/// Inclusive upper bound.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max: Option<Number>,
	/// Increment, counted from `min` (or zero).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub step: Option<Number>,
	/// Enumerated choices, for settings that are not a numeric range.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub values: Option<Vec<Value>>,
	/// Display unit.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub unit: Option<String>,
	/// Serialized as `type`.
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Descriptor keys this type does not model, kept as found.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl Setting {
	/// Unconstrained setting holding `value`.
	pub fn new(value: impl Into<Value>) -> Self {
		Self {
			value: value.into(),
			min: None,
			max: None,
			step: None,
			values: None,
			unit: None,
			kind: None,
			extra: Map::new(),
		}
	}

	/// Inclusive `[min, max]`.
	pub fn range(mut self, min: impl Into<Number>, max: impl Into<Number>) -> Self {
		self.min = Some(min.into());
		self.max = Some(max.into());
		self
	}

	/// Required increment.
	pub fn step(mut self, step: impl Into<Number>) -> Self { self.step = Some(step.into()); self }

	/// Restrict to an enumeration.
	pub fn one_of(mut self, values: impl IntoIterator<Item = Value>) -> Self {
		self.values = Some(values.into_iter().collect());
		self
	}

	/// Display unit, e.g. `cores`.
	pub fn unit(mut self, unit: impl Into<String>) -> Self { self.unit = Some(unit.into()); self }

	/// Free-form type tag, serialized as `type`.
	pub fn kind(mut self, kind: impl Into<String>) -> Self { self.kind = Some(kind.into()); self }

	/// Validate `requested` against this setting's enumeration and range.
	/// `name` is only used in the error.
	pub fn check(&self, name: &str, requested: &Value) -> Result<()> {
		if requested.is_object() {
			return Err(AdjustError::invalid_value(name, "a setting value cannot be an object"));
		}
		if let Some(values) = &self.values {
			if !values.contains(requested) {
				return Err(AdjustError::invalid_value(name, format!("{requested} is not one of {}", Value::Array(values.clone()))));
			}
		}
		if self.min.is_none() && self.max.is_none() && self.step.is_none() {
			return Ok(());
		}
		let v = requested
			.as_f64()
			.ok_or_else(|| AdjustError::invalid_value(name, format!("expected a number, got {requested}")))?;
		if let Some(min) = self.min.as_ref().and_then(Number::as_f64) {
			if v < min { return Err(AdjustError::invalid_value(name, format!("{v} is below min {min}"))); }
		}
		if let Some(max) = self.max.as_ref().and_then(Number::as_f64) {
			if v > max { return Err(AdjustError::invalid_value(name, format!("{v} is above max {max}"))); }
		}
		if let Some(step) = self.step.as_ref().and_then(Number::as_f64).filter(|s| *s > 0.0) {
			let base = self.min.as_ref().and_then(Number::as_f64).unwrap_or(0.0);
			let n = (v - base) / step;
			if (n - n.round()).abs() > STEP_EPSILON {
				return Err(AdjustError::invalid_value(name, format!("{v} is not a multiple of step {step}")));
			}
		}
		Ok(())
	}
}

/// A settings tree node: a leaf setting or a named group (e.g. a component).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SettingsNode {
	/// Leaf.
	Setting(Setting),
	/// Nested settings, keyed by name.
	Group(SettingsDocument),
}

impl SettingsNode {
	/// A JSON object is a leaf when it carries a non-object `value`.
	/// Anything else, including an object whose `value` member is itself an
	/// object, is a group.
	pub fn is_leaf(node: &Map<String, Value>) -> bool { node.get("value").is_some_and(|v| !v.is_object()) }
}

impl<'de> Deserialize<'de> for SettingsNode {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = Map::<String, Value>::deserialize(deserializer)?;
		let node = if Self::is_leaf(&raw) {
			serde_json::from_value(Value::Object(raw)).map(Self::Setting)
		} else {
			serde_json::from_value(Value::Object(raw)).map(Self::Group)
		};
		node.map_err(de::Error::custom)
	}
}

/// What `query` reports. Serialized as a plain JSON object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SettingsDocument(BTreeMap<String, SettingsNode>);

impl SettingsDocument {
	/// Empty document.
	pub fn new() -> Self { Self::default() }

	/// Add or replace a leaf.
	pub fn insert_setting(&mut self, name: impl Into<String>, setting: Setting) -> &mut Self {
		self.0.insert(name.into(), SettingsNode::Setting(setting));
		self
	}

	/// Add or replace a nested group.
	pub fn insert_group(&mut self, name: impl Into<String>, group: SettingsDocument) -> &mut Self {
		self.0.insert(name.into(), SettingsNode::Group(group));
		self
	}

	/// Node directly under this document.
	pub fn get(&self, name: &str) -> Option<&SettingsNode> { self.0.get(name) }

	/// Top-level leaf setting by name.
	pub fn setting(&self, name: &str) -> Option<&Setting> {
		match self.0.get(name) {
			Some(SettingsNode::Setting(s)) => Some(s),
			_ => None,
		}
	}

	/// Nodes in name order.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingsNode)> { self.0.iter() }
	/// Number of direct children.
	pub fn len(&self) -> usize { self.0.len() }
	/// True when the document has no children.
	pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

/// Parsed stdin payload of adjust mode. The runtime imposes no schema;
/// drivers interpret it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AdjustRequest(Value);

impl AdjustRequest {
	/// Parse stdin text. Any JSON document is accepted.
	pub fn parse(input: &str) -> Result<Self> { Ok(Self(serde_json::from_str(input)?)) }

	/// `{app_id: {setting: value, ...}}` lookup. None when the payload has
	/// no object under `app_id`.
	pub fn settings_for(&self, app_id: &str) -> Option<&Map<String, Value>> {
		self.0.get(app_id).and_then(Value::as_object)
	}

	/// The raw payload.
	pub fn into_value(self) -> Value { self.0 }
}

impl From<Value> for AdjustRequest {
	fn from(v: Value) -> Self { Self(v) }
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn bare_value_document_serializes_flat() {
		let mut doc = SettingsDocument::new();
		doc.insert_setting("replicas", Setting::new(3));
		assert_eq!(serde_json::to_value(&doc).unwrap(), json!({"replicas": {"value": 3}}));
	}

	#[test]
	fn grouped_document_round_trips_through_json() {
		let raw = json!({
			"web": {"cpu": {"value": 0.5, "min": 0.1, "max": 2, "unit": "cores"}},
			"replicas": {"value": 3}
		});
		let doc: SettingsDocument = serde_json::from_value(raw.clone()).unwrap();
		assert!(matches!(doc.get("web"), Some(SettingsNode::Group(_))));
		assert_eq!(doc.setting("replicas").map(|s| &s.value), Some(&json!(3)));
		assert_eq!(serde_json::to_value(&doc).unwrap(), raw);
	}

	#[test]
	fn unmodelled_descriptor_keys_survive() {
		let raw = json!({"replicas": {"value": 3, "description": "pod count", "min": 1}});
		let doc: SettingsDocument = serde_json::from_value(raw.clone()).unwrap();
		let s = doc.setting("replicas").unwrap();
		assert_eq!(s.extra.get("description"), Some(&json!("pod count")));
		assert_eq!(serde_json::to_value(&doc).unwrap(), raw);
	}

	#[test]
	fn group_with_child_named_value_stays_a_group() {
		let raw = json!({"jvm": {"value": {"value": 1}, "heap": {"value": 512}}});
		let doc: SettingsDocument = serde_json::from_value(raw.clone()).unwrap();
		let Some(SettingsNode::Group(jvm)) = doc.get("jvm") else { panic!("jvm parsed as {:?}", doc.get("jvm")) };
		assert_eq!(jvm.len(), 2);
		assert_eq!(jvm.setting("heap").map(|s| &s.value), Some(&json!(512)));
		assert_eq!(serde_json::to_value(&doc).unwrap(), raw);
		assert!(serde_json::from_value::<SettingsDocument>(json!({"replicas": 3})).is_err());
	}

	#[test]
	fn built_document_matches_wire_shape() {
		let mut web = SettingsDocument::new();
		web.insert_setting("cpu", Setting::new(0.5).unit("cores").kind("range"));
		let mut doc = SettingsDocument::new();
		doc.insert_group("web", web).insert_setting("replicas", Setting::new(2));
		let names: Vec<_> = doc.iter().map(|(name, _)| name.as_str()).collect();
		assert_eq!(names, ["replicas", "web"]);
		assert_eq!(
			serde_json::to_value(&doc).unwrap(),
			json!({"replicas": {"value": 2}, "web": {"cpu": {"value": 0.5, "unit": "cores", "type": "range"}}})
		);
	}

	#[test]
	fn object_values_are_rejected() {
		let e = Setting::new(1).check("replicas", &json!({"value": 2})).unwrap_err();
		assert_eq!(e.kind(), "InvalidValue");
	}

	#[test]
	fn range_and_step_checks() {
		let s = Setting::new(2).range(1, 10).step(1);
		assert!(s.check("replicas", &json!(5)).is_ok());
		assert!(s.check("replicas", &json!(0)).is_err());
		assert!(s.check("replicas", &json!(11)).is_err());
		let e = s.check("replicas", &json!(2.5)).unwrap_err();
		assert!(e.to_string().contains("step"));
		assert_eq!(s.check("replicas", &json!("five")).unwrap_err().kind(), "InvalidValue");
	}

	#[test]
	fn float_step_tolerates_rounding() {
		let s = Setting::new(0.5).range(Number::from_f64(0.1).unwrap(), 2).step(Number::from_f64(0.1).unwrap());
		assert!(s.check("cpu", &json!(0.3)).is_ok());
		assert!(s.check("cpu", &json!(0.35)).is_err());
	}

	#[test]
	fn enumerated_values() {
		let s = Setting::new("g1").one_of([json!("g1"), json!("parallel")]);
		assert!(s.check("gc", &json!("parallel")).is_ok());
		assert!(s.check("gc", &json!("zgc")).is_err());
		assert!(Setting::new(1).check("free", &json!("anything")).is_ok());
	}

	#[test]
	fn request_lookup_by_app() {
		let req = AdjustRequest::parse(r#"{"svc1":{"replicas":5},"svc2":7}"#).unwrap();
		assert_eq!(req.settings_for("svc1").and_then(|m| m.get("replicas")), Some(&json!(5)));
		assert!(req.settings_for("svc2").is_none());
		assert!(req.settings_for("svc3").is_none());
		assert_eq!(AdjustRequest::parse("[1,").unwrap_err().kind(), "JsonEofError");
	}
}

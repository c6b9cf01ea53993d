//! Option registry and type conversion
//!
//! Each widget type declares a static table of `OptionDescriptor`s. An
//! `OptionSet` holds one instance's explicitly set values and encodes them,
//! in table order, into the payload handed to the client-side constructor.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::WidgetError;
use crate::markup;
use crate::Result;

/// Shape accepted by an option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    Int,
    Text,
    /// A JSON value, or a string holding JSON text
    Json,
    /// `true`/`false` for the whole widget, or a list of zero-based indices
    BoolOrIndexList,
}

impl OptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::Bool => "boolean",
            OptionKind::Int => "integer",
            OptionKind::Text => "string",
            OptionKind::Json => "JSON value",
            OptionKind::BoolOrIndexList => "boolean or list of indices",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitPolicy {
    /// Emitted only when explicitly set
    WhenSet,
    /// Emitted always, with the default standing in when unset
    Always,
}

/// Client-side default, kept for documentation and `Always` emission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

impl DefaultValue {
    pub fn to_json(self) -> Value {
        match self {
            DefaultValue::Null => Value::Null,
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::Int(i) => Value::from(i),
            DefaultValue::Str(s) => Value::String(s.to_string()),
        }
    }
}

/// Static metadata for one configurable property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDescriptor {
    /// Server-side property name, e.g. `Collapsible`
    pub property: &'static str,
    /// Name in the initialization payload, e.g. `collapsible`
    pub wire_name: &'static str,
    pub kind: OptionKind,
    pub default: DefaultValue,
    /// String values are markup fragments and must be canonicalized
    pub html_encoded: bool,
    pub emit: EmitPolicy,
}

impl OptionDescriptor {
    pub const fn new(
        property: &'static str,
        wire_name: &'static str,
        kind: OptionKind,
        default: DefaultValue,
    ) -> Self {
        Self {
            property,
            wire_name,
            kind,
            default,
            html_encoded: false,
            emit: EmitPolicy::WhenSet,
        }
    }

    pub const fn html_encoded(mut self) -> Self {
        self.html_encoded = true;
        self
    }

    pub const fn always_emit(mut self) -> Self {
        self.emit = EmitPolicy::Always;
        self
    }

    /// Default in its encoded form
    pub fn encoded_default(&self) -> Value {
        match self.default {
            DefaultValue::Str(s) if self.html_encoded => {
                Value::String(markup::normalize_fragment(s))
            }
            other => other.to_json(),
        }
    }
}

/// The polymorphic `disabled` option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Disabled {
    /// Disable (`true`) or enable (`false`) the whole widget
    Flag(bool),
    /// Zero-based positions of the children to disable
    Indices(Vec<usize>),
}

impl Disabled {
    pub fn to_json(&self) -> Value {
        match self {
            Disabled::Flag(flag) => Value::Bool(*flag),
            Disabled::Indices(indices) => {
                Value::Array(indices.iter().map(|&i| Value::from(i)).collect())
            }
        }
    }

    /// Accept a boolean or an array of non-negative integers; reject
    /// everything else.
    pub fn from_json(value: &Value) -> std::result::Result<Self, String> {
        match value {
            Value::Bool(flag) => Ok(Disabled::Flag(*flag)),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .and_then(|i| usize::try_from(i).ok())
                        .ok_or_else(|| format!("expected a non-negative index, got {}", item))
                })
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Disabled::Indices),
            other => Err(format!(
                "expected a boolean or a list of indices, got {}",
                json_type_name(other)
            )),
        }
    }
}

impl From<bool> for Disabled {
    fn from(flag: bool) -> Self {
        Disabled::Flag(flag)
    }
}

impl From<Vec<usize>> for Disabled {
    fn from(indices: Vec<usize>) -> Self {
        Disabled::Indices(indices)
    }
}

/// A runtime option value before conversion
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Json(Value),
    Disabled(Disabled),
}

impl OptionValue {
    fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Bool(_) => "boolean",
            OptionValue::Int(_) => "integer",
            OptionValue::Text(_) => "string",
            OptionValue::Json(_) => "JSON value",
            OptionValue::Disabled(_) => "disabled value",
        }
    }

    /// Interpret an untyped value according to the descriptor's kind
    pub fn from_json(descriptor: &OptionDescriptor, value: Value) -> Result<Self> {
        let name = descriptor.wire_name;
        let mismatch = |value: &Value| {
            WidgetError::invalid_value(
                name,
                format!(
                    "expected {}, got {}",
                    descriptor.kind.as_str(),
                    json_type_name(value)
                ),
            )
        };

        match descriptor.kind {
            OptionKind::Bool => value
                .as_bool()
                .map(OptionValue::Bool)
                .ok_or_else(|| mismatch(&value)),
            OptionKind::Int => value
                .as_i64()
                .map(OptionValue::Int)
                .ok_or_else(|| mismatch(&value)),
            OptionKind::Text => match value {
                Value::String(s) => Ok(OptionValue::Text(s)),
                other => Err(mismatch(&other)),
            },
            OptionKind::Json => Ok(OptionValue::Json(value)),
            OptionKind::BoolOrIndexList => Disabled::from_json(&value)
                .map(OptionValue::Disabled)
                .map_err(|reason| WidgetError::invalid_value(name, reason)),
        }
    }

    /// Convert into the wire representation for `descriptor`
    pub fn encode(&self, descriptor: &OptionDescriptor) -> Result<Value> {
        let name = descriptor.wire_name;

        match (descriptor.kind, self) {
            (OptionKind::Bool, OptionValue::Bool(b)) => Ok(Value::Bool(*b)),
            (OptionKind::Int, OptionValue::Int(i)) => Ok(Value::from(*i)),
            (OptionKind::Text, OptionValue::Text(s)) if descriptor.html_encoded => {
                Ok(Value::String(markup::normalize_fragment(s)))
            }
            (OptionKind::Text, OptionValue::Text(s)) => Ok(Value::String(s.clone())),
            (OptionKind::Json, OptionValue::Json(Value::String(text))) => serde_json::from_str(text)
                .map_err(|e| WidgetError::invalid_value(name, format!("not valid JSON: {}", e))),
            (OptionKind::Json, OptionValue::Json(value)) => Ok(value.clone()),
            (OptionKind::Json, OptionValue::Text(text)) => serde_json::from_str(text)
                .map_err(|e| WidgetError::invalid_value(name, format!("not valid JSON: {}", e))),
            (OptionKind::BoolOrIndexList, OptionValue::Disabled(disabled)) => {
                Ok(disabled.to_json())
            }
            (OptionKind::BoolOrIndexList, OptionValue::Bool(flag)) => Ok(Value::Bool(*flag)),
            (kind, value) => Err(WidgetError::invalid_value(
                name,
                format!("expected {}, got {}", kind.as_str(), value.type_name()),
            )),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read-only view over a widget type's descriptor table
#[derive(Debug, Clone, Copy)]
pub struct OptionRegistry {
    descriptors: &'static [OptionDescriptor],
}

impl OptionRegistry {
    pub const fn new(descriptors: &'static [OptionDescriptor]) -> Self {
        Self { descriptors }
    }

    /// Look up by wire name or by property name
    pub fn find(&self, name: &str) -> Option<&'static OptionDescriptor> {
        let descriptors: &'static [OptionDescriptor] = self.descriptors;
        descriptors
            .iter()
            .find(|d| d.wire_name == name || d.property == name)
    }
}

/// Explicitly set option values of one widget instance
#[derive(Debug, Clone)]
pub struct OptionSet {
    registry: OptionRegistry,
    values: HashMap<&'static str, OptionValue>,
}

impl OptionSet {
    pub fn new(registry: OptionRegistry) -> Self {
        Self {
            registry,
            values: HashMap::new(),
        }
    }

    fn descriptor(&self, name: &str) -> Result<&'static OptionDescriptor> {
        self.registry
            .find(name)
            .ok_or_else(|| WidgetError::UnknownOption(name.to_string()))
    }

    /// Set a typed value. The value is converted immediately, so a shape
    /// mismatch is reported here rather than at render time.
    pub fn set(&mut self, name: &str, value: OptionValue) -> Result<()> {
        let descriptor = self.descriptor(name)?;
        value.encode(descriptor)?;
        self.values.insert(descriptor.wire_name, value);
        Ok(())
    }

    /// Set from an untyped value, e.g. one parsed from a declarative source
    pub fn set_json(&mut self, name: &str, value: Value) -> Result<()> {
        let descriptor = self.descriptor(name)?;
        let value = OptionValue::from_json(descriptor, value)?;
        self.set(descriptor.wire_name, value)
    }

    /// Return an option to its unset state
    pub fn clear(&mut self, name: &str) -> Result<Option<OptionValue>> {
        let descriptor = self.descriptor(name)?;
        Ok(self.values.remove(descriptor.wire_name))
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        let descriptor = self.registry.find(name)?;
        self.values.get(descriptor.wire_name)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Encode every set option, plus `Always` options, in table order
    pub fn encode(&self) -> Result<InitPayload> {
        let mut map = Map::new();

        for descriptor in self.registry.descriptors {
            match self.values.get(descriptor.wire_name) {
                Some(value) => {
                    map.insert(descriptor.wire_name.to_string(), value.encode(descriptor)?);
                }
                None if descriptor.emit == EmitPolicy::Always => {
                    map.insert(descriptor.wire_name.to_string(), descriptor.encoded_default());
                }
                None => {}
            }
        }

        Ok(InitPayload(map))
    }
}

/// Ordered wire-name → value mapping for the client-side constructor
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InitPayload(Map<String, Value>);

impl InitPayload {
    pub fn get(&self, wire_name: &str) -> Option<&Value> {
        self.0.get(wire_name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// JSON text safe to embed inside a `<script>` element.
    ///
    /// `<`, `>`, `&`, `'` and the JS line separators only occur inside string
    /// literals in JSON text, so replacing them with `\u` escapes keeps the
    /// value intact for the client while making `</script>` unrepresentable.
    pub fn to_script_literal(&self) -> Result<String> {
        let json = serde_json::to_string(&self.0)?;
        Ok(script_safe(&json))
    }
}

pub(crate) fn script_safe(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for ch in json.chars() {
        match ch {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\'' => out.push_str("\\u0027"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static TEST_OPTIONS: &[OptionDescriptor] = &[
        OptionDescriptor::new("Animate", "animate", OptionKind::Bool, DefaultValue::Bool(false)),
        OptionDescriptor::new(
            "Disabled",
            "disabled",
            OptionKind::BoolOrIndexList,
            DefaultValue::Bool(false),
        ),
        OptionDescriptor::new("Label", "label", OptionKind::Text, DefaultValue::Str("<b>x</b>"))
            .html_encoded(),
        OptionDescriptor::new("Extra", "extra", OptionKind::Json, DefaultValue::Null),
        OptionDescriptor::new("Version", "version", OptionKind::Int, DefaultValue::Int(2))
            .always_emit(),
    ];

    fn option_set() -> OptionSet {
        OptionSet::new(OptionRegistry::new(TEST_OPTIONS))
    }

    #[test]
    fn test_unset_options_omitted() {
        let payload = option_set().encode().unwrap();
        // Only the always-emitted option appears
        assert_eq!(payload.to_json(), json!({"version": 2}));
    }

    #[test]
    fn test_set_options_emitted_in_table_order() {
        let mut options = option_set();
        options.set("version", OptionValue::Int(3)).unwrap();
        options.set("Animate", OptionValue::Bool(false)).unwrap();

        let payload = options.encode().unwrap();
        assert_eq!(payload.keys().collect::<Vec<_>>(), vec!["animate", "version"]);
        // Explicitly set to the default still appears
        assert_eq!(payload.get("animate"), Some(&json!(false)));
    }

    #[test]
    fn test_disabled_shapes() {
        let mut options = option_set();

        options.set_json("disabled", json!(true)).unwrap();
        assert_eq!(options.encode().unwrap().get("disabled"), Some(&json!(true)));

        options.set_json("disabled", json!([0, 2])).unwrap();
        assert_eq!(options.encode().unwrap().get("disabled"), Some(&json!([0, 2])));
        assert_eq!(
            options.get("disabled"),
            Some(&OptionValue::Disabled(Disabled::Indices(vec![0, 2])))
        );

        for bad in [json!("yes"), json!([0, -1]), json!([0, "1"]), json!(1), json!(null)] {
            let err = options.set_json("disabled", bad).unwrap_err();
            assert!(matches!(
                err,
                WidgetError::InvalidOptionValue { ref option, .. } if option == "disabled"
            ));
        }

        // A rejected value leaves the previous one in place
        assert_eq!(options.encode().unwrap().get("disabled"), Some(&json!([0, 2])));
    }

    #[test]
    fn test_typed_mismatch_rejected() {
        let mut options = option_set();
        let err = options
            .set("disabled", OptionValue::Text("all".to_string()))
            .unwrap_err();
        assert!(matches!(err, WidgetError::InvalidOptionValue { .. }));

        assert!(options.set("animate", OptionValue::Int(1)).is_err());
        assert!(options.set_json("version", json!("3")).is_err());
    }

    #[test]
    fn test_unknown_option() {
        let mut options = option_set();
        assert!(matches!(
            options.set_json("nope", json!(1)),
            Err(WidgetError::UnknownOption(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_json_option_from_text() {
        let mut options = option_set();
        options
            .set_json("extra", json!(r#"{"expires": 7, "path": "/"}"#))
            .unwrap();
        assert_eq!(
            options.encode().unwrap().get("extra"),
            Some(&json!({"expires": 7, "path": "/"}))
        );

        assert!(options.set_json("extra", json!("{not json")).is_err());
    }

    #[test]
    fn test_markup_option_canonicalized() {
        let mut options = option_set();
        options
            .set("label", OptionValue::Text("&lt;i&gt;hi&lt;/i&gt;".to_string()))
            .unwrap();
        assert_eq!(options.encode().unwrap().get("label"), Some(&json!("<i>hi</i>")));

        let label = &TEST_OPTIONS[2];
        assert_eq!(label.encoded_default(), json!("<b>x</b>"));
    }

    #[test]
    fn test_clear_option() {
        let mut options = option_set();
        options.set("animate", OptionValue::Bool(true)).unwrap();
        assert!(options.is_set("Animate"));
        assert_eq!(options.clear("animate").unwrap(), Some(OptionValue::Bool(true)));
        assert!(options.encode().unwrap().get("animate").is_none());
    }

    #[test]
    fn test_script_literal_is_script_safe() {
        let mut options = option_set();
        options
            .set("label", OptionValue::Text("</script><script>alert('x')</script>".to_string()))
            .unwrap();

        let literal = options.encode().unwrap().to_script_literal().unwrap();
        assert!(!literal.contains("</"));
        assert!(!literal.contains('\''));

        // The client still sees the original markup
        let parsed: Value = serde_json::from_str(&literal).unwrap();
        assert_eq!(parsed["label"], json!("</script><script>alert('x')</script>"));
    }
}

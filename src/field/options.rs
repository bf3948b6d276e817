use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declarative options for a single field entry.
///
/// Only a handful of keys carry meaning here (`type`, `name`, `text`,
/// `class`, `tooltip`, `alt`); everything else is carried through untouched
/// so that the field can hand the whole map to its base configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldOptions(Map<String, Value>);

impl FieldOptions {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Interpret a JSON value as an options map. Anything but an object yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned().map(Self)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn type_key(&self) -> Option<&str> {
        self.str_option("type")
    }

    pub fn name(&self) -> Option<&str> {
        self.str_option("name")
    }

    /// Raw `text` option; may be a message reference or a non-string value.
    pub fn text(&self) -> Option<&Value> {
        self.0.get("text").filter(|value| !value.is_null())
    }

    pub fn class(&self) -> Option<&str> {
        self.str_option("class")
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.str_option("tooltip")
    }

    /// Fallback entry used when this one cannot be built.
    pub fn alt(&self) -> Option<&Value> {
        self.0.get("alt").filter(|value| value.is_object())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    fn str_option(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for FieldOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_recognized_keys() {
        let options = FieldOptions::from_value(&json!({
            "type": "field_label_serializable",
            "name": "TITLE",
            "text": "hello",
            "class": "title",
            "tooltip": "a title",
            "extra": 7
        }))
        .unwrap();
        assert_eq!(options.type_key(), Some("field_label_serializable"));
        assert_eq!(options.name(), Some("TITLE"));
        assert_eq!(options.text(), Some(&json!("hello")));
        assert_eq!(options.class(), Some("title"));
        assert_eq!(options.tooltip(), Some("a title"));
        assert_eq!(options.get("extra"), Some(&json!(7)));
    }

    #[test]
    fn null_text_counts_as_absent() {
        let options = FieldOptions::new().with("text", Value::Null);
        assert!(options.text().is_none());
    }

    #[test]
    fn rejects_non_object_values() {
        assert!(FieldOptions::from_value(&json!(["text"])).is_none());
        assert!(FieldOptions::from_value(&json!("text")).is_none());
    }

    #[test]
    fn deserializes_transparently() {
        let options: FieldOptions = serde_json::from_value(json!({"text": "hi"})).unwrap();
        assert_eq!(options.text(), Some(&json!("hi")));
        assert_eq!(options.into_value(), json!({"text": "hi"}));
    }
}

mod label;
mod label_serializable;
mod options;

use serde_json::Value;

pub use label::{FieldLabel, LabelField};
pub use label_serializable::FieldLabelSerializable;
pub use options::FieldOptions;

/// Capability shared by every field variant.
///
/// The two identity flags are what the rest of the editor reads: the UI
/// consults [`Field::editable`] before attaching input handlers, and the
/// persistence layer consults [`Field::serializable`] before saving or
/// restoring the value.
pub trait Field: FieldClone + std::fmt::Debug {
    fn type_key(&self) -> &'static str;
    fn editable(&self) -> bool;
    fn serializable(&self) -> bool;
    fn value(&self) -> &str;

    /// Programmatic update. Returns whether the stored value changed.
    fn set_value(&mut self, value: &Value) -> bool;

    fn config(&self) -> Option<&FieldOptions>;

    fn text(&self) -> String {
        self.value().to_string()
    }

    fn css_class(&self) -> Option<&str> {
        None
    }

    fn tooltip(&self) -> Option<&str> {
        None
    }

    fn is_clickable(&self) -> bool {
        self.editable()
    }

    fn save_state(&self) -> Option<Value> {
        self.serializable()
            .then(|| Value::String(self.value().to_string()))
    }

    fn load_state(&mut self, state: &Value) -> bool {
        if !self.serializable() {
            return false;
        }
        self.set_value(state)
    }
}

pub trait FieldClone {
    fn clone_box(&self) -> Box<dyn Field>;
}

impl<T> FieldClone for T
where
    T: 'static + Field + Clone,
{
    fn clone_box(&self) -> Box<dyn Field> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Field> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Text form of an arbitrary JSON value; `None` for null.
pub(crate) fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(num) => Some(num.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| value_to_text(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

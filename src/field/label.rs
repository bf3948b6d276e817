use serde_json::Value;

use super::{Field, FieldOptions, value_to_text};
use crate::message::MessageResolver;
use crate::registry::{FieldConstructor, FieldRegistry, RegistryError};

/// Construction contract of the label family.
///
/// `from_config` is provided once here and always builds `Self`, so a type
/// that wraps an existing label and implements this trait without
/// overriding `from_config` is still constructed as itself when the registry
/// dispatches to it.
pub trait LabelField: Field + Clone + Sized + 'static {
    const TYPE_KEY: &'static str;

    fn construct(
        value: Option<&Value>,
        css_class: Option<&str>,
        config: Option<FieldOptions>,
    ) -> Self;

    /// Build from declarative options, resolving message references in `text`.
    fn from_config(options: &FieldOptions, messages: &dyn MessageResolver) -> Self {
        let text = match options.text() {
            Some(Value::String(raw)) => messages.resolve(raw),
            Some(other) => value_to_text(other).unwrap_or_default(),
            None => String::new(),
        };
        Self::construct(Some(&Value::String(text)), None, Some(options.clone()))
    }

    fn register(registry: &mut FieldRegistry) -> Result<Option<FieldConstructor>, RegistryError> {
        registry.register(Self::TYPE_KEY, FieldConstructor::of::<Self>())
    }
}

/// Display-only text. Neither editable nor persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLabel {
    value: String,
    css_class: Option<String>,
    tooltip: Option<String>,
    config: Option<FieldOptions>,
}

impl FieldLabel {
    pub const EDITABLE: bool = false;
    pub const SERIALIZABLE: bool = false;

    /// `css_class` only applies when no config is given; a config supplies its own `class`.
    pub fn new(
        value: Option<&Value>,
        css_class: Option<&str>,
        config: Option<FieldOptions>,
    ) -> Self {
        let mut label = Self {
            value: value.and_then(value_to_text).unwrap_or_default(),
            css_class: css_class.map(str::to_string),
            tooltip: None,
            config: None,
        };
        if let Some(config) = config {
            label.configure(config);
        }
        label
    }

    pub fn set_css_class(&mut self, css_class: Option<&str>) {
        self.css_class = css_class.map(str::to_string);
    }

    fn configure(&mut self, config: FieldOptions) {
        self.css_class = config.class().map(str::to_string);
        self.tooltip = config.tooltip().map(str::to_string);
        self.config = Some(config);
    }
}

impl Field for FieldLabel {
    fn type_key(&self) -> &'static str {
        Self::TYPE_KEY
    }

    fn editable(&self) -> bool {
        Self::EDITABLE
    }

    fn serializable(&self) -> bool {
        Self::SERIALIZABLE
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn set_value(&mut self, value: &Value) -> bool {
        match value_to_text(value) {
            Some(text) if text != self.value => {
                self.value = text;
                true
            }
            _ => false,
        }
    }

    fn config(&self) -> Option<&FieldOptions> {
        self.config.as_ref()
    }

    fn css_class(&self) -> Option<&str> {
        self.css_class.as_deref()
    }

    fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }
}

impl LabelField for FieldLabel {
    const TYPE_KEY: &'static str = "field_label";

    fn construct(
        value: Option<&Value>,
        css_class: Option<&str>,
        config: Option<FieldOptions>,
    ) -> Self {
        Self::new(value, css_class, config)
    }
}

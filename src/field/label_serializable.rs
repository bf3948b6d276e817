use serde_json::Value;

use super::{Field, FieldLabel, FieldOptions, LabelField};

/// A label whose text is saved with the block.
///
/// Behaves like [`FieldLabel`] in every respect except persistence: the
/// value is exported and restored with the owning block's state, but it can
/// only change through programmatic calls.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLabelSerializable {
    label: FieldLabel,
}

impl FieldLabelSerializable {
    pub const EDITABLE: bool = false;
    pub const SERIALIZABLE: bool = true;

    pub fn new(
        value: Option<&Value>,
        css_class: Option<&str>,
        config: Option<FieldOptions>,
    ) -> Self {
        Self {
            label: FieldLabel::new(value, css_class, config),
        }
    }

    pub fn set_css_class(&mut self, css_class: Option<&str>) {
        self.label.set_css_class(css_class);
    }
}

impl Field for FieldLabelSerializable {
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
        self.label.value()
    }

    fn set_value(&mut self, value: &Value) -> bool {
        self.label.set_value(value)
    }

    fn config(&self) -> Option<&FieldOptions> {
        self.label.config()
    }

    fn css_class(&self) -> Option<&str> {
        self.label.css_class()
    }

    fn tooltip(&self) -> Option<&str> {
        self.label.tooltip()
    }
}

impl LabelField for FieldLabelSerializable {
    const TYPE_KEY: &'static str = "field_label_serializable";

    fn construct(
        value: Option<&Value>,
        css_class: Option<&str>,
        config: Option<FieldOptions>,
    ) -> Self {
        Self::new(value, css_class, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageTable, PassThrough};
    use crate::registry::FieldRegistry;
    use serde_json::json;

    /// Wraps the serializable label without overriding `from_config`.
    #[derive(Debug, Clone)]
    struct HeadingLabel(FieldLabelSerializable);

    impl Field for HeadingLabel {
        fn type_key(&self) -> &'static str {
            Self::TYPE_KEY
        }

        fn editable(&self) -> bool {
            self.0.editable()
        }

        fn serializable(&self) -> bool {
            self.0.serializable()
        }

        fn value(&self) -> &str {
            self.0.value()
        }

        fn set_value(&mut self, value: &Value) -> bool {
            self.0.set_value(value)
        }

        fn config(&self) -> Option<&FieldOptions> {
            self.0.config()
        }
    }

    impl LabelField for HeadingLabel {
        const TYPE_KEY: &'static str = "field_heading";

        fn construct(
            value: Option<&Value>,
            css_class: Option<&str>,
            config: Option<FieldOptions>,
        ) -> Self {
            Self(FieldLabelSerializable::construct(value, css_class, config))
        }
    }

    #[test]
    fn keeps_string_initial_values() {
        for text in ["", "hello", "  spaced  ", "ünïcode", "%{BKY_NOT_RESOLVED}"] {
            let field = FieldLabelSerializable::new(Some(&json!(text)), None, None);
            assert_eq!(field.value(), text);
        }
    }

    #[test]
    fn absent_or_null_initial_value_is_empty() {
        assert_eq!(FieldLabelSerializable::new(None, None, None).value(), "");
        assert_eq!(
            FieldLabelSerializable::new(Some(&Value::Null), None, None).value(),
            ""
        );
    }

    #[test]
    fn flags_are_fixed_regardless_of_arguments() {
        let config = FieldOptions::new()
            .with("editable", true)
            .with("serializable", false);
        let fields = [
            FieldLabelSerializable::new(None, None, None),
            FieldLabelSerializable::new(Some(&json!("x")), Some("cls"), Some(config.clone())),
            FieldLabelSerializable::from_config(&config, &PassThrough),
        ];
        for field in fields {
            assert!(!field.editable());
            assert!(field.serializable());
            assert!(!field.is_clickable());
        }
    }

    #[test]
    fn from_config_reads_plain_text() {
        let options = FieldOptions::new().with("text", "hello");
        let field = FieldLabelSerializable::from_config(&options, &PassThrough);
        assert_eq!(field.value(), "hello");
        assert_eq!(field.config(), Some(&options));
        assert_eq!(field.css_class(), None);
    }

    #[test]
    fn from_config_resolves_message_references() {
        let messages = MessageTable::new().with("BKY_SOME_REF", "Resolved");
        let options = FieldOptions::new().with("text", "%{BKY_SOME_REF}");
        let field = FieldLabelSerializable::from_config(&options, &messages);
        assert_eq!(field.value(), "Resolved");
    }

    #[test]
    fn from_config_without_text_is_empty() {
        let field = FieldLabelSerializable::from_config(&FieldOptions::new(), &PassThrough);
        assert_eq!(field.value(), "");
    }

    #[test]
    fn from_config_forwards_class_through_config() {
        let options = FieldOptions::new().with("text", "t").with("class", "caption");
        let field = FieldLabelSerializable::from_config(&options, &PassThrough);
        assert_eq!(field.css_class(), Some("caption"));

        let mut field = field;
        field.set_css_class(None);
        assert_eq!(field.css_class(), None);
    }

    #[test]
    fn state_round_trips_through_programmatic_api() {
        let mut field = FieldLabelSerializable::new(Some(&json!("before")), None, None);
        assert_eq!(field.save_state(), Some(json!("before")));
        assert!(field.load_state(&json!("after")));
        assert_eq!(field.value(), "after");
    }

    #[test]
    fn wrapper_without_override_builds_itself() {
        let options = FieldOptions::new().with("text", "Heading");
        let heading: HeadingLabel = HeadingLabel::from_config(&options, &PassThrough);
        assert_eq!(heading.type_key(), "field_heading");
        assert_eq!(heading.value(), "Heading");

        let mut registry = FieldRegistry::new();
        HeadingLabel::register(&mut registry).unwrap();
        let built = registry
            .build(&options.with("type", "field_heading"), &PassThrough)
            .unwrap();
        assert_eq!(built.type_key(), "field_heading");
        assert!(built.serializable());
    }
}

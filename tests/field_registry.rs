use blockfields::prelude::*;
use blockfields::{FieldConstructor, FieldLabel, PassThrough, RegistryError};
use serde_json::{Value, json};

/// A caption that is persisted like the serializable label but styled on its own.
#[derive(Debug, Clone)]
struct Caption {
    inner: FieldLabelSerializable,
}

impl Field for Caption {
    fn type_key(&self) -> &'static str {
        <Self as LabelField>::TYPE_KEY
    }

    fn editable(&self) -> bool {
        self.inner.editable()
    }

    fn serializable(&self) -> bool {
        self.inner.serializable()
    }

    fn value(&self) -> &str {
        self.inner.value()
    }

    fn set_value(&mut self, value: &Value) -> bool {
        self.inner.set_value(value)
    }

    fn config(&self) -> Option<&FieldOptions> {
        self.inner.config()
    }

    fn css_class(&self) -> Option<&str> {
        Some("caption")
    }
}

impl LabelField for Caption {
    const TYPE_KEY: &'static str = "field_caption";

    fn construct(
        value: Option<&Value>,
        css_class: Option<&str>,
        config: Option<FieldOptions>,
    ) -> Self {
        Self {
            inner: FieldLabelSerializable::construct(value, css_class, config),
        }
    }
}

fn options(value: Value) -> FieldOptions {
    FieldOptions::from_value(&value).expect("options must be an object")
}

#[test]
fn builtin_registration_resolves_serializable_label() {
    let registry = FieldRegistry::with_builtins();
    assert_eq!(
        registry.lookup("field_label_serializable"),
        Ok(&FieldConstructor::of::<FieldLabelSerializable>())
    );
    assert!(matches!(
        registry.lookup("unregistered_key"),
        Err(RegistryError::NotFound { .. })
    ));
}

#[test]
fn extension_can_replace_a_builtin() {
    let mut registry = FieldRegistry::with_builtins();
    let previous = registry
        .register(
            "field_label_serializable",
            FieldConstructor::of::<FieldLabel>(),
        )
        .unwrap();
    assert_eq!(previous, Some(FieldConstructor::of::<FieldLabelSerializable>()));

    let field = registry
        .build(
            &options(json!({"type": "field_label_serializable", "text": "x"})),
            &PassThrough,
        )
        .unwrap();
    assert!(!field.serializable());
}

#[test]
fn custom_label_is_built_as_itself() {
    let mut registry = FieldRegistry::with_builtins();
    Caption::register(&mut registry).unwrap();

    let messages = MessageTable::new().with("BKY_CAPTION", "Loop body");
    let field = registry
        .build(
            &options(json!({"type": "field_caption", "text": "%{BKY_CAPTION}"})),
            &messages,
        )
        .unwrap();
    assert_eq!(field.type_key(), "field_caption");
    assert_eq!(field.css_class(), Some("caption"));
    assert_eq!(field.value(), "Loop body");
    assert!(!field.editable());
    assert_eq!(field.save_state(), Some(json!("Loop body")));
}

#[test]
fn block_round_trip_through_saved_state() {
    let registry = FieldRegistry::with_builtins();
    let messages = MessageTable::new().with("BKY_TIMES", "times");
    let entries = blockfields::field_entries(&json!({
        "type": "controls_repeat",
        "message0": "repeat %1 %2",
        "args0": [
            {"type": "field_label_serializable", "name": "COUNT", "text": "10"},
            {"type": "field_label", "text": "%{BKY_TIMES}"}
        ]
    }))
    .unwrap();

    let mut block =
        BlockFields::load(&entries, &registry, &messages, &LoadOptions::default()).unwrap();
    let saved = block.save_state();
    assert_eq!(Value::Object(saved.clone()), json!({"COUNT": "10"}));

    block.get_mut("COUNT").unwrap().set_value(&json!(3));
    assert_eq!(block.get("COUNT").unwrap().value(), "3");

    assert_eq!(block.load_state(&saved), 1);
    assert_eq!(block.get("COUNT").unwrap().value(), "10");
    let texts: Vec<_> = block.iter().map(|(_, field)| field.text()).collect();
    assert_eq!(texts, vec!["10", "times"]);
}

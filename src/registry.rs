//! Type-key to constructor mapping for declaratively defined fields.

use std::fmt;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use crate::field::{Field, FieldLabel, FieldLabelSerializable, FieldOptions, LabelField};
use crate::message::MessageResolver;

/// Builds a boxed field from its declarative options.
pub type FieldFactory = fn(&FieldOptions, &dyn MessageResolver) -> Box<dyn Field>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A type-key was referenced but never registered.
    #[error("no field registered for type '{type_key}'")]
    NotFound { type_key: String },

    #[error("field type key cannot be empty")]
    EmptyTypeKey,

    /// Options handed to the registry carry no string `type`.
    #[error("field options have no 'type' key")]
    MissingTypeKey,
}

/// A registered constructor: the concrete type it builds plus its factory.
///
/// Constructors from [`FieldConstructor::of`] are equal when they build the
/// same type. Constructors from [`FieldConstructor::from_factory`] are equal
/// only when they share both the name and the factory function.
#[derive(Clone, Copy)]
pub struct FieldConstructor {
    type_name: &'static str,
    factory: FieldFactory,
    typed: bool,
}

impl FieldConstructor {
    /// Constructor dispatching to `T::from_config`.
    pub fn of<T: LabelField>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            factory: build_label::<T>,
            typed: true,
        }
    }

    /// Constructor backed by an arbitrary factory. `type_name` identifies what it builds.
    pub fn from_factory(type_name: &'static str, factory: FieldFactory) -> Self {
        Self {
            type_name,
            factory,
            typed: false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn build(&self, options: &FieldOptions, messages: &dyn MessageResolver) -> Box<dyn Field> {
        (self.factory)(options, messages)
    }
}

impl PartialEq for FieldConstructor {
    fn eq(&self, other: &Self) -> bool {
        if self.type_name != other.type_name || self.typed != other.typed {
            return false;
        }
        // Generic factories may be duplicated per codegen unit.
        self.typed || std::ptr::fn_addr_eq(self.factory, other.factory)
    }
}

impl Eq for FieldConstructor {}

impl fmt::Debug for FieldConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConstructor")
            .field("type_name", &self.type_name)
            .finish()
    }
}

fn build_label<T: LabelField>(
    options: &FieldOptions,
    messages: &dyn MessageResolver,
) -> Box<dyn Field> {
    Box::new(T::from_config(options, messages))
}

/// Maps type-keys to field constructors.
///
/// Built once at startup, optionally extended, then shared read-only by the
/// loaders. Keys are case-insensitive and the last registration for a key
/// wins.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    constructors: IndexMap<String, FieldConstructor>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in label fields.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert(FieldLabel::TYPE_KEY, FieldConstructor::of::<FieldLabel>());
        registry.insert(
            FieldLabelSerializable::TYPE_KEY,
            FieldConstructor::of::<FieldLabelSerializable>(),
        );
        registry
    }

    /// Store `constructor` under `type_key`, returning whatever it replaced.
    pub fn register(
        &mut self,
        type_key: &str,
        constructor: FieldConstructor,
    ) -> Result<Option<FieldConstructor>, RegistryError> {
        let key = normalize_key(type_key)?;
        let previous = self.insert(&key, constructor);
        if let Some(previous) = &previous {
            debug!(
                type_key = %key,
                previous = previous.type_name(),
                replacement = constructor.type_name(),
                "replaced field constructor"
            );
        } else {
            debug!(type_key = %key, constructor = constructor.type_name(), "registered field");
        }
        Ok(previous)
    }

    pub fn unregister(&mut self, type_key: &str) -> Result<FieldConstructor, RegistryError> {
        let key = normalize_key(type_key)?;
        let removed = self
            .constructors
            .shift_remove(&key)
            .ok_or_else(|| RegistryError::NotFound {
                type_key: key.clone(),
            })?;
        debug!(type_key = %key, "unregistered field");
        Ok(removed)
    }

    /// Any key that was never registered, empty ones included, is `NotFound`.
    pub fn lookup(&self, type_key: &str) -> Result<&FieldConstructor, RegistryError> {
        let key = type_key.trim().to_ascii_lowercase();
        self.constructors
            .get(&key)
            .ok_or(RegistryError::NotFound { type_key: key })
    }

    pub fn contains(&self, type_key: &str) -> bool {
        self.lookup(type_key).is_ok()
    }

    /// Registered keys in registration order.
    pub fn type_keys(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Build a field from options naming their own `type`.
    pub fn build(
        &self,
        options: &FieldOptions,
        messages: &dyn MessageResolver,
    ) -> Result<Box<dyn Field>, RegistryError> {
        let type_key = options.type_key().ok_or(RegistryError::MissingTypeKey)?;
        let constructor = self.lookup(type_key)?;
        Ok(constructor.build(options, messages))
    }

    fn insert(&mut self, key: &str, constructor: FieldConstructor) -> Option<FieldConstructor> {
        self.constructors.insert(key.to_string(), constructor)
    }
}

fn normalize_key(type_key: &str) -> Result<String, RegistryError> {
    let trimmed = type_key.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::EmptyTypeKey);
    }
    Ok(trimmed.to_ascii_lowercase())
}

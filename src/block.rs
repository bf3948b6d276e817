//! Building and persisting the fields of a single block.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::field::{Field, FieldOptions};
use crate::message::MessageResolver;
use crate::registry::{FieldRegistry, RegistryError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldLoadError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("field entry {index} is not an object")]
    NotAnObject { index: usize },

    #[error("duplicate field name '{name}'")]
    DuplicateName { name: String },
}

/// Loader policy.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Abort on the first failing entry instead of skipping it.
    pub strict: bool,
    /// Retry a failing entry with its `alt` entry.
    pub alt_fallback: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            strict: false,
            alt_fallback: true,
        }
    }
}

impl LoadOptions {
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_alt_fallback(mut self, enabled: bool) -> Self {
        self.alt_fallback = enabled;
        self
    }
}

/// An entry the loader could not build.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedField {
    pub index: usize,
    pub error: FieldLoadError,
}

/// The fields of one block, in definition order.
///
/// Named fields occupy slots addressable by name; unnamed ones (typically
/// decorative labels) are kept for display but never persisted.
#[derive(Debug, Clone, Default)]
pub struct BlockFields {
    slots: Vec<(Option<String>, Box<dyn Field>)>,
    names: IndexMap<String, usize>,
    skipped: Vec<SkippedField>,
}

impl BlockFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every entry through `registry`, skipping (and logging) the ones that fail.
    pub fn load(
        entries: &[Value],
        registry: &FieldRegistry,
        messages: &dyn MessageResolver,
        options: &LoadOptions,
    ) -> Result<Self, FieldLoadError> {
        let mut block = Self::new();
        for (index, entry) in entries.iter().enumerate() {
            let outcome = build_entry(entry, index, registry, messages, options)
                .and_then(|(name, field)| block.push(name, field));
            if let Err(error) = outcome {
                if options.strict {
                    return Err(error);
                }
                warn!(index, %error, "skipping field entry");
                block.skipped.push(SkippedField { index, error });
            }
        }
        debug!(
            fields = block.len(),
            skipped = block.skipped.len(),
            "loaded block fields"
        );
        Ok(block)
    }

    /// Add a field, named or not. Names must be unique within the block.
    pub fn push(
        &mut self,
        name: Option<String>,
        field: Box<dyn Field>,
    ) -> Result<(), FieldLoadError> {
        if let Some(name) = &name {
            if self.names.contains_key(name) {
                return Err(FieldLoadError::DuplicateName { name: name.clone() });
            }
            self.names.insert(name.clone(), self.slots.len());
        }
        self.slots.push((name, field));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Field> {
        self.names
            .get(name)
            .map(|&index| &*self.slots[index].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Box<dyn Field>> {
        let index = *self.names.get(name)?;
        Some(&mut self.slots[index].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &dyn Field)> {
        self.slots
            .iter()
            .map(|(name, field)| (name.as_deref(), &**field))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn skipped(&self) -> &[SkippedField] {
        &self.skipped
    }

    /// Names of the fields the editor may attach input handlers to.
    pub fn editable_names(&self) -> Vec<&str> {
        self.names
            .iter()
            .filter(|(_, index)| self.slots[**index].1.editable())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Persisted state: `name -> value` for every named serializable field.
    pub fn save_state(&self) -> Map<String, Value> {
        let mut state = Map::new();
        for (name, index) in &self.names {
            if let Some(value) = self.slots[*index].1.save_state() {
                state.insert(name.clone(), value);
            }
        }
        state
    }

    /// Restore persisted values. Returns how many fields took a value.
    pub fn load_state(&mut self, state: &Map<String, Value>) -> usize {
        let mut applied = 0;
        for (name, value) in state {
            let Some(&index) = self.names.get(name) else {
                debug!(name = %name, "no field for saved state entry");
                continue;
            };
            let field = &mut self.slots[index].1;
            if !field.serializable() {
                continue;
            }
            if field.load_state(value) {
                applied += 1;
            }
        }
        applied
    }
}

fn build_entry(
    entry: &Value,
    index: usize,
    registry: &FieldRegistry,
    messages: &dyn MessageResolver,
    options: &LoadOptions,
) -> Result<(Option<String>, Box<dyn Field>), FieldLoadError> {
    let mut current = FieldOptions::from_value(entry).ok_or(FieldLoadError::NotAnObject { index })?;
    loop {
        match registry.build(&current, messages) {
            Ok(field) => {
                let name = current.name().map(str::to_string);
                return Ok((name, field));
            }
            Err(error) => {
                let fallback = options
                    .alt_fallback
                    .then(|| current.alt().and_then(FieldOptions::from_value))
                    .flatten();
                match fallback {
                    Some(alt) => {
                        debug!(index, %error, "falling back to alt field entry");
                        current = alt;
                    }
                    None => return Err(error.into()),
                }
            }
        }
    }
}

//! Message-reference resolution for field text.
//!
//! Field definitions authored as data may use `%{BKY_NAME}` placeholders in
//! place of literal text. Resolution is injected into field construction as
//! a [`MessageResolver`] so fields can be built without a live string table.

use std::sync::LazyLock;

use anyhow::{Result, bail};
use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde_json::Value;

const REFERENCE_PREFIX: &str = "BKY_";
const MAX_DEPTH: usize = 16;

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%%|%\{([A-Za-z]\w*)\}").expect("invalid message reference regex"));

/// Turns raw option text into literal text. Must be total.
pub trait MessageResolver {
    fn resolve(&self, raw: &str) -> String;
}

/// Resolver that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl MessageResolver for PassThrough {
    fn resolve(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// In-memory string table keyed by upper-case message name.
#[derive(Debug, Clone, Default)]
pub struct MessageTable {
    messages: IndexMap<String, String>,
}

impl MessageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a flat JSON object of strings.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Some(entries) = value.as_object() else {
            bail!("message table must be an object");
        };
        let mut table = Self::new();
        for (key, text) in entries {
            let Some(text) = text.as_str() else {
                bail!("message '{key}' must be a string");
            };
            table.insert(key, text);
        }
        Ok(table)
    }

    pub fn with(mut self, key: &str, text: impl Into<String>) -> Self {
        self.insert(key, text);
        self
    }

    /// Insert a message. `BKY_SOME_REF` and `some_ref` address the same entry.
    pub fn insert(&mut self, key: &str, text: impl Into<String>) -> Option<String> {
        self.messages.insert(normalize_key(key), text.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(&normalize_key(key)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn resolve_at(&self, raw: &str, depth: usize) -> String {
        REFERENCE
            .replace_all(raw, |caps: &Captures<'_>| {
                let Some(name) = caps.get(1) else {
                    return "%".to_string();
                };
                let upper = name.as_str().to_ascii_uppercase();
                let found = upper
                    .strip_prefix(REFERENCE_PREFIX)
                    .and_then(|key| self.messages.get(key));
                match found {
                    Some(text) if depth < MAX_DEPTH => self.resolve_at(text, depth + 1),
                    Some(text) => text.clone(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

impl MessageResolver for MessageTable {
    fn resolve(&self, raw: &str) -> String {
        self.resolve_at(raw, 0)
    }
}

fn normalize_key(key: &str) -> String {
    let upper = key.trim().to_ascii_uppercase();
    match upper.strip_prefix(REFERENCE_PREFIX) {
        Some(stripped) => stripped.to_string(),
        None => upper,
    }
}

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use super::DocumentFormat;

/// Parse structured data in any supported format into a `serde_json::Value`.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).with_context(|| "failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).with_context(|| "failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => contents
            .parse::<toml::Value>()
            .with_context(|| "failed to parse TOML document")
            .and_then(|value| {
                serde_json::to_value(value).context("failed to convert TOML to JSON")
            }),
    }
}

/// Field entries of a block definition.
///
/// Accepts either a bare array of entries or a block definition object whose
/// `args0`, `args1`, ... arrays are concatenated in numeric order.
pub fn field_entries(document: &Value) -> Result<Vec<Value>> {
    match document {
        Value::Array(entries) => Ok(entries.clone()),
        Value::Object(map) => {
            let mut groups = map
                .iter()
                .filter_map(|(key, value)| {
                    let index = key.strip_prefix("args")?.parse::<usize>().ok()?;
                    Some((index, value))
                })
                .collect::<Vec<_>>();
            if groups.is_empty() {
                bail!("block definition has no args0 array");
            }
            groups.sort_by_key(|(index, _)| *index);
            let mut entries = Vec::new();
            for (index, group) in groups {
                let items = group
                    .as_array()
                    .with_context(|| format!("args{index} must be an array"))?;
                entries.extend(items.iter().cloned());
            }
            Ok(entries)
        }
        _ => bail!("field document must be an array or a block definition object"),
    }
}

/// Saved block state: a flat object of field name to value.
pub fn state_map(document: &Value) -> Result<Map<String, Value>> {
    document
        .as_object()
        .cloned()
        .context("saved state must be an object")
}

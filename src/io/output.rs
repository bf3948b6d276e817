use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use super::DocumentFormat;

/// Where an exported block state ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    pub fn file(path: impl AsRef<Path>) -> Self {
        OutputDestination::File(path.as_ref().to_path_buf())
    }

    fn describe(&self) -> String {
        match self {
            OutputDestination::Stdout => "stdout".to_string(),
            OutputDestination::File(path) => format!("file {}", path.display()),
        }
    }
}

/// How a block's saved state is rendered and where it is written.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: DocumentFormat,
    pub pretty: bool,
    pub destinations: Vec<OutputDestination>,
}

impl OutputOptions {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            pretty: true,
            destinations: vec![OutputDestination::Stdout],
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_destinations(mut self, destinations: Vec<OutputDestination>) -> Self {
        self.destinations = destinations;
        self
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::new(DocumentFormat::Json)
    }
}

/// Render `state` (slot name to value, as returned by
/// [`BlockFields::save_state`](crate::BlockFields::save_state)) once and
/// write it to every destination.
pub fn emit(state: &Map<String, Value>, options: &OutputOptions) -> Result<()> {
    if options.destinations.is_empty() {
        return Ok(());
    }
    let rendered = render_state(state, options.format, options.pretty)?;
    for destination in &options.destinations {
        write_state(destination, &rendered).with_context(|| {
            format!("failed to export block state to {}", destination.describe())
        })?;
    }
    Ok(())
}

/// Serialize a saved state in `format`. TOML renders the slots as a
/// top-level table.
pub fn render_state(
    state: &Map<String, Value>,
    format: DocumentFormat,
    pretty: bool,
) -> Result<String> {
    let rendered = match format {
        DocumentFormat::Json if pretty => serde_json::to_string_pretty(state),
        DocumentFormat::Json => serde_json::to_string(state),
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            return serde_yaml::to_string(state).context("failed to render block state as YAML");
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => {
            let rendered = if pretty {
                toml::to_string_pretty(state)
            } else {
                toml::to_string(state)
            };
            return rendered.context("failed to render block state as TOML");
        }
    };
    rendered.context("failed to render block state as JSON")
}

fn write_state(destination: &OutputDestination, rendered: &str) -> Result<()> {
    match destination {
        OutputDestination::Stdout => write_line(&mut io::stdout().lock(), rendered, "stdout"),
        OutputDestination::File(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_line(&mut file, rendered, &path.display().to_string())
        }
    }
}

fn write_line(writer: &mut impl Write, rendered: &str, target: &str) -> Result<()> {
    writer
        .write_all(rendered.as_bytes())
        .and_then(|_| writer.write_all(b"\n"))
        .with_context(|| format!("failed to write to {target}"))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {target}"))
}

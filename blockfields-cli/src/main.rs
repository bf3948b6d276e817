use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use blockfields::{
    BlockFields, DocumentFormat, FieldRegistry, LoadOptions, MessageResolver, MessageTable,
    OutputDestination, OutputOptions, PassThrough, emit, field_entries, parse_document_str,
    state_map,
};

#[derive(Debug, Parser)]
#[command(
    name = "blockfields",
    version,
    about = "Build block fields from a declarative definition and print their saved state"
)]
struct Cli {
    /// Field definition spec: file path, inline payload, or "-" for stdin
    #[arg(short = 'f', long = "fields", value_name = "SPEC")]
    fields: String,

    /// Message table spec used to resolve %{BKY_*} references
    #[arg(short = 'm', long = "messages", value_name = "SPEC")]
    messages: Option<String>,

    /// Saved state spec to restore into the built fields
    #[arg(short = 's', long = "state", value_name = "SPEC")]
    state: Option<String>,

    /// Fail on the first field that cannot be built instead of skipping it
    #[arg(long = "strict")]
    strict: bool,

    /// Do not retry failing entries with their "alt" entry
    #[arg(long = "no-alt")]
    no_alt: bool,

    /// Output destinations ("-" writes to stdout). Accepts multiple values per flag use.
    #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
    outputs: Vec<String>,

    /// Emit compact output rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug)]
enum InputSource {
    File(PathBuf),
    Stdin,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut diagnostics = DiagnosticCollector::default();

    let specs = [
        Some(cli.fields.as_str()),
        cli.messages.as_deref(),
        cli.state.as_deref(),
    ];
    if specs.iter().flatten().filter(|spec| **spec == "-").count() > 1 {
        diagnostics.push_input(
            "stdin",
            "only one of --fields, --messages or --state may read from stdin",
        );
    }
    diagnostics.check()?;

    let fields_doc = load_value(&cli.fields, "fields")?;
    let messages_doc = cli
        .messages
        .as_deref()
        .map(|spec| load_value(spec, "messages"))
        .transpose()?;
    let state_doc = cli
        .state
        .as_deref()
        .map(|spec| load_value(spec, "state"))
        .transpose()?;

    let entries = field_entries(&fields_doc).map_err(Report::msg)?;
    let table = messages_doc
        .as_ref()
        .map(MessageTable::from_value)
        .transpose()
        .map_err(Report::msg)?;
    let messages: &dyn MessageResolver = match &table {
        Some(table) => table,
        None => &PassThrough,
    };

    let registry = FieldRegistry::with_builtins();
    let options = LoadOptions::default()
        .with_strict(cli.strict)
        .with_alt_fallback(!cli.no_alt);
    let mut block = BlockFields::load(&entries, &registry, messages, &options)
        .wrap_err("failed to build block fields")?;

    if !block.skipped().is_empty() && block.is_empty() {
        return Err(eyre!("no field entry could be built"));
    }

    if let Some(state) = state_doc.as_ref() {
        let state = state_map(state).map_err(Report::msg)?;
        let applied = block.load_state(&state);
        tracing::debug!(applied, "restored saved state");
    }

    let output = build_output_options(&cli, &mut diagnostics);
    diagnostics.check()?;

    emit(&block.save_state(), &output).map_err(Report::msg)?;
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "blockfields=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_value(spec: &str, label: &str) -> Result<Value> {
    if spec == "-" {
        let contents = read_from_source(&InputSource::Stdin)?;
        return parse_contents(&contents, DocumentFormat::default(), label);
    }

    let path = PathBuf::from(spec);
    match read_from_source(&InputSource::File(path.clone())) {
        Ok(contents) => {
            let format = DocumentFormat::from_path(&path).unwrap_or_default();
            parse_contents(&contents, format, label)
        }
        Err(err) => {
            if is_not_found(&err) {
                let inline_label = format!("inline {label}");
                return parse_contents(spec, DocumentFormat::default(), &inline_label);
            }
            Err(err.wrap_err(format!("failed to load {label} from {}", path.display())))
        }
    }
}

fn read_from_source(source: &InputSource) -> Result<String> {
    match source {
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .wrap_err("failed to read from stdin")?;
            Ok(buffer)
        }
        InputSource::File(path) => fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read file {}", path.display())),
    }
}

fn is_not_found(err: &Report) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|io_err| io_err.kind() == io::ErrorKind::NotFound)
}

fn parse_contents(contents: &str, format: DocumentFormat, label: &str) -> Result<Value> {
    match parse_document_str(contents, format) {
        Ok(value) => Ok(value),
        Err(primary) => {
            for candidate in DocumentFormat::available_formats() {
                if candidate == format {
                    continue;
                }
                if let Ok(value) = parse_document_str(contents, candidate) {
                    return Ok(value);
                }
            }
            Err(Report::msg(format!(
                "failed to parse {label}: tried {} (first error: {primary})",
                format_list()
            )))
        }
    }
}

fn format_list() -> String {
    let items: Vec<String> = DocumentFormat::available_formats()
        .into_iter()
        .map(|fmt| fmt.to_string())
        .collect();
    items.join(", ")
}

#[derive(Default)]
struct DiagnosticCollector {
    messages: Vec<String>,
}

impl DiagnosticCollector {
    fn push_input(&mut self, label: &str, message: impl Into<String>) {
        self.messages
            .push(format!("input ({label}): {}", message.into()));
    }

    fn push_output(&mut self, message: impl Into<String>) {
        self.messages.push(format!("output: {}", message.into()));
    }

    fn check(&mut self) -> Result<()> {
        if self.messages.is_empty() {
            return Ok(());
        }
        let mut body = String::from("encountered input/output issues:\n");
        for (idx, msg) in self.messages.drain(..).enumerate() {
            let _ = writeln!(body, "  {}. {}", idx + 1, msg);
        }
        Err(eyre!(body))
    }
}

fn build_output_options(cli: &Cli, diagnostics: &mut DiagnosticCollector) -> OutputOptions {
    let mut destinations = Vec::new();
    for raw in &cli.outputs {
        if raw.trim().is_empty() {
            diagnostics.push_output("output destination cannot be empty");
            continue;
        }
        if raw == "-" {
            destinations.push(OutputDestination::Stdout);
        } else {
            destinations.push(OutputDestination::file(raw));
        }
    }
    if destinations.is_empty() {
        destinations.push(OutputDestination::Stdout);
    }

    let mut format: Option<DocumentFormat> = None;
    for dest in &destinations {
        let OutputDestination::File(path) = dest else {
            continue;
        };
        match (DocumentFormat::from_path(path), format) {
            (None, _) => diagnostics.push_output(format!(
                "cannot infer format from output file {}; use {}",
                path.display(),
                format_list()
            )),
            (Some(detected), Some(existing)) if detected != existing => {
                diagnostics.push_output(format!(
                    "output file {} uses {detected} but other destinations use {existing}; align extensions",
                    path.display()
                ))
            }
            (Some(detected), _) => format = Some(detected),
        }
    }

    OutputOptions::new(format.unwrap_or_else(|| fields_format(&cli.fields)))
        .with_pretty(!cli.no_pretty)
        .with_destinations(destinations)
}

fn fields_format(spec: &str) -> DocumentFormat {
    DocumentFormat::from_path(Path::new(spec)).unwrap_or_default()
}

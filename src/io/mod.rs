mod format;
mod input;
mod output;

pub use format::DocumentFormat;
pub use input::{field_entries, parse_document_str, state_map};
pub use output::{OutputDestination, OutputOptions, emit, render_state};

#![deny(rust_2018_idioms)]
//! Field type model for a block editor.
//!
//! Blocks are described as data: each inline widget is an options map that
//! names its field type by key. A [`FieldRegistry`] maps those keys to
//! constructors, and every field exposes the two flags the rest of the
//! editor cares about, `editable` and `serializable`.
//!
//! ```
//! use blockfields::{Field, FieldOptions, FieldRegistry, MessageTable};
//!
//! let registry = FieldRegistry::with_builtins();
//! let messages = MessageTable::new().with("BKY_TITLE", "Repeat");
//! let options = FieldOptions::new()
//!     .with("type", "field_label_serializable")
//!     .with("text", "%{BKY_TITLE}");
//!
//! let field = registry.build(&options, &messages).unwrap();
//! assert_eq!(field.value(), "Repeat");
//! assert!(!field.editable());
//! assert!(field.serializable());
//! ```

mod block;
mod field;
mod io;
mod message;
mod registry;

pub use block::{BlockFields, FieldLoadError, LoadOptions, SkippedField};
pub use field::{Field, FieldClone, FieldLabel, FieldLabelSerializable, FieldOptions, LabelField};
pub use io::{
    DocumentFormat, OutputDestination, OutputOptions, emit, field_entries, parse_document_str,
    render_state, state_map,
};
pub use message::{MessageResolver, MessageTable, PassThrough};
pub use registry::{FieldConstructor, FieldFactory, FieldRegistry, RegistryError};

pub mod prelude {
    pub use super::{
        BlockFields, Field, FieldLabelSerializable, FieldOptions, FieldRegistry, LabelField,
        LoadOptions, MessageResolver, MessageTable,
    };
}

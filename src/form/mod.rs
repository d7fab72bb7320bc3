//! Main module for formgen library functionality

pub mod document;
pub mod error;
pub mod formatting;
pub mod parsing;
pub mod schema;
pub mod state;
pub mod value;

pub use document::{read, write, Document, LoadReport, Variant, WriteReport};
pub use error::{CellPosition, DocumentError, ParseError, SchemaError, ValueError};
pub use formatting::format;
pub use parsing::parse;
pub use schema::{ElementKind, FieldDescriptor, SchemaRegistry, Shape, TypeTag};
pub use state::FormState;
pub use value::{Cell, TypedValue};

//! Error types for form parsing, schema construction and document I/O

use crate::form::schema::{ElementKind, TypeTag};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Where an offending token sits inside a field's value.
///
/// Indices are 1-based, matching what a user counts when looking at the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellPosition {
    Scalar,
    Element { index: usize },
    Cell { row: usize, column: usize },
}

impl fmt::Display for CellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellPosition::Scalar => Ok(()),
            CellPosition::Element { index } => write!(f, " at element {}", index),
            CellPosition::Cell { row, column } => {
                write!(f, " at row {}, column {}", row, column)
            }
        }
    }
}

/// Errors raised while turning raw field text into a typed value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A scalar, vector element or matrix cell is not a valid number of the
    /// declared kind.
    #[error("invalid {expected} value {text:?}{position}")]
    InvalidFormat {
        text: String,
        expected: ElementKind,
        position: CellPosition,
    },
}

/// Errors raised while building a [`SchemaRegistry`](crate::form::schema::SchemaRegistry)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema defines no fields")]
    EmptySchema,

    #[error("field '{0}' is defined more than once")]
    DuplicateField(String),

    #[error("field '{field}' has unknown type '{kind}'")]
    UnknownType { field: String, kind: String },
}

/// A stored value that does not fit its field's declared type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("expected {expected}, found {found}{position}")]
    Mismatch {
        expected: String,
        found: &'static str,
        position: CellPosition,
    },

    #[error("annotated entry has no \"value\" member")]
    MissingValue,

    #[error("stored type '{stored}' does not match declared type '{declared}'")]
    TagMismatch { stored: String, declared: TypeTag },
}

/// Errors raised by document writing and loading
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The file is not valid JSON, or its top level is not an object.
    #[error("malformed document {origin}: {reason}")]
    MalformedDocument { origin: String, reason: String },

    /// Required fields were empty; nothing was written.
    #[error("missing required fields: {}", fields.join(", "))]
    MissingRequiredFields { fields: Vec<String> },

    #[error("I/O error on {}: {error}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type DocumentResult<T> = Result<T, DocumentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_format_names_token_and_position() {
        let err = ParseError::InvalidFormat {
            text: "x".into(),
            expected: ElementKind::Integer,
            position: CellPosition::Cell { row: 2, column: 3 },
        };
        assert_eq!(err.to_string(), "invalid integer value \"x\" at row 2, column 3");

        let err = ParseError::InvalidFormat {
            text: "abc".into(),
            expected: ElementKind::Float,
            position: CellPosition::Scalar,
        };
        assert_eq!(err.to_string(), "invalid float value \"abc\"");
    }

    #[test]
    fn missing_required_lists_every_field() {
        let err = DocumentError::MissingRequiredFields {
            fields: vec!["key1".into(), "key4".into()],
        };
        assert_eq!(err.to_string(), "missing required fields: key1, key4");
    }
}

//! Typed values back to editable text
//!
//! The output is what a form shows after loading a document, and it parses back
//! to the same value: vectors join elements with `", "`, matrices put one row
//! per line, and absent cells render as nothing, so `[1, null, 3]` shows as
//! `1, , 3`.

use crate::form::schema::TypeTag;
use crate::form::value::{Cell, TypedValue};

/// Render `value` as the text of a field declared as `tag`.
///
/// # Panics
///
/// In debug builds, panics if `value` is not one that `tag` can hold (see
/// [`TypedValue::matches`]). Values from [`parse`](crate::form::parse) or
/// [`TypedValue::from_json`] with the same tag always match.
pub fn format(value: &TypedValue, tag: TypeTag) -> String {
    debug_assert!(value.matches(tag), "{:?} is not a {} value", value, tag);
    match value {
        TypedValue::Integer(i) => i.to_string(),
        TypedValue::Float(f) => format_float(*f),
        TypedValue::Text(s) => s.clone(),
        TypedValue::Vector(cells) => join_cells(cells),
        TypedValue::Matrix(rows) => rows
            .iter()
            .map(|row| join_cells(row))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Shortest text that parses back to `f`, always with a decimal point or an
/// exponent so a float field never looks like an integer.
pub fn format_float(f: f64) -> String {
    format!("{:?}", f)
}

fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Absent => String::new(),
        Cell::Int(i) => i.to_string(),
        Cell::Float(f) => format_float(*f),
        Cell::Text(s) => s.clone(),
    }
}

fn join_cells(cells: &[Cell]) -> String {
    cells.iter().map(format_cell).collect::<Vec<_>>().join(", ")
}

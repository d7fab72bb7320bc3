//! Typed field values
//!
//! A [`TypedValue`] is what a field's raw text becomes after parsing. Vectors and
//! matrices hold [`Cell`]s so that an empty element can be kept as
//! [`Cell::Absent`] instead of disappearing.
//!
//! The JSON mapping is direct: numbers stay numbers, text stays strings, absent
//! cells become `null`, matrices become arrays of arrays. Reading goes through
//! [`TypedValue::from_json`], which checks the stored value against the field's
//! declared tag instead of trusting whatever shape is in the file.

use crate::form::error::{CellPosition, ValueError};
use crate::form::schema::{ElementKind, Shape, TypeTag};
use serde_json::Value;

/// One element of a vector or one cell of a matrix
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Absent,
    Int(i64),
    Float(f64),
    Text(String),
}

/// The parsed value of a single field
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Vector(Vec<Cell>),
    Matrix(Vec<Vec<Cell>>),
}

impl Cell {
    pub fn is_absent(&self) -> bool {
        matches!(self, Cell::Absent)
    }

    fn fits(&self, kind: ElementKind) -> bool {
        match self {
            Cell::Absent => kind.is_numeric(),
            Cell::Int(_) => kind == ElementKind::Integer,
            Cell::Float(_) => kind == ElementKind::Float,
            Cell::Text(_) => kind == ElementKind::Text,
        }
    }
}

impl TypedValue {
    pub fn shape(&self) -> Shape {
        match self {
            TypedValue::Integer(_) | TypedValue::Float(_) | TypedValue::Text(_) => Shape::Scalar,
            TypedValue::Vector(_) => Shape::Vector,
            TypedValue::Matrix(_) => Shape::Matrix,
        }
    }

    /// Whether this value is one that `tag` can hold.
    pub fn matches(&self, tag: TypeTag) -> bool {
        let kind = tag.element();
        match (self, tag.shape()) {
            (TypedValue::Integer(_), Shape::Scalar) => kind == ElementKind::Integer,
            (TypedValue::Float(_), Shape::Scalar) => kind == ElementKind::Float,
            (TypedValue::Text(_), Shape::Scalar) => kind == ElementKind::Text,
            (TypedValue::Vector(cells), Shape::Vector) => cells.iter().all(|c| c.fits(kind)),
            (TypedValue::Matrix(rows), Shape::Matrix) => {
                rows.iter().flatten().all(|c| c.fits(kind))
            }
            _ => false,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            TypedValue::Integer(i) => Value::from(*i),
            TypedValue::Float(f) => float_to_json(*f),
            TypedValue::Text(s) => Value::String(s.clone()),
            TypedValue::Vector(cells) => Value::Array(cells.iter().map(cell_to_json).collect()),
            TypedValue::Matrix(rows) => Value::Array(
                rows.iter()
                    .map(|row| Value::Array(row.iter().map(cell_to_json).collect()))
                    .collect(),
            ),
        }
    }

    /// Interpret a stored JSON value as a value of type `tag`.
    ///
    /// Integers are accepted where floats are declared; nothing else is coerced.
    /// Text vectors and matrices must not contain `null`.
    pub fn from_json(value: &Value, tag: TypeTag) -> Result<Self, ValueError> {
        let kind = tag.element();
        match tag.shape() {
            Shape::Scalar => match cell_from_json(value, kind, false, CellPosition::Scalar, tag)? {
                Cell::Int(i) => Ok(TypedValue::Integer(i)),
                Cell::Float(f) => Ok(TypedValue::Float(f)),
                Cell::Text(s) => Ok(TypedValue::Text(s)),
                Cell::Absent => Err(mismatch(tag, value, CellPosition::Scalar)),
            },
            Shape::Vector => {
                let items = as_array(value, tag, CellPosition::Scalar)?;
                let cells = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let position = CellPosition::Element { index: i + 1 };
                        cell_from_json(item, kind, kind.is_numeric(), position, tag)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TypedValue::Vector(cells))
            }
            Shape::Matrix => {
                let rows = as_array(value, tag, CellPosition::Scalar)?;
                let mut matrix = Vec::with_capacity(rows.len());
                for (r, row) in rows.iter().enumerate() {
                    let cells = as_array(row, tag, CellPosition::Element { index: r + 1 })?;
                    let row = cells
                        .iter()
                        .enumerate()
                        .map(|(c, item)| {
                            let position = CellPosition::Cell {
                                row: r + 1,
                                column: c + 1,
                            };
                            cell_from_json(item, kind, kind.is_numeric(), position, tag)
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    matrix.push(row);
                }
                Ok(TypedValue::Matrix(matrix))
            }
        }
    }
}

fn float_to_json(f: f64) -> Value {
    // Non-finite floats never come out of the parser.
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn cell_to_json(cell: &Cell) -> Value {
    match cell {
        Cell::Absent => Value::Null,
        Cell::Int(i) => Value::from(*i),
        Cell::Float(f) => float_to_json(*f),
        Cell::Text(s) => Value::String(s.clone()),
    }
}

fn cell_from_json(
    value: &Value,
    kind: ElementKind,
    allow_null: bool,
    position: CellPosition,
    tag: TypeTag,
) -> Result<Cell, ValueError> {
    match (kind, value) {
        (_, Value::Null) if allow_null => Ok(Cell::Absent),
        (ElementKind::Integer, Value::Number(n)) => {
            n.as_i64().map(Cell::Int).ok_or_else(|| mismatch(tag, value, position))
        }
        (ElementKind::Float, Value::Number(n)) => {
            n.as_f64().map(Cell::Float).ok_or_else(|| mismatch(tag, value, position))
        }
        (ElementKind::Text, Value::String(s)) => Ok(Cell::Text(s.clone())),
        _ => Err(mismatch(tag, value, position)),
    }
}

fn as_array<'a>(
    value: &'a Value,
    tag: TypeTag,
    position: CellPosition,
) -> Result<&'a Vec<Value>, ValueError> {
    value.as_array().ok_or_else(|| mismatch(tag, value, position))
}

fn mismatch(tag: TypeTag, found: &Value, position: CellPosition) -> ValueError {
    let expected = match position {
        CellPosition::Scalar => tag.to_string(),
        _ => format!("{} element of {}", tag.element(), tag),
    };
    ValueError::Mismatch {
        expected,
        found: json_kind(found),
        position,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

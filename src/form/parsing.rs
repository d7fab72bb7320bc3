//! Raw field text to typed values
//!
//!     All parsing starts by trimming the raw text. Text that is empty after
//!     trimming is not an error: the field simply has no value and is left out of
//!     the document.
//!
//! Scalars
//!
//!     `integer` and `float` convert the trimmed text directly. `text` keeps it
//!     verbatim. Floats must be finite, since JSON has no spelling for NaN or
//!     infinity.
//!
//! Vectors
//!
//!     All whitespace is removed from the text, then it is split on commas. An
//!     empty token in a numeric vector is an absent element (`1,,3`); in a text
//!     vector it is dropped.
//!
//! Matrices
//!
//!     Lines are rows and commas separate cells. Blank lines are skipped and every
//!     cell is trimmed on its own; whitespace inside a cell is kept. Empty cells
//!     are absent in numeric matrices and dropped in text matrices. `float_matrix`
//!     and `text_matrix` drop a row whose cells are all empty; `int_matrix` keeps
//!     every non-blank line, so `,,` becomes a row of absent cells.
//!
//! A vector or matrix that ends up with no elements at all is treated like an
//! empty field.

use crate::form::error::{CellPosition, ParseError};
use crate::form::schema::{ElementKind, TypeTag};
use crate::form::value::{Cell, TypedValue};

/// Parse the raw text of a field declared as `tag`.
///
/// Returns `Ok(None)` when the field is empty.
pub fn parse(raw: &str, tag: TypeTag) -> Result<Option<TypedValue>, ParseError> {
    let cleaned = clean_input(raw);
    if cleaned.is_empty() {
        return Ok(None);
    }

    let value = match tag {
        TypeTag::Integer => TypedValue::Integer(parse_int(cleaned, CellPosition::Scalar)?),
        TypeTag::Float => TypedValue::Float(parse_float(cleaned, CellPosition::Scalar)?),
        TypeTag::Text => TypedValue::Text(cleaned.to_string()),
        TypeTag::IntVector => {
            TypedValue::Vector(parse_numeric_vector(cleaned, ElementKind::Integer)?)
        }
        TypeTag::FloatVector => {
            TypedValue::Vector(parse_numeric_vector(cleaned, ElementKind::Float)?)
        }
        TypeTag::TextVector => TypedValue::Vector(parse_text_vector(cleaned)),
        // Matrices see the untrimmed text so row numbers match the user's lines.
        TypeTag::IntMatrix => TypedValue::Matrix(parse_numeric_matrix(
            raw,
            ElementKind::Integer,
            RowPolicy::KeepNonBlankLines,
        )?),
        TypeTag::FloatMatrix => TypedValue::Matrix(parse_numeric_matrix(
            raw,
            ElementKind::Float,
            RowPolicy::DropEmptyRows,
        )?),
        TypeTag::TextMatrix => TypedValue::Matrix(parse_text_matrix(raw)),
    };

    let empty = match &value {
        TypedValue::Vector(cells) => cells.is_empty(),
        TypedValue::Matrix(rows) => rows.is_empty(),
        _ => false,
    };
    Ok(if empty { None } else { Some(value) })
}

/// Trim surrounding whitespace, including the trailing newline multi-line
/// editors tend to append.
pub fn clean_input(raw: &str) -> &str {
    raw.trim()
}

/// Which matrix rows survive once their cells are split out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowPolicy {
    KeepNonBlankLines,
    DropEmptyRows,
}

fn parse_int(token: &str, position: CellPosition) -> Result<i64, ParseError> {
    token.parse::<i64>().map_err(|_| invalid(token, ElementKind::Integer, position))
}

fn parse_float(token: &str, position: CellPosition) -> Result<f64, ParseError> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(invalid(token, ElementKind::Float, position)),
    }
}

fn parse_cell(token: &str, kind: ElementKind, position: CellPosition) -> Result<Cell, ParseError> {
    if token.is_empty() {
        return Ok(Cell::Absent);
    }
    match kind {
        ElementKind::Integer => parse_int(token, position).map(Cell::Int),
        ElementKind::Float => parse_float(token, position).map(Cell::Float),
        ElementKind::Text => Ok(Cell::Text(token.to_string())),
    }
}

fn invalid(token: &str, expected: ElementKind, position: CellPosition) -> ParseError {
    ParseError::InvalidFormat {
        text: token.to_string(),
        expected,
        position,
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn parse_numeric_vector(text: &str, kind: ElementKind) -> Result<Vec<Cell>, ParseError> {
    strip_whitespace(text)
        .split(',')
        .enumerate()
        .map(|(i, token)| parse_cell(token, kind, CellPosition::Element { index: i + 1 }))
        .collect()
}

fn parse_text_vector(text: &str) -> Vec<Cell> {
    strip_whitespace(text)
        .split(',')
        .filter(|token| !token.is_empty())
        .map(|token| Cell::Text(token.to_string()))
        .collect()
}

/// Non-blank lines of a matrix, each split into trimmed cells.
///
/// Row numbers count every line of `text`, blank ones included. Callers pass
/// the raw field text, so leading blank lines are counted too. Each line is
/// trimmed on its own, which makes trimming the whole text first unnecessary.
fn matrix_rows(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.split('\n')
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line.trim().split(',').map(str::trim).collect()))
}

fn parse_numeric_matrix(
    text: &str,
    kind: ElementKind,
    policy: RowPolicy,
) -> Result<Vec<Vec<Cell>>, ParseError> {
    let mut matrix = Vec::new();
    for (row, cells) in matrix_rows(text) {
        if policy == RowPolicy::DropEmptyRows && cells.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let parsed = cells
            .iter()
            .enumerate()
            .map(|(c, cell)| parse_cell(cell, kind, CellPosition::Cell { row, column: c + 1 }))
            .collect::<Result<Vec<_>, _>>()?;
        matrix.push(parsed);
    }
    Ok(matrix)
}

fn parse_text_matrix(text: &str) -> Vec<Vec<Cell>> {
    matrix_rows(text)
        .map(|(_, cells)| {
            cells
                .into_iter()
                .filter(|cell| !cell.is_empty())
                .map(|cell| Cell::Text(cell.to_string()))
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ints(values: &[Option<i64>]) -> Vec<Cell> {
        values
            .iter()
            .map(|v| v.map(Cell::Int).unwrap_or(Cell::Absent))
            .collect()
    }

    fn texts(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Cell::Text(v.to_string())).collect()
    }

    #[rstest]
    #[case(TypeTag::Integer)]
    #[case(TypeTag::Float)]
    #[case(TypeTag::Text)]
    #[case(TypeTag::IntVector)]
    #[case(TypeTag::FloatVector)]
    #[case(TypeTag::TextVector)]
    #[case(TypeTag::IntMatrix)]
    #[case(TypeTag::FloatMatrix)]
    #[case(TypeTag::TextMatrix)]
    fn blank_input_is_absent(#[case] tag: TypeTag) {
        assert_eq!(parse("", tag), Ok(None));
        assert_eq!(parse("  \n\t \n", tag), Ok(None));
    }

    #[rstest]
    #[case("42", TypedValue::Integer(42))]
    #[case("  -7\n", TypedValue::Integer(-7))]
    #[case("+3", TypedValue::Integer(3))]
    fn parses_integers(#[case] raw: &str, #[case] expected: TypedValue) {
        assert_eq!(parse(raw, TypeTag::Integer), Ok(Some(expected)));
    }

    #[rstest]
    #[case("1.5", 1.5)]
    #[case("2", 2.0)]
    #[case("-1e3", -1000.0)]
    fn parses_floats(#[case] raw: &str, #[case] expected: f64) {
        assert_eq!(parse(raw, TypeTag::Float), Ok(Some(TypedValue::Float(expected))));
    }

    #[rstest]
    #[case("abc", TypeTag::Float)]
    #[case("nan", TypeTag::Float)]
    #[case("inf", TypeTag::Float)]
    #[case("1.5", TypeTag::Integer)]
    #[case("99999999999999999999", TypeTag::Integer)]
    fn rejects_malformed_scalars(#[case] raw: &str, #[case] tag: TypeTag) {
        assert_eq!(
            parse(raw, tag),
            Err(ParseError::InvalidFormat {
                text: raw.to_string(),
                expected: tag.element(),
                position: CellPosition::Scalar,
            })
        );
    }

    #[test]
    fn text_is_kept_verbatim_after_trimming() {
        assert_eq!(
            parse("  hello,  world \n", TypeTag::Text),
            Ok(Some(TypedValue::Text("hello,  world".into())))
        );
    }

    #[test]
    fn numeric_vector_keeps_empty_elements() {
        assert_eq!(
            parse("1, 2, ,4", TypeTag::IntVector),
            Ok(Some(TypedValue::Vector(ints(&[Some(1), Some(2), None, Some(4)]))))
        );
        assert_eq!(
            parse(",1,", TypeTag::IntVector),
            Ok(Some(TypedValue::Vector(ints(&[None, Some(1), None]))))
        );
    }

    #[test]
    fn vector_whitespace_is_removed_inside_tokens() {
        assert_eq!(
            parse("1 0, 2\t5", TypeTag::IntVector),
            Ok(Some(TypedValue::Vector(ints(&[Some(10), Some(25)]))))
        );
        assert_eq!(
            parse("hello world, foo", TypeTag::TextVector),
            Ok(Some(TypedValue::Vector(texts(&["helloworld", "foo"]))))
        );
    }

    #[test]
    fn float_vector_reports_element_position() {
        assert_eq!(
            parse("1.0, x, 3", TypeTag::FloatVector),
            Err(ParseError::InvalidFormat {
                text: "x".into(),
                expected: ElementKind::Float,
                position: CellPosition::Element { index: 2 },
            })
        );
    }

    #[test]
    fn text_vector_drops_empty_tokens() {
        assert_eq!(
            parse(",a,,b,", TypeTag::TextVector),
            Ok(Some(TypedValue::Vector(texts(&["a", "b"]))))
        );
        assert_eq!(parse(", ,", TypeTag::TextVector), Ok(None));
    }

    #[test]
    fn int_matrix_skips_blank_lines() {
        assert_eq!(
            parse("1,2\n\n3,4\n", TypeTag::IntMatrix),
            Ok(Some(TypedValue::Matrix(vec![
                ints(&[Some(1), Some(2)]),
                ints(&[Some(3), Some(4)]),
            ])))
        );
    }

    #[test]
    fn int_matrix_keeps_rows_of_empty_cells() {
        assert_eq!(
            parse("1,2\n ,\n3,4", TypeTag::IntMatrix),
            Ok(Some(TypedValue::Matrix(vec![
                ints(&[Some(1), Some(2)]),
                ints(&[None, None]),
                ints(&[Some(3), Some(4)]),
            ])))
        );
    }

    #[test]
    fn float_matrix_drops_rows_of_empty_cells() {
        assert_eq!(
            parse("1.5, \n , \n, 4", TypeTag::FloatMatrix),
            Ok(Some(TypedValue::Matrix(vec![
                vec![Cell::Float(1.5), Cell::Absent],
                vec![Cell::Absent, Cell::Float(4.0)],
            ])))
        );
        assert_eq!(parse(",,\n,", TypeTag::FloatMatrix), Ok(None));
    }

    #[rstest]
    #[case("1,2\n\n3,x", TypeTag::IntMatrix, "x", 3, 2)]
    #[case("\n\n1,2\n3,x", TypeTag::IntMatrix, "x", 4, 2)]
    #[case("  \r\n\t\n 1,2\n3,x\n\n", TypeTag::IntMatrix, "x", 4, 2)]
    #[case("\n1.5\n\n, y", TypeTag::FloatMatrix, "y", 4, 2)]
    fn matrix_errors_point_at_source_line(
        #[case] raw: &str,
        #[case] tag: TypeTag,
        #[case] text: &str,
        #[case] row: usize,
        #[case] column: usize,
    ) {
        assert_eq!(
            parse(raw, tag),
            Err(ParseError::InvalidFormat {
                text: text.into(),
                expected: tag.element(),
                position: CellPosition::Cell { row, column },
            })
        );
    }

    #[test]
    fn leading_blank_lines_do_not_change_matrix_values() {
        assert_eq!(
            parse("\n \n1,2\n3,4", TypeTag::IntMatrix),
            parse("1,2\n3,4", TypeTag::IntMatrix)
        );
    }

    #[test]
    fn text_matrix_trims_cells_but_keeps_inner_spaces() {
        assert_eq!(
            parse(" new york , boston\r\n, ,\nparis,", TypeTag::TextMatrix),
            Ok(Some(TypedValue::Matrix(vec![
                texts(&["new york", "boston"]),
                texts(&["paris"]),
            ])))
        );
    }
}

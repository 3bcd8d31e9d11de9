//! Typed views of cells.
//!
//! Conversion is driven by the column's inferred type, never by reinterpreting
//! bytes. A missing cell is the empty span and converts to [`CellValue::Null`];
//! words such as `NULL` or `NaN` are ordinary text.

use std::fmt;

use crate::error::{CsvError, Result};
use crate::infer::ColumnType;
use crate::span::TextSpan;
use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(TextSpan<'a>),
    Null,
}

impl<'a> CellValue<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            CellValue::Integer(value) => Some(value),
            _ => None,
        }
    }

    /// Integers widen to floats here so numeric code can treat both alike
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            CellValue::Float(value) => Some(value),
            CellValue::Integer(value) => Some(value as f64),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match *self {
            CellValue::Boolean(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<TextSpan<'a>> {
        match *self {
            CellValue::Text(span) => Some(span),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(value) => write!(f, "{value}"),
            CellValue::Float(value) => write!(f, "{value}"),
            CellValue::Boolean(value) => write!(f, "{value}"),
            CellValue::Text(span) => write!(f, "{span}"),
            CellValue::Null => f.write_str("null"),
        }
    }
}

pub fn parse_integer(text: &[u8]) -> Option<i64> {
    std::str::from_utf8(text).ok()?.parse().ok()
}

pub fn parse_float(text: &[u8]) -> Option<f64> {
    std::str::from_utf8(text).ok()?.parse().ok()
}

pub fn parse_boolean(text: &[u8]) -> Option<bool> {
    match text {
        b"true" | b"TRUE" => Some(true),
        b"false" | b"FALSE" => Some(false),
        _ => None,
    }
}

/// Convert one cell according to `column_type`; `None` if the text does not fit
pub fn convert(cell: TextSpan<'_>, column_type: ColumnType) -> Option<CellValue<'_>> {
    if cell.is_empty() {
        return Some(CellValue::Null);
    }
    let text = cell.as_bytes();
    match column_type {
        ColumnType::Integer => parse_integer(text).map(CellValue::Integer),
        ColumnType::Float => parse_float(text).map(CellValue::Float),
        ColumnType::Boolean => parse_boolean(text).map(CellValue::Boolean),
        ColumnType::String => Some(CellValue::Text(cell)),
    }
}

impl<'a> Table<'a> {
    fn expect_type(&self, column: usize, expected: ColumnType) -> Result<()> {
        let actual = self.column_type_of(column)?;
        if actual == expected {
            Ok(())
        } else {
            Err(CsvError::TypeMismatch {
                column,
                expected,
                actual,
            })
        }
    }

    /// The cell converted according to its column's type
    pub fn value_at(&self, row: usize, column: usize) -> Result<CellValue<'a>> {
        let cell = self.cell(row, column)?;
        let column_type = self.types[column];
        convert(cell, column_type).ok_or_else(|| CsvError::InvalidValue {
            row,
            column,
            expected: column_type,
            text: cell.to_str_lossy().into_owned(),
        })
    }

    pub fn integer_at(&self, row: usize, column: usize) -> Result<Option<i64>> {
        self.expect_type(column, ColumnType::Integer)?;
        Ok(self.value_at(row, column)?.as_integer())
    }

    pub fn float_at(&self, row: usize, column: usize) -> Result<Option<f64>> {
        self.expect_type(column, ColumnType::Float)?;
        Ok(self.value_at(row, column)?.as_float())
    }

    pub fn boolean_at(&self, row: usize, column: usize) -> Result<Option<bool>> {
        self.expect_type(column, ColumnType::Boolean)?;
        Ok(self.value_at(row, column)?.as_boolean())
    }

    /// Every value of an Integer column, `None` where the cell is missing
    pub fn integer_column(&self, column: usize) -> Result<Vec<Option<i64>>> {
        self.expect_type(column, ColumnType::Integer)?;
        (0..self.row_count())
            .map(|row| Ok(self.value_at(row, column)?.as_integer()))
            .collect()
    }

    pub fn float_column(&self, column: usize) -> Result<Vec<Option<f64>>> {
        self.expect_type(column, ColumnType::Float)?;
        (0..self.row_count())
            .map(|row| Ok(self.value_at(row, column)?.as_float()))
            .collect()
    }
}

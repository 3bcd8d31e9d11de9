use thiserror::Error;

use crate::arena::AllocError;
use crate::infer::ColumnType;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("out of memory: {0}")]
    MemoryExhausted(#[from] AllocError),

    #[error("CSV empty: no header line found")]
    EmptyInput,

    #[error("line {line}: expected {expected} fields, found {found}")]
    MalformedStructure {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("{kind} index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("column {column} is {actual}, not {expected}")]
    TypeMismatch {
        column: usize,
        expected: ColumnType,
        actual: ColumnType,
    },

    #[error("row {row}, column {column}: {text:?} is not a valid {expected}")]
    InvalidValue {
        row: usize,
        column: usize,
        expected: ColumnType,
        text: String,
    },

    #[error("cannot store {text:?}: {reason}")]
    InvalidCell { text: String, reason: &'static str },

    #[error("expected {expected} cells, got {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CsvError>;

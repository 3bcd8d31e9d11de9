//! Column type detection.
//!
//! Each column is scanned once. Three candidacies are tracked (integer,
//! boolean, float) and the first one still standing in the order
//! Integer > Boolean > Float wins; everything else is a String column.
//! Empty cells never rule anything out, so an all-empty column is Integer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::span::TextSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    String,
}

impl ColumnType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Integer => "Integer",
            ColumnType::Float => "Float",
            ColumnType::Boolean => "Boolean",
            ColumnType::String => "String",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

pub const BOOLEAN_LITERALS: [&[u8]; 4] = [b"true", b"TRUE", b"false", b"FALSE"];

pub fn is_boolean_literal(text: &[u8]) -> bool {
    BOOLEAN_LITERALS.iter().any(|literal| *literal == text)
}

/// Running state of a single-column scan.
#[derive(Debug, Clone, Copy)]
pub struct TypeCandidates {
    integer: bool,
    boolean: bool,
    float: bool,
    // once a cell fails the digit scan neither numeric type can come back
    numeric_ruled_out: bool,
}

impl Default for TypeCandidates {
    fn default() -> Self {
        Self {
            integer: true,
            boolean: true,
            float: false,
            numeric_ruled_out: false,
        }
    }
}

impl TypeCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, cell: TextSpan<'_>) {
        let text = cell.as_bytes();
        if text.is_empty() {
            return;
        }

        if !is_boolean_literal(text) {
            self.boolean = false;
        }

        if self.numeric_ruled_out {
            return;
        }

        let mut seen_dot = false;
        for (i, &byte) in text.iter().enumerate() {
            if byte.is_ascii_digit() {
                continue;
            }
            if byte == b'.' && i > 0 && !seen_dot {
                seen_dot = true;
                self.integer = false;
                self.float = true;
                continue;
            }
            if byte == b'-' && i == 0 && text.get(1).is_some_and(u8::is_ascii_digit) {
                continue;
            }

            self.integer = false;
            self.float = false;
            self.numeric_ruled_out = true;
            break;
        }
    }

    pub fn resolve(&self) -> ColumnType {
        if self.integer {
            ColumnType::Integer
        } else if self.boolean {
            ColumnType::Boolean
        } else if self.float {
            ColumnType::Float
        } else {
            ColumnType::String
        }
    }
}

/// Classify a column from all of its cells
pub fn infer_column_type<'a, I>(cells: I) -> ColumnType
where
    I: IntoIterator<Item = TextSpan<'a>>,
{
    let mut candidates = TypeCandidates::new();
    for cell in cells {
        candidates.observe(cell);
    }
    candidates.resolve()
}

//! Growing and cleaning a parsed table.
//!
//! Nothing here writes into memory an earlier view may still read. Rows and
//! the header grow by copying forward into fresh arena blocks, so clones of a
//! table taken before an edit keep seeing the old contents. Column types are
//! detected again after every edit.
//!
//! Edited text must survive [`Table::write_csv`] and a fresh parse, so it may
//! not hold a delimiter, a newline or a NUL byte.

use tracing::debug;

use crate::arena::Arena;
use crate::error::{CsvError, Result};
use crate::infer::infer_column_type;
use crate::parser::tokenizer::{is_delimiter, NEWLINE, SENTINEL};
use crate::span::TextSpan;
use crate::table::{infer_types, Row, Table};

fn check_cell(text: &str) -> Result<()> {
    let reason = text.bytes().find_map(|byte| match byte {
        NEWLINE => Some("contains a newline"),
        SENTINEL => Some("contains a NUL byte"),
        byte if is_delimiter(byte) => Some("contains a field delimiter"),
        _ => None,
    });
    match reason {
        Some(reason) => Err(CsvError::InvalidCell {
            text: text.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Copy `text` into the arena as a trimmed cell
fn arena_cell<'a>(arena: &'a Arena, text: &str) -> Result<TextSpan<'a>> {
    check_cell(text)?;
    Ok(TextSpan::from(arena.alloc_str(text)?).trim())
}

impl<'a> Table<'a> {
    /// Add a data row at the bottom
    ///
    /// `cells` must hold exactly one value per column.
    pub fn append_row(&mut self, arena: &'a Arena, cells: &[&str]) -> Result<()> {
        if cells.len() != self.column_count() {
            return Err(CsvError::ShapeMismatch {
                expected: self.column_count(),
                found: cells.len(),
            });
        }

        for cell in cells {
            check_cell(cell)?;
        }
        let spans = cells
            .iter()
            .map(|cell| arena_cell(arena, cell))
            .collect::<Result<Vec<_>>>()?;
        let spans: &'a [TextSpan<'a>] = arena.alloc_slice_copy(&spans)?;

        let rows = arena.extend_slice(self.rows, &[Row::new(spans)])?;
        self.types = infer_types(arena, self.column_count(), rows)?;
        self.rows = rows;
        Ok(())
    }

    /// Add a column on the right, one value per existing row
    pub fn append_column(&mut self, arena: &'a Arena, name: &str, cells: &[&str]) -> Result<()> {
        if cells.len() != self.row_count() {
            return Err(CsvError::ShapeMismatch {
                expected: self.row_count(),
                found: cells.len(),
            });
        }

        check_cell(name)?;
        for cell in cells {
            check_cell(cell)?;
        }

        let ordinal = self.column_count();
        let name = arena_cell(arena, name)?;
        let header = arena.extend_slice(self.header, &[name])?;

        let mut rows = Vec::with_capacity(self.row_count());
        let mut added = Vec::with_capacity(self.row_count());
        for (row, text) in self.rows.iter().zip(cells) {
            let cell = arena_cell(arena, text)?;
            rows.push(Row::new(arena.extend_slice(row.cells(), &[cell])?));
            added.push(cell);
        }
        let rows: &'a [Row<'a>] = arena.alloc_slice_copy(&rows)?;

        let mut index = self.index;
        index.insert(arena, name, ordinal)?;
        let types = arena.extend_slice(self.types, &[infer_column_type(added)])?;

        self.header = header;
        self.rows = rows;
        self.index = index;
        self.types = types;
        Ok(())
    }

    /// Put `value` into every missing cell of column `name`
    ///
    /// Returns how many cells were filled. A blank `value` is refused, since
    /// it would leave every cell missing.
    pub fn fill_missing(&mut self, arena: &'a Arena, name: &str, value: &str) -> Result<usize> {
        let column = self.column_ordinal(name)?;
        check_cell(value)?;
        if TextSpan::from(value).trim().is_empty() {
            return Err(CsvError::InvalidCell {
                text: value.to_string(),
                reason: "a fill value must not be blank",
            });
        }
        let missing = self
            .rows
            .iter()
            .filter(|row| row.cells()[column].is_empty())
            .count();
        if missing == 0 {
            return Ok(0);
        }

        let value = arena_cell(arena, value)?;
        let mut rows = Vec::with_capacity(self.row_count());
        for row in self.rows {
            if row.cells()[column].is_empty() {
                let cells = arena.alloc_slice_copy(row.cells())?;
                cells[column] = value;
                rows.push(Row::new(cells));
            } else {
                rows.push(*row);
            }
        }
        let rows: &'a [Row<'a>] = arena.alloc_slice_copy(&rows)?;

        self.types = infer_types(arena, self.column_count(), rows)?;
        self.rows = rows;
        debug!(column = name, filled = missing, "filled missing cells");
        Ok(missing)
    }

    /// A new table without the rows that have any missing cell
    ///
    /// Header and index are shared with `self`.
    pub fn drop_missing(&self, arena: &'a Arena) -> Result<Table<'a>> {
        let kept: Vec<Row<'a>> = self
            .rows
            .iter()
            .filter(|row| !row.has_missing())
            .copied()
            .collect();
        debug!(
            kept = kept.len(),
            dropped = self.row_count() - kept.len(),
            "dropped rows with missing cells"
        );
        let rows = arena.alloc_slice_copy(&kept)?;
        Table::assemble(arena, self.header, rows, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::ColumnType;

    #[test]
    fn test_append_row_retypes() {
        let arena = Arena::new();
        let mut table = Table::parse(&arena, b"id,score\n1,2\n").unwrap();
        assert_eq!(table.column_types(), &[ColumnType::Integer, ColumnType::Integer]);

        table.append_row(&arena, &["2", " 3.5 "]).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(1, 1).unwrap(), "3.5");
        assert_eq!(table.column_types(), &[ColumnType::Integer, ColumnType::Float]);
    }

    #[test]
    fn test_append_row_wrong_width() {
        let arena = Arena::new();
        let mut table = Table::parse(&arena, b"a,b\n1,2\n").unwrap();
        let err = table.append_row(&arena, &["1"]).unwrap_err();
        assert!(matches!(
            err,
            CsvError::ShapeMismatch {
                expected: 2,
                found: 1
            }
        ));
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_append_row_leaves_clones_alone() {
        let arena = Arena::new();
        let mut table = Table::parse(&arena, b"a\n1\n").unwrap();
        let before = table.clone();
        table.append_row(&arena, &["x"]).unwrap();
        assert_eq!(before.row_count(), 1);
        assert_eq!(before.column_type_of(0).unwrap(), ColumnType::Integer);
        assert_eq!(table.column_type_of(0).unwrap(), ColumnType::String);
    }

    #[test]
    fn test_append_row_rejects_unwritable_text() {
        let arena = Arena::new();
        let mut table = Table::parse(&arena, b"a,b\n1,2\n").unwrap();

        for bad in ["x,y", "x;y", "x\ny", "x\0"] {
            let err = table.append_row(&arena, &[bad, "z"]).unwrap_err();
            assert!(
                matches!(err, CsvError::InvalidCell { ref text, .. } if text == bad),
                "{bad:?} accepted"
            );
        }
        let err = table.append_row(&arena, &["x", "y,z"]).unwrap_err();
        assert_eq!(err.to_string(), "cannot store \"y,z\": contains a field delimiter");
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_appended_row_survives_write_and_reparse() {
        let arena = Arena::new();
        let mut table = Table::parse(&arena, b"a,b\n1,2\n").unwrap();
        table.append_row(&arena, &["x y", " z\t"]).unwrap();

        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let reparsed = Table::parse(&arena, &out).unwrap();
        assert_eq!(reparsed.row_count(), 2);
        assert_eq!(reparsed.row_at(1).unwrap().cells(), table.row_at(1).unwrap().cells());
    }

    #[test]
    fn test_append_column_rejects_unwritable_text() {
        let arena = Arena::new();
        let mut table = Table::parse(&arena, b"name\nann\n").unwrap();

        assert!(matches!(
            table.append_column(&arena, "a;b", &["1"]),
            Err(CsvError::InvalidCell { .. })
        ));
        assert!(matches!(
            table.append_column(&arena, "ok", &["1\n2"]),
            Err(CsvError::InvalidCell { .. })
        ));
        assert_eq!(table.column_count(), 1);
        assert_eq!(table.column_index_of("ok"), None);
    }

    #[test]
    fn test_append_column() {
        let arena = Arena::new();
        let mut table = Table::parse(&arena, b"name\nann\nbob\n").unwrap();
        table.append_column(&arena, "active", &["true", "FALSE"]).unwrap();

        assert_eq!(table.column_count(), 2);
        assert_eq!(table.column_index_of("active"), Some(1));
        assert_eq!(table.column_type_of(1).unwrap(), ColumnType::Boolean);
        assert_eq!(table.cell(1, 1).unwrap(), "FALSE");
        assert!(table.rows().iter().all(|row| row.len() == 2));
    }

    #[test]
    fn test_append_column_shadows_duplicate_name() {
        let arena = Arena::new();
        let mut table = Table::parse(&arena, b"v\n1\n").unwrap();
        table.append_column(&arena, "v", &["a"]).unwrap();
        assert_eq!(table.column_index_of("v"), Some(1));

        let err = table.append_column(&arena, "w", &[]).unwrap_err();
        assert!(matches!(err, CsvError::ShapeMismatch { expected: 1, found: 0 }));
    }

    #[test]
    fn test_fill_missing() {
        let arena = Arena::new();
        let mut table = Table::parse(&arena, b"name,age\nann,\nbob,17\ncid,\n").unwrap();
        let filled = table.fill_missing(&arena, "age", "0").unwrap();
        assert_eq!(filled, 2);
        assert_eq!(table.cell(0, 1).unwrap(), "0");
        assert_eq!(table.cell(1, 1).unwrap(), "17");
        assert_eq!(table.fill_missing(&arena, "age", "0").unwrap(), 0);
        assert!(matches!(
            table.fill_missing(&arena, "height", "0"),
            Err(CsvError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_fill_missing_retypes() {
        let arena = Arena::new();
        let mut table = Table::parse(&arena, b"x\n1\n\n").unwrap();
        table.fill_missing(&arena, "x", "n/a").unwrap();
        assert_eq!(table.column_type_of(0).unwrap(), ColumnType::String);
    }

    #[test]
    fn test_fill_missing_rejects_blank_value() {
        let arena = Arena::new();
        let mut table = Table::parse(&arena, b"x,y\n,1\n,2\n").unwrap();

        let err = table.fill_missing(&arena, "x", "  ").unwrap_err();
        assert!(matches!(err, CsvError::InvalidCell { .. }));
        assert!(matches!(
            table.fill_missing(&arena, "x", "a,b"),
            Err(CsvError::InvalidCell { .. })
        ));
        assert!(table.rows().iter().all(|row| row.has_missing()));
        assert_eq!(table.fill_missing(&arena, "x", "7").unwrap(), 2);
        assert!(table.rows().iter().all(|row| !row.has_missing()));
    }

    #[test]
    fn test_drop_missing() {
        let arena = Arena::new();
        let table = Table::parse(&arena, b"a,b\n1,x\n,y\n3,\n4,z\n").unwrap();
        let cleaned = table.drop_missing(&arena).unwrap();
        assert_eq!(cleaned.row_count(), 2);
        assert_eq!(cleaned.cell(1, 0).unwrap(), "4");
        assert_eq!(cleaned.column_index_of("b"), Some(1));
        assert_eq!(table.row_count(), 4);
    }
}

use serde::Serialize;

use crate::arena::Arena;
use crate::error::{CsvError, Result};
use crate::index::ColumnIndex;
use crate::infer::{infer_column_type, ColumnType};
use crate::span::TextSpan;

/// One data record: exactly `column_count` cells, in header order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Row<'a> {
    cells: &'a [TextSpan<'a>],
}

impl<'a> Row<'a> {
    pub(crate) fn new(cells: &'a [TextSpan<'a>]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &'a [TextSpan<'a>] {
        self.cells
    }

    pub fn get(&self, column: usize) -> Option<TextSpan<'a>> {
        self.cells.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'a, TextSpan<'a>>> {
        self.cells.iter().copied()
    }

    /// True when some cell is missing (an empty span)
    pub fn has_missing(&self) -> bool {
        self.cells.iter().any(TextSpan::is_empty)
    }
}

impl<'a> IntoIterator for Row<'a> {
    type Item = TextSpan<'a>;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, TextSpan<'a>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A header entry together with its inferred type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column<'a> {
    pub ordinal: usize,
    pub name: TextSpan<'a>,
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    pub ordinal: usize,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub rows: usize,
    pub columns: Vec<ColumnSchema>,
}

/// A parsed table.
///
/// Every slice here points into the arena the table was built from, which
/// must outlive it. The table itself holds shared references only, so once
/// built it can be read from any number of threads.
#[derive(Debug, Clone)]
pub struct Table<'a> {
    pub(crate) header: &'a [TextSpan<'a>],
    pub(crate) types: &'a [ColumnType],
    pub(crate) rows: &'a [Row<'a>],
    pub(crate) index: ColumnIndex<'a>,
}

/// Detect the type of every column from the full set of rows
pub(crate) fn infer_types<'a>(
    arena: &'a Arena,
    columns: usize,
    rows: &[Row<'a>],
) -> Result<&'a [ColumnType]> {
    let types = arena.alloc_slice_fill_iter(
        (0..columns).map(|col| infer_column_type(rows.iter().map(|row| row.cells[col]))),
    )?;
    Ok(types)
}

impl<'a> Table<'a> {
    /// Put already-sliced parts together and run type inference
    pub(crate) fn assemble(
        arena: &'a Arena,
        header: &'a [TextSpan<'a>],
        rows: &'a [Row<'a>],
        index: ColumnIndex<'a>,
    ) -> Result<Self> {
        debug_assert!(rows.iter().all(|row| row.len() == header.len()));
        let types = infer_types(arena, header.len(), rows)?;
        Ok(Table {
            header,
            types,
            rows,
            index,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// A table with a header but no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header(&self) -> &'a [TextSpan<'a>] {
        self.header
    }

    pub fn rows(&self) -> &'a [Row<'a>] {
        self.rows
    }

    pub fn column_types(&self) -> &'a [ColumnType] {
        self.types
    }

    pub fn row_at(&self, index: usize) -> Result<Row<'a>> {
        self.rows
            .get(index)
            .copied()
            .ok_or(CsvError::IndexOutOfBounds {
                kind: "row",
                index,
                len: self.rows.len(),
            })
    }

    /// Ordinal of the column called `name`; the right-most one if the header
    /// repeats it
    pub fn column_index_of(&self, name: &str) -> Option<usize> {
        self.index.lookup(name.as_bytes())
    }

    pub fn column_ordinal(&self, name: &str) -> Result<usize> {
        self.column_index_of(name)
            .ok_or_else(|| CsvError::ColumnNotFound(name.to_string()))
    }

    pub(crate) fn check_column(&self, column: usize) -> Result<()> {
        if column < self.header.len() {
            Ok(())
        } else {
            Err(CsvError::IndexOutOfBounds {
                kind: "column",
                index: column,
                len: self.header.len(),
            })
        }
    }

    pub fn column_type_of(&self, column: usize) -> Result<ColumnType> {
        self.check_column(column)?;
        Ok(self.types[column])
    }

    pub fn columns(&self) -> impl Iterator<Item = Column<'a>> + 'a {
        let header = self.header;
        let types = self.types;
        header
            .iter()
            .zip(types)
            .enumerate()
            .map(|(ordinal, (&name, &column_type))| Column {
                ordinal,
                name,
                column_type,
            })
    }

    /// Every cell of one column, top to bottom
    pub fn column(&self, column: usize) -> Result<impl Iterator<Item = TextSpan<'a>> + 'a> {
        self.check_column(column)?;
        let rows = self.rows;
        Ok(rows.iter().map(move |row| row.cells[column]))
    }

    pub fn column_by_name(
        &self,
        name: &str,
    ) -> Result<impl Iterator<Item = TextSpan<'a>> + 'a> {
        self.column(self.column_ordinal(name)?)
    }

    pub fn cell(&self, row: usize, column: usize) -> Result<TextSpan<'a>> {
        self.check_column(column)?;
        Ok(self.row_at(row)?.cells[column])
    }

    pub fn cell_by_name(&self, row: usize, name: &str) -> Result<TextSpan<'a>> {
        self.cell(row, self.column_ordinal(name)?)
    }

    /// Rows whose cell in column `name` satisfies `predicate`
    pub fn filter_rows<P>(&self, name: &str, mut predicate: P) -> Result<Vec<Row<'a>>>
    where
        P: FnMut(TextSpan<'a>) -> bool,
    {
        let column = self.column_ordinal(name)?;
        Ok(self
            .rows
            .iter()
            .filter(|row| predicate(row.cells[column]))
            .copied()
            .collect())
    }

    pub fn schema(&self) -> TableSchema {
        TableSchema {
            rows: self.row_count(),
            columns: self
                .columns()
                .map(|column| ColumnSchema {
                    ordinal: column.ordinal,
                    name: column.name.to_str_lossy().into_owned(),
                    column_type: column.column_type,
                })
                .collect(),
        }
    }
}

pub mod tokenizer;


use std::sync::Arc;

use tracing::debug;

use crate::arena::{AllocError, Arena};
use crate::config::{ParserConfig, RaggedRowPolicy};
use crate::diagnostics::{DiagnosticHandler, TracingDiagnosticHandler};
use crate::error::{CsvError, Result};
use crate::index::ColumnIndex;
use crate::span::TextSpan;
use crate::table::{Row, Table};

pub use tokenizer::Dimensions;

/// Builds a [`Table`] whose spans, rows and index all live in one arena.
///
/// Parsing is two passes over the buffer: a sizing pass that counts rows and
/// columns, then a structural pass that slices every field into a span in a
/// single `rows × columns` grid. Fields are never copied.
pub struct CsvParser<'a> {
    arena: &'a Arena,
    config: ParserConfig,
    diagnostic_handler: Arc<dyn DiagnosticHandler>,
}

impl<'a> CsvParser<'a> {
    pub fn new(
        arena: &'a Arena,
        config: ParserConfig,
        diagnostic_handler: Arc<dyn DiagnosticHandler>,
    ) -> Self {
        CsvParser {
            arena,
            config,
            diagnostic_handler,
        }
    }

    /// Default configuration, diagnostics forwarded to `tracing`
    pub fn with_defaults(arena: &'a Arena) -> Self {
        Self::new(
            arena,
            ParserConfig::default(),
            Arc::new(TracingDiagnosticHandler::new()),
        )
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn arena(&self) -> &'a Arena {
        self.arena
    }

    /// Copy `input` into the arena and parse it
    pub fn parse(&self, input: &[u8]) -> Result<Table<'a>> {
        let buffer = self.arena.alloc_slice_copy(tokenizer::content(input))?;
        self.parse_buffer(buffer)
    }

    /// Parse a buffer that already lives at least as long as the arena
    /// (typically one read straight into it)
    pub fn parse_buffer(&self, buffer: &'a [u8]) -> Result<Table<'a>> {
        let buffer = tokenizer::content(buffer);
        let dims = tokenizer::measure(buffer).ok_or(CsvError::EmptyInput)?;
        debug!(
            rows = dims.rows,
            columns = dims.columns,
            bytes = buffer.len(),
            "sized input"
        );

        let (header, index) = self.parse_header(dims.header(buffer), dims.columns)?;
        let rows = self.parse_rows(dims.body(buffer), &dims)?;

        let table = Table::assemble(self.arena, header, rows, index)?;
        debug!(
            regions = self.arena.region_count(),
            arena_bytes = self.arena.allocated_bytes(),
            "parsed table"
        );
        Ok(table)
    }

    fn parse_header(
        &self,
        line: &'a [u8],
        columns: usize,
    ) -> Result<(&'a [TextSpan<'a>], ColumnIndex<'a>)> {
        let header = self
            .arena
            .alloc_slice_fill_copy(columns, TextSpan::empty())?;
        let mut index = ColumnIndex::new();

        // the sizing pass counted these same delimiters, so the counts agree
        let names = tokenizer::fields(line);
        for (ordinal, (slot, name)) in header.iter_mut().zip(names).enumerate() {
            *slot = name;
            if index.lookup(name.as_bytes()).is_some() {
                let message =
                    format!("column `{name}` repeats; lookups by name resolve to column {ordinal}");
                self.diagnostic_handler.info(1, &message);
            }
            index.insert(self.arena, name, ordinal)?;
        }

        let header: &'a [TextSpan<'a>] = header;
        Ok((header, index))
    }

    fn parse_rows(&self, body: &'a [u8], dims: &Dimensions) -> Result<&'a [Row<'a>]> {
        let columns = dims.columns;
        let len = dims
            .rows
            .checked_mul(columns)
            .ok_or(AllocError { requested: usize::MAX })?;
        let grid = self.arena.alloc_slice_fill_copy(len, TextSpan::empty())?;

        for (row, (line, slots)) in tokenizer::lines(body, dims.rows)
            .zip(grid.chunks_mut(columns))
            .enumerate()
        {
            let mut found = 0;
            for field in tokenizer::fields(line) {
                if let Some(slot) = slots.get_mut(found) {
                    *slot = field;
                }
                found += 1;
            }

            if found != columns {
                self.ragged_row(tokenizer::row_line(row), columns, found)?;
            }
        }

        let grid: &'a [TextSpan<'a>] = grid;
        let rows = self
            .arena
            .alloc_slice_fill_iter(grid.chunks(columns).map(Row::new))?;
        Ok(rows)
    }

    fn ragged_row(&self, line: usize, expected: usize, found: usize) -> Result<()> {
        match self.config.ragged_rows {
            RaggedRowPolicy::Reject => {
                self.diagnostic_handler.error(
                    line,
                    &format!("row has {found} fields but the header has {expected}"),
                );
                Err(CsvError::MalformedStructure {
                    line,
                    expected,
                    found,
                })
            }
            RaggedRowPolicy::Pad => {
                let message = if found < expected {
                    format!("row has {found} of {expected} fields; missing cells left empty")
                } else {
                    format!(
                        "row has {found} fields but the header has {expected}; \
                         extra fields dropped"
                    )
                };
                self.diagnostic_handler.warning(line, &message);
                Ok(())
            }
        }
    }
}

impl<'a> Table<'a> {
    /// Parse `input` with the default configuration
    pub fn parse(arena: &'a Arena, input: &[u8]) -> Result<Table<'a>> {
        CsvParser::with_defaults(arena).parse(input)
    }
}

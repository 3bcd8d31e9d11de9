//! Reading tables from files and writing them back out.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::arena::{AllocError, Arena};
use crate::error::Result;
use crate::parser::CsvParser;
use crate::span::TextSpan;
use crate::table::Table;

/// Read the whole file at `path` straight into arena memory
pub fn read_into_arena<'a>(arena: &'a Arena, path: &Path) -> Result<&'a [u8]> {
    let mut file = File::open(path)?;
    let len = usize::try_from(file.metadata()?.len())
        .map_err(|_| AllocError { requested: usize::MAX })?;

    let buffer = arena.alloc_slice_fill_copy(len, 0u8)?;
    file.read_exact(buffer)?;
    debug!(path = %path.display(), bytes = len, "read file into arena");
    Ok(buffer)
}

impl<'a> CsvParser<'a> {
    /// Parse a file without an intermediate heap copy
    pub fn parse_file(&self, path: &Path) -> Result<Table<'a>> {
        let buffer = read_into_arena(self.arena(), path)?;
        self.parse_buffer(buffer)
    }
}

fn write_record<W: Write>(writer: &mut W, cells: &[TextSpan<'_>]) -> std::io::Result<()> {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }
        writer.write_all(cell.as_bytes())?;
    }
    writer.write_all(b"\n")
}

impl<'a> Table<'a> {
    /// Write the header and every row, comma separated, one record per line
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_record(writer, self.header)?;
        for row in self.rows {
            write_record(writer, row.cells())?;
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_csv(&mut writer)?;
        writer.flush()?;
        info!(path = %path.display(), rows = self.row_count(), "saved table");
        Ok(())
    }
}

use std::fmt;

use crate::table::Table;

fn write_line<I>(f: &mut fmt::Formatter<'_>, widths: &[usize], cells: I) -> fmt::Result
where
    I: Iterator<Item = String>,
{
    let last = widths.len().saturating_sub(1);
    for (i, cell) in cells.enumerate() {
        if i == last {
            f.write_str(&cell)?;
        } else {
            write!(f, "{:<width$} | ", cell, width = widths[i])?;
        }
    }
    f.write_str("\n")
}

/// Renders an aligned grid: `name (Type)` headers, a dashed rule, then one
/// line per row. The last column is left unpadded.
impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<String> = self
            .columns()
            .map(|column| format!("{} ({})", column.name, column.column_type))
            .collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in self.rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.to_str_lossy().chars().count());
            }
        }

        write_line(f, &widths, headers.iter().cloned())?;

        let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;

        for row in self.rows {
            write_line(f, &widths, row.iter().map(|cell| cell.to_string()))?;
        }
        Ok(())
    }
}

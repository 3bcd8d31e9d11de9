//! Descriptive statistics over a single column.
//!
//! Numeric statistics accept Integer and Float columns and skip missing cells.
//! They return `None` when the column has no values at all.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{CsvError, Result};
use crate::infer::ColumnType;
use crate::span::TextSpan;
use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    pub mode: Option<String>,
}

fn mean_of(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median_of(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Population standard deviation
fn std_dev_of(values: &[f64]) -> Option<f64> {
    let mean = mean_of(values)?;
    let variance = values
        .iter()
        .map(|value| (value - mean) * (value - mean))
        .sum::<f64>()
        / values.len() as f64;
    Some(variance.sqrt())
}

impl<'a> Table<'a> {
    /// Values of a numeric column with missing cells left out
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>> {
        let column = self.column_ordinal(name)?;
        let column_type = self.types[column];
        if !column_type.is_numeric() {
            return Err(CsvError::TypeMismatch {
                column,
                expected: ColumnType::Float,
                actual: column_type,
            });
        }

        let mut values = Vec::with_capacity(self.row_count());
        for row in 0..self.row_count() {
            if let Some(value) = self.value_at(row, column)?.as_float() {
                values.push(value);
            }
        }
        Ok(values)
    }

    pub fn mean(&self, name: &str) -> Result<Option<f64>> {
        Ok(mean_of(&self.numeric_values(name)?))
    }

    pub fn median(&self, name: &str) -> Result<Option<f64>> {
        Ok(median_of(&self.numeric_values(name)?))
    }

    pub fn std_dev(&self, name: &str) -> Result<Option<f64>> {
        Ok(std_dev_of(&self.numeric_values(name)?))
    }

    /// Most frequent non-empty cell text; ties go to the value seen first
    pub fn mode(&self, name: &str) -> Result<Option<TextSpan<'a>>> {
        let column = self.column_ordinal(name)?;
        let mut counts: FxHashMap<TextSpan<'a>, (usize, usize)> = FxHashMap::default();
        for (row, cell) in self.column(column)?.enumerate() {
            if cell.is_empty() {
                continue;
            }
            counts.entry(cell).or_insert((0, row)).0 += 1;
        }

        Ok(counts
            .into_iter()
            .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
                count_a.cmp(count_b).then(first_b.cmp(first_a))
            })
            .map(|(cell, _)| cell))
    }

    pub fn summarize(&self, name: &str) -> Result<ColumnSummary> {
        let column = self.column_ordinal(name)?;
        let column_type = self.types[column];
        let missing = self.column(column)?.filter(TextSpan::is_empty).count();

        let (mean, median, std_dev) = if column_type.is_numeric() {
            let values = self.numeric_values(name)?;
            (mean_of(&values), median_of(&values), std_dev_of(&values))
        } else {
            (None, None, None)
        };

        Ok(ColumnSummary {
            name: name.to_string(),
            column_type,
            count: self.row_count() - missing,
            missing,
            mean,
            median,
            std_dev,
            mode: self.mode(name)?.map(|cell| cell.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use indoc::indoc;

    const SCORES: &str = indoc! {"
        name,age,score,team
        ann,31,2.5,red
        bob,17,,blue
        cid,45,4.5,red
        dee,,1.0,
    "};

    #[test]
    fn test_mean_median_std_dev() {
        let arena = Arena::new();
        let table = Table::parse(&arena, SCORES.as_bytes()).unwrap();

        assert_eq!(table.mean("age").unwrap(), Some(31.0));
        assert_eq!(table.median("age").unwrap(), Some(31.0));
        assert_eq!(table.median("score").unwrap(), Some(2.5));

        let sd = table.std_dev("age").unwrap().unwrap();
        // population sd of 31, 17, 45
        assert!((sd - 11.430952132988164).abs() < 1e-9);
    }

    #[test]
    fn test_even_median() {
        let arena = Arena::new();
        let table = Table::parse(&arena, b"x\n4\n1\n3\n2\n").unwrap();
        assert_eq!(table.median("x").unwrap(), Some(2.5));
    }

    #[test]
    fn test_stats_on_text_column_is_type_mismatch() {
        let arena = Arena::new();
        let table = Table::parse(&arena, SCORES.as_bytes()).unwrap();
        assert!(matches!(
            table.mean("name"),
            Err(CsvError::TypeMismatch { column: 0, .. })
        ));
        assert!(matches!(
            table.mean("height"),
            Err(CsvError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_stats_without_values() {
        let arena = Arena::new();
        let table = Table::parse(&arena, b"x\n\n\n").unwrap();
        assert_eq!(table.mean("x").unwrap(), None);
        assert_eq!(table.median("x").unwrap(), None);
        assert_eq!(table.std_dev("x").unwrap(), None);
        assert_eq!(table.mode("x").unwrap(), None);
    }

    #[test]
    fn test_mode_ties_go_to_first_seen() {
        let arena = Arena::new();
        let table = Table::parse(&arena, b"c\nb\na\na\nb\n").unwrap();
        assert_eq!(table.mode("c").unwrap().unwrap(), "b");

        let table = Table::parse(&arena, SCORES.as_bytes()).unwrap();
        assert_eq!(table.mode("team").unwrap().unwrap(), "red");
    }

    #[test]
    fn test_summarize() {
        let arena = Arena::new();
        let table = Table::parse(&arena, SCORES.as_bytes()).unwrap();
        let summary = table.summarize("score").unwrap();
        assert_eq!(summary.column_type, ColumnType::Float);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.missing, 1);
        assert_eq!(summary.mean, Some(8.0 / 3.0));

        let summary = table.summarize("team").unwrap();
        assert_eq!(summary.mean, None);
        assert_eq!(summary.mode.as_deref(), Some("red"));
    }
}

//! Dataset-wide data-quality audit: missingness, duplicate rows and column types.

mod summary;

pub use summary::{
    group_thousands, render_audit_summary, write_audit_summary, AuditSummary, TOP_MISSING_LIMIT,
};

use crate::analytics::dataset::{ColumnType, Table, Value};
use serde::Serialize;
use std::collections::HashSet;

/// Columns strictly above this share of missing cells are flagged.
pub const HIGH_MISSINGNESS_THRESHOLD: f64 = 90.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMissingness {
    pub column: String,
    pub count: usize,
    /// Rounded to two decimals, half away from zero.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDataType {
    pub column: String,
    pub dtype: ColumnType,
    pub label: &'static str,
}

/// Read-only audit of one table. Per-column entries keep the table's column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditResult {
    pub total_records: usize,
    pub total_columns: usize,
    pub duplicate_rows: usize,
    pub missing_by_column: Vec<ColumnMissingness>,
    pub high_missingness_columns: Vec<String>,
    pub data_types: Vec<ColumnDataType>,
}

impl AuditResult {
    pub fn missing_for(&self, column: &str) -> Option<&ColumnMissingness> {
        self.missing_by_column
            .iter()
            .find(|entry| entry.column == column)
    }

    pub fn dtype_of(&self, column: &str) -> Option<ColumnType> {
        self.data_types
            .iter()
            .find(|entry| entry.column == column)
            .map(|entry| entry.dtype)
    }

    /// Columns by descending missing percentage; ties keep column order.
    pub fn top_missing(&self, limit: usize) -> Vec<&ColumnMissingness> {
        let mut ranked: Vec<&ColumnMissingness> = self.missing_by_column.iter().collect();
        ranked.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
        ranked.truncate(limit);
        ranked
    }

    pub fn summary(&self) -> AuditSummary<'_> {
        AuditSummary::from_result(self)
    }
}

pub fn audit_data_quality(table: &Table) -> AuditResult {
    let total_records = table.row_count();
    let mut missing_by_column = Vec::with_capacity(table.column_count());
    let mut high_missingness_columns = Vec::new();
    let mut data_types = Vec::with_capacity(table.column_count());

    for column in table.columns() {
        let count = column.missing_count();
        let raw_percentage = missing_percentage(count, total_records);

        if raw_percentage > HIGH_MISSINGNESS_THRESHOLD {
            high_missingness_columns.push(column.name().to_string());
        }

        missing_by_column.push(ColumnMissingness {
            column: column.name().to_string(),
            count,
            percentage: round_percentage(raw_percentage),
        });
        data_types.push(ColumnDataType {
            column: column.name().to_string(),
            dtype: column.dtype(),
            label: column.dtype().label(),
        });
    }

    let duplicate_rows = count_duplicate_rows(table);

    tracing::debug!(
        records = total_records,
        duplicates = duplicate_rows,
        flagged = high_missingness_columns.len(),
        "data quality audit complete"
    );

    AuditResult {
        total_records,
        total_columns: table.column_count(),
        duplicate_rows,
        missing_by_column,
        high_missingness_columns,
        data_types,
    }
}

fn missing_percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Two-decimal rounding, half away from zero.
pub fn round_percentage(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rows equal, value for value, to an earlier row.
fn count_duplicate_rows(table: &Table) -> usize {
    let mut seen: HashSet<Vec<&Value>> = HashSet::with_capacity(table.row_count());
    table
        .rows()
        .map(|row| seen.insert(row))
        .filter(|inserted| !inserted)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::dataset::Column;

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_percentage(12.345_000_1), 12.35);
        assert_eq!(round_percentage(0.125), 0.13);
        assert_eq!(round_percentage(33.333_333), 33.33);
        assert_eq!(round_percentage(100.0), 100.0);
    }

    #[test]
    fn duplicate_rows_count_later_copies_only() {
        let table = Table::new(vec![
            Column::integers("a", [Some(1), Some(1), Some(2), Some(1)]),
            Column::texts("b", [Some("x"), Some("x"), Some("x"), Some("y")]),
        ])
        .expect("table");
        assert_eq!(count_duplicate_rows(&table), 1);
    }

    #[test]
    fn null_cells_match_for_duplicate_detection() {
        let table = Table::new(vec![
            Column::floats("weight", [None, None]),
            Column::texts("payer_code", [Some("MC"), Some("MC")]),
        ])
        .expect("table");
        assert_eq!(count_duplicate_rows(&table), 1);
    }

    #[test]
    fn exactly_ninety_percent_is_not_flagged() {
        let mut values = vec![None; 9];
        values.push(Some(1));
        let table = Table::new(vec![Column::integers("a1c", values)]).expect("table");

        let result = audit_data_quality(&table);
        assert_eq!(result.missing_for("a1c").expect("entry").percentage, 90.0);
        assert!(result.high_missingness_columns.is_empty());
    }

    #[test]
    fn empty_table_reports_zero_percentages() {
        let table = Table::new(vec![Column::integers("a", Vec::<Option<i64>>::new())])
            .expect("table");
        let result = audit_data_quality(&table);
        assert_eq!(result.total_records, 0);
        assert_eq!(result.duplicate_rows, 0);
        assert_eq!(result.missing_for("a").expect("entry").percentage, 0.0);
    }

    #[test]
    fn top_missing_is_stable_on_ties() {
        let table = Table::new(vec![
            Column::integers("first", [None, Some(1)]),
            Column::integers("second", [Some(1), Some(2)]),
            Column::integers("third", [None, Some(3)]),
            Column::integers("fourth", [None, None]),
        ])
        .expect("table");
        let result = audit_data_quality(&table);

        let order: Vec<&str> = result
            .top_missing(10)
            .into_iter()
            .map(|entry| entry.column.as_str())
            .collect();
        assert_eq!(order, vec!["fourth", "first", "third", "second"]);
    }
}

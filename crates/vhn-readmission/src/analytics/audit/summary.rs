use super::{AuditResult, ColumnMissingness};
use serde::Serialize;
use std::fmt::{self, Write};

pub const TOP_MISSING_LIMIT: usize = 10;

const BANNER_WIDTH: usize = 70;

#[derive(Debug, Clone, Serialize)]
pub struct AuditSummary<'a> {
    pub total_records: usize,
    pub total_columns: usize,
    pub duplicate_rows: usize,
    pub high_missingness: Vec<&'a ColumnMissingness>,
    pub top_missing: Vec<&'a ColumnMissingness>,
}

impl<'a> AuditSummary<'a> {
    pub(super) fn from_result(result: &'a AuditResult) -> Self {
        let high_missingness = result
            .high_missingness_columns
            .iter()
            .filter_map(|column| result.missing_for(column))
            .collect();

        Self {
            total_records: result.total_records,
            total_columns: result.total_columns,
            duplicate_rows: result.duplicate_rows,
            high_missingness,
            top_missing: result.top_missing(TOP_MISSING_LIMIT),
        }
    }
}

/// Fixed-layout text report of an audit.
pub fn write_audit_summary<W: Write>(out: &mut W, result: &AuditResult) -> fmt::Result {
    let summary = result.summary();
    let heavy = "=".repeat(BANNER_WIDTH);
    let light = "-".repeat(BANNER_WIDTH);

    writeln!(out, "{heavy}")?;
    writeln!(out, "DATA QUALITY AUDIT SUMMARY")?;
    writeln!(out, "{heavy}")?;
    writeln!(
        out,
        "\nTotal Records: {}",
        group_thousands(summary.total_records)
    )?;
    writeln!(out, "Total Columns: {}", summary.total_columns)?;
    writeln!(
        out,
        "Duplicate Rows: {}",
        group_thousands(summary.duplicate_rows)
    )?;

    writeln!(out, "\n{light}")?;
    writeln!(out, "HIGH MISSINGNESS COLUMNS (>90%)")?;
    writeln!(out, "{light}")?;
    if summary.high_missingness.is_empty() {
        writeln!(out, "  None")?;
    } else {
        for entry in &summary.high_missingness {
            writeln!(
                out,
                "  \u{2022} {}: {:.2}% missing",
                entry.column, entry.percentage
            )?;
        }
    }

    writeln!(out, "\n{light}")?;
    writeln!(out, "TOP {TOP_MISSING_LIMIT} COLUMNS BY MISSINGNESS")?;
    writeln!(out, "{light}")?;
    for entry in &summary.top_missing {
        writeln!(
            out,
            "  \u{2022} {}: {:.2}% ({} records)",
            entry.column,
            entry.percentage,
            group_thousands(entry.count)
        )?;
    }

    writeln!(out, "\n{heavy}")
}

pub fn render_audit_summary(result: &AuditResult) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_audit_summary(&mut out, result);
    out
}

/// `101766` -> `101,766`.
pub fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

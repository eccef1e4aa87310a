//! Reformats the block-structured identifier mapping export (one header per
//! code table, blank-line separated) into a flat `Table,ID,Description` file.

mod parser;

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("failed to read mapping export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write mapping table: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    #[serde(rename = "Table")]
    pub table: String,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Description")]
    pub description: String,
}

/// Entry count for one code table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub table: String,
    pub count: usize,
}

/// Per-table entry counts in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingSummary {
    pub total: usize,
    pub tables: Vec<TableCount>,
}

impl MappingSummary {
    pub fn from_entries(entries: &[MappingEntry]) -> Self {
        let mut tables: Vec<TableCount> = Vec::new();
        for entry in entries {
            match tables.iter_mut().find(|count| count.table == entry.table) {
                Some(count) => count.count += 1,
                None => tables.push(TableCount {
                    table: entry.table.clone(),
                    count: 1,
                }),
            }
        }

        Self {
            total: entries.len(),
            tables,
        }
    }
}

pub fn parse_id_mapping<R: Read>(reader: R) -> Result<Vec<MappingEntry>, ReferenceError> {
    Ok(parser::parse_lines(reader)?)
}

pub fn write_id_mapping<W: Write>(
    writer: W,
    entries: &[MappingEntry],
) -> Result<(), ReferenceError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if entries.is_empty() {
        csv_writer.write_record(["Table", "ID", "Description"])?;
    }
    for entry in entries {
        csv_writer.serialize(entry)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Reads `input`, writes the flat table to `output`, and returns the summary.
pub fn reformat_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<MappingSummary, ReferenceError> {
    let entries = parse_id_mapping(std::fs::File::open(input)?)?;
    write_id_mapping(std::fs::File::create(output)?, &entries)?;

    let summary = MappingSummary::from_entries(&entries);
    tracing::info!(
        entries = summary.total,
        tables = summary.tables.len(),
        "reformatted identifier mapping"
    );
    Ok(summary)
}

use super::MappingEntry;
use std::io::{BufRead, BufReader, Read};

/// Walks the block-structured mapping export line by line.
///
/// A line mentioning `description` opens a block named by its first field; a
/// blank line or a lone comma closes it. A header with an empty first field
/// opens nothing. Data lines outside a block are dropped.
pub(crate) fn parse_lines<R: Read>(reader: R) -> Result<Vec<MappingEntry>, std::io::Error> {
    let mut entries = Vec::new();
    let mut current_table: Option<String> = None;

    for line in BufReader::new(reader).lines() {
        let line = line?;
        let line = line.trim().trim_start_matches('\u{feff}');

        if line.is_empty() || line == "," {
            current_table = None;
            continue;
        }

        if line.to_lowercase().contains("description") {
            let table = line.split(',').next().unwrap_or_default();
            current_table = Some(table.to_string()).filter(|name| !name.is_empty());
            continue;
        }

        let Some(table) = current_table.as_deref() else {
            continue;
        };
        if let Some(entry) = parse_data_line(table, line) {
            entries.push(entry);
        }
    }

    Ok(entries)
}

fn parse_data_line(table: &str, line: &str) -> Option<MappingEntry> {
    let (id, description) = line.split_once(',')?;
    let id = id.trim();
    if id.is_empty() {
        return None;
    }

    Some(MappingEntry {
        table: table.to_string(),
        id: id.to_string(),
        description: description.trim().trim_matches('"').to_string(),
    })
}

use super::{Column, ColumnType, DatasetError, Table};
use std::io::{Read, Write};
use std::path::Path;

/// Cell spellings read as null, the usual pandas defaults. `"?"` is absent: the
/// encounter extract uses it as a sentinel that only the diagnosis predicate
/// treats as missing.
pub const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn load_csv_path<P: AsRef<Path>>(path: P) -> Result<Table, DatasetError> {
    let file = std::fs::File::open(path)?;
    load_csv(file)
}

/// Reads a headed CSV into a [`Table`], inferring one type per column: integer
/// when every present cell parses as `i64`, float when every present cell
/// parses as `f64`, text otherwise. Columns with no present cells are floats.
/// Any NaN spelling `f64` accepts is loaded as null.
pub fn load_csv<R: Read>(reader: R) -> Result<Table, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect();
    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for record in csv_reader.records() {
        let record = record?;
        for (cells, field) in raw.iter_mut().zip(record.iter()) {
            cells.push(present(field).map(str::to_string));
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| build_column(name, cells))
        .collect();

    let table = Table::new(columns)?;
    tracing::debug!(
        rows = table.row_count(),
        columns = table.column_count(),
        "loaded tabular dataset"
    );
    Ok(table)
}

/// Writes `table` as headed CSV. Null cells become empty fields.
pub fn write_csv<W: Write>(writer: W, table: &Table) -> Result<(), DatasetError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(table.columns().iter().map(|column| column.name()))?;
    for row in table.rows() {
        csv_writer.write_record(
            row.iter()
                .map(|value| value.as_text().unwrap_or_default()),
        )?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_path<P: AsRef<Path>>(path: P, table: &Table) -> Result<(), DatasetError> {
    let file = std::fs::File::create(path)?;
    write_csv(file, table)
}

fn present(field: &str) -> Option<&str> {
    if NULL_MARKERS.contains(&field) {
        None
    } else {
        Some(field)
    }
}

fn infer_type(cells: &[Option<String>]) -> ColumnType {
    let mut present = cells.iter().flatten().peekable();
    if present.peek().is_none() {
        return ColumnType::Float;
    }

    let mut integer = true;
    for cell in present {
        if integer && cell.parse::<i64>().is_ok() {
            continue;
        }
        integer = false;
        if cell.parse::<f64>().is_err() {
            return ColumnType::Text;
        }
    }

    if integer {
        ColumnType::Integer
    } else {
        ColumnType::Float
    }
}

fn build_column(name: String, cells: Vec<Option<String>>) -> Column {
    match infer_type(&cells) {
        ColumnType::Integer => Column::integers(
            name,
            cells
                .into_iter()
                .map(|cell| cell.and_then(|value| value.parse::<i64>().ok())),
        ),
        ColumnType::Float => Column::floats(
            name,
            cells
                .into_iter()
                .map(|cell| cell.and_then(|value| value.parse::<f64>().ok())),
        ),
        ColumnType::Text => Column::texts(name, cells),
    }
}

//! Column-oriented table with declared column types.
//!
//! Every column carries a [`ColumnType`] and every non-null value must match it.
//! Column lengths are checked when the table is assembled, so downstream code
//! (auditor, scorer, aggregations) can index rows without re-validating.

mod loader;

pub use loader::{load_csv, load_csv_path, write_csv, write_csv_path, NULL_MARKERS};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("column '{0}' appears more than once")]
    DuplicateColumn(String),
    #[error("column '{column}' is declared {declared} but row {row} holds a {found} value")]
    TypeMismatch {
        column: String,
        declared: &'static str,
        row: usize,
        found: &'static str,
    },
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("column '{0}' is not numeric")]
    NotNumeric(String),
}

/// Declared storage type of a column. Labels follow the dtype names analysts
/// see in notebooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    Text,
}

impl ColumnType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Integer => "int64",
            Self::Float => "float64",
            Self::Text => "object",
        }
    }

    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single cell. `Null` is the only missing marker at this level; sentinel
/// strings such as `"?"` are ordinary text here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Null, or a NaN float.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(value) => value.is_nan(),
            _ => false,
        }
    }

    const fn kind_label(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }

    fn matches(&self, dtype: ColumnType) -> bool {
        matches!(
            (self, dtype),
            (Value::Null, _)
                | (Value::Integer(_), ColumnType::Integer)
                | (Value::Float(_), ColumnType::Float)
                | (Value::Text(_), ColumnType::Text)
        )
    }

    /// Numeric view of the cell; text is parsed, non-finite floats are dropped.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(value) => Some(*value as f64),
            Value::Float(value) if value.is_finite() => Some(*value),
            Value::Text(value) => value.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// Integer view of the cell. Floats truncate toward zero.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            Value::Float(value) if value.is_finite() => Some(value.trunc() as i64),
            Value::Text(value) => value.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Text view of the cell, rendering numbers the way they print.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Integer(value) => Some(value.to_string()),
            Value::Float(value) => Some(value.to_string()),
            Value::Text(value) => Some(value.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Text(value) => f.write_str(value),
        }
    }
}

// Value-wise equality: nulls compare equal to each other, floats compare by
// canonical bit pattern so rows can be hashed for duplicate detection.
fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => canonical_bits(*a) == canonical_bits(*b),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Integer(value) => value.hash(state),
            Value::Float(value) => canonical_bits(*value).hash(state),
            Value::Text(value) => value.hash(state),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    dtype: ColumnType,
    values: Vec<Value>,
}

impl Column {
    pub fn new(
        name: impl Into<String>,
        dtype: ColumnType,
        values: Vec<Value>,
    ) -> Result<Self, DatasetError> {
        let name = name.into();
        if let Some((row, value)) = values
            .iter()
            .enumerate()
            .find(|(_, value)| !value.matches(dtype))
        {
            return Err(DatasetError::TypeMismatch {
                column: name,
                declared: dtype.label(),
                row,
                found: value.kind_label(),
            });
        }

        Ok(Self {
            name,
            dtype,
            values,
        })
    }

    pub fn integers<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<i64>>,
    {
        Self {
            name: name.into(),
            dtype: ColumnType::Integer,
            values: values
                .into_iter()
                .map(|value| value.map_or(Value::Null, Value::Integer))
                .collect(),
        }
    }

    pub fn floats<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Self {
            name: name.into(),
            dtype: ColumnType::Float,
            values: values
                .into_iter()
                .map(|value| match value {
                    Some(value) if !value.is_nan() => Value::Float(value),
                    _ => Value::Null,
                })
                .collect(),
        }
    }

    pub fn texts<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            dtype: ColumnType::Text,
            values: values
                .into_iter()
                .map(|value| value.map_or(Value::Null, |text| Value::Text(text.into())))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> ColumnType {
        self.dtype
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_null()).count()
    }
}

/// Named, typed columns sharing one row count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);

        for (index, column) in columns.iter().enumerate() {
            if column.len() != row_count {
                return Err(DatasetError::RaggedColumn {
                    column: column.name.clone(),
                    expected: row_count,
                    actual: column.len(),
                });
            }
            if columns[..index].iter().any(|other| other.name == column.name) {
                return Err(DatasetError::DuplicateColumn(column.name.clone()));
            }
        }

        Ok(Self { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn require_column(&self, name: &str) -> Result<&Column, DatasetError> {
        self.column(name)
            .ok_or_else(|| DatasetError::UnknownColumn(name.to_string()))
    }

    /// Borrowed view of one row in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|column| &column.values[index])
                .collect(),
        )
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.row_count).map(move |index| {
            self.columns
                .iter()
                .map(|column| &column.values[index])
                .collect()
        })
    }

    /// Returns a new table with `column` appended, as callers do when writing
    /// derived scores back next to the source data.
    pub fn with_column(self, column: Column) -> Result<Self, DatasetError> {
        let mut columns = self.columns;
        columns.push(column);
        Self::new(columns)
    }

    /// Like [`Table::with_column`], but a column of the same name is replaced
    /// in its existing position.
    pub fn with_column_replaced(self, column: Column) -> Result<Self, DatasetError> {
        let mut columns = self.columns;
        match columns
            .iter()
            .position(|existing| existing.name() == column.name())
        {
            Some(index) => columns[index] = column,
            None => columns.push(column),
        }
        Self::new(columns)
    }
}

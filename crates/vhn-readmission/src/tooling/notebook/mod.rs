//! Minimal notebook document model plus in-place patching and merging.
//!
//! Only `cells[*].source` is interpreted; every other key (top-level metadata,
//! cell outputs, ids) is carried through untouched.

mod merge;
mod patch;

pub use merge::{merge_files, merge_notebooks};
pub use patch::{patch_file, AnchoredFix, NotebookPatch};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum NotebookError {
    #[error("failed to access notebook: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid notebook document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("at least one notebook is required to merge")]
    NoInputs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "source_lines"
    )]
    pub source: Option<Vec<String>>,
}

impl Notebook {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, NotebookError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, NotebookError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// One-space indented JSON with non-ASCII text kept verbatim.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), NotebookError> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
        self.serialize(&mut serializer)?;
        Ok(())
    }

    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), NotebookError> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.to_writer(&mut file)?;
        file.flush()?;
        Ok(())
    }

    pub fn source_lines_mut(&mut self) -> impl Iterator<Item = &mut Vec<String>> {
        self.cells.iter_mut().filter_map(|cell| cell.source.as_mut())
    }
}

// Sources may be stored as one string; split it into newline-terminated lines.
fn source_lines<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Source {
        Lines(Vec<String>),
        Text(String),
    }

    let source = Option::<Source>::deserialize(deserializer)?;
    Ok(source.map(|source| match source {
        Source::Lines(lines) => lines,
        Source::Text(text) => text.split_inclusive('\n').map(str::to_string).collect(),
    }))
}

use super::{Notebook, NotebookError};
use std::path::Path;

/// Appends the cells of `rest` to `first`, in order. Metadata and every other
/// top-level key come from `first`.
pub fn merge_notebooks<I>(first: Notebook, rest: I) -> Notebook
where
    I: IntoIterator<Item = Notebook>,
{
    let mut merged = first;
    for part in rest {
        merged.cells.extend(part.cells);
    }
    merged
}

/// Merges `inputs` in order into a new document at `output`; returns the cell count.
pub fn merge_files<P, Q>(inputs: &[P], output: Q) -> Result<usize, NotebookError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (first, rest) = inputs.split_first().ok_or(NotebookError::NoInputs)?;
    let first = Notebook::from_path(first)?;
    let rest = rest
        .iter()
        .map(Notebook::from_path)
        .collect::<Result<Vec<_>, _>>()?;

    let merged = merge_notebooks(first, rest);
    merged.to_path(output.as_ref())?;

    tracing::info!(
        parts = inputs.len(),
        cells = merged.cells.len(),
        output = %output.as_ref().display(),
        "merged notebook sections"
    );
    Ok(merged.cells.len())
}

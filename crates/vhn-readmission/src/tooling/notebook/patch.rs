use super::{Notebook, NotebookError};
use std::path::Path;

/// Rewrites the first line at or after an `anchor` line that contains
/// `needle` but not `guard`. The guard keeps reruns from patching twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchoredFix {
    pub anchor: String,
    pub needle: String,
    pub replacement: String,
    pub guard: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotebookPatch {
    /// In every source line containing `matching`, replace all `find` with `replace`.
    Replace {
        matching: String,
        find: String,
        replace: String,
    },
    Anchored(AnchoredFix),
}

impl NotebookPatch {
    pub fn replace(find: impl Into<String>, replace: impl Into<String>) -> Self {
        let find = find.into();
        Self::Replace {
            matching: find.clone(),
            find,
            replace: replace.into(),
        }
    }

    /// Points the mapping load at the reformatted reference file.
    pub fn formatted_mapping_path() -> Self {
        Self::Replace {
            matching: "pd.read_csv('data_files/IDs_mapping.csv')".to_string(),
            find: "data_files/IDs_mapping.csv".to_string(),
            replace: "data_files/IDs_mapping_formatted.csv".to_string(),
        }
    }

    /// Inserts `.unstack()` before the risk-order reindex of the grouped
    /// readmission table.
    pub fn risk_table_unstack() -> Self {
        Self::Anchored(AnchoredFix {
            anchor: "risk_readmit_analysis = df.groupby".to_string(),
            needle: ").reindex(risk_order)".to_string(),
            replacement: ").unstack().reindex(risk_order)".to_string(),
            guard: ".unstack()".to_string(),
        })
    }

    /// Applies the patch and returns how many lines were rewritten.
    pub fn apply(&self, notebook: &mut Notebook) -> usize {
        match self {
            NotebookPatch::Replace {
                matching,
                find,
                replace,
            } => notebook.replace_in_sources(matching, find, replace),
            NotebookPatch::Anchored(fix) => notebook.apply_anchored_fix(fix),
        }
    }
}

impl Notebook {
    pub fn replace_in_sources(&mut self, matching: &str, find: &str, replace: &str) -> usize {
        let mut rewritten = 0;
        for lines in self.source_lines_mut() {
            for line in lines.iter_mut() {
                if line.contains(matching) && line.contains(find) {
                    *line = line.replace(find, replace);
                    rewritten += 1;
                }
            }
        }
        rewritten
    }

    pub fn apply_anchored_fix(&mut self, fix: &AnchoredFix) -> usize {
        let mut rewritten = 0;
        for lines in self.source_lines_mut() {
            for anchor_at in 0..lines.len() {
                if !lines[anchor_at].contains(&fix.anchor) {
                    continue;
                }
                if let Some(target) = lines[anchor_at..]
                    .iter_mut()
                    .find(|line| line.contains(&fix.needle) && !line.contains(&fix.guard))
                {
                    *target = target.replace(&fix.needle, &fix.replacement);
                    rewritten += 1;
                }
            }
        }
        rewritten
    }
}

/// Reads the notebook at `path`, applies `patch` and rewrites the file in place.
pub fn patch_file<P: AsRef<Path>>(path: P, patch: &NotebookPatch) -> Result<usize, NotebookError> {
    let path = path.as_ref();
    let mut notebook = Notebook::from_path(path)?;
    let rewritten = patch.apply(&mut notebook);
    notebook.to_path(path)?;

    tracing::info!(path = %path.display(), rewritten, "patched notebook");
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::notebook_json;
    use super::*;
    use std::io::Cursor;

    fn notebook(sources: &[&[&str]]) -> Notebook {
        Notebook::from_reader(Cursor::new(notebook_json(sources))).expect("fixture parses")
    }

    #[test]
    fn replace_rewrites_every_matching_line() {
        let mut nb = notebook(&[
            &["ids = pd.read_csv('data_files/IDs_mapping.csv')\n", "ids.head()\n"],
            &["# data_files/IDs_mapping.csv is block formatted\n"],
            &["again = pd.read_csv('data_files/IDs_mapping.csv')"],
        ]);

        let rewritten = NotebookPatch::formatted_mapping_path().apply(&mut nb);

        assert_eq!(rewritten, 2);
        let first = nb.cells[0].source.as_ref().expect("source");
        assert_eq!(
            first[0],
            "ids = pd.read_csv('data_files/IDs_mapping_formatted.csv')\n"
        );
        let comment = nb.cells[1].source.as_ref().expect("source");
        assert_eq!(comment[0], "# data_files/IDs_mapping.csv is block formatted\n");
    }

    #[test]
    fn plain_replace_matches_on_find_text() {
        let mut nb = notebook(&[&["a = 1\n", "b = a + a\n"]]);
        assert_eq!(NotebookPatch::replace("a", "x").apply(&mut nb), 2);
        assert_eq!(
            nb.cells[0].source.as_ref().expect("source")[1],
            "b = x + x\n"
        );
    }

    #[test]
    fn anchored_fix_patches_line_after_anchor_once() {
        let mut nb = notebook(&[&[
            "other = df.reindex(risk_order)\n",
            "risk_readmit_analysis = df.groupby('VCI_Risk_Category')['readmitted'].apply(\n",
            "    lambda x: x.value_counts(normalize=True)\n",
            ").reindex(risk_order)\n",
        ]]);
        let patch = NotebookPatch::risk_table_unstack();

        assert_eq!(patch.apply(&mut nb), 1);
        let lines = nb.cells[0].source.as_ref().expect("source");
        assert_eq!(lines[3], ").unstack().reindex(risk_order)\n");
        assert_eq!(lines[0], "other = df.reindex(risk_order)\n");

        assert_eq!(patch.apply(&mut nb), 0, "guard prevents a second rewrite");
    }

    #[test]
    fn patch_file_rewrites_in_place() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("analysis.ipynb");
        std::fs::write(
            &path,
            notebook_json(&[&["ids = pd.read_csv('data_files/IDs_mapping.csv')"]]),
        )
        .expect("fixture written");

        let rewritten =
            patch_file(&path, &NotebookPatch::formatted_mapping_path()).expect("patch applies");
        assert_eq!(rewritten, 1);

        let reloaded = Notebook::from_path(&path).expect("reload");
        assert_eq!(
            reloaded.cells[0].source.as_ref().expect("source")[0],
            "ids = pd.read_csv('data_files/IDs_mapping_formatted.csv')"
        );
        assert_eq!(reloaded.extra["nbformat_minor"], 5);
    }

    #[test]
    fn patch_file_reports_invalid_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.ipynb");
        std::fs::write(&path, "{ not json").expect("fixture written");

        let error = patch_file(&path, &NotebookPatch::replace("a", "b")).expect_err("invalid");
        assert!(matches!(error, NotebookError::Json(_)));
    }
}

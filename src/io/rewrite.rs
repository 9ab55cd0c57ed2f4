//! Applying edits to source text and collecting rewritten units.

use std::path::{Path, PathBuf};

use crate::core::errors::{Result, SymshrinkError};
use crate::rename::Edit;

/// Apply `edits` to `source`, returning the rewritten text.
///
/// Edits may arrive in any order. Identical duplicates are collapsed, since
/// one token can be reported by more than one traversal path. Edits that
/// fall outside the buffer, split a UTF-8 sequence, or overlap a different
/// edit are rejected and nothing is rewritten.
pub fn apply_edits(file: &Path, source: &str, edits: &[Edit]) -> Result<String> {
    let mut ordered: Vec<&Edit> = edits.iter().collect();
    ordered.sort_by(|a, b| {
        a.span
            .cmp(&b.span)
            .then_with(|| a.replacement.cmp(&b.replacement))
    });
    ordered.dedup_by(|next, prev| next.span == prev.span && next.replacement == prev.replacement);

    let fail = |message: String| SymshrinkError::rewrite(file.display().to_string(), message);

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0usize;

    for edit in ordered {
        let start = edit.span.offset;
        let end = match edit.span.checked_end() {
            Some(end) => end,
            None => {
                return Err(fail(format!(
                    "edit at {} with length {} is outside the {}-byte source",
                    start,
                    edit.span.len,
                    source.len()
                )))
            }
        };

        if end > source.len() {
            return Err(fail(format!(
                "edit {}..{} is outside the {}-byte source",
                start,
                end,
                source.len()
            )));
        }
        if !source.is_char_boundary(start) || !source.is_char_boundary(end) {
            return Err(fail(format!(
                "edit {start}..{end} does not fall on character boundaries"
            )));
        }
        if start < cursor {
            return Err(fail(format!(
                "edit {start}..{end} overlaps a preceding edit ending at {cursor}"
            )));
        }
        if !edit.original.is_empty() && &source[start..end] != edit.original {
            return Err(fail(format!(
                "expected {:?} at {}..{}, found {:?}",
                edit.original,
                start,
                end,
                &source[start..end]
            )));
        }

        output.push_str(&source[cursor..start]);
        output.push_str(&edit.replacement);
        cursor = end;
    }

    output.push_str(&source[cursor..]);
    Ok(output)
}

/// Banner written before each unit in a combined output file
pub fn banner(file: &Path) -> String {
    format!("// ======== {} ========\n", file.display())
}

/// Rewritten units gathered into one document.
#[derive(Debug, Clone, Default)]
pub struct CombinedOutput {
    units: Vec<(PathBuf, String)>,
}

impl CombinedOutput {
    /// Empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rewritten unit
    pub fn push(&mut self, file: impl Into<PathBuf>, content: impl Into<String>) {
        self.units.push((file.into(), content.into()));
    }

    /// Number of collected units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Units in file order, so the document does not depend on scheduling
    pub fn render(&self) -> String {
        let mut units: Vec<&(PathBuf, String)> = self.units.iter().collect();
        units.sort_by(|a, b| a.0.cmp(&b.0));

        let mut document = String::new();
        for (file, content) in units {
            document.push_str(&banner(file));
            document.push_str(content);
            document.push_str("\n\n");
        }
        document
    }

    /// Write the rendered document atomically
    pub fn write_to(&self, path: &Path) -> Result<()> {
        crate::io::persistence::write_atomic(path, &self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rename::Span;

    fn edit(offset: usize, len: usize, replacement: &str) -> Edit {
        Edit::new(Span::new(offset, len), replacement)
    }

    #[test]
    fn test_apply_edits_out_of_order() {
        let source = "int myFunction() { return myVariable; }";
        let edits = vec![edit(26, 10, "b"), edit(4, 10, "a")];

        let rewritten = apply_edits(Path::new("main.cpp"), source, &edits).unwrap();
        assert_eq!(rewritten, "int a() { return b; }");
    }

    #[test]
    fn test_duplicate_edits_collapse() {
        let source = "foo + foo";
        let edits = vec![edit(0, 3, "a"), edit(0, 3, "a"), edit(6, 3, "a")];
        assert_eq!(
            apply_edits(Path::new("x.cpp"), source, &edits).unwrap(),
            "a + a"
        );
    }

    #[test]
    fn test_conflicting_edits_are_rejected() {
        let source = "foobar";
        let err = apply_edits(
            Path::new("x.cpp"),
            source,
            &[edit(0, 3, "a"), edit(0, 3, "b")],
        )
        .unwrap_err();
        assert!(matches!(err, SymshrinkError::Rewrite { .. }));

        assert!(apply_edits(Path::new("x.cpp"), source, &[edit(0, 4, "a"), edit(2, 3, "b")]).is_err());
    }

    #[test]
    fn test_out_of_bounds_and_boundaries() {
        assert!(apply_edits(Path::new("x.cpp"), "abc", &[edit(2, 5, "z")]).is_err());
        // "é" is two bytes; offset 1 splits it.
        assert!(apply_edits(Path::new("x.cpp"), "é x", &[edit(1, 1, "z")]).is_err());
    }

    #[test]
    fn test_overflowing_span_is_rejected() {
        let err = apply_edits(Path::new("x.cpp"), "abc", &[edit(usize::MAX, 2, "a")]).unwrap_err();
        assert!(matches!(err, SymshrinkError::Rewrite { .. }));
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn test_original_text_is_checked() {
        let mut stale = edit(0, 3, "a");
        stale.original = "bar".to_string();
        let err = apply_edits(Path::new("x.cpp"), "foo", &[stale]).unwrap_err();
        assert!(err.to_string().contains("x.cpp"));
    }

    #[test]
    fn test_no_edits_returns_source() {
        assert_eq!(apply_edits(Path::new("x.cpp"), "unchanged", &[]).unwrap(), "unchanged");
    }

    #[test]
    fn test_combined_output_format() {
        let mut combined = CombinedOutput::new();
        combined.push("src/b.cpp", "int b;");
        combined.push("src/a.cpp", "int a;");

        assert_eq!(
            combined.render(),
            "// ======== src/a.cpp ========\nint a;\n\n// ======== src/b.cpp ========\nint b;\n\n"
        );
        assert_eq!(combined.len(), 2);
    }
}

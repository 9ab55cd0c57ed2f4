//! File plumbing for the persisted mapping.
//!
//! Mapping files are small JSON objects that are read once at the start of a
//! run and written once at the end. Writes go to a temporary sibling first
//! and are renamed into place, so an interrupted run never leaves a
//! truncated mapping behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::core::errors::{Result, SymshrinkError};

/// Suffix of the sibling file holding the macro table.
pub const MACRO_TABLE_SUFFIX: &str = "macros.json";

/// Read a file that is allowed to be absent.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SymshrinkError::io(
            format!("Failed to read mapping file: {}", path.display()),
            e,
        )),
    }
}

/// Write `content` to `path` atomically.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            SymshrinkError::io(
                format!("Failed to create directory: {}", parent.display()),
                e,
            )
        })?;
    }

    let temp_path = temp_path_for(path);
    fs::write(&temp_path, content).map_err(|e| {
        SymshrinkError::io(
            format!("Failed to write file: {}", temp_path.display()),
            e,
        )
    })?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        SymshrinkError::io(format!("Failed to rename file: {}", path.display()), e)
    })
}

/// Location of the macro table that accompanies an identifier mapping file.
///
/// `out/names.json` pairs with `out/names.macros.json`.
pub fn macro_table_path(identifier_path: &Path) -> PathBuf {
    let stem = identifier_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mapping".to_string());
    identifier_path.with_file_name(format!("{stem}.{MACRO_TABLE_SUFFIX}"))
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

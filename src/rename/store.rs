//! Dual-namespace mapping store with JSON persistence.
//!
//! The store keeps one injective `qualified name -> short name` table per
//! [`Namespace`] plus the allocator cursor shared by both tables. Loading a
//! persisted table never fails on individual entries: bad entries are
//! reported and skipped, and the cursor is moved past the highest rank that
//! was accepted so new names never collide with persisted ones.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::Namespace;
use crate::core::errors::{Result, SymshrinkResultExt};
use crate::io::persistence::{read_optional, write_atomic};
use crate::naming::{decode_name, is_short_name, KeywordGuard, NameCursor, PreservationPolicy};

/// One namespace's table.
#[derive(Debug, Clone, Default)]
struct MappingTable {
    forward: HashMap<String, String>,
    reverse: HashMap<String, String>,
}

impl MappingTable {
    fn get(&self, qualified_name: &str) -> Option<&str> {
        self.forward.get(qualified_name).map(String::as_str)
    }

    fn insert(&mut self, qualified_name: String, short_name: String) {
        debug_assert!(
            !self.forward.contains_key(&qualified_name),
            "qualified name inserted twice: {qualified_name}"
        );
        debug_assert!(
            !self.reverse.contains_key(&short_name),
            "short name assigned twice: {short_name}"
        );
        self.reverse.insert(short_name.clone(), qualified_name.clone());
        self.forward.insert(qualified_name, short_name);
    }

    fn is_claimed(&self, short_name: &str) -> bool {
        self.reverse.contains_key(short_name)
    }

    fn holder_of(&self, short_name: &str) -> Option<&str> {
        self.reverse.get(short_name).map(String::as_str)
    }

    fn sorted(&self) -> BTreeMap<String, String> {
        self.forward
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Why a persisted entry was skipped during load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// The value is not a JSON string
    NotAString,
    /// The value is empty or contains characters outside `a..=z`
    InvalidShortName,
    /// The value decodes to a rank the allocator cannot continue from
    OutOfRange,
    /// The value is a reserved word
    Reserved,
    /// The key is protected by the preservation policy
    Preserved,
    /// Another key already owns the value
    DuplicateShortName {
        /// Key that claimed the value first
        holder: String,
    },
    /// The key is already mapped to a different value
    Conflicting {
        /// Value already in the table
        existing: String,
    },
}

/// A persisted entry that was not loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedEntry {
    /// Qualified name as written in the file
    pub key: String,
    /// Raw value as written in the file
    pub value: String,
    /// Why it was skipped
    #[serde(flatten)]
    pub reason: RejectReason,
}

/// Outcome of loading one table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    /// File the table was read from, if any
    pub source: Option<PathBuf>,
    /// The file did not exist
    pub missing: bool,
    /// The document was not a JSON object; nothing was loaded
    pub malformed: bool,
    /// Entries added to the table
    pub accepted: usize,
    /// Entries skipped, with reasons
    pub rejected: Vec<RejectedEntry>,
    /// Allocator cursor after the load
    pub next_index: u64,
}

/// Options for [`MappingStore::save_table`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Write the file even when the table is empty
    pub allow_empty: bool,
}

/// Outcome of saving one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// The table was written
    Written {
        /// Number of entries written
        entries: usize,
    },
    /// The table was empty and nothing was written
    SkippedEmpty,
}

impl SaveOutcome {
    /// Outcome of saving two tables together
    pub fn combine(self, other: SaveOutcome) -> SaveOutcome {
        match (self, other) {
            (Self::Written { entries: a }, Self::Written { entries: b }) => {
                Self::Written { entries: a + b }
            }
            (written @ Self::Written { .. }, Self::SkippedEmpty)
            | (Self::SkippedEmpty, written @ Self::Written { .. }) => written,
            (Self::SkippedEmpty, Self::SkippedEmpty) => Self::SkippedEmpty,
        }
    }
}

/// Both mapping tables plus the allocator cursor.
#[derive(Debug, Clone, Default)]
pub struct MappingStore {
    identifiers: MappingTable,
    macros: MappingTable,
    cursor: NameCursor,
}

impl MappingStore {
    /// Empty store with the cursor at index 0
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, namespace: Namespace) -> &MappingTable {
        match namespace {
            Namespace::Identifier => &self.identifiers,
            Namespace::Macro => &self.macros,
        }
    }

    fn table_mut(&mut self, namespace: Namespace) -> &mut MappingTable {
        match namespace {
            Namespace::Identifier => &mut self.identifiers,
            Namespace::Macro => &mut self.macros,
        }
    }

    /// Short name already assigned to `qualified_name`.
    pub fn lookup(&self, namespace: Namespace, qualified_name: &str) -> Option<&str> {
        self.table(namespace).get(qualified_name)
    }

    /// Record a new mapping.
    ///
    /// Callers must check [`lookup`](Self::lookup) first; inserting a name
    /// twice, or reusing a short name within a namespace, is a logic error.
    pub fn insert(
        &mut self,
        namespace: Namespace,
        qualified_name: impl Into<String>,
        short_name: impl Into<String>,
    ) {
        self.table_mut(namespace)
            .insert(qualified_name.into(), short_name.into());
    }

    /// Whether `short_name` is already assigned in `namespace`
    pub fn is_claimed(&self, namespace: Namespace, short_name: &str) -> bool {
        self.table(namespace).is_claimed(short_name)
    }

    /// Whether `namespace` holds at least one mapping
    pub fn has_entries(&self, namespace: Namespace) -> bool {
        !self.table(namespace).forward.is_empty()
    }

    /// Number of mappings in `namespace`
    pub fn len(&self, namespace: Namespace) -> usize {
        self.table(namespace).forward.len()
    }

    /// Whether both tables are empty
    pub fn is_empty(&self) -> bool {
        Namespace::ALL.iter().all(|ns| !self.has_entries(*ns))
    }

    /// Sorted copy of one table
    pub fn snapshot(&self, namespace: Namespace) -> BTreeMap<String, String> {
        self.table(namespace).sorted()
    }

    /// Allocator cursor shared by both namespaces
    pub fn cursor(&self) -> NameCursor {
        self.cursor
    }

    /// Mutable access to the allocator cursor
    pub fn cursor_mut(&mut self) -> &mut NameCursor {
        &mut self.cursor
    }

    /// Load one table from `path`. An absent file loads nothing.
    pub fn load_table(
        &mut self,
        namespace: Namespace,
        path: &Path,
        keywords: &KeywordGuard,
        policy: &PreservationPolicy,
    ) -> Result<LoadReport> {
        let Some(content) = read_optional(path)? else {
            debug!("No {} mapping at {}", namespace, path.display());
            return Ok(LoadReport {
                source: Some(path.to_path_buf()),
                missing: true,
                next_index: self.cursor.peek(),
                ..LoadReport::default()
            });
        };

        let mut report = self.load_str(namespace, &content, keywords, policy);
        report.source = Some(path.to_path_buf());
        info!(
            "Loaded {} {} mappings from {} ({} rejected, next index {})",
            report.accepted,
            namespace,
            path.display(),
            report.rejected.len(),
            report.next_index
        );
        Ok(report)
    }

    /// Load one table from an in-memory JSON document.
    pub fn load_str(
        &mut self,
        namespace: Namespace,
        content: &str,
        keywords: &KeywordGuard,
        policy: &PreservationPolicy,
    ) -> LoadReport {
        let mut report = LoadReport::default();

        let entries = match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(entries)) => entries,
            Ok(other) => {
                warn!(
                    "Ignoring {} mapping: expected a JSON object, found {}",
                    namespace,
                    json_kind(&other)
                );
                report.malformed = true;
                report.next_index = self.cursor.peek();
                return report;
            }
            Err(e) => {
                warn!("Ignoring {} mapping: failed to parse JSON: {}", namespace, e);
                report.malformed = true;
                report.next_index = self.cursor.peek();
                return report;
            }
        };

        for (key, value) in entries {
            match self.admit_entry(namespace, &key, &value, keywords, policy) {
                Ok(Some(rank)) => {
                    self.cursor.observe(rank);
                    report.accepted += 1;
                }
                Ok(None) => {}
                Err(reason) => {
                    let value = value
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| value.to_string());
                    warn!(
                        "Skipping {} mapping {:?} -> {:?}: {:?}",
                        namespace, key, value, reason
                    );
                    report.rejected.push(RejectedEntry { key, value, reason });
                }
            }
        }

        report.next_index = self.cursor.peek();
        report
    }

    /// Validate and insert one persisted entry, returning its rank.
    ///
    /// `Ok(None)` means the entry was already present with the same value.
    fn admit_entry(
        &mut self,
        namespace: Namespace,
        key: &str,
        value: &Value,
        keywords: &KeywordGuard,
        policy: &PreservationPolicy,
    ) -> std::result::Result<Option<u64>, RejectReason> {
        let short_name = value.as_str().ok_or(RejectReason::NotAString)?;

        if !is_short_name(short_name) {
            return Err(RejectReason::InvalidShortName);
        }
        let rank = decode_name(short_name)
            .filter(|rank| *rank < u64::MAX)
            .ok_or(RejectReason::OutOfRange)?;
        if keywords.is_reserved(short_name) {
            return Err(RejectReason::Reserved);
        }
        if policy.must_preserve(key) {
            return Err(RejectReason::Preserved);
        }

        let table = self.table_mut(namespace);
        if let Some(existing) = table.get(key) {
            if existing == short_name {
                return Ok(None);
            }
            return Err(RejectReason::Conflicting {
                existing: existing.to_string(),
            });
        }
        if let Some(holder) = table.holder_of(short_name) {
            return Err(RejectReason::DuplicateShortName {
                holder: holder.to_string(),
            });
        }

        table.insert(key.to_string(), short_name.to_string());
        Ok(Some(rank))
    }

    /// Serialize one table as a pretty, key-sorted JSON object.
    pub fn to_json(&self, namespace: Namespace) -> Result<String> {
        serde_json::to_string_pretty(&self.snapshot(namespace)).map_json_err("mapping table")
    }

    /// Persist one table to `path`.
    ///
    /// An empty table is not written unless `options.allow_empty` is set, so
    /// a run that renamed nothing cannot wipe an existing mapping.
    pub fn save_table(
        &self,
        namespace: Namespace,
        path: &Path,
        options: SaveOptions,
    ) -> Result<SaveOutcome> {
        let entries = self.len(namespace);
        if entries == 0 && !options.allow_empty {
            debug!(
                "Not writing empty {} mapping to {}",
                namespace,
                path.display()
            );
            return Ok(SaveOutcome::SkippedEmpty);
        }

        let content = self.to_json(namespace)?;
        write_atomic(path, &content)?;
        info!(
            "Saved {} {} mappings to {}",
            entries,
            namespace,
            path.display()
        );
        Ok(SaveOutcome::Written { entries })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn load(store: &mut MappingStore, content: &str) -> LoadReport {
        store.load_str(
            Namespace::Identifier,
            content,
            &KeywordGuard::new(),
            &PreservationPolicy::default(),
        )
    }

    #[test]
    fn test_lookup_and_insert() {
        let mut store = MappingStore::new();
        assert_eq!(store.lookup(Namespace::Identifier, "foo"), None);

        store.insert(Namespace::Identifier, "foo", "a");
        assert_eq!(store.lookup(Namespace::Identifier, "foo"), Some("a"));
        assert_eq!(store.lookup(Namespace::Macro, "foo"), None);
        assert!(store.is_claimed(Namespace::Identifier, "a"));
        assert!(!store.is_claimed(Namespace::Macro, "a"));
        assert!(store.has_entries(Namespace::Identifier));
        assert!(!store.has_entries(Namespace::Macro));
    }

    #[test]
    fn test_load_sets_cursor_past_max_rank() {
        let mut store = MappingStore::new();
        let report = load(&mut store, r#"{"myFunction": "a", "myVariable": "zz", "other": "c"}"#);

        assert_eq!(report.accepted, 3);
        assert!(report.rejected.is_empty());
        assert_eq!(report.next_index, 702);
        assert_eq!(store.cursor().peek(), 702);
        assert_eq!(store.lookup(Namespace::Identifier, "myVariable"), Some("zz"));
    }

    #[test]
    fn test_load_skips_invalid_entries() {
        let mut store = MappingStore::new();
        let report = load(
            &mut store,
            r#"{
                "good": "b",
                "upper": "Ab",
                "digits": "a1",
                "empty": "",
                "number": 7,
                "keyword": "do",
                "std::vector": "q",
                "int": "r"
            }"#,
        );

        assert_eq!(report.accepted, 1);
        assert_eq!(report.rejected.len(), 7);
        assert_eq!(store.cursor().peek(), 2);

        let reason_for = |key: &str| {
            report
                .rejected
                .iter()
                .find(|r| r.key == key)
                .map(|r| r.reason.clone())
                .unwrap()
        };
        assert_eq!(reason_for("upper"), RejectReason::InvalidShortName);
        assert_eq!(reason_for("digits"), RejectReason::InvalidShortName);
        assert_eq!(reason_for("empty"), RejectReason::InvalidShortName);
        assert_eq!(reason_for("number"), RejectReason::NotAString);
        assert_eq!(reason_for("keyword"), RejectReason::Reserved);
        assert_eq!(reason_for("std::vector"), RejectReason::Preserved);
        assert_eq!(reason_for("int"), RejectReason::Preserved);
    }

    #[test]
    fn test_load_rejects_duplicate_short_names() {
        let mut store = MappingStore::new();
        let report = load(&mut store, r#"{"alpha": "k", "beta": "k"}"#);

        assert_eq!(report.accepted, 1);
        assert_eq!(
            report.rejected[0].reason,
            RejectReason::DuplicateShortName {
                holder: "alpha".to_string()
            }
        );
        assert_eq!(store.lookup(Namespace::Identifier, "beta"), None);
    }

    #[test]
    fn test_load_malformed_document_loads_nothing() {
        let mut store = MappingStore::new();
        let report = load(&mut store, "{ not json");
        assert!(report.malformed);
        assert_eq!(report.accepted, 0);
        assert!(store.is_empty());

        let report = load(&mut store, r#"["a", "b"]"#);
        assert!(report.malformed);
        assert_eq!(store.cursor().peek(), 0);
    }

    #[test]
    fn test_reload_same_entries_is_idempotent() {
        let mut store = MappingStore::new();
        load(&mut store, r#"{"foo": "a"}"#);
        let report = load(&mut store, r#"{"foo": "a", "bar": "b"}"#);
        assert_eq!(report.accepted, 1);
        assert!(report.rejected.is_empty());

        let report = load(&mut store, r#"{"foo": "c"}"#);
        assert_eq!(
            report.rejected[0].reason,
            RejectReason::Conflicting {
                existing: "a".to_string()
            }
        );
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("names.json");

        let mut store = MappingStore::new();
        store.insert(Namespace::Identifier, "myFunction", "a");
        store.insert(Namespace::Identifier, "myVariable", "b");
        store.insert(Namespace::Macro, "MAX", "c");

        let outcome = store
            .save_table(Namespace::Identifier, &path, SaveOptions::default())
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Written { entries: 2 });

        let mut reloaded = MappingStore::new();
        let report = reloaded
            .load_table(
                Namespace::Identifier,
                &path,
                &KeywordGuard::new(),
                &PreservationPolicy::default(),
            )
            .unwrap();

        assert_eq!(report.accepted, 2);
        assert_eq!(
            reloaded.snapshot(Namespace::Identifier),
            store.snapshot(Namespace::Identifier)
        );
        assert!(!reloaded.has_entries(Namespace::Macro));
        assert_eq!(reloaded.cursor().peek(), 2);
    }

    #[test]
    fn test_save_empty_table_is_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("names.json");
        std::fs::write(&path, r#"{"keep": "a"}"#).unwrap();

        let store = MappingStore::new();
        let outcome = store
            .save_table(Namespace::Identifier, &path, SaveOptions::default())
            .unwrap();

        assert_eq!(outcome, SaveOutcome::SkippedEmpty);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"keep": "a"}"#);

        let outcome = store
            .save_table(
                Namespace::Identifier,
                &path,
                SaveOptions { allow_empty: true },
            )
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Written { entries: 0 });
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_save_outcomes_combine() {
        let written = |entries| SaveOutcome::Written { entries };
        assert_eq!(written(2).combine(written(3)), written(5));
        assert_eq!(written(2).combine(SaveOutcome::SkippedEmpty), written(2));
        assert_eq!(SaveOutcome::SkippedEmpty.combine(written(1)), written(1));
        assert_eq!(
            SaveOutcome::SkippedEmpty.combine(SaveOutcome::SkippedEmpty),
            SaveOutcome::SkippedEmpty
        );
    }

    #[test]
    fn test_load_missing_file_is_not_an_error() {
        let dir = tempdir().unwrap();
        let mut store = MappingStore::new();
        let report = store
            .load_table(
                Namespace::Identifier,
                &dir.path().join("absent.json"),
                &KeywordGuard::new(),
                &PreservationPolicy::default(),
            )
            .unwrap();

        assert!(report.missing);
        assert_eq!(report.accepted, 0);
    }

    #[test]
    fn test_to_json_is_sorted() {
        let mut store = MappingStore::new();
        store.insert(Namespace::Identifier, "zeta", "a");
        store.insert(Namespace::Identifier, "alpha", "b");

        let json = store.to_json(Namespace::Identifier).unwrap();
        assert!(json.find("alpha").unwrap() < json.find("zeta").unwrap());
    }
}

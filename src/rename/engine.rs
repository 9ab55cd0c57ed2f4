//! Thread-safe short-name resolution.
//!
//! [`RenameEngine`] owns the mapping store and funnels every mutation through
//! one critical section. Sessions running on different threads share the
//! engine behind an `Arc`; the check-allocate-insert sequence in
//! [`RenameEngine::resolve_detailed`] runs under a single lock covering both
//! namespaces, so two callers can never be handed the same short name.

use std::collections::BTreeMap;
use std::path::Path;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::store::{LoadReport, MappingStore, SaveOptions, SaveOutcome};
use super::Namespace;
use crate::core::config::RenameConfig;
use crate::core::errors::Result;
use crate::io::persistence::macro_table_path;
use crate::naming::{KeywordGuard, PreservationPolicy};

/// How a resolved name was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOrigin {
    /// The name is protected and was returned unchanged
    Preserved,
    /// The name was already mapped
    Existing,
    /// A new short name was allocated
    Allocated,
}

/// Result of [`RenameEngine::resolve_detailed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Name to use in place of the original
    pub name: String,
    /// How `name` was obtained
    pub origin: ResolutionOrigin,
}

/// Counters describing the engine's work so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// New short names handed out
    pub allocated: u64,
    /// Resolutions answered from the store
    pub reused: u64,
    /// Resolutions of preserved names
    pub preserved: u64,
    /// Allocator candidates skipped because they were reserved
    pub keywords_skipped: u64,
}

#[derive(Debug, Default)]
struct EngineState {
    store: MappingStore,
    stats: EngineStats,
}

/// Shared rename state: mapping tables, allocator cursor and policies.
#[derive(Debug)]
pub struct RenameEngine {
    state: Mutex<EngineState>,
    keywords: KeywordGuard,
    policy: PreservationPolicy,
    persist_macros: bool,
}

impl Default for RenameEngine {
    fn default() -> Self {
        Self::new(KeywordGuard::new(), PreservationPolicy::default())
    }
}

impl RenameEngine {
    /// Engine with an empty store
    pub fn new(keywords: KeywordGuard, policy: PreservationPolicy) -> Self {
        Self {
            state: Mutex::new(EngineState::default()),
            keywords,
            policy,
            persist_macros: false,
        }
    }

    /// Engine configured from a [`RenameConfig`]
    pub fn from_config(config: &RenameConfig) -> Self {
        let mut engine = Self::new(config.keyword_guard(), config.preservation_policy());
        engine.persist_macros = config.persist_macros;
        engine
    }

    /// Start from an existing store instead of an empty one
    pub fn with_store(mut self, store: MappingStore) -> Self {
        self.state.get_mut().store = store;
        self
    }

    /// Also load and save the macro table
    pub fn with_macro_persistence(mut self, enabled: bool) -> Self {
        self.persist_macros = enabled;
        self
    }

    /// Short name for `qualified_name`, allocating one if needed.
    ///
    /// Preserved names come back unchanged, as does any new name once the
    /// cursor is exhausted. Never fails.
    pub fn resolve(&self, namespace: Namespace, qualified_name: &str) -> String {
        self.resolve_detailed(namespace, qualified_name).name
    }

    /// Like [`resolve`](Self::resolve), also reporting how the name was found.
    pub fn resolve_detailed(&self, namespace: Namespace, qualified_name: &str) -> Resolved {
        if self.policy.must_preserve(qualified_name) {
            self.state.lock().stats.preserved += 1;
            return Resolved {
                name: qualified_name.to_string(),
                origin: ResolutionOrigin::Preserved,
            };
        }

        let mut state = self.state.lock();

        if let Some(existing) = state.store.lookup(namespace, qualified_name) {
            let name = existing.to_string();
            state.stats.reused += 1;
            return Resolved {
                name,
                origin: ResolutionOrigin::Existing,
            };
        }

        let name = loop {
            let Some(candidate) = state.store.cursor_mut().next_name() else {
                warn!(
                    "Short names exhausted; leaving {} {:?} unchanged",
                    namespace, qualified_name
                );
                return Resolved {
                    name: qualified_name.to_string(),
                    origin: ResolutionOrigin::Preserved,
                };
            };
            if self.keywords.is_reserved(&candidate) {
                debug!("Skipping reserved candidate {:?}", candidate);
                state.stats.keywords_skipped += 1;
                continue;
            }
            if state.store.is_claimed(namespace, &candidate) {
                continue;
            }
            break candidate;
        };

        state
            .store
            .insert(namespace, qualified_name.to_string(), name.clone());
        state.stats.allocated += 1;
        debug!("Allocated {} {:?} => {:?}", namespace, qualified_name, name);

        Resolved {
            name,
            origin: ResolutionOrigin::Allocated,
        }
    }

    /// Existing short name for `qualified_name`, without allocating.
    pub fn lookup(&self, namespace: Namespace, qualified_name: &str) -> Option<String> {
        self.state
            .lock()
            .store
            .lookup(namespace, qualified_name)
            .map(str::to_string)
    }

    /// Whether `qualified_name` is protected from renaming
    pub fn is_preserved(&self, qualified_name: &str) -> bool {
        self.policy.must_preserve(qualified_name)
    }

    /// Whether `namespace` holds at least one mapping
    pub fn has_entries(&self, namespace: Namespace) -> bool {
        self.state.lock().store.has_entries(namespace)
    }

    /// Index the allocator will try next
    pub fn next_index(&self) -> u64 {
        self.state.lock().store.cursor().peek()
    }

    /// Counters accumulated since construction
    pub fn stats(&self) -> EngineStats {
        self.state.lock().stats
    }

    /// Sorted copy of one table
    pub fn snapshot(&self, namespace: Namespace) -> BTreeMap<String, String> {
        self.state.lock().store.snapshot(namespace)
    }

    /// Copy of the whole store
    pub fn store(&self) -> MappingStore {
        self.state.lock().store.clone()
    }

    /// Load the persisted mapping at `path`.
    ///
    /// Reads the identifier table and, when macro persistence is enabled,
    /// the sibling macro table. Missing files load nothing.
    pub fn load(&self, path: &Path) -> Result<Vec<LoadReport>> {
        let mut state = self.state.lock();
        let mut reports = vec![state.store.load_table(
            Namespace::Identifier,
            path,
            &self.keywords,
            &self.policy,
        )?];

        if self.persist_macros {
            reports.push(state.store.load_table(
                Namespace::Macro,
                &macro_table_path(path),
                &self.keywords,
                &self.policy,
            )?);
        }

        Ok(reports)
    }

    /// Persist the mapping to `path`.
    ///
    /// Each table is written only when it holds entries. The macro table goes
    /// to its sibling file when macro persistence is enabled. The outcome is
    /// `Written` with the total entry count if any table was written.
    pub fn save(&self, path: &Path) -> Result<SaveOutcome> {
        let state = self.state.lock();
        let mut outcome = state
            .store
            .save_table(Namespace::Identifier, path, SaveOptions::default())?;

        if self.persist_macros {
            let macros = state.store.save_table(
                Namespace::Macro,
                &macro_table_path(path),
                SaveOptions::default(),
            )?;
            outcome = outcome.combine(macros);
        }

        if outcome == SaveOutcome::SkippedEmpty {
            info!("No mappings to save; leaving {} untouched", path.display());
        }
        Ok(outcome)
    }
}

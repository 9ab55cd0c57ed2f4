//! Occurrence eligibility and per-session deduplication.
//!
//! The filter answers two questions for every record the front end emits:
//! may this occurrence be rewritten at all, and has this exact declaration
//! already been handled in the current traversal. Its state is scoped to a
//! single session and discarded afterwards.

use std::fmt;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use super::occurrence::{DeclId, OccurrenceKind, OccurrenceRecord, SourceFlags};

/// Why an occurrence was left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The front end could not attribute a location
    InvalidLocation,
    /// Comes from a unit other than the one being rewritten
    OutsideMainFile,
    /// Comes from a system header
    SystemHeader,
    /// Synthesized by the compiler
    Implicit,
    /// The same declaration was already handled in this session
    AlreadyProcessed,
    /// The name is protected by the preservation policy
    Preserved,
    /// A reference or expansion with no mapping yet
    NoMapping,
    /// The occurrence has no spelled name to replace
    Unnamed,
}

impl SkipReason {
    /// Lowercase label used in logs and reports
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidLocation => "invalid location",
            Self::OutsideMainFile => "outside main file",
            Self::SystemHeader => "system header",
            Self::Implicit => "implicit",
            Self::AlreadyProcessed => "already processed",
            Self::Preserved => "preserved",
            Self::NoMapping => "no mapping",
            Self::Unnamed => "unnamed",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Hand the occurrence to the engine
    Admit,
    /// Leave the occurrence unchanged
    Reject(SkipReason),
}

impl Admission {
    /// Whether the occurrence was admitted
    pub fn is_admitted(self) -> bool {
        matches!(self, Self::Admit)
    }
}

/// Lifecycle of a macro name within a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroState {
    /// No definition or expansion seen yet
    #[default]
    Unseen,
    /// The defining occurrence was admitted
    Defined,
    /// At least one expansion followed the definition
    Expanded,
}

/// Declaration identity: the front end's node id, or the name position
/// when the front end does not supply one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DeclKey {
    Node(DeclId),
    Site(String, usize),
}

/// Per-session admit/reject gate.
#[derive(Debug, Default)]
pub struct OccurrenceFilter {
    processed_decls: AHashSet<DeclKey>,
    processed_macro_sites: AHashSet<(String, usize)>,
    macro_states: AHashMap<String, MacroState>,
}

impl OccurrenceFilter {
    /// Fresh filter for a new session
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a subtree rooted at a node with these flags is worth visiting.
    ///
    /// A valid location outside the main unit or inside a system header
    /// prunes the subtree. An invalid location is descended, since the
    /// translation-unit root itself has no location.
    pub fn should_traverse(flags: &SourceFlags) -> bool {
        flags.invalid_location || (flags.in_main_file && !flags.in_system_header)
    }

    /// Provenance check shared by every occurrence kind.
    pub fn check(record: &OccurrenceRecord) -> Result<(), SkipReason> {
        let flags = &record.flags;
        if flags.invalid_location {
            return Err(SkipReason::InvalidLocation);
        }
        if flags.in_system_header {
            return Err(SkipReason::SystemHeader);
        }
        if !flags.in_main_file {
            return Err(SkipReason::OutsideMainFile);
        }
        if flags.implicit {
            return Err(SkipReason::Implicit);
        }
        Ok(())
    }

    /// Whether `record` may be rewritten, ignoring deduplication.
    pub fn is_eligible(record: &OccurrenceRecord) -> bool {
        Self::check(record).is_ok()
    }

    /// Decide on `record` and remember it.
    ///
    /// Declarations are admitted once per identity. References and macro
    /// expansions are never deduplicated: each one is a separate span.
    pub fn admit(&mut self, record: &OccurrenceRecord) -> Admission {
        if let Err(reason) = Self::check(record) {
            return Admission::Reject(reason);
        }

        match record.kind {
            OccurrenceKind::Declaration => {
                let key = match record.decl_id {
                    Some(id) => DeclKey::Node(id),
                    None => DeclKey::Site(record.qualified_name.clone(), record.span.offset),
                };
                if !self.processed_decls.insert(key) {
                    return Admission::Reject(SkipReason::AlreadyProcessed);
                }
            }
            OccurrenceKind::MacroDefinition => {
                let site = (record.qualified_name.clone(), record.span.offset);
                if !self.processed_macro_sites.insert(site) {
                    return Admission::Reject(SkipReason::AlreadyProcessed);
                }
                self.macro_states
                    .insert(record.qualified_name.clone(), MacroState::Defined);
            }
            OccurrenceKind::MacroExpansion => {
                if let Some(state) = self.macro_states.get_mut(&record.qualified_name) {
                    *state = MacroState::Expanded;
                }
            }
            OccurrenceKind::Reference => {}
        }

        Admission::Admit
    }

    /// Where `name` stands in this session's macro lifecycle
    pub fn macro_state(&self, name: &str) -> MacroState {
        self.macro_states.get(name).copied().unwrap_or_default()
    }

    /// Number of distinct declarations admitted so far
    pub fn processed_declarations(&self) -> usize {
        self.processed_decls.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rename::occurrence::Span;

    #[test]
    fn test_eligibility_flags() {
        let base = OccurrenceRecord::declaration(DeclId(1), "foo", "foo", 0);
        assert!(OccurrenceFilter::is_eligible(&base));

        let cases = [
            (SourceFlags::main_file().invalid(), SkipReason::InvalidLocation),
            (SourceFlags::included(), SkipReason::OutsideMainFile),
            (SourceFlags::system_header(), SkipReason::SystemHeader),
            (SourceFlags::main_file().implicit(), SkipReason::Implicit),
        ];
        for (flags, reason) in cases {
            let record = base.clone().with_flags(flags);
            assert_eq!(OccurrenceFilter::check(&record), Err(reason));
        }
    }

    #[test]
    fn test_main_file_system_header_is_rejected() {
        let mut flags = SourceFlags::main_file();
        flags.in_system_header = true;
        let record = OccurrenceRecord::reference("foo", "foo", 3).with_flags(flags);
        assert_eq!(OccurrenceFilter::check(&record), Err(SkipReason::SystemHeader));
    }

    #[test]
    fn test_declarations_are_deduplicated_by_identity() {
        let mut filter = OccurrenceFilter::new();
        let decl = OccurrenceRecord::declaration(DeclId(7), "Widget", "Widget", 10);

        assert_eq!(filter.admit(&decl), Admission::Admit);
        assert_eq!(
            filter.admit(&decl),
            Admission::Reject(SkipReason::AlreadyProcessed)
        );

        let redeclaration = OccurrenceRecord::declaration(DeclId(8), "Widget", "Widget", 90);
        assert_eq!(filter.admit(&redeclaration), Admission::Admit);
        assert_eq!(filter.processed_declarations(), 2);
    }

    #[test]
    fn test_declarations_without_id_use_site() {
        let mut filter = OccurrenceFilter::new();
        let mut decl = OccurrenceRecord::reference("x", "x", 4);
        decl.kind = OccurrenceKind::Declaration;

        assert!(filter.admit(&decl).is_admitted());
        assert!(!filter.admit(&decl).is_admitted());
        assert!(filter
            .admit(&decl.clone().with_span(Span::new(20, 1)))
            .is_admitted());
    }

    #[test]
    fn test_references_are_never_deduplicated() {
        let mut filter = OccurrenceFilter::new();
        let decl = OccurrenceRecord::declaration(DeclId(1), "counter", "counter", 0);
        let reference = OccurrenceRecord::reference("counter", "counter", 30);

        assert!(filter.admit(&decl).is_admitted());
        assert!(filter.admit(&reference).is_admitted());
        assert!(filter.admit(&reference).is_admitted());
    }

    #[test]
    fn test_ineligible_declaration_is_not_remembered() {
        let mut filter = OccurrenceFilter::new();
        let decl = OccurrenceRecord::declaration(DeclId(3), "helper", "helper", 0);

        let foreign = decl.clone().with_flags(SourceFlags::included());
        assert_eq!(
            filter.admit(&foreign),
            Admission::Reject(SkipReason::OutsideMainFile)
        );
        assert!(filter.admit(&decl).is_admitted());
    }

    #[test]
    fn test_macro_state_machine() {
        let mut filter = OccurrenceFilter::new();
        assert_eq!(filter.macro_state("LIMIT"), MacroState::Unseen);

        let early = OccurrenceRecord::macro_expansion("LIMIT", 0);
        assert!(filter.admit(&early).is_admitted());
        assert_eq!(filter.macro_state("LIMIT"), MacroState::Unseen);

        let definition = OccurrenceRecord::macro_definition("LIMIT", 20);
        assert!(filter.admit(&definition).is_admitted());
        assert_eq!(filter.macro_state("LIMIT"), MacroState::Defined);
        assert_eq!(
            filter.admit(&definition),
            Admission::Reject(SkipReason::AlreadyProcessed)
        );

        for offset in [40, 60] {
            let expansion = OccurrenceRecord::macro_expansion("LIMIT", offset);
            assert!(filter.admit(&expansion).is_admitted());
            assert_eq!(filter.macro_state("LIMIT"), MacroState::Expanded);
        }
    }

    #[test]
    fn test_should_traverse() {
        assert!(OccurrenceFilter::should_traverse(&SourceFlags::main_file()));
        assert!(OccurrenceFilter::should_traverse(&SourceFlags::included().invalid()));
        assert!(!OccurrenceFilter::should_traverse(&SourceFlags::included()));
        assert!(!OccurrenceFilter::should_traverse(&SourceFlags::system_header()));
    }
}

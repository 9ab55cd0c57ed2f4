//! The rename engine and everything that feeds it.
//!
//! ```text
//! front end ──▶ OccurrenceRecord ──▶ OccurrenceFilter ──▶ RenameEngine ──▶ Edit
//!                                      (per session)       (shared)
//! ```
//!
//! One [`RewriteSession`] exists per unit being rewritten; all sessions share
//! a single [`RenameEngine`] so that a symbol receives the same short name in
//! every file of a project.

pub mod engine;
pub mod filter;
pub mod occurrence;
pub mod session;
pub mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use engine::{EngineStats, RenameEngine, ResolutionOrigin, Resolved};
pub use filter::{Admission, MacroState, OccurrenceFilter, SkipReason};
pub use occurrence::{DeclId, OccurrenceKind, OccurrenceRecord, SourceFlags, Span};
pub use session::{Decision, Edit, OccurrenceVisitor, RewriteSession, SessionStats, UnitRewrite};
pub use store::{LoadReport, MappingStore, RejectReason, RejectedEntry, SaveOptions, SaveOutcome};

/// Which mapping table a symbol lives in.
///
/// Macros and ordinary identifiers never share a table, even when their
/// qualified names are the same string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Declarations and references to them
    Identifier,
    /// Preprocessor macro names
    Macro,
}

impl Namespace {
    /// Both namespaces, identifiers first
    pub const ALL: [Namespace; 2] = [Namespace::Identifier, Namespace::Macro];

    /// Lowercase label used in logs and reports
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Macro => "macro",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Per-unit rewrite sessions.
//!
//! A front end walks one translation unit and feeds every occurrence it
//! finds to an [`OccurrenceVisitor`]. [`RewriteSession`] is the visitor used
//! for renaming: it filters occurrences, asks the shared engine for short
//! names and collects the resulting text edits. Sessions for different units
//! run concurrently against the same engine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::engine::{RenameEngine, ResolutionOrigin};
use super::filter::{Admission, OccurrenceFilter, SkipReason};
use super::occurrence::{OccurrenceRecord, SourceFlags, Span};

/// Replacement of one span of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// Bytes to replace
    pub span: Span,
    /// Text written into `span`
    pub replacement: String,
    /// Text expected at `span` before the edit, when known
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub original: String,
}

impl Edit {
    /// Replace `span` with `replacement`
    pub fn new(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
            original: String::new(),
        }
    }
}

/// Outcome of visiting one occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Replace the occurrence's span
    Rewrite(Edit),
    /// Leave the source text alone
    Unchanged(SkipReason),
}

/// Callbacks a front end drives while walking a unit.
pub trait OccurrenceVisitor {
    /// Whether to descend into a node with these flags
    fn should_traverse(&self, flags: &SourceFlags) -> bool {
        OccurrenceFilter::should_traverse(flags)
    }

    /// Handle one occurrence
    fn visit(&mut self, record: &OccurrenceRecord) -> Decision;
}

/// Counters for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Occurrences handed to the session
    pub visited: usize,
    /// Occurrences that produced an edit
    pub rewritten: usize,
    /// Short names allocated on behalf of this unit
    pub allocated: usize,
    /// Unchanged occurrences by reason
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl SessionStats {
    /// Total number of unchanged occurrences
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    /// Add another session's counters to these
    pub fn merge(&mut self, other: &SessionStats) {
        self.visited += other.visited;
        self.rewritten += other.rewritten;
        self.allocated += other.allocated;
        for (reason, count) in &other.skipped {
            *self.skipped.entry(*reason).or_default() += count;
        }
    }
}

/// Everything a session produced for its unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRewrite {
    /// Unit the edits apply to
    pub file: PathBuf,
    /// Edits in visit order
    pub edits: Vec<Edit>,
    /// Session counters
    pub stats: SessionStats,
}

/// Visitor that renames the symbols of one translation unit.
#[derive(Debug)]
pub struct RewriteSession {
    file: PathBuf,
    engine: Arc<RenameEngine>,
    filter: OccurrenceFilter,
    edits: Vec<Edit>,
    stats: SessionStats,
}

impl RewriteSession {
    /// Session for `file` sharing `engine`
    pub fn new(file: impl Into<PathBuf>, engine: Arc<RenameEngine>) -> Self {
        Self {
            file: file.into(),
            engine,
            filter: OccurrenceFilter::new(),
            edits: Vec::new(),
            stats: SessionStats::default(),
        }
    }

    /// Unit being rewritten
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Visit every record in order
    pub fn run<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a OccurrenceRecord>,
    {
        for record in records {
            self.visit(record);
        }
    }

    /// Close the session and hand back its edits
    pub fn finish(self) -> UnitRewrite {
        debug!(
            "Session for {} finished: {} visited, {} rewritten, {} skipped",
            self.file.display(),
            self.stats.visited,
            self.stats.rewritten,
            self.stats.skipped_total()
        );
        UnitRewrite {
            file: self.file,
            edits: self.edits,
            stats: self.stats,
        }
    }

    fn decide(&mut self, record: &OccurrenceRecord) -> Decision {
        if let Admission::Reject(reason) = self.filter.admit(record) {
            return Decision::Unchanged(reason);
        }

        let namespace = record.namespace();
        let name = if record.kind.is_defining() {
            let resolved = self
                .engine
                .resolve_detailed(namespace, &record.qualified_name);
            match resolved.origin {
                ResolutionOrigin::Preserved => {
                    return Decision::Unchanged(SkipReason::Preserved)
                }
                ResolutionOrigin::Allocated => self.stats.allocated += 1,
                ResolutionOrigin::Existing => {}
            }
            resolved.name
        } else {
            if self.engine.is_preserved(&record.qualified_name) {
                return Decision::Unchanged(SkipReason::Preserved);
            }
            match self.engine.lookup(namespace, &record.qualified_name) {
                Some(name) => name,
                None => return Decision::Unchanged(SkipReason::NoMapping),
            }
        };

        // Constructors, operators and anonymous entities still hold a name
        // but have nothing spelled to replace.
        if record.span.is_empty() {
            return Decision::Unchanged(SkipReason::Unnamed);
        }

        Decision::Rewrite(Edit {
            span: record.span,
            replacement: name,
            original: record.spelling.clone(),
        })
    }
}

impl OccurrenceVisitor for RewriteSession {
    fn visit(&mut self, record: &OccurrenceRecord) -> Decision {
        self.stats.visited += 1;
        let decision = self.decide(record);

        match &decision {
            Decision::Rewrite(edit) => {
                trace!(
                    "{}: {:?} at {} => {:?}",
                    self.file.display(),
                    record.qualified_name,
                    edit.span.offset,
                    edit.replacement
                );
                self.stats.rewritten += 1;
                self.edits.push(edit.clone());
            }
            Decision::Unchanged(reason) => {
                *self.stats.skipped.entry(*reason).or_default() += 1;
            }
        }

        decision
    }
}

//! Occurrence records handed over by the front end.
//!
//! The engine never looks at syntax. A front end reports every appearance of
//! a symbol as an [`OccurrenceRecord`]: what kind of appearance it is, the
//! fully qualified name it resolves to, the text span to replace, and where
//! the occurrence comes from.

use serde::{Deserialize, Serialize};

use super::Namespace;

/// Opaque identity of one declaration node within a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub u64);

/// What kind of appearance an occurrence is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceKind {
    /// The declaring occurrence of a named entity
    Declaration,
    /// A use of an already declared entity
    Reference,
    /// The name token of a `#define`
    MacroDefinition,
    /// A use of a macro name
    MacroExpansion,
}

impl OccurrenceKind {
    /// Mapping table this kind of occurrence resolves against
    pub fn namespace(self) -> Namespace {
        match self {
            Self::Declaration | Self::Reference => Namespace::Identifier,
            Self::MacroDefinition | Self::MacroExpansion => Namespace::Macro,
        }
    }

    /// Defining occurrences may allocate; the others only look names up.
    pub fn is_defining(self) -> bool {
        matches!(self, Self::Declaration | Self::MacroDefinition)
    }
}

/// Byte range in the unit's source buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the first replaced byte
    pub offset: usize,
    /// Number of bytes replaced
    pub len: usize,
}

impl Span {
    /// Span covering `len` bytes from `offset`
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// One past the last replaced byte, or `None` if that overflows
    pub fn checked_end(&self) -> Option<usize> {
        self.offset.checked_add(self.len)
    }

    /// One past the last replaced byte, saturating at `usize::MAX`
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.len)
    }

    /// Whether the span covers no text
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether two spans share at least one byte
    pub fn overlaps(&self, other: &Span) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }
}

/// Provenance of an occurrence as classified by the front end.
///
/// For references, `implicit` and `invalid_location` describe the referenced
/// declaration: a use of a compiler-synthesized entity is not rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFlags {
    /// Written in the unit currently being rewritten
    pub in_main_file: bool,
    /// Comes from a system header
    pub in_system_header: bool,
    /// Synthesized by the compiler rather than written by the user
    pub implicit: bool,
    /// The front end could not attribute a location
    pub invalid_location: bool,
}

impl SourceFlags {
    /// A user-written occurrence in the main unit
    pub fn main_file() -> Self {
        Self {
            in_main_file: true,
            ..Self::default()
        }
    }

    /// An occurrence that lives in an included user header
    pub fn included() -> Self {
        Self::default()
    }

    /// An occurrence inside a system header
    pub fn system_header() -> Self {
        Self {
            in_system_header: true,
            ..Self::default()
        }
    }

    /// Same flags, marked as compiler-synthesized
    pub fn implicit(mut self) -> Self {
        self.implicit = true;
        self
    }

    /// Same flags, with no attributable location
    pub fn invalid(mut self) -> Self {
        self.invalid_location = true;
        self
    }
}

/// One appearance of a symbol in the unit being rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceRecord {
    /// Declaration, reference, macro definition or macro expansion
    pub kind: OccurrenceKind,
    /// Identity of the declaration node, for declaration dedup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decl_id: Option<DeclId>,
    /// Fully qualified name; bare name for macros
    pub qualified_name: String,
    /// Text currently at `span`
    #[serde(default)]
    pub spelling: String,
    /// Text range the replacement name is written into
    pub span: Span,
    /// Source classification
    #[serde(default)]
    pub flags: SourceFlags,
}

impl OccurrenceRecord {
    fn build(
        kind: OccurrenceKind,
        qualified_name: impl Into<String>,
        spelling: impl Into<String>,
        offset: usize,
    ) -> Self {
        let spelling = spelling.into();
        Self {
            kind,
            decl_id: None,
            qualified_name: qualified_name.into(),
            span: Span::new(offset, spelling.len()),
            spelling,
            flags: SourceFlags::main_file(),
        }
    }

    /// Declaration of `qualified_name`, spelled `spelling` at `offset`
    pub fn declaration(
        decl_id: DeclId,
        qualified_name: impl Into<String>,
        spelling: impl Into<String>,
        offset: usize,
    ) -> Self {
        let mut record = Self::build(OccurrenceKind::Declaration, qualified_name, spelling, offset);
        record.decl_id = Some(decl_id);
        record
    }

    /// Reference to `qualified_name`, spelled `spelling` at `offset`
    pub fn reference(
        qualified_name: impl Into<String>,
        spelling: impl Into<String>,
        offset: usize,
    ) -> Self {
        Self::build(OccurrenceKind::Reference, qualified_name, spelling, offset)
    }

    /// `#define name` with the name token at `offset`
    pub fn macro_definition(name: impl Into<String>, offset: usize) -> Self {
        let name = name.into();
        Self::build(OccurrenceKind::MacroDefinition, name.clone(), name, offset)
    }

    /// Expansion of macro `name` at `offset`
    pub fn macro_expansion(name: impl Into<String>, offset: usize) -> Self {
        let name = name.into();
        Self::build(OccurrenceKind::MacroExpansion, name.clone(), name, offset)
    }

    /// Replace the provenance flags
    pub fn with_flags(mut self, flags: SourceFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Replace the span, e.g. for declarations without a spelled name
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Mapping table the record resolves against
    pub fn namespace(&self) -> Namespace {
        self.kind.namespace()
    }
}

//! # Symshrink-RS: Deterministic Symbol Minification for C/C++
//!
//! Replaces user-defined identifiers and macro names in C/C++ translation
//! units with the shortest available names (`a`, `b`, ..., `z`, `aa`, ...),
//! keeping the mapping stable across files and across runs.
//!
//! - **Naming**: bijective base-26 name enumeration, reserved-word guard and
//!   preservation policy for names that must never change
//! - **Rename Engine**: thread-safe, injective mapping from qualified names to
//!   short names, persisted as JSON between runs
//! - **Rewrite Sessions**: per-unit occurrence filtering and edit collection
//! - **Project Driver**: parallel multi-unit runs with in-place or combined output
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 API Layer (ProjectRenamer)               │
//! ├──────────────────────────────────────────────────────────┤
//! │  Rename            │  Naming          │  I/O             │
//! │                    │                  │                  │
//! │ • RenameEngine     │ • Allocator      │ • Persistence    │
//! │ • MappingStore     │ • Keywords       │ • Rewrite        │
//! │ • RewriteSession   │ • Preservation   │                  │
//! │ • OccurrenceFilter │                  │                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The C/C++ front end is external: it walks each unit and reports every
//! declaration, reference, macro definition and macro expansion as an
//! [`OccurrenceRecord`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use symshrink_rs::{ProjectRenamer, RenameConfig, TranslationUnit};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RenameConfig::default().with_mapping_file("names.json");
//!     let renamer = ProjectRenamer::new(config)?;
//!
//!     let unit = TranslationUnit::from_json_file(Path::new("main.occurrences.json"))?;
//!     let report = renamer.run(&[unit])?;
//!
//!     println!("{} occurrences renamed", report.occurrences.rewritten);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "mimalloc")]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

// Configuration and error plumbing
pub mod core {
    //! Configuration and error types shared by every layer.

    pub mod config;
    pub mod errors;
}

// Short-name generation and naming policy
pub mod naming;

// Mapping store, engine and rewrite sessions
pub mod rename;

// Persistence and text rewriting
pub mod io {
    //! File persistence and source text rewriting.

    pub mod persistence;
    pub mod rewrite;
}

// Public API and project driver
pub mod api {
    //! High-level multi-unit driver.

    pub mod project;
}

// Re-export primary types for convenience
pub use api::project::{MappingStatus, ProjectRenamer, ProjectReport, TranslationUnit};
pub use core::config::RenameConfig;
pub use core::errors::{Result, SymshrinkError, SymshrinkResultExt};
pub use naming::{decode_name, generate_name, KeywordGuard, NameCursor, PreservationPolicy};
pub use rename::{
    Decision, Edit, MappingStore, Namespace, OccurrenceKind, OccurrenceRecord, OccurrenceVisitor,
    RenameEngine, RewriteSession, UnitRewrite,
};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build-time feature detection
pub mod features {
    //! Runtime feature detection.

    /// Check if units are rewritten on a worker pool
    pub const fn has_parallel() -> bool {
        cfg!(feature = "parallel")
    }
}

//! Short-name generation and the policies that constrain it.
//!
//! - [`allocator`]: bijective base-26 enumeration and its cursor
//! - [`keywords`]: reserved words skipped during allocation
//! - [`preserve`]: names that are never renamed

pub mod allocator;
pub mod keywords;
pub mod preserve;

pub use allocator::{decode_name, generate_name, is_short_name, NameCursor};
pub use keywords::KeywordGuard;
pub use preserve::{PreservationPolicy, DEFAULT_FOREIGN_PREFIXES, DEFAULT_PRESERVED_NAMES};

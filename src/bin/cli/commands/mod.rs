//! Command execution.
//!
//! - config: printing and validating configuration files
//! - mapping: inspecting mapping files and the name enumeration
//! - rename: running a project rename

pub mod config;
pub mod mapping;
pub mod rename;

pub use config::{load_configuration, print_default_config, validate_config};
pub use mapping::{name_command, rank_command, show_mapping_command};
pub use rename::rename_command;

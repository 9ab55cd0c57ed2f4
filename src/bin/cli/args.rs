//! CLI Argument Structures
//!
//! All argument definitions and subcommands of the `symshrink` binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Deterministic symbol minification for C/C++ sources
#[derive(Parser)]
#[command(name = "symshrink")]
#[command(version = VERSION)]
#[command(about = "Symshrink - deterministic, persistent symbol minification for C/C++")]
#[command(long_about = "
Rename user-defined identifiers and macros to the shortest available names,
keeping the mapping stable across files and across runs.

The C/C++ front end writes one occurrence dump per translation unit; symshrink
assigns names, rewrites the sources and persists the mapping.

Common Usage:

  # Rename two units, reusing and extending names.json
  symshrink rename --mapping names.json --write main.json util.json

  # Collect the rewritten units into one file instead
  symshrink rename --mapping names.json --combined-output all.cpp *.json

  # Inspect a mapping file
  symshrink show-mapping names.json

  # Which short name has index 701, and which index is 'if'?
  symshrink name 701
  symshrink rank if
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rename symbols in the units described by occurrence dumps
    Rename(Box<RenameArgs>),

    /// Print the short name at an allocation index
    Name(NameArgs),

    /// Print the allocation index of a short name
    Rank(RankArgs),

    /// Load a mapping file and list its entries
    #[command(name = "show-mapping")]
    ShowMapping(ShowMappingArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Validate a symshrink configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Machine-readable JSON
    Json,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Occurrence dumps, one per translation unit
    #[arg(required = true)]
    pub dumps: Vec<PathBuf>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Mapping file to load before and save after the run
    #[arg(short, long, env = "SYMSHRINK_MAPPING")]
    pub mapping: Option<PathBuf>,

    /// Rewrite source files in place
    #[arg(short, long)]
    pub write: bool,

    /// Write all rewritten units into a single file
    #[arg(long)]
    pub combined_output: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Also persist the macro table next to the mapping file
    #[arg(long)]
    pub persist_macros: bool,

    /// Additional names that must never be renamed
    #[arg(long = "preserve", value_name = "NAME")]
    pub preserve: Vec<String>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Args)]
pub struct NameArgs {
    /// Zero-based allocation index
    pub index: u64,
}

#[derive(Args)]
pub struct RankArgs {
    /// Short name made of lowercase ASCII letters
    pub name: String,
}

#[derive(Args)]
pub struct ShowMappingArgs {
    /// Mapping file to inspect
    pub mapping: PathBuf,

    /// Configuration whose reserved and preserved names apply while loading
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Also load the sibling macro table
    #[arg(long)]
    pub macros: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Configuration file to validate
    pub config: PathBuf,
}

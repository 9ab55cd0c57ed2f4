//! Symshrink CLI - deterministic symbol minification for C/C++ sources
//!
//! Runs the rename engine over occurrence dumps produced by the C/C++ front
//! end and offers a few commands for inspecting mappings and configuration.

use clap::Parser;

mod cli;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Rename(args) => {
            cli::rename_command(*args)?;
        }
        Commands::Name(args) => {
            cli::name_command(args)?;
        }
        Commands::Rank(args) => {
            cli::rank_command(args)?;
        }
        Commands::ShowMapping(args) => {
            cli::show_mapping_command(args)?;
        }
        Commands::PrintDefaultConfig => {
            cli::print_default_config()?;
        }
        Commands::ValidateConfig(args) => {
            cli::validate_config(args)?;
        }
    }

    Ok(())
}

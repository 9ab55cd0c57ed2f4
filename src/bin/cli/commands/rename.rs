//! The `rename` command.

use anyhow::Context;
use owo_colors::OwoColorize;
use tracing::{debug, info};

use crate::cli::args::{OutputFormat, RenameArgs};
use crate::cli::commands::config::load_configuration;
use crate::cli::output::{display_report, unit_progress};
use symshrink_rs::{ProjectRenamer, RenameConfig, TranslationUnit};

/// Rename symbols in the units described by occurrence dumps
pub fn rename_command(args: RenameArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;
    let renamer = ProjectRenamer::new(config)?;

    let mut units = Vec::with_capacity(args.dumps.len());
    for dump in &args.dumps {
        let unit = TranslationUnit::from_json_file(dump)
            .with_context(|| format!("Failed to load occurrence dump: {}", dump.display()))?;
        debug!(
            "Loaded {} occurrences for {}",
            unit.occurrences.len(),
            unit.file.display()
        );
        units.push(unit);
    }

    let hide_progress = args.no_progress || args.format == OutputFormat::Json;
    let pb = unit_progress(units.len(), hide_progress)?;
    let report = renamer.run_with_progress(&units, |_| pb.inc(1))?;
    pb.finish_and_clear();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => display_report(&report),
    }

    if !report.is_success() {
        return Err(anyhow::anyhow!(
            "{} unit(s) could not be rewritten",
            report.failures.len()
        ));
    }

    if args.format == OutputFormat::Text {
        println!("{}", "✅ Rename complete".bright_green().bold());
    }
    info!("Rename finished for {} units", report.units);
    Ok(())
}

/// Configuration file (or defaults) with command-line overrides applied
fn build_config(args: &RenameArgs) -> anyhow::Result<RenameConfig> {
    let mut config = load_configuration(args.config.as_deref())?;

    if let Some(mapping) = &args.mapping {
        config.mapping_file = Some(mapping.clone());
    }
    if args.write {
        config.write_in_place = true;
    }
    if let Some(path) = &args.combined_output {
        config.combined_output = Some(path.clone());
    }
    if let Some(jobs) = args.jobs {
        config.workers = Some(jobs);
    }
    if args.persist_macros {
        config.persist_macros = true;
    }
    config.preserved_names.extend(args.preserve.iter().cloned());

    Ok(config)
}

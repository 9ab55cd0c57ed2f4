//! Mapping inspection and name-enumeration commands.

use owo_colors::OwoColorize;
use serde_json::json;

use crate::cli::args::{NameArgs, OutputFormat, RankArgs, ShowMappingArgs};
use crate::cli::commands::config::load_configuration;
use crate::cli::output::{display_load_reports, display_mapping};
use symshrink_rs::rename::Namespace;
use symshrink_rs::{decode_name, generate_name, RenameEngine};

/// Print the short name at an allocation index
pub fn name_command(args: NameArgs) -> anyhow::Result<()> {
    println!("{}", generate_name(args.index));
    Ok(())
}

/// Print the allocation index of a short name
pub fn rank_command(args: RankArgs) -> anyhow::Result<()> {
    match decode_name(&args.name) {
        Some(rank) => {
            println!("{rank}");
            Ok(())
        }
        None => Err(anyhow::anyhow!(
            "'{}' is not a short name (expected lowercase ASCII letters)",
            args.name
        )),
    }
}

/// Load a mapping file and list its entries
pub fn show_mapping_command(args: ShowMappingArgs) -> anyhow::Result<()> {
    let config = load_configuration(args.config.as_deref())?;
    config.validate()?;

    let engine = RenameEngine::from_config(&config).with_macro_persistence(args.macros);
    let reports = engine.load(&args.mapping)?;

    if reports.first().is_some_and(|r| r.missing) {
        return Err(anyhow::anyhow!(
            "Mapping file not found: {}",
            args.mapping.display()
        ));
    }

    let namespaces: &[Namespace] = if args.macros {
        &Namespace::ALL
    } else {
        &[Namespace::Identifier]
    };

    match args.format {
        OutputFormat::Json => {
            let mut tables = serde_json::Map::new();
            for namespace in namespaces {
                tables.insert(namespace.to_string(), json!(engine.snapshot(*namespace)));
            }
            let output = json!({
                "tables": tables,
                "next_index": engine.next_index(),
                "loads": reports,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            display_load_reports(&reports);
            println!();
            for namespace in namespaces {
                let entries: Vec<(String, String)> =
                    engine.snapshot(*namespace).into_iter().collect();
                let title = match namespace {
                    Namespace::Identifier => "🔤 Identifiers",
                    Namespace::Macro => "🔣 Macros",
                };
                display_mapping(title, &entries);
            }
            println!(
                "{} {}",
                "Next name:".dimmed(),
                generate_name(engine.next_index()).cyan()
            );
        }
    }

    Ok(())
}

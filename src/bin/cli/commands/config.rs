//! Configuration management commands.

use std::path::Path;

use anyhow::Context;
use owo_colors::OwoColorize;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use crate::cli::args::ValidateConfigArgs;
use symshrink_rs::RenameConfig;

/// Load configuration from a YAML file, or defaults when none is given
pub fn load_configuration(path: Option<&Path>) -> anyhow::Result<RenameConfig> {
    let config = match path {
        Some(path) => RenameConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => RenameConfig::default(),
    };
    Ok(config)
}

/// Print default configuration in YAML format
pub fn print_default_config() -> anyhow::Result<()> {
    println!("{}", "# Default symshrink configuration".dimmed());
    println!(
        "{}",
        "# Save this to a file and customize as needed".dimmed()
    );
    println!(
        "{}",
        "# Usage: symshrink rename --config your-config.yml <dumps>".dimmed()
    );
    println!();

    let yaml_output = serde_yaml::to_string(&RenameConfig::default())?;
    println!("{}", yaml_output);

    Ok(())
}

/// Validate a symshrink configuration file
pub fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    println!(
        "{} {}",
        "🔍 Validating configuration:".bright_blue().bold(),
        args.config.display().to_string().cyan()
    );
    println!();

    let config = match load_configuration(Some(args.config.as_path()))
        .and_then(|config| config.validate().map(|()| config).map_err(Into::into))
    {
        Ok(config) => {
            println!(
                "{}",
                "✅ Configuration file is valid!".bright_green().bold()
            );
            println!();
            config
        }
        Err(e) => {
            eprintln!("{} {:#}", "❌ Configuration validation failed:".red(), e);
            println!();
            println!(
                "{}",
                "💡 Tip: Use 'symshrink print-default-config' to see valid format".dimmed()
            );
            return Err(anyhow::anyhow!("Configuration validation failed: {:#}", e));
        }
    };

    /// Row used when printing the configuration summary.
    #[derive(Tabled)]
    struct DetailRow {
        setting: String,
        value: String,
    }

    let display_path = |path: &Option<std::path::PathBuf>| {
        path.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    let detail_rows = vec![
        DetailRow {
            setting: "Mapping file".to_string(),
            value: display_path(&config.mapping_file),
        },
        DetailRow {
            setting: "Preserved names".to_string(),
            value: config.preserved_names.len().to_string(),
        },
        DetailRow {
            setting: "Foreign prefixes".to_string(),
            value: config.foreign_prefixes.join(", "),
        },
        DetailRow {
            setting: "Extra reserved words".to_string(),
            value: config.extra_reserved.len().to_string(),
        },
        DetailRow {
            setting: "Persist macros".to_string(),
            value: config.persist_macros.to_string(),
        },
        DetailRow {
            setting: "Workers".to_string(),
            value: config
                .workers
                .map(|w| w.to_string())
                .unwrap_or_else(|| "auto".to_string()),
        },
        DetailRow {
            setting: "Write in place".to_string(),
            value: config.write_in_place.to_string(),
        },
        DetailRow {
            setting: "Combined output".to_string(),
            value: display_path(&config.combined_output),
        },
    ];

    let mut table = Table::new(detail_rows);
    table.with(TableStyle::rounded());
    println!("{}", table);

    Ok(())
}

//! Output formatting and progress display.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use symshrink_rs::rename::{LoadReport, RejectReason};
use symshrink_rs::{decode_name, MappingStatus, ProjectReport};

/// Progress bar advanced once per finished unit
pub fn unit_progress(units: usize, hidden: bool) -> anyhow::Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(units as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    pb.set_message("renaming units");
    Ok(pb)
}

/// Row of the mapping listing
#[derive(Tabled)]
struct MappingRow {
    #[tabled(rename = "Qualified Name")]
    qualified_name: String,
    #[tabled(rename = "Short Name")]
    short_name: String,
    #[tabled(rename = "Index")]
    index: String,
}

/// Row of the rejected-entry listing
#[derive(Tabled)]
struct RejectedRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// Print one mapping table sorted by short-name index
pub fn display_mapping(title: &str, entries: &[(String, String)]) {
    println!("{} {}", title.bright_blue().bold(), format!("({})", entries.len()).dimmed());

    if entries.is_empty() {
        println!("   {}", "no entries".dimmed());
        println!();
        return;
    }

    let mut rows: Vec<(Option<u64>, MappingRow)> = entries
        .iter()
        .map(|(key, value)| {
            let rank = decode_name(value);
            (
                rank,
                MappingRow {
                    qualified_name: key.clone(),
                    short_name: value.clone(),
                    index: rank.map(|r| r.to_string()).unwrap_or_default(),
                },
            )
        })
        .collect();
    rows.sort_by_key(|(rank, _)| *rank);

    let mut table = Table::new(rows.into_iter().map(|(_, row)| row));
    table.with(TableStyle::rounded());
    println!("{}", table);
    println!();
}

/// Print load outcomes and any rejected entries
pub fn display_load_reports(reports: &[LoadReport]) {
    for report in reports {
        let source = report
            .source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string());

        if report.missing {
            println!("{} {}", "•".dimmed(), format!("{source}: not found").dimmed());
            continue;
        }
        if report.malformed {
            println!(
                "{} {}",
                "⚠️  Ignored malformed mapping:".yellow().bold(),
                source.cyan()
            );
            continue;
        }

        println!(
            "{} {} {}",
            "✅ Loaded".bright_green().bold(),
            format!("{} entries from", report.accepted).bright_green(),
            source.cyan()
        );

        if !report.rejected.is_empty() {
            println!(
                "{}",
                format!("⚠️  {} entries rejected", report.rejected.len())
                    .yellow()
                    .bold()
            );
            let rows: Vec<RejectedRow> = report
                .rejected
                .iter()
                .map(|entry| RejectedRow {
                    key: entry.key.clone(),
                    value: entry.value.clone(),
                    reason: describe_rejection(&entry.reason),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(TableStyle::rounded());
            println!("{}", table);
        }
    }
}

fn describe_rejection(reason: &RejectReason) -> String {
    match reason {
        RejectReason::NotAString => "value is not a string".to_string(),
        RejectReason::InvalidShortName => "not a lowercase short name".to_string(),
        RejectReason::OutOfRange => "index out of range".to_string(),
        RejectReason::Reserved => "reserved word".to_string(),
        RejectReason::Preserved => "key is a preserved name".to_string(),
        RejectReason::DuplicateShortName { holder } => format!("already held by {holder}"),
        RejectReason::Conflicting { existing } => format!("conflicts with {existing}"),
    }
}

/// Row of the run summary
#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Print the summary of a rename run
pub fn display_report(report: &ProjectReport) {
    println!();
    println!("{}", "📊 Rename Summary".bright_blue().bold());

    let mut rows = vec![
        SummaryRow {
            metric: "Units".to_string(),
            value: report.units.to_string(),
        },
        SummaryRow {
            metric: "Occurrences visited".to_string(),
            value: report.occurrences.visited.to_string(),
        },
        SummaryRow {
            metric: "Occurrences renamed".to_string(),
            value: report.occurrences.rewritten.to_string(),
        },
        SummaryRow {
            metric: "Names allocated".to_string(),
            value: report.engine.allocated.to_string(),
        },
        SummaryRow {
            metric: "Names reused".to_string(),
            value: report.engine.reused.to_string(),
        },
        SummaryRow {
            metric: "Reserved words skipped".to_string(),
            value: report.engine.keywords_skipped.to_string(),
        },
        SummaryRow {
            metric: "Files written".to_string(),
            value: report.files_written.to_string(),
        },
    ];
    for (reason, count) in &report.occurrences.skipped {
        rows.push(SummaryRow {
            metric: format!("Skipped ({reason})"),
            value: count.to_string(),
        });
    }

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{}", table);

    if let Some(path) = &report.combined_output {
        println!(
            "{} {}",
            "📄 Combined output:".bright_blue().bold(),
            path.display().to_string().cyan()
        );
    }

    match &report.mapping {
        MappingStatus::Written { entries } => println!(
            "{} {}",
            "💾 Mapping saved:".bright_green().bold(),
            format!("{entries} identifiers").bright_green()
        ),
        MappingStatus::SkippedEmpty => {
            println!("{}", "💾 Mapping empty; nothing saved".dimmed())
        }
        MappingStatus::NotConfigured => {
            println!("{}", "💾 No mapping file configured".dimmed())
        }
        MappingStatus::Failed { message } => {
            eprintln!("{} {}", "❌ Failed to save mapping:".red().bold(), message)
        }
    }

    for failure in &report.failures {
        eprintln!(
            "{} {}: {}",
            "❌".red(),
            failure.file.display().to_string().cyan(),
            failure.message
        );
    }
}

//! Extract command - pull vouchers out of a single file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use clap::Args;
use console::style;
use tracing::{debug, info};

use voucher_core::catalog::{self, RecordFilter};
use voucher_core::export::{export_file_name, export_records, ExportFormat};
use voucher_core::{VoucherExtractor, VoucherRecord};

use super::{load_config, read_input, ModeArg, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (txt, csv, text or pdf)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file or directory (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Extraction strategy (default: from config)
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Keep records whose username, package or location contains this term
    #[arg(short, long)]
    search: Option<String>,

    /// Keep records with exactly this package label
    #[arg(long)]
    package: Option<String>,

    /// Keep records with exactly this location
    #[arg(long)]
    location: Option<String>,

    /// JSON export of saved vouchers; their usernames are skipped
    #[arg(long)]
    exclude: Option<PathBuf>,

    /// Print extraction counts
    #[arg(long)]
    summary: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    info!("Processing file: {}", args.input.display());
    let text = read_input(&args.input, &config).await?;

    let extractor = VoucherExtractor::from_config(&config);
    let mode = args.mode.map(Into::into).unwrap_or(config.extraction.default_mode);
    let report = extractor.run(&text, mode);

    if report.is_empty() {
        eprintln!(
            "{} No accounts found in {}",
            style("⚠").yellow(),
            args.input.display()
        );
    }

    let found = report.count();
    let selected = select_records(&report.records, &args);

    let (records, skipped) = match &args.exclude {
        Some(path) => catalog::split_duplicates(selected, saved_usernames(path)?),
        None => (selected, Vec::new()),
    };

    let format: ExportFormat = args.format.into();
    let output = export_records(&records, format)?;

    if let Some(output_path) = &args.output {
        let output_path = if output_path.is_dir() {
            output_path.join(export_file_name(format, Utc::now().date_naive()))
        } else {
            output_path.clone()
        };
        fs::write(&output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.summary {
        eprintln!();
        eprintln!(
            "{} Extracted {} accounts ({} mode)",
            style("ℹ").blue(),
            found,
            report.mode
        );
        eprintln!(
            "{} Blocks: {} seen, {} dropped",
            style("ℹ").blue(),
            report.stats.blocks_seen,
            report.stats.blocks_dropped
        );
        if args.exclude.is_some() {
            eprintln!(
                "{} Skipped {} already saved or repeated",
                style("ℹ").blue(),
                skipped.len()
            );
        }
        eprintln!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            start.elapsed().as_millis()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Apply `--search`, `--package` and `--location`.
fn select_records(records: &[VoucherRecord], args: &ExtractArgs) -> Vec<VoucherRecord> {
    let filter = RecordFilter {
        package: args.package.clone(),
        location: args.location.clone(),
        status: None,
    };

    // A blank search term keeps everything
    catalog::search(records, args.search.as_deref().unwrap_or_default())
        .into_iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

/// Usernames of a saved JSON export.
///
/// Any JSON array of objects with a `username` field is accepted.
fn saved_usernames(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    let saved: serde_json::Value = serde_json::from_str(&content)?;

    let Some(items) = saved.as_array() else {
        anyhow::bail!("Saved vouchers file must hold a JSON array: {}", path.display());
    };

    Ok(items
        .iter()
        .filter_map(|item| item.get("username").and_then(|u| u.as_str()))
        .map(str::to_string)
        .collect())
}

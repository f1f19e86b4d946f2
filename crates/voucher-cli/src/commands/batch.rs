//! Batch command - extract vouchers from many files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use voucher_core::catalog::split_duplicates;
use voucher_core::export::{export_records, ExportFormat};
use voucher_core::input::is_allowed_with;
use voucher_core::{ExtractionMode, ExtractionReport, VoucherConfig, VoucherExtractor};

use super::{load_config, read_input, ModeArg, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Extraction strategy (default: from config)
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Drop accounts whose username was already extracted earlier in the batch
    #[arg(long)]
    dedupe: bool,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome of one file.
struct FileResult {
    path: PathBuf,
    report: Option<ExtractionReport>,
    duplicates: usize,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let name = p.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            is_allowed_with(name, &config.input.allowed_extensions)
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let extractor = VoucherExtractor::from_config(&config);
    let mode = args.mode.map(Into::into).unwrap_or(config.extraction.default_mode);
    let format: ExportFormat = args.format.into();

    let mut seen: HashSet<String> = HashSet::new();
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let outcome = extract_file(&path, &extractor, mode, &config).await;
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(mut report) => {
                let mut duplicates = 0;
                if args.dedupe {
                    let (fresh, skipped) = split_duplicates(report.records, seen.iter().cloned());
                    duplicates = skipped.len();
                    report.records = fresh;
                }
                seen.extend(report.records.iter().map(|r| r.username().to_string()));

                if let Some(ref output_dir) = args.output_dir {
                    let output_path = output_path(output_dir, &path, format);
                    fs::write(&output_path, export_records(&report.records, format)?)?;
                    debug!("Wrote output to {}", output_path.display());
                }

                results.push(FileResult {
                    path,
                    report: Some(report),
                    duplicates,
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(FileResult {
                        path,
                        report: None,
                        duplicates: 0,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful: Vec<_> = results.iter().filter(|r| r.report.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let accounts: usize = successful
        .iter()
        .filter_map(|r| r.report.as_ref())
        .map(ExtractionReport::count)
        .sum();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed, {} accounts",
        style(successful.len()).green(),
        style(failed.len()).red(),
        accounts
    );

    let empty: Vec<_> = successful
        .iter()
        .filter(|r| r.report.as_ref().is_some_and(ExtractionReport::is_empty))
        .collect();
    if !empty.is_empty() {
        println!();
        println!("{}", style("No accounts found in:").yellow());
        for result in &empty {
            println!("  - {}", result.path.display());
        }
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn extract_file(
    path: &Path,
    extractor: &VoucherExtractor,
    mode: ExtractionMode,
    config: &VoucherConfig,
) -> anyhow::Result<ExtractionReport> {
    let text = read_input(path, config).await?;
    Ok(extractor.run(&text, mode))
}

/// `<output_dir>/<input stem>.<ext>`
fn output_path(output_dir: &Path, input: &Path, format: ExportFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("vouchers");
    output_dir.join(format!("{}.{}", stem, format.extension()))
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "mode",
        "accounts",
        "blocks_seen",
        "blocks_dropped",
        "duplicates",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        match &result.report {
            Some(report) => wtr.write_record([
                filename,
                "success",
                report.mode.as_str(),
                &report.count().to_string(),
                &report.stats.blocks_seen.to_string(),
                &report.stats.blocks_dropped.to_string(),
                &result.duplicates.to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?,
            None => wtr.write_record([
                filename,
                "failed",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?,
        }
    }

    wtr.flush()?;
    Ok(())
}

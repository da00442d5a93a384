//! Convert command - consolidate NFe XML files into one table.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use nfe_core::invoice::DocumentExtractor;
use nfe_core::output::OutputFormat;
use nfe_core::{
    BatchOutcome, BatchProcessor, CorpusScanner, NfeError, ProgressObserver, ScanError,
    SinkError,
};

use super::load_config;

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// XML files to convert; when given, --input is ignored
    files: Vec<PathBuf>,

    /// Folder containing .xml files, searched recursively (default: ./NFs)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (default: ./Invoices.xlsx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from the output extension, else xlsx)
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum Format {
    /// Excel workbook
    Xlsx,
    /// CSV file
    Csv,
    /// JSON array
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Xlsx => OutputFormat::Xlsx,
            Format::Csv => OutputFormat::Csv,
            Format::Json => OutputFormat::Json,
        }
    }
}

/// Progress bar fed from the batch worker thread.
struct BarObserver {
    pb: ProgressBar,
}

impl ProgressObserver for BarObserver {
    fn on_item(&self, current: usize, total: usize, label: &str) {
        self.pb.set_length(total as u64);
        self.pb.set_position(current.saturating_sub(1) as u64);
        self.pb.set_message(label.to_string());
    }

    fn on_finish(&self, outcome: &BatchOutcome) {
        self.pb.set_position(outcome.total_candidates as u64);
        self.pb.finish_and_clear();
    }
}

pub async fn run(args: ConvertArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let scanner = CorpusScanner::from_config(&config.scan);

    let candidates = if args.files.is_empty() {
        let input_dir = args.input.unwrap_or_else(|| config.scan.input_dir.clone());
        let files = scanner.scan_directory(&input_dir).map_err(NfeError::from)?;
        if files.is_empty() {
            return Err(NfeError::from(ScanError::NoCandidates {
                dir: input_dir,
                extension: config.scan.extension,
            })
            .into());
        }
        files
    } else {
        if args.input.is_some() {
            debug!("Explicit files given, ignoring --input");
        }
        scanner.scan_files(args.files)
    };

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        candidates.len()
    );

    let destination = args.output.unwrap_or_else(|| config.output.path.clone());
    let format = args
        .format
        .map(OutputFormat::from)
        .or_else(|| OutputFormat::from_path(&destination))
        .unwrap_or_default();
    ensure_parent_dir(&destination)?;

    let pb = if args.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(candidates.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let cancel = Arc::new(AtomicBool::new(false));
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping after the current file");
                cancel.store(true, Ordering::Relaxed);
            }
        })
    };

    let processor = BatchProcessor::new(DocumentExtractor::new().with_config(config.extraction))
        .with_cancellation(cancel);
    let writer = format.writer(&config.output);
    let observer = BarObserver { pb };
    let target = destination.clone();

    let result = tokio::task::spawn_blocking(move || {
        nfe_core::run(&processor, &candidates, &observer, writer.as_ref(), &target)
    })
    .await?;
    ctrl_c.abort();

    let summary = result?;

    info!("Conversion finished in {:?}", start.elapsed());
    println!(
        "{} {} generated: {}",
        style("✓").green(),
        format,
        fs::canonicalize(&summary.destination)
            .unwrap_or_else(|_| summary.destination.clone())
            .display()
    );
    println!(
        "   Records: {} | Files with error/ignored: {}",
        style(summary.total_valid_records).green(),
        style(summary.failed_file_names.len()).red()
    );

    if !summary.failed_file_names.is_empty() {
        println!();
        println!("{}", style("Files with error/ignored:").red());
        for name in &summary.failed_file_names {
            println!("  - {}", name);
        }
    }

    Ok(())
}

fn ensure_parent_dir(destination: &Path) -> Result<(), NfeError> {
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            debug!("Creating output folder {}", parent.display());
            fs::create_dir_all(parent).map_err(|e| NfeError::Sink(SinkError::Io(e)))
        }
        _ => Ok(()),
    }
}

/// Process exit code for a failed command.
pub fn exit_code(err: &anyhow::Error) -> ExitCode {
    ExitCode::from(exit_status(err))
}

/// `1` input problems, `2` nothing to write, `3` output failure, `130`
/// interrupted.
fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<NfeError>() {
        Some(NfeError::EmptyBatch { .. }) => 2,
        Some(NfeError::Sink(_)) => 3,
        Some(NfeError::Cancelled { .. }) => 130,
        _ => 1,
    }
}

/// Extra guidance for errors that have a known fix.
pub fn remediation(err: &anyhow::Error) -> Option<&'static str> {
    match err.downcast_ref::<NfeError>() {
        Some(NfeError::Sink(sink)) if sink.is_missing_capability() => Some(
            "rebuild with `--features xlsx`, or pass `--format csv` / `--format json`",
        ),
        Some(NfeError::EmptyBatch { .. }) => Some("no valid records produced, nothing was saved"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink(err: SinkError) -> anyhow::Error {
        NfeError::Sink(err).into()
    }

    #[test]
    fn test_exit_status() {
        let no_dir = NfeError::from(ScanError::NotADirectory(PathBuf::from("NFs")));
        let no_files = NfeError::from(ScanError::NoCandidates {
            dir: PathBuf::from("NFs"),
            extension: "xml".to_string(),
        });

        assert_eq!(exit_status(&no_dir.into()), 1);
        assert_eq!(exit_status(&no_files.into()), 1);
        assert_eq!(exit_status(&NfeError::EmptyBatch { failed: 3 }.into()), 2);
        assert_eq!(exit_status(&sink(SinkError::Io(std::io::Error::other("disk full")))), 3);
        assert_eq!(
            exit_status(&NfeError::Cancelled { processed: 1, total: 4 }.into()),
            130
        );
        assert_eq!(exit_status(&anyhow::anyhow!("bad config")), 1);
    }

    #[test]
    fn test_remediation() {
        let missing = sink(SinkError::MissingCapability {
            format: "xlsx",
            feature: "xlsx",
        });
        assert!(remediation(&missing).is_some_and(|hint| hint.contains("--features xlsx")));
        assert_eq!(exit_status(&missing), 3);

        assert!(remediation(&NfeError::EmptyBatch { failed: 0 }.into()).is_some());
        assert_eq!(
            remediation(&NfeError::Cancelled { processed: 0, total: 2 }.into()),
            None
        );
    }
}

//! valsplit - Hold out the newest documents of each category for validation.
//!
//! Usage:
//!   valsplit --base CORPUS               Move the newest 20% of each category
//!   valsplit --base CORPUS --dry-run     Show the plan without moving anything
//!   valsplit --restore MANIFEST          Move everything in a manifest back
//!   valsplit --help                      Show help

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use itertools::Itertools;
use tracing_subscriber::EnvFilter;

use valsplit_core::{
    DEFAULT_EXTENSIONS, DEFAULT_MANIFEST_NAME, DEFAULT_PROPORTION, DEFAULT_VALIDATION_DIR,
};
use valsplit_ops::{Partitioner, RestoreEngine, RestoreReport, RunReport, SplitConfig};

#[derive(Parser)]
#[command(
    name = "valsplit",
    version,
    about = "Move the newest documents of each category into a validation folder",
    long_about = "valsplit carves a categorized corpus (one directory per category) into \
                  training and validation partitions.\n\n\
                  Documents are ranked by the number at the start of their file name \
                  (highest first), falling back to modification time. The newest share \
                  of each category is moved to <base>/<val-folder>/<category>/, and every \
                  move is appended to a CSV manifest that `--restore` can replay."
)]
struct Cli {
    /// Corpus root containing one folder per category
    #[arg(long, required_unless_present = "restore")]
    base: Option<PathBuf>,

    /// Name of the validation folder inside the corpus root
    #[arg(long, default_value = DEFAULT_VALIDATION_DIR)]
    val_folder: String,

    /// Proportion of each category to move
    #[arg(long, default_value_t = DEFAULT_PROPORTION)]
    pct: f64,

    /// Extensions to include
    #[arg(long, num_args = 1.., default_values_t = DEFAULT_EXTENSIONS.map(String::from))]
    ext: Vec<String>,

    /// Only show the plan; move nothing
    #[arg(long)]
    dry_run: bool,

    /// Manifest file (relative paths are resolved against the corpus root)
    #[arg(long, default_value = DEFAULT_MANIFEST_NAME)]
    manifest: PathBuf,

    /// Restore every file recorded in this manifest instead of splitting
    #[arg(long, value_name = "MANIFEST", conflicts_with = "dry_run")]
    restore: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(manifest) = &cli.restore {
        return run_restore(manifest, cli.format);
    }

    let base = cli.base.ok_or_else(|| eyre!("--base is required unless --restore is given"))?;

    let config = SplitConfig::builder()
        .root(base)
        .validation_dir(cli.val_folder)
        .proportion(cli.pct)
        .extensions(cli.ext)
        .dry_run(cli.dry_run)
        .manifest_path(cli.manifest)
        .build()
        .context("Invalid configuration")?;

    run_split(config, cli.format)
}

/// Install a stderr subscriber; `RUST_LOG` overrides the verbosity flag.
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Default filter: warnings only, `-v` for info, `-vv` for debug.
fn log_directive(verbose: u8) -> String {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    format!("valsplit={level}")
}

/// Split the corpus (or preview the split).
fn run_split(config: SplitConfig, format: OutputFormat) -> Result<()> {
    let root = config.root.clone();
    let report = Partitioner::new(config)
        .run()
        .with_context(|| format!("Split failed for {}", root.display()))?;

    match format {
        OutputFormat::Text => print_run_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

/// Replay a manifest.
fn run_restore(manifest: &Path, format: OutputFormat) -> Result<()> {
    let report = RestoreEngine::new(manifest)
        .restore()
        .with_context(|| format!("Restore failed for {}", manifest.display()))?;

    match format {
        OutputFormat::Text => print_restore_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn print_run_report(report: &RunReport) {
    println!("Base: {}", report.root.display());
    println!("Validation folder: {}", report.validation_root.display());
    println!(
        "Extensions: {} | Proportion: {}",
        report.extensions.iter().join(", "),
        report.proportion
    );
    println!("{}", "─".repeat(60));

    if report.outcomes.is_empty() {
        println!("No category folders found.");
        return;
    }

    for outcome in &report.outcomes {
        if outcome.is_skipped() {
            println!("[CAT] {}: {} files | to move: 0", outcome.name, outcome.total);
            continue;
        }
        println!(
            "[CAT] {}: {} files (with ID: {}) | to move: {}",
            outcome.name, outcome.total, outcome.with_id, outcome.planned
        );
    }

    if report.is_empty() {
        println!();
        println!("Nothing to move.");
        return;
    }

    if report.dry_run {
        println!();
        println!("[DRY-RUN] Files that would be moved (newest by ID, then by date):");
        for (name, category) in report.plan.iter() {
            let dest = category.destination(&report.validation_root);
            for selection in &category.selected {
                let tag = match selection.key.id() {
                    Some(id) => format!("ID={id}"),
                    None => "NO_ID".to_string(),
                };
                println!(
                    "  [{}] {:<60} -> {}/   ({})",
                    name,
                    selection.document.name,
                    dest.display(),
                    tag
                );
            }
        }
        println!();
        println!(
            "[DRY-RUN] Total: {} files ({}).",
            report.total_planned(),
            format_size(report.plan.total_bytes())
        );
        return;
    }

    println!();
    if !report.failures.is_empty() {
        println!("{} file(s) could not be moved:", report.failures.len());
        for failure in &report.failures {
            println!("  [{}] {}", failure.category, failure.message);
        }
        println!();
    }
    println!(
        "Moved {} files. Manifest: {}",
        report.total_moved(),
        report.manifest.display()
    );
}

fn print_restore_report(report: &RestoreReport) {
    for warning in &report.warnings {
        println!("  {}", warning.message);
    }
    println!(
        "[RESTORE] Restored: {} | Missing: {} | Conflicts: {} | Failed: {} | Unreadable rows: {}",
        report.restored, report.missing, report.conflicts, report.failed, report.malformed
    );
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

//! End-to-end split: scan, rank, plan, relocate, record.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::Serialize;
use tracing::{error, info, warn};

use valsplit_core::{ManifestEntry, SplitConfig, SplitError};
use valsplit_plan::{CategoryPlan, PartitionPlan, SamplePlanner};
use valsplit_scan::CategoryScanner;

use crate::manifest::ManifestLog;
use crate::relocate::{move_file, relocate};

/// Per-category result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOutcome {
    /// Category name.
    pub name: CompactString,
    /// Eligible documents found.
    pub total: usize,
    /// Eligible documents carrying an identifier.
    pub with_id: usize,
    /// Documents selected for the validation partition.
    pub planned: usize,
    /// Documents actually moved (always 0 on a dry run).
    pub moved: usize,
    /// Documents whose move failed.
    pub failed: usize,
}

impl CategoryOutcome {
    fn from_plan(plan: &CategoryPlan) -> Self {
        Self {
            name: plan.name.clone(),
            total: plan.total,
            with_id: plan.with_id,
            planned: plan.selected.len(),
            moved: 0,
            failed: 0,
        }
    }

    /// Whether the category was skipped (no documents or nothing to move).
    pub fn is_skipped(&self) -> bool {
        self.total == 0 || self.planned == 0
    }
}

/// A document that could not be relocated. The run continued without it.
#[derive(Debug, Clone, Serialize)]
pub struct MoveFailure {
    /// Category of the document.
    pub category: CompactString,
    /// Path of the document.
    pub path: PathBuf,
    /// Error description, including the attempted operation.
    pub message: String,
}

/// Everything a run did, or would do on a dry run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Canonical corpus root.
    pub root: PathBuf,
    /// Validation partition directory.
    pub validation_root: PathBuf,
    /// Manifest location.
    pub manifest: PathBuf,
    /// Accepted extensions.
    pub extensions: Vec<String>,
    /// Proportion sampled per category.
    pub proportion: f64,
    /// Whether the filesystem was left untouched.
    pub dry_run: bool,
    /// The computed plan.
    pub plan: PartitionPlan,
    /// Per-category outcome, in plan order.
    pub outcomes: Vec<CategoryOutcome>,
    /// Manifest entries written by this run.
    pub moved: Vec<ManifestEntry>,
    /// Documents that could not be moved.
    pub failures: Vec<MoveFailure>,
}

impl RunReport {
    /// Number of documents selected.
    pub fn total_planned(&self) -> usize {
        self.plan.total_selected()
    }

    /// Number of documents moved.
    pub fn total_moved(&self) -> usize {
        self.moved.len()
    }

    /// Whether no category had anything to move.
    pub fn is_empty(&self) -> bool {
        self.total_planned() == 0
    }
}

/// Drives a complete split for one configuration.
#[derive(Debug, Clone)]
pub struct Partitioner {
    config: SplitConfig,
}

impl Partitioner {
    /// Create a partitioner.
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }

    /// Run the split.
    ///
    /// Fails only for configuration problems, or when the manifest cannot be
    /// opened or written. Individual move failures are collected in the
    /// report and the run continues.
    pub fn run(&self) -> Result<RunReport, SplitError> {
        let scanner = CategoryScanner::new(&self.config)?;
        let categories = scanner.scan()?;
        let plan = SamplePlanner::new(self.config.proportion).plan(categories);

        let mut report = RunReport {
            root: scanner.root().to_path_buf(),
            validation_root: scanner.validation_root().to_path_buf(),
            manifest: scanner.root().join(&self.config.manifest_path),
            extensions: self.config.normalized_extensions(),
            proportion: self.config.proportion,
            dry_run: self.config.dry_run,
            outcomes: plan.iter().map(|(_, c)| CategoryOutcome::from_plan(c)).collect(),
            plan: PartitionPlan::default(),
            moved: Vec::new(),
            failures: Vec::new(),
        };

        for outcome in &report.outcomes {
            info!(
                category = %outcome.name,
                total = outcome.total,
                with_id = outcome.with_id,
                planned = outcome.planned,
                "Category planned"
            );
        }

        if self.config.dry_run || plan.total_selected() == 0 {
            report.plan = plan;
            return Ok(report);
        }

        let mut manifest = ManifestLog::open(&report.manifest)?;

        for (outcome, (_, category)) in report.outcomes.iter_mut().zip(plan.iter()) {
            if category.is_skipped() {
                continue;
            }

            let dest_dir = category.destination(&report.validation_root);
            for selection in &category.selected {
                let source = &selection.document.path;

                // Only move files the manifest can record.
                let planned = ManifestEntry::new(
                    category.name.as_str(),
                    source,
                    dest_dir.join(source.file_name().unwrap_or_default()),
                    selection.id_rank(),
                );
                if let Err(err) = manifest.encode(&planned) {
                    skip_file(&mut report.failures, outcome, &category.name, source, err);
                    continue;
                }

                let dest = match relocate(source, &dest_dir) {
                    Ok(dest) => dest,
                    Err(err) => {
                        skip_file(&mut report.failures, outcome, &category.name, source, err);
                        continue;
                    }
                };

                let entry = ManifestEntry::new(
                    category.name.as_str(),
                    source,
                    &dest,
                    selection.id_rank(),
                );
                if let Err(err) = manifest.append(&entry) {
                    // Every file left in the validation folder must be in the manifest.
                    if let Err(undo) = move_file(&dest, source) {
                        error!("Failed to roll back unrecorded move: {undo}");
                    }
                    return Err(err);
                }

                outcome.moved += 1;
                report.moved.push(entry);
            }
        }

        info!(
            moved = report.moved.len(),
            failed = report.failures.len(),
            manifest = %manifest.path().display(),
            "Split finished"
        );

        report.plan = plan;
        Ok(report)
    }
}

fn skip_file(
    failures: &mut Vec<MoveFailure>,
    outcome: &mut CategoryOutcome,
    category: &CompactString,
    source: &Path,
    err: SplitError,
) {
    warn!(category = %category, "Skipping file: {err}");
    outcome.failed += 1;
    failures.push(MoveFailure {
        category: category.clone(),
        path: source.to_path_buf(),
        message: err.to_string(),
    });
}

//! Manifest replay to undo a split.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use valsplit_core::{IoOp, ManifestEntry, RestoreWarning, SplitError};

use crate::manifest::read_manifest;
use crate::relocate::move_file;

/// Aggregate outcome of a restore.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RestoreReport {
    /// Manifest that was replayed.
    pub manifest: PathBuf,
    /// Files moved back to their original path.
    pub restored: usize,
    /// Entries whose destination no longer exists.
    pub missing: usize,
    /// Entries left in place because the original path is occupied.
    pub conflicts: usize,
    /// Entries whose move back failed.
    pub failed: usize,
    /// Manifest rows that could not be decoded.
    pub malformed: usize,
    /// One warning per entry that was not restored.
    pub warnings: Vec<RestoreWarning>,
}

impl RestoreReport {
    /// Number of manifest entries processed.
    pub fn total(&self) -> usize {
        self.restored + self.missing + self.conflicts + self.failed + self.malformed
    }
}

/// Moves relocated files back to where the manifest says they came from.
#[derive(Debug, Clone)]
pub struct RestoreEngine {
    manifest: PathBuf,
}

impl RestoreEngine {
    /// Create an engine for a manifest file.
    pub fn new(manifest: impl Into<PathBuf>) -> Self {
        Self {
            manifest: manifest.into(),
        }
    }

    /// Replay the manifest, newest entry first.
    ///
    /// Only a missing or unreadable manifest is an error. Individual entries
    /// that cannot be decoded or restored are counted and reported as
    /// warnings. An occupied original path is never overwritten.
    pub fn restore(&self) -> Result<RestoreReport, SplitError> {
        if !self.manifest.is_file() {
            return Err(SplitError::configuration(
                &self.manifest,
                "Restore manifest does not exist",
            ));
        }

        let records = read_manifest(&self.manifest)?;
        let mut report = RestoreReport {
            manifest: self.manifest.clone(),
            malformed: records.rejected.len(),
            ..Default::default()
        };

        for warning in records.rejected {
            warn!("{}", warning.message);
            report.warnings.push(warning);
        }

        for entry in records.entries.iter().rev() {
            self.restore_entry(entry, &mut report);
        }

        info!(
            restored = report.restored,
            missing = report.missing,
            conflicts = report.conflicts,
            failed = report.failed,
            malformed = report.malformed,
            "Restore finished"
        );

        Ok(report)
    }

    fn restore_entry(&self, entry: &ManifestEntry, report: &mut RestoreReport) {
        if !entry.dst.exists() {
            report.missing += 1;
            report.warnings.push(RestoreWarning::missing_source(&entry.dst));
            return;
        }

        if entry.src.exists() {
            warn!(src = %entry.src.display(), "Original path occupied, leaving file in place");
            report.conflicts += 1;
            report.warnings.push(RestoreWarning::conflict(&entry.src));
            return;
        }

        let result = match entry.src.parent() {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|e| SplitError::io(IoOp::CreateDir, parent, e))
            }
            None => Ok(()),
        }
        .and_then(|()| move_file(&entry.dst, &entry.src));

        match result {
            Ok(()) => report.restored += 1,
            Err(err) => {
                warn!("Restore failed: {err}");
                report.failed += 1;
                report.warnings.push(RestoreWarning::move_failed(&err));
            }
        }
    }
}

//! Error types for partitioning and restore operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Filesystem operation being attempted when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum IoOp {
    #[strum(serialize = "create directory")]
    CreateDir,
    #[strum(serialize = "read directory")]
    ReadDir,
    #[strum(serialize = "move")]
    Move,
    #[strum(serialize = "copy")]
    Copy,
    #[strum(serialize = "remove")]
    Remove,
    #[strum(serialize = "open manifest")]
    OpenManifest,
    #[strum(serialize = "write manifest")]
    WriteManifest,
}

/// Errors that can occur while partitioning or restoring a corpus.
#[derive(Debug, Error)]
pub enum SplitError {
    /// Missing or invalid corpus root or manifest. Fatal, raised before any mutation.
    #[error("Configuration error at {path}: {message}")]
    Configuration { path: PathBuf, message: String },

    /// A single filesystem operation failed.
    #[error("Failed to {op} {path}: {source}")]
    Io {
        op: IoOp,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest could not be encoded or decoded.
    #[error("Manifest error at {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl SplitError {
    /// Create a configuration error for a path.
    pub fn configuration(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Configuration {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with operation and path context.
    pub fn io(op: IoOp, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Create a manifest codec error.
    pub fn manifest(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Manifest {
            path: path.into(),
            source,
        }
    }

    /// Whether this error aborts the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// The path the failed operation was working on.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Configuration { path, .. } | Self::Io { path, .. } | Self::Manifest { path, .. } => {
                path
            }
        }
    }
}

/// Kind of restore warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestoreWarningKind {
    /// The relocated file no longer exists at its manifest destination.
    MissingSource,
    /// The original path is occupied, so the file was left in place.
    Conflict,
    /// Moving the file back failed.
    MoveFailed,
    /// A manifest row could not be decoded and was skipped.
    MalformedEntry,
}

/// Non-fatal warning encountered during restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: RestoreWarningKind,
}

impl RestoreWarning {
    /// Create a missing source warning for a manifest destination.
    pub fn missing_source(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Restore source missing: {}", path.display()),
            path,
            kind: RestoreWarningKind::MissingSource,
        }
    }

    /// Create a conflict warning for an occupied original path.
    pub fn conflict(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Restore target already exists: {}", path.display()),
            path,
            kind: RestoreWarningKind::Conflict,
        }
    }

    /// Create a warning from a failed move back.
    pub fn move_failed(error: &SplitError) -> Self {
        Self {
            path: error.path().clone(),
            message: error.to_string(),
            kind: RestoreWarningKind::MoveFailed,
        }
    }

    /// Create a warning for a manifest row that could not be decoded.
    pub fn malformed_entry(
        manifest: impl Into<PathBuf>,
        line: Option<u64>,
        detail: impl std::fmt::Display,
    ) -> Self {
        let message = match line {
            Some(line) => format!("Skipping unreadable manifest row at line {line}: {detail}"),
            None => format!("Skipping unreadable manifest row: {detail}"),
        };
        Self {
            path: manifest.into(),
            message,
            kind: RestoreWarningKind::MalformedEntry,
        }
    }
}

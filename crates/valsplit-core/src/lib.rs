//! Core types and configuration for valsplit.
//!
//! This crate provides the data model shared by the scanning, planning and
//! relocation crates: documents and their rank keys, manifest records,
//! the run configuration, and the error taxonomy.

mod config;
mod document;
mod error;
mod manifest;

pub use config::{
    DEFAULT_EXTENSIONS, DEFAULT_MANIFEST_NAME, DEFAULT_PROPORTION, DEFAULT_VALIDATION_DIR,
    SplitConfig, SplitConfigBuilder, SplitConfigBuilderError, normalize_extension,
};
pub use document::{Category, Document, RankKey};
pub use error::{IoOp, RestoreWarning, RestoreWarningKind, SplitError};
pub use manifest::{MANIFEST_HEADER, MANIFEST_TIME_FORMAT, ManifestEntry};

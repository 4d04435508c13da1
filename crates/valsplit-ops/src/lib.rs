//! Relocation, manifest and restore engine for valsplit.
//!
//! This crate performs the filesystem side of a split: moving selected
//! documents into the validation partition without overwriting anything,
//! recording every completed move in an append-only CSV manifest, and
//! replaying that manifest to put files back.

mod executor;
mod manifest;
mod relocate;
mod restore;

pub use executor::{CategoryOutcome, MoveFailure, Partitioner, RunReport};
pub use manifest::{ManifestLog, ManifestRecords, read_manifest};
pub use relocate::{relocate, unique_destination};
pub use restore::{RestoreEngine, RestoreReport};

// Re-export the types callers need to drive a run
pub use valsplit_core::{
    ManifestEntry, RestoreWarning, RestoreWarningKind, SplitConfig, SplitConfigBuilder,
    SplitError,
};
pub use valsplit_plan::{CategoryPlan, PartitionPlan, Selection};

//! Manifest record types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Column names of the manifest, in order.
pub const MANIFEST_HEADER: [&str; 5] = ["moved_at", "category", "src", "dst", "id_rank"];

/// Local timestamp format for `moved_at`, second precision.
pub const MANIFEST_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One relocation, as recorded in the manifest.
///
/// Entries are written once and never rewritten; restore only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Local time the move completed.
    pub moved_at: String,
    /// Category the file was taken from.
    pub category: String,
    /// Original location.
    pub src: PathBuf,
    /// Location inside the validation partition.
    pub dst: PathBuf,
    /// 1-based position within the category selection, if the file carried an identifier.
    pub id_rank: Option<usize>,
}

impl ManifestEntry {
    /// Create an entry stamped with the current local time.
    pub fn new(
        category: impl Into<String>,
        src: impl Into<PathBuf>,
        dst: impl Into<PathBuf>,
        id_rank: Option<usize>,
    ) -> Self {
        Self {
            moved_at: chrono::Local::now()
                .format(MANIFEST_TIME_FORMAT)
                .to_string(),
            category: category.into(),
            src: src.into(),
            dst: dst.into(),
            id_rank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_timestamp_has_second_precision() {
        let entry = ManifestEntry::new("economia", "/c/economia/1.html", "/c/V/economia/1.html", Some(1));
        assert_eq!(entry.moved_at.len(), "2024-01-01T00:00:00".len());
        assert_eq!(&entry.moved_at[10..11], "T");
        assert!(chrono::NaiveDateTime::parse_from_str(&entry.moved_at, MANIFEST_TIME_FORMAT).is_ok());
    }
}

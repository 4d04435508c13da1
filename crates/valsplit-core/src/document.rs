//! Document and rank key types.

use std::cmp::Ordering;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A single corpus file belonging to exactly one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Name of the owning category directory.
    pub category: CompactString,
    /// Absolute path on disk.
    pub path: PathBuf,
    /// File name including extension.
    pub name: CompactString,
    /// File name without the final extension.
    pub stem: CompactString,
    /// Final extension, without the dot.
    pub extension: Option<CompactString>,
    /// Last modification time (UNIX epoch when unavailable).
    pub modified: SystemTime,
    /// Size in bytes.
    pub size: u64,
}

impl Document {
    /// Create a document from a path and already-read metadata values.
    pub fn new(
        category: impl Into<CompactString>,
        path: impl Into<PathBuf>,
        modified: SystemTime,
        size: u64,
    ) -> Self {
        let path = path.into();
        let name = lossy(path.file_name());
        let stem = lossy(path.file_stem());
        let extension = path
            .extension()
            .map(|e| CompactString::new(e.to_string_lossy()));

        Self {
            category: category.into(),
            path,
            name,
            stem,
            extension,
            modified,
            size,
        }
    }
}

/// A category directory and the eligible documents found beneath it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Directory name, used as the category label.
    pub name: CompactString,
    /// Absolute path of the category directory.
    pub path: PathBuf,
    /// Eligible documents at any depth, in path order.
    pub documents: Vec<Document>,
}

impl Category {
    /// Create an empty category for a directory.
    pub fn new(name: impl Into<CompactString>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            documents: Vec::new(),
        }
    }

    /// Number of eligible documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the category has no eligible documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn lossy(s: Option<&std::ffi::OsStr>) -> CompactString {
    s.map(|s| CompactString::new(s.to_string_lossy()))
        .unwrap_or_default()
}

/// Comparable recency key. Sorting ascending yields newest first.
///
/// Identified documents always precede unidentified ones. Within each group
/// the larger value (identifier, or modification time in nanoseconds) comes
/// first, and the file name breaks remaining ties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankKey {
    /// Whether the file name carries a leading numeric identifier.
    pub has_id: bool,
    /// The identifier, or the modification time in nanoseconds since the epoch.
    pub value: u128,
    /// File name used as the final tie-break.
    pub name: CompactString,
}

impl RankKey {
    /// Key for a document with a leading identifier.
    pub fn identified(id: u128, name: impl Into<CompactString>) -> Self {
        Self {
            has_id: true,
            value: id,
            name: name.into(),
        }
    }

    /// Key for a document without an identifier, ranked by modification time.
    ///
    /// Times before the epoch collapse to zero.
    pub fn unidentified(modified: SystemTime, name: impl Into<CompactString>) -> Self {
        let value = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Self {
            has_id: false,
            value,
            name: name.into(),
        }
    }

    /// The identifier, if present.
    pub fn id(&self) -> Option<u128> {
        self.has_id.then_some(self.value)
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .has_id
            .cmp(&self.has_id)
            .then_with(|| other.value.cmp(&self.value))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_document_name_parts() {
        let doc = Document::new(
            "economia",
            "/corpus/economia/826016-foo.html",
            UNIX_EPOCH,
            10,
        );
        assert_eq!(doc.name, "826016-foo.html");
        assert_eq!(doc.stem, "826016-foo");
        assert_eq!(doc.extension.as_deref(), Some("html"));
    }

    #[test]
    fn test_identified_precedes_unidentified() {
        let small_id = RankKey::identified(1, "1.html");
        let recent = RankKey::unidentified(
            UNIX_EPOCH + Duration::from_secs(u32::MAX as u64),
            "a.html",
        );
        assert!(small_id < recent);
    }

    #[test]
    fn test_higher_value_ranks_first() {
        let mut keys = vec![
            RankKey::identified(100, "100.html"),
            RankKey::identified(114, "114.html"),
            RankKey::identified(105, "105.html"),
        ];
        keys.sort();
        let ids: Vec<_> = keys.iter().filter_map(RankKey::id).collect();
        assert_eq!(ids, vec![114, 105, 100]);
    }

    #[test]
    fn test_name_breaks_ties() {
        let a = RankKey::identified(7, "007-a.html");
        let b = RankKey::identified(7, "7-b.html");
        assert!(a < b);
    }

    #[test]
    fn test_pre_epoch_collapses_to_zero() {
        let key = RankKey::unidentified(UNIX_EPOCH - Duration::from_secs(5), "x.html");
        assert_eq!(key.value, 0);
        assert_eq!(key.id(), None);
    }
}

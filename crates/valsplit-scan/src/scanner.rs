//! JWalk-based category scanner.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use compact_str::CompactString;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use jwalk::{Parallelism, WalkDir};
use tracing::{debug, warn};

use valsplit_core::{Category, Document, IoOp, SplitConfig, SplitError};

/// Enumerates category directories and their eligible documents.
///
/// Read-only: nothing on disk is touched.
#[derive(Debug)]
pub struct CategoryScanner {
    root: PathBuf,
    validation_root: PathBuf,
    validation_dir: String,
    matcher: GlobSet,
}

impl CategoryScanner {
    /// Create a scanner for the configured corpus root.
    ///
    /// Fails with a configuration error if the root is missing or not a
    /// directory, or if an extension cannot be turned into a pattern.
    pub fn new(config: &SplitConfig) -> Result<Self, SplitError> {
        let root = config.root.canonicalize().map_err(|e| {
            SplitError::configuration(&config.root, format!("Corpus root does not exist: {e}"))
        })?;

        if !root.is_dir() {
            return Err(SplitError::configuration(
                root,
                "Corpus root is not a directory",
            ));
        }

        let matcher = build_matcher(&config.normalized_extensions())
            .map_err(|e| SplitError::configuration(&config.root, e))?;

        Ok(Self {
            validation_root: root.join(&config.validation_dir),
            validation_dir: config.validation_dir.clone(),
            root,
            matcher,
        })
    }

    /// Canonical corpus root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the validation partition.
    pub fn validation_root(&self) -> &Path {
        &self.validation_root
    }

    /// List category directories, sorted by name, without their documents.
    pub fn categories(&self) -> Result<Vec<Category>, SplitError> {
        let entries =
            std::fs::read_dir(&self.root).map_err(|e| SplitError::io(IoOp::ReadDir, &self.root, e))?;

        let mut categories = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!(root = %self.root.display(), "Skipping unreadable entry: {err}");
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            if name == self.validation_dir || self.is_in_validation(&path) {
                debug!(path = %path.display(), "Skipping validation partition");
                continue;
            }

            categories.push(Category::new(name, path));
        }

        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    /// Recursively collect the eligible documents of one category.
    pub fn documents(&self, category: &Category) -> Vec<Document> {
        let walker = WalkDir::new(&category.path)
            .parallelism(Parallelism::Serial)
            .skip_hidden(false)
            .follow_links(false)
            .sort(true);

        let mut documents = Vec::new();
        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    warn!(category = %category.name, "Skipping unreadable path: {err}");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if self.is_in_validation(&path) || !self.accepts(&entry.file_name().to_string_lossy()) {
                continue;
            }

            // Metadata failures leave the document ranked as oldest.
            let (modified, size) = match entry.metadata() {
                Ok(m) => (m.modified().unwrap_or(UNIX_EPOCH), m.len()),
                Err(err) => {
                    warn!(path = %path.display(), "Failed to read metadata: {err}");
                    (UNIX_EPOCH, 0)
                }
            };

            documents.push(Document::new(
                CompactString::new(&category.name),
                path,
                modified,
                size,
            ));
        }

        documents
    }

    /// List every category together with its documents.
    pub fn scan(&self) -> Result<Vec<Category>, SplitError> {
        let mut categories = self.categories()?;
        for category in &mut categories {
            category.documents = self.documents(category);
            debug!(
                category = %category.name,
                documents = category.documents.len(),
                "Scanned category"
            );
        }
        Ok(categories)
    }

    /// Check if a file name carries an accepted extension.
    pub fn accepts(&self, file_name: &str) -> bool {
        self.matcher.is_match(file_name)
    }

    fn is_in_validation(&self, path: &Path) -> bool {
        path.starts_with(&self.validation_root)
    }
}

/// Build a case-insensitive matcher for file names ending in one of the
/// extensions, taken literally, with a non-empty stem.
fn build_matcher(extensions: &[String]) -> Result<GlobSet, String> {
    let mut builder = GlobSetBuilder::new();
    for ext in extensions {
        let glob = GlobBuilder::new(&format!("?*{}", globset::escape(ext)))
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|e| format!("Invalid extension '{ext}': {e}"))?;
        builder.add(glob);
    }
    builder.build().map_err(|e| e.to_string())
}

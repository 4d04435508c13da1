//! Append-only CSV manifest of relocations.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use valsplit_core::{IoOp, MANIFEST_HEADER, ManifestEntry, RestoreWarning, SplitError};

/// Single writer for a manifest file.
///
/// The header is written only when the file is new (or empty); existing
/// rows are never rewritten. Rows are encoded in memory and reach the file
/// whole, each flushed before returning, so the file only ever grows by
/// complete rows.
#[derive(Debug)]
pub struct ManifestLog {
    path: PathBuf,
    file: File,
}

impl ManifestLog {
    /// Open a manifest for appending, creating it (and its parent) if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SplitError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SplitError::io(IoOp::CreateDir, parent, e))?;
        }

        let is_new = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        let unterminated = !is_new && !ends_with_newline(&path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| SplitError::io(IoOp::OpenManifest, &path, e))?;

        let mut log = Self { path, file };

        if unterminated {
            warn!(path = %log.path.display(), "Manifest ends with a partial row");
            log.write_row(b"\n")?;
        }

        if is_new {
            let header = encode_row(&log.path, |w| w.write_record(MANIFEST_HEADER))?;
            log.write_row(&header)?;
            debug!(path = %log.path.display(), "Created manifest");
        }

        Ok(log)
    }

    /// Encode an entry exactly as [`append`](Self::append) would write it.
    ///
    /// Fails for entries the manifest cannot represent, such as paths that
    /// are not valid UTF-8. Nothing is written.
    pub fn encode(&self, entry: &ManifestEntry) -> Result<Vec<u8>, SplitError> {
        encode_row(&self.path, |w| w.serialize(entry))
    }

    /// Append one entry and flush it to disk.
    pub fn append(&mut self, entry: &ManifestEntry) -> Result<(), SplitError> {
        let row = self.encode(entry)?;
        self.write_row(&row)
    }

    /// Location of the manifest file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_row(&mut self, row: &[u8]) -> Result<(), SplitError> {
        self.file
            .write_all(row)
            .and_then(|()| self.file.flush())
            .map_err(|e| SplitError::io(IoOp::WriteManifest, &self.path, e))
    }
}

fn encode_row(
    path: &Path,
    write: impl FnOnce(&mut csv::Writer<Vec<u8>>) -> csv::Result<()>,
) -> Result<Vec<u8>, SplitError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    write(&mut writer).map_err(|e| SplitError::manifest(path, e))?;
    writer
        .into_inner()
        .map_err(|e| SplitError::io(IoOp::WriteManifest, path, e.into_error()))
}

fn ends_with_newline(path: &Path) -> Result<bool, SplitError> {
    let mut last = [0u8; 1];
    File::open(path)
        .and_then(|mut file| {
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)
        })
        .map_err(|e| SplitError::io(IoOp::OpenManifest, path, e))?;
    Ok(last[0] == b'\n')
}

/// Decoded contents of a manifest file.
#[derive(Debug, Clone, Default)]
pub struct ManifestRecords {
    /// Readable entries, in file order.
    pub entries: Vec<ManifestEntry>,
    /// One warning per row that could not be decoded.
    pub rejected: Vec<RestoreWarning>,
}

/// Read every entry of a manifest, in file order.
///
/// Rows that cannot be decoded are skipped and reported in
/// [`ManifestRecords::rejected`]. Only failing to read the file is an error.
pub fn read_manifest(path: &Path) -> Result<ManifestRecords, SplitError> {
    let file = File::open(path).map_err(|e| SplitError::io(IoOp::OpenManifest, path, e))?;
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut records = ManifestRecords::default();
    for row in reader.deserialize::<ManifestEntry>() {
        match row {
            Ok(entry) => records.entries.push(entry),
            Err(e) if e.is_io_error() => return Err(SplitError::manifest(path, e)),
            Err(e) => {
                let line = e.position().map(|p| p.line());
                records
                    .rejected
                    .push(RestoreWarning::malformed_entry(path, line, &e));
            }
        }
    }

    Ok(records)
}

//! Collision-safe file relocation.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use valsplit_core::{IoOp, SplitError};

/// Move `source` into `dest_dir`, never overwriting an existing file.
///
/// The directory is created if needed. When the file name is taken, `_1`,
/// `_2`, ... is appended to the stem until a free name is found. Returns the
/// path actually used.
pub fn relocate(source: &Path, dest_dir: &Path) -> Result<PathBuf, SplitError> {
    fs::create_dir_all(dest_dir).map_err(|e| SplitError::io(IoOp::CreateDir, dest_dir, e))?;

    let file_name = source.file_name().ok_or_else(|| {
        SplitError::io(
            IoOp::Move,
            source,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;

    let dest = unique_destination(&dest_dir.join(file_name));
    move_file(source, &dest)?;

    debug!(src = %source.display(), dst = %dest.display(), "Relocated");
    Ok(dest)
}

/// First free path among `name.ext`, `name_1.ext`, `name_2.ext`, ...
///
/// Deterministic given the current directory contents.
pub fn unique_destination(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let parent = path.parent().unwrap_or(Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().to_string());

    (1u64..)
        .map(|k| {
            let name = match &extension {
                Some(ext) => format!("{stem}_{k}.{ext}"),
                None => format!("{stem}_{k}"),
            };
            parent.join(name)
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Move a single file, falling back to copy + remove across filesystems.
pub(crate) fn move_file(source: &Path, dest: &Path) -> Result<(), SplitError> {
    let rename_err = match fs::rename(source, dest) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    if !source.is_file() {
        return Err(SplitError::io(IoOp::Move, source, rename_err));
    }

    copy_then_remove(source, dest)
}

/// Cross-filesystem move. On failure the file is left only at `source`.
fn copy_then_remove(source: &Path, dest: &Path) -> Result<(), SplitError> {
    if let Err(e) = fs::copy(source, dest) {
        // Drop whatever part of the copy was written.
        let _ = fs::remove_file(dest);
        return Err(SplitError::io(IoOp::Copy, source, e));
    }

    if let Err(e) = fs::remove_file(source) {
        let _ = fs::remove_file(dest);
        return Err(SplitError::io(IoOp::Remove, source, e));
    }

    debug!(src = %source.display(), dst = %dest.display(), "Moved by copy");
    Ok(())
}

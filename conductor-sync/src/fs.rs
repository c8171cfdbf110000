//! File-tree primitives: recursive copy, idempotent remove, `mkdir -p`, and
//! rebased multi-file copy.
//!
//! Rebasing treats `\` and `/` as the same separator, so a list of files
//! produced on one platform can be relocated on another.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, source_err, SyncError};

/// Copy a file or directory tree to `destination` (the exact target path).
///
/// Missing parent directories are created and existing files overwritten.
/// Returns the number of files copied.
pub fn copy_tree(source: &Path, destination: &Path) -> Result<usize, SyncError> {
    let meta = fs::metadata(source).map_err(|e| source_err(source, e))?;
    if meta.is_dir() {
        make_dirs(destination)?;
        let mut entries = fs::read_dir(source)
            .map_err(|e| io_err(source, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| io_err(source, e))?;
        entries.sort_by_key(|e| e.file_name());

        let mut copied = 0;
        for entry in entries {
            copied += copy_tree(&entry.path(), &destination.join(entry.file_name()))?;
        }
        Ok(copied)
    } else {
        if let Some(parent) = destination.parent() {
            make_dirs(parent)?;
        }
        fs::copy(source, destination).map_err(|e| io_err(destination, e))?;
        tracing::debug!(
            "cp {} {}",
            abbreviate(&source.to_string_lossy()),
            abbreviate(&destination.to_string_lossy())
        );
        Ok(1)
    }
}

/// Copy `source` into directory `dir`, keeping its file name (`cp -R src dir/`).
pub fn copy_into(source: &Path, dir: &Path) -> Result<usize, SyncError> {
    let name = source.file_name().ok_or_else(|| SyncError::Io {
        path: source.to_path_buf(),
        source: std::io::Error::new(ErrorKind::InvalidInput, "source has no file name"),
    })?;
    copy_tree(source, &dir.join(name))
}

/// Recursively delete `path`. Absent paths are not an error.
///
/// Returns `true` if something was removed.
pub fn remove_tree(path: &Path) -> Result<bool, SyncError> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(io_err(path, e)),
    };
    let removed = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match removed {
        Ok(()) => {
            tracing::info!("removed: {}", path.display());
            Ok(true)
        }
        // Lost a race with another remover; the outcome is the same.
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_err(path, e)),
    }
}

/// Create `path` and all missing ancestors. Existing directories are fine.
pub fn make_dirs(path: &Path) -> Result<(), SyncError> {
    fs::create_dir_all(path).map_err(|e| io_err(path, e))
}

// ---------------------------------------------------------------------------
// Rebased copy
// ---------------------------------------------------------------------------

/// A rebased copy: every file under `root` is recreated under `destination`
/// with the same relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySpec {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
    pub destination: PathBuf,
}

impl CopySpec {
    pub fn apply(&self) -> Result<Vec<PathBuf>, SyncError> {
        copy_rebased(&self.root, &self.files, &self.destination)
    }
}

/// Copy each of `files` to `destdir`, named relative to `rootdir`.
///
/// `copy_rebased("A", ["A/B/c.txt"], "D")` creates `D/B/c.txt`. Files that do
/// not lie under `rootdir` keep their whole (relative) path under `destdir`.
/// Returns the destination paths in input order.
pub fn copy_rebased<P: AsRef<Path>>(
    rootdir: &Path,
    files: &[P],
    destdir: &Path,
) -> Result<Vec<PathBuf>, SyncError> {
    let root = normalize(rootdir);
    let root = root.trim_end_matches('/');
    make_dirs(destdir)?;

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let file = file.as_ref();
        let dest = destdir.join(rebase(root, &normalize(file)));
        copy_tree(file, &dest)?;
        written.push(dest);
    }
    Ok(written)
}

/// Path with `\` rewritten to `/`.
fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Strip `root` from `file` when `file` lies under it (component boundary).
fn rebase<'a>(root: &str, file: &'a str) -> &'a str {
    if !root.is_empty() {
        if let Some(rest) = file.strip_prefix(root) {
            if rest.starts_with('/') {
                return rest.trim_start_matches('/');
            }
            if rest.is_empty() {
                return file.rsplit('/').next().unwrap_or(file);
            }
        }
    }
    file.trim_start_matches('/')
}

/// Long paths are shown as `...` plus their last 30 characters.
fn abbreviate(path: &str) -> String {
    const KEEP: usize = 30;
    let count = path.chars().count();
    if count > KEEP {
        let tail: String = path.chars().skip(count - KEEP).collect();
        format!("...{tail}")
    } else {
        path.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

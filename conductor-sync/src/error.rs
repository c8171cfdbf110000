//! Error types for conductor-sync.

use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from file sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The file or directory to copy or read does not exist.
    #[error("missing source: {path}")]
    MissingSource { path: PathBuf },

    /// The OS refused access to `path`.
    #[error("permission denied at {path}: {source}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A version rule pattern failed to compile.
    #[error("invalid version pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Convenience constructor; classifies permission errors.
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    let path = path.into();
    match source.kind() {
        ErrorKind::PermissionDenied => SyncError::PermissionDenied { path, source },
        _ => SyncError::Io { path, source },
    }
}

/// Like [`io_err`], but a `NotFound` on a source path is [`SyncError::MissingSource`].
pub(crate) fn source_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    if source.kind() == ErrorKind::NotFound {
        SyncError::MissingSource { path: path.into() }
    } else {
        io_err(path, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_io_kinds() {
        let denied = io_err("/x", std::io::Error::from(ErrorKind::PermissionDenied));
        assert!(matches!(denied, SyncError::PermissionDenied { .. }));

        let missing = source_err("/y", std::io::Error::from(ErrorKind::NotFound));
        assert!(matches!(missing, SyncError::MissingSource { .. }));
        assert!(missing.to_string().contains("/y"));

        let other = io_err("/z", std::io::Error::from(ErrorKind::NotFound));
        assert!(matches!(other, SyncError::Io { .. }));
    }
}

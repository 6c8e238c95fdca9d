use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("cannot write to install location {path}: {source}")]
    Permission {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("new image hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("install failed and the previous image could not be restored from {backup}: {source}")]
    Rollback {
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApplyError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn permission(path: PathBuf, source: std::io::Error) -> Self {
        Self::Permission { path, source }
    }
}

/// Failure reported by a [`Patcher`](crate::Patcher) implementation.
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct PatchError {
    context: &'static str,
    #[source]
    source: std::io::Error,
}

impl PatchError {
    #[must_use]
    pub fn new(context: &'static str, source: std::io::Error) -> Self {
        Self { context, source }
    }
}

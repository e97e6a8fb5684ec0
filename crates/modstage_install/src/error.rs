//! Error types for install operations.
//!
//! Fatal problems (the target root cannot be created, another install holds
//! the lock, cancellation) are returned as [`Error`]. Problems with a single
//! file or directory are not fatal: they are recorded as [`EntryFailure`]s and
//! reported in the install summary.

use camino::Utf8PathBuf;
use serde::Serialize;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Naming or mod list error from `modstage_core`.
    #[error(transparent)]
    Core(#[from] modstage_core::Error),

    /// The target root is missing and could not be created.
    #[error("Target directory '{path}' is unusable: {source}")]
    TargetRoot {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another install currently holds the lock on the target root.
    #[error("Another install is already running against '{0}'")]
    InstallLocked(Utf8PathBuf),

    /// The install was cancelled through its [`CancelToken`](crate::CancelToken).
    #[error("Install cancelled")]
    Cancelled,
}

/// What the engine was doing when an entry failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryOperation {
    Enumerate,
    Copy,
    RemoveDirectory,
    RemoveFile,
}

/// A recovered per-entry failure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFailure {
    pub path: Utf8PathBuf,
    pub operation: EntryOperation,
    pub message: String,
}

impl EntryFailure {
    pub(crate) fn new(
        path: impl Into<Utf8PathBuf>,
        operation: EntryOperation,
        err: impl std::fmt::Display,
    ) -> Self {
        let failure = Self {
            path: path.into(),
            operation,
            message: err.to_string(),
        };
        tracing::warn!(
            "{:?} failed for {}: {}",
            failure.operation,
            failure.path,
            failure.message
        );
        failure
    }
}

//! Error taxonomy: fatal crawl errors and non-fatal per-item load errors.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions. Frontier/traversal errors abort startup; checkpoint
/// write failures abort the run (continuing would break crash consistency).
#[derive(Debug, Error)]
pub enum TrawlError {
    /// The checkpointed path no longer exists or is no longer listed under
    /// its parent. Surfaced at startup; the caller decides whether to clear
    /// the checkpoint and restart.
    #[error(
        "stale checkpoint for root {root}: {path} no longer exists (clear the checkpoint to restart from scratch)"
    )]
    StaleCheckpoint { root: PathBuf, path: PathBuf },

    /// The checkpoint file exists but its content does not parse for this
    /// root's mode, or points outside the root.
    #[error("corrupt checkpoint for root {root}: {reason}")]
    CorruptCheckpoint { root: PathBuf, reason: String },

    /// Durable checkpoint write failed. Always fatal.
    #[error("failed to write checkpoint for root {root}: {source}")]
    StorageWrite {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Checkpoint read or state-dir setup failed.
    #[error("failed to read checkpoint state for root {root}: {source}")]
    StorageRead {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Listing or resolving a path during traversal failed.
    #[error("cannot walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root is neither a directory nor a regular file.
    #[error("root {root} is neither a directory nor a regular file")]
    BadRoot { root: PathBuf },

    /// A loader worker died before handing its item back (loader panic).
    #[error("a loader worker terminated without completing its item")]
    WorkerLost,
}

/// Per-item load failure. Recorded on the work item and surfaced to the
/// caller; never stops the pipeline.
#[derive(Clone, Debug, Error)]
#[error("{kind}: {message}")]
pub struct LoadError {
    pub kind: LoadErrorKind,
    pub message: String,
}

impl LoadError {
    pub fn new(kind: LoadErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// What went wrong loading one file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// Recognized as the expected kind of file, but its content failed to
    /// parse or read.
    InvalidFormat,
    /// Not the kind of file this loader handles (e.g. filtered extension,
    /// not a regular file).
    WrongKind,
    /// The file vanished between traversal and load.
    NotFound,
}

impl std::fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LoadErrorKind::InvalidFormat => "invalid format",
            LoadErrorKind::WrongKind => "wrong kind",
            LoadErrorKind::NotFound => "not found",
        };
        f.write_str(s)
    }
}

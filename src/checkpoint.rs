//! Durable single-value checkpoint store: one small text file per root.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::TrawlError;
use crate::types::{Position, RootKind};
use crate::utils::config::{checkpoint_file_name, default_state_dir};

/// Maps one root to its last fully processed position. At most one value
/// exists per root; absence means never started or fully completed.
///
/// Single-writer: only the drain thread calls [`set`](Self::set). Concurrent
/// crawls over the same root are not supported.
pub struct CheckpointStore {
    root: PathBuf,
    kind: RootKind,
    file: PathBuf,
}

impl CheckpointStore {
    /// Open the store for `root` (already normalized/canonical). Creates the
    /// state directory if needed; the checkpoint file itself is created
    /// lazily on first [`set`](Self::set).
    pub fn open(
        root: &Path,
        kind: RootKind,
        state_dir: Option<&Path>,
    ) -> Result<Self, TrawlError> {
        let dir = match state_dir {
            Some(d) => d.to_path_buf(),
            None => default_state_dir().ok_or_else(|| TrawlError::StorageRead {
                root: root.to_path_buf(),
                source: std::io::Error::other("no user config directory available"),
            })?,
        };
        fs::create_dir_all(&dir).map_err(|e| TrawlError::StorageRead {
            root: root.to_path_buf(),
            source: e,
        })?;
        let file = dir.join(checkpoint_file_name(root));
        Ok(Self {
            root: root.to_path_buf(),
            kind,
            file,
        })
    }

    /// Last committed position, or None when never started / cleared.
    pub fn get(&self) -> Result<Option<Position>, TrawlError> {
        let raw = match fs::read_to_string(&self.file) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(TrawlError::StorageRead {
                    root: self.root.clone(),
                    source: e,
                });
            }
        };
        let raw = raw.trim_end_matches(['\n', '\r']);
        if raw.is_empty() {
            return Ok(None);
        }
        match self.kind {
            RootKind::Dir => Ok(Some(Position::Path(PathBuf::from(raw)))),
            RootKind::List => {
                let n = raw
                    .parse::<u64>()
                    .map_err(|_| TrawlError::CorruptCheckpoint {
                        root: self.root.clone(),
                        reason: format!("expected a line count, found {:?}", raw),
                    })?;
                Ok(Some(Position::Line(n)))
            }
        }
    }

    /// Overwrite the checkpoint and flush it to stable storage before
    /// returning, so a crash immediately after `set` never loses the commit.
    /// Truncate-rewrite-then-sync; not atomic rename.
    pub fn set(&self, position: &Position) -> Result<(), TrawlError> {
        let write = || -> std::io::Result<()> {
            let mut f = File::create(&self.file)?;
            writeln!(f, "{}", position)?;
            f.sync_all()
        };
        write().map_err(|e| TrawlError::StorageWrite {
            root: self.root.clone(),
            source: e,
        })
    }

    /// Delete the checkpoint. Called once the traversal reaches natural
    /// exhaustion; a missing file is not an error.
    pub fn clear(&self) -> Result<(), TrawlError> {
        match fs::remove_file(&self.file) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TrawlError::StorageWrite {
                root: self.root.clone(),
                source: e,
            }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the backing checkpoint file.
    pub fn file_path(&self) -> &Path {
        &self.file
    }
}

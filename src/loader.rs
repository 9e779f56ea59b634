//! Loader seam: the expensive per-file parse dispatched to worker threads.

use std::path::Path;

use crate::error::{LoadError, LoadErrorKind};

/// Parses one file into a payload. Implementations run on worker threads;
/// errors are per-item and never stop the pipeline.
pub trait Loader: Send + Sync + 'static {
    type Payload: Send + 'static;

    fn load(&self, path: &Path) -> Result<Self::Payload, LoadError>;
}

/// Whole-file loader with an optional extension filter. Stands in for a
/// format-specific parser: filtered-out files are `WrongKind`, unreadable
/// content is `InvalidFormat`, vanished files are `NotFound`.
#[derive(Clone, Debug, Default)]
pub struct ReadLoader {
    extensions: Vec<String>,
}

impl ReadLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept files whose extension matches one of `extensions`
    /// (case-insensitive, without the leading dot).
    pub fn with_extensions(extensions: Vec<String>) -> Self {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    fn extension_accepted(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.iter().any(|want| want == &e.to_ascii_lowercase()))
    }
}

impl Loader for ReadLoader {
    type Payload = Vec<u8>;

    fn load(&self, path: &Path) -> Result<Vec<u8>, LoadError> {
        if !self.extension_accepted(path) {
            return Err(LoadError::new(
                LoadErrorKind::WrongKind,
                format!("{} does not match the extension filter", path.display()),
            ));
        }
        std::fs::read(path).map_err(|e| {
            let kind = match e.kind() {
                std::io::ErrorKind::NotFound => LoadErrorKind::NotFound,
                std::io::ErrorKind::IsADirectory => LoadErrorKind::WrongKind,
                _ => LoadErrorKind::InvalidFormat,
            };
            LoadError::new(kind, format!("{}: {}", path.display(), e))
        })
    }
}

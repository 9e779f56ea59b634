//! Trawler: resumable, checkpointed file crawler with ordered prefetch.
//!
//! Enumerates the files under a root (a directory tree, or a text file
//! listing one path per line) in a fixed deterministic order, overlaps the
//! per-file load with downstream work across a fixed pool of worker
//! threads, and delivers items strictly in traversal order. After each item
//! is released, a durable checkpoint records its position, so an abrupt
//! termination (crash, power loss, kill) resumes exactly after the last
//! committed file: nothing is reprocessed, nothing is skipped.

pub mod checkpoint;
pub mod engine;
pub mod error;
pub mod frontier;
pub mod item;
pub mod loader;
pub mod observer;
pub mod pipeline;
pub mod traversal;
pub mod types;
pub mod utils;

pub use error::{LoadError, LoadErrorKind, TrawlError};
pub use item::{Item, ItemGuard};
pub use loader::{Loader, ReadLoader};
pub use observer::{NullObserver, TrawlObserver};
pub use pipeline::Trawl;
pub use types::*;

use log::debug;
use std::path::Path;
use std::sync::Arc;

use crate::checkpoint::CheckpointStore;

/// Result alias used by the public trawler API.
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Single entry point: start a crawl over `root` with `opts`, loading each
/// file through `loader`. Iterate the returned [`Trawl`] to receive items in
/// traversal order; release each via [`ItemGuard::finish`] to commit its
/// checkpoint, then call [`Trawl::finish`] to join the pipeline.
///
/// Fails up front on a stale checkpoint (the recorded path no longer
/// exists); clear it with [`clear_checkpoint`] to restart from scratch.
pub fn trawl<L: Loader>(root: &Path, opts: &TrawlOpts, loader: Arc<L>) -> Result<Trawl<L::Payload>> {
    trawl_with_observer(root, opts, loader, Arc::new(NullObserver))
}

/// [`trawl`] with an injected lifecycle observer (one call per event: item
/// produced, loaded, errored, checkpoint committed).
pub fn trawl_with_observer<L: Loader>(
    root: &Path,
    opts: &TrawlOpts,
    loader: Arc<L>,
    observer: Arc<dyn TrawlObserver>,
) -> Result<Trawl<L::Payload>> {
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    pipeline::run_pipeline(root, opts, loader, observer)
}

/// Remove any stored checkpoint for `root`. Returns whether one existed.
/// The caller's answer to [`TrawlError::StaleCheckpoint`].
pub fn clear_checkpoint(root: &Path, opts: &TrawlOpts) -> Result<bool> {
    let root = match root.canonicalize() {
        Ok(r) => r,
        // Root itself may be gone; nothing to clear then.
        Err(_) => return Ok(false),
    };
    let kind = if root.is_file() {
        RootKind::List
    } else {
        RootKind::Dir
    };
    let store = CheckpointStore::open(&root, kind, opts.state_dir.as_deref())?;
    let existed = store.get().unwrap_or_default().is_some() || store.file_path().exists();
    store.clear()?;
    Ok(existed)
}

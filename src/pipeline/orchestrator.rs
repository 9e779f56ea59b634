//! Wire a traversal, loader, and checkpoint store into a running pipeline.

use log::debug;
use std::path::Path;
use std::sync::Arc;

use crate::checkpoint::CheckpointStore;
use crate::error::TrawlError;
use crate::loader::Loader;
use crate::observer::TrawlObserver;
use crate::traversal::Traversal;
use crate::types::{RootKind, TrawlOpts};
use crate::utils::config::{effective_prefetch_depth, effective_workers};

use super::context::create_pipeline_channels;
use super::drain::Trawl;
use super::producer::spawn_producer_thread;
use super::worker::spawn_loader_workers;

/// Open the checkpoint store for `root`, rebuild the traversal from the
/// stored position, and start one producer plus W loader workers. Returns
/// the caller-facing drain. Frontier construction runs here, before any
/// thread spawns, so resume failures ([`TrawlError::StaleCheckpoint`] among
/// them) abort startup.
pub fn run_pipeline<L: Loader>(
    root: &Path,
    opts: &TrawlOpts,
    loader: Arc<L>,
    observer: Arc<dyn TrawlObserver>,
) -> Result<Trawl<L::Payload>, TrawlError> {
    let root = root.canonicalize().map_err(|e| TrawlError::Walk {
        path: root.to_path_buf(),
        source: e,
    })?;
    let kind = if root.is_file() {
        RootKind::List
    } else if root.is_dir() {
        RootKind::Dir
    } else {
        return Err(TrawlError::BadRoot { root });
    };

    let store = Arc::new(CheckpointStore::open(
        &root,
        kind,
        opts.state_dir.as_deref(),
    )?);
    let checkpoint = store.get()?;
    if let Some(pos) = &checkpoint {
        debug!("resuming {} from {}", root.display(), pos);
    }
    let traversal = Traversal::new(&root, checkpoint.as_ref(), opts.direction)?;

    let prefetch_depth = effective_prefetch_depth(opts.prefetch_depth);
    let workers = effective_workers(opts.workers);
    debug!(
        "pipeline for {}: {} workers, prefetch depth {}",
        root.display(),
        workers,
        prefetch_depth
    );

    let channels = create_pipeline_channels::<L::Payload>(prefetch_depth);
    let producer = spawn_producer_thread(
        traversal,
        channels.order_tx,
        channels.work_tx,
        Arc::clone(&channels.first_error),
        Arc::clone(&channels.cancel),
        Arc::clone(&observer),
    );
    let workers = spawn_loader_workers(
        channels.work_rx,
        loader,
        workers,
        Arc::clone(&channels.cancel),
        Arc::clone(&observer),
    );

    Ok(Trawl::new(
        channels.order_rx,
        store,
        observer,
        channels.cancel,
        channels.first_error,
        producer,
        workers,
    ))
}

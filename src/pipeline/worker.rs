//! Loader workers: pop from the work queue, load, hand the item back on its
//! completion channel. Completion order across workers is unconstrained;
//! the order queue makes delivery order independent of it.

use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crate::loader::Loader;
use crate::observer::TrawlObserver;
use crate::utils::config::POLL_INTERVAL;

use super::context::Slot;

fn loader_worker_loop<L: Loader>(
    work_rx: Receiver<Slot<L::Payload>>,
    loader: Arc<L>,
    cancel: Arc<AtomicBool>,
    observer: Arc<dyn TrawlObserver>,
) {
    loop {
        if cancel.load(Ordering::Relaxed) {
            return;
        }
        match work_rx.recv_timeout(POLL_INTERVAL) {
            Ok((mut item, done_tx)) => {
                item.run_load(loader.as_ref());
                match item.error() {
                    Some(err) => observer.on_errored(item.path(), err),
                    None => observer.on_loaded(item.path()),
                }
                // Drain may already be gone (cancelled run); nothing to do.
                let _ = done_tx.send(item);
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

/// Spawn W loader workers sharing the work queue. Workers exit once the
/// producer has dropped its sender and the queue is drained, or when the
/// cancel token is set.
pub(crate) fn spawn_loader_workers<L: Loader>(
    work_rx: Receiver<Slot<L::Payload>>,
    loader: Arc<L>,
    workers: usize,
    cancel: Arc<AtomicBool>,
    observer: Arc<dyn TrawlObserver>,
) -> Vec<JoinHandle<()>> {
    (0..workers)
        .map(|_| {
            let work_rx = work_rx.clone();
            let loader = Arc::clone(&loader);
            let cancel = Arc::clone(&cancel);
            let observer = Arc::clone(&observer);
            thread::spawn(move || loader_worker_loop(work_rx, loader, cancel, observer))
        })
        .collect()
}

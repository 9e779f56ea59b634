//! Order-preserving drain: the caller-facing sequential feed of work items.

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::checkpoint::CheckpointStore;
use crate::error::TrawlError;
use crate::item::{Item, ItemGuard};
use crate::observer::TrawlObserver;
use crate::utils::config::POLL_INTERVAL;

/// A running crawl: iterate to receive [`ItemGuard`]s in exact traversal
/// order, regardless of which worker finishes loading first. Items may load
/// out of order; each `next` blocks on the front item's completion channel,
/// so checkpoint commits advance monotonically in traversal order.
///
/// The sequence is lazy, finite, and non-restartable. Call
/// [`finish`](Self::finish) after iterating to join the pipeline threads and
/// surface any fatal traversal error.
pub struct Trawl<P> {
    order_rx: Receiver<Receiver<Item<P>>>,
    store: Arc<CheckpointStore>,
    observer: Arc<dyn TrawlObserver>,
    cancel: Arc<AtomicBool>,
    first_error: Arc<Mutex<Option<TrawlError>>>,
    producer: Option<JoinHandle<usize>>,
    workers: Vec<JoinHandle<()>>,
    exhausted: bool,
}

impl<P> std::fmt::Debug for Trawl<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trawl")
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

impl<P> Trawl<P> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        order_rx: Receiver<Receiver<Item<P>>>,
        store: Arc<CheckpointStore>,
        observer: Arc<dyn TrawlObserver>,
        cancel: Arc<AtomicBool>,
        first_error: Arc<Mutex<Option<TrawlError>>>,
        producer: JoinHandle<usize>,
        workers: Vec<JoinHandle<()>>,
    ) -> Self {
        Self {
            order_rx,
            store,
            observer,
            cancel,
            first_error,
            producer: Some(producer),
            workers,
            exhausted: false,
        }
    }

    /// Clean-shutdown token. Setting it stops production and delivery; the
    /// checkpoint is left in place, so the next run resumes from the last
    /// committed item (same as a crash, minus the crash).
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// The checkpoint store backing this crawl.
    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Join producer and workers and report the run outcome: the produced
    /// count on success, or the first fatal error (traversal failure,
    /// checkpoint clear failure, lost worker).
    pub fn finish(mut self) -> Result<usize, TrawlError> {
        // Unblock the producer if the caller stopped consuming early.
        drop(self.order_rx);
        let produced = match self.producer.take() {
            Some(h) => h.join().unwrap_or(0),
            None => 0,
        };
        for h in self.workers.drain(..) {
            let _ = h.join();
        }
        if let Some(err) = self.first_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(produced)
    }

    /// Natural exhaustion: every produced item was delivered and the
    /// producer is done. Clear the checkpoint so the root reads as never
    /// started / fully completed.
    fn on_exhausted(&mut self) {
        self.exhausted = true;
        if self.cancel.load(Ordering::Relaxed) {
            return;
        }
        if self.first_error.lock().unwrap().is_some() {
            return;
        }
        debug!(
            "traversal of {} exhausted, clearing checkpoint",
            self.store.root().display()
        );
        if let Err(e) = self.store.clear() {
            let _ = self.first_error.lock().unwrap().get_or_insert(e);
        }
    }

    fn record_lost_worker(&mut self) {
        let _ = self
            .first_error
            .lock()
            .unwrap()
            .get_or_insert(TrawlError::WorkerLost);
        self.exhausted = true;
    }
}

// No Drop impl: finish() moves fields out of self. Dropping a Trawl mid-run
// closes the channels, which winds the producer and workers down.

impl<P> Iterator for Trawl<P> {
    type Item = ItemGuard<P>;

    fn next(&mut self) -> Option<ItemGuard<P>> {
        if self.exhausted {
            return None;
        }
        // Strict FIFO over the order queue; bounded waits keep cancellation
        // responsive instead of blocking indefinitely.
        let done_rx = loop {
            if self.cancel.load(Ordering::Relaxed) {
                return None;
            }
            match self.order_rx.recv_timeout(POLL_INTERVAL) {
                Ok(rx) => break rx,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    self.on_exhausted();
                    return None;
                }
            }
        };
        // Loading may complete out of order across workers; delivery waits
        // for this item specifically.
        loop {
            if self.cancel.load(Ordering::Relaxed) {
                return None;
            }
            match done_rx.recv_timeout(POLL_INTERVAL) {
                Ok(item) => {
                    return Some(ItemGuard::new(
                        item,
                        Arc::clone(&self.store),
                        Arc::clone(&self.observer),
                    ));
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    self.record_lost_worker();
                    return None;
                }
            }
        }
    }
}

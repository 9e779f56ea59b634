//! Pipeline channels and shared state handed to the producer and workers.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use crate::error::TrawlError;
use crate::item::Item;

/// One unit on the work queue: the item plus the one-shot channel the worker
/// sends it back on once loaded. The paired receiver travels through the
/// order queue, so delivery order is fixed at production time.
pub(crate) type Slot<P> = (Item<P>, Sender<Item<P>>);

/// The two bounded queues of capacity C plus shared flags. Every item is
/// enqueued into both queues exactly once, in the same relative order.
pub(crate) struct PipelineChannels<P> {
    pub work_tx: Sender<Slot<P>>,
    pub work_rx: Receiver<Slot<P>>,
    pub order_tx: Sender<Receiver<Item<P>>>,
    pub order_rx: Receiver<Receiver<Item<P>>>,
    /// First fatal traversal error, recorded by the producer.
    pub first_error: Arc<Mutex<Option<TrawlError>>>,
    /// Clean-shutdown token, polled between queue operations.
    pub cancel: Arc<AtomicBool>,
}

pub(crate) fn create_pipeline_channels<P>(prefetch_depth: usize) -> PipelineChannels<P> {
    let (work_tx, work_rx) = bounded::<Slot<P>>(prefetch_depth);
    let (order_tx, order_rx) = bounded::<Receiver<Item<P>>>(prefetch_depth);
    PipelineChannels {
        work_tx,
        work_rx,
        order_tx,
        order_rx,
        first_error: Arc::new(Mutex::new(None)),
        cancel: Arc::new(AtomicBool::new(false)),
    }
}

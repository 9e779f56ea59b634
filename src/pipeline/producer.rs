//! Producer thread: drives the traversal and feeds both pipeline queues.

use crossbeam_channel::{SendTimeoutError, Sender, bounded};
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::error::TrawlError;
use crate::item::Item;
use crate::observer::TrawlObserver;
use crate::traversal::Traversal;
use crate::utils::config::POLL_INTERVAL;

use super::context::Slot;

/// Send with backpressure, polling the cancel token. Returns false when the
/// run was cancelled or the receiving side went away.
fn send_polling<T>(tx: &Sender<T>, mut value: T, cancel: &AtomicBool) -> bool {
    loop {
        if cancel.load(Ordering::Relaxed) {
            return false;
        }
        match tx.send_timeout(value, POLL_INTERVAL) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(v)) => value = v,
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}

/// Spawn the producer: for each traversal entry, build an item and a fresh
/// completion channel, enqueue the completion receiver on the order queue
/// and the (item, completion sender) pair on the work queue. Pushes block at
/// capacity C, which is the backpressure bounding how far production runs
/// ahead of the consumer. Dropping both senders on exit is the
/// production-finished signal. Returns the produced count.
pub(crate) fn spawn_producer_thread<P: Send + 'static>(
    traversal: Traversal,
    order_tx: Sender<crossbeam_channel::Receiver<Item<P>>>,
    work_tx: Sender<Slot<P>>,
    first_error: Arc<Mutex<Option<TrawlError>>>,
    cancel: Arc<AtomicBool>,
    observer: Arc<dyn TrawlObserver>,
) -> JoinHandle<usize> {
    thread::spawn(move || {
        let mut count = 0_usize;
        for entry in traversal {
            let pending = match entry {
                Ok(p) => p,
                Err(e) => {
                    let _ = first_error.lock().unwrap().get_or_insert(e);
                    break;
                }
            };
            let item = Item::new(pending.path.clone(), pending.position);
            let (done_tx, done_rx) = bounded::<Item<P>>(1);
            if !send_polling(&order_tx, done_rx, &cancel) {
                break;
            }
            if !send_polling(&work_tx, (item, done_tx), &cancel) {
                break;
            }
            observer.on_produced(&pending.path);
            count += 1;
        }
        debug!("producer: traversal finished after {} entries", count);
        count
    })
}

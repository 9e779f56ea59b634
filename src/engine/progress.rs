//! Progress counter driven by pipeline observer events.

use kdam::{Animation, Bar, BarExt};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::LoadError;
use crate::observer::TrawlObserver;

pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a counter for an unknown total (shows count without percentage).
pub fn create_counter(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " files"
    )))
}

/// Bump the bar by `n` if available. try_lock so worker threads never block
/// on the display; a skipped update catches up on the next one.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut bar) = pb.try_lock() {
        let _ = bar.update(n);
    }
}

/// Observer that ticks the counter once per finished load (success or
/// error). Runs on worker threads, so updates are non-blocking.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl TrawlObserver for ProgressObserver {
    fn on_loaded(&self, _path: &Path) {
        update_progress_bar(&self.bar, 1);
    }

    fn on_errored(&self, _path: &Path, _error: &LoadError) {
        update_progress_bar(&self.bar, 1);
    }
}

//! Work item: one file's load state, payload, and commit responsibility.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::checkpoint::CheckpointStore;
use crate::error::{LoadError, TrawlError};
use crate::loader::Loader;
use crate::observer::TrawlObserver;
use crate::types::{LoadState, Position};

/// A handle wrapping one path: `unloaded → loading → {loaded, errored}`.
/// Owned by the pipeline until the drain hands it to the caller inside an
/// [`ItemGuard`].
pub struct Item<P> {
    path: PathBuf,
    position: Position,
    state: LoadState,
    payload: Option<P>,
    error: Option<LoadError>,
}

impl<P> Item<P> {
    pub(crate) fn new(path: PathBuf, position: Position) -> Self {
        Self {
            path,
            position,
            state: LoadState::Unloaded,
            payload: None,
            error: None,
        }
    }

    /// Run the loader exactly once. The unit of work dispatched to worker
    /// threads.
    pub(crate) fn run_load<L>(&mut self, loader: &L)
    where
        L: Loader<Payload = P>,
    {
        self.state = LoadState::Loading;
        match loader.load(&self.path) {
            Ok(payload) => {
                self.payload = Some(payload);
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                self.error = Some(e);
                self.state = LoadState::Errored;
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checkpoint position committed when this item is released.
    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Parsed payload, present iff `state() == Loaded`.
    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    /// Move the payload out, leaving the item `Loaded` but empty.
    pub fn take_payload(&mut self) -> Option<P> {
        self.payload.take()
    }

    /// Load error, present iff `state() == Errored`.
    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }
}

/// Scoped acquisition of one item. [`finish`](Self::finish) releases it and
/// commits its checkpoint position; dropping the guard without finishing
/// abandons the item, so a caller fault never advances the crash-recovery
/// cursor past unfinished work.
pub struct ItemGuard<P> {
    item: Item<P>,
    store: Arc<CheckpointStore>,
    observer: Arc<dyn TrawlObserver>,
}

impl<P> ItemGuard<P> {
    pub(crate) fn new(
        item: Item<P>,
        store: Arc<CheckpointStore>,
        observer: Arc<dyn TrawlObserver>,
    ) -> Self {
        Self {
            item,
            store,
            observer,
        }
    }

    /// Release the item as fully handled: flush the durable checkpoint for
    /// its position. A write failure propagates and must abort the run.
    pub fn finish(self) -> Result<(), TrawlError> {
        self.store.set(self.item.position())?;
        self.observer.on_committed(self.item.position());
        Ok(())
    }
}

impl<P> Deref for ItemGuard<P> {
    type Target = Item<P>;

    fn deref(&self) -> &Item<P> {
        &self.item
    }
}

impl<P> DerefMut for ItemGuard<P> {
    fn deref_mut(&mut self) -> &mut Item<P> {
        &mut self.item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NullObserver;
    use crate::types::RootKind;

    fn guard_for(
        state: &Path,
        root: &Path,
        path: PathBuf,
    ) -> (ItemGuard<Vec<u8>>, Arc<CheckpointStore>) {
        let store =
            Arc::new(CheckpointStore::open(root, RootKind::Dir, Some(state)).unwrap());
        let item = Item::new(path.clone(), Position::Path(path));
        let guard = ItemGuard::new(item, Arc::clone(&store), Arc::new(NullObserver));
        (guard, store)
    }

    #[test]
    fn finish_commits_the_item_position() {
        let tmp = tempfile::tempdir().unwrap();
        let root = PathBuf::from("/data/archive");
        let (guard, store) = guard_for(tmp.path(), &root, root.join("a"));
        guard.finish().unwrap();
        assert_eq!(
            store.get().unwrap(),
            Some(Position::Path(root.join("a")))
        );
    }

    #[test]
    fn dropping_without_finish_leaves_the_cursor_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let root = PathBuf::from("/data/archive");
        let (guard, store) = guard_for(tmp.path(), &root, root.join("a"));
        drop(guard);
        assert_eq!(store.get().unwrap(), None);
    }
}

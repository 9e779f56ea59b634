//! Frontier reconstruction: rebuild the remaining work list from a single
//! checkpoint path without re-walking completed subtrees.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::error::TrawlError;
use crate::types::SortDirection;

/// Fixed total order over sibling entries. Both directory expansion and
/// frontier rebuild must use this exact comparator or resume breaks.
pub fn compare_siblings(a: &Path, b: &Path, direction: SortDirection) -> Ordering {
    let ord = a.as_os_str().cmp(b.as_os_str());
    match direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}

/// Immediate children of `dir`, sorted by [`compare_siblings`].
pub fn sorted_children(dir: &Path, direction: SortDirection) -> Result<Vec<PathBuf>, TrawlError> {
    let walk_err = |e: std::io::Error| TrawlError::Walk {
        path: dir.to_path_buf(),
        source: e,
    };
    let mut children = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(walk_err)? {
        children.push(entry.map_err(walk_err)?.path());
    }
    children.sort_by(|a, b| compare_siblings(a, b, direction));
    Ok(children)
}

/// Rebuild the pending-entry list for a directory root.
///
/// With no checkpoint the frontier is just `[root]`. With a checkpoint path,
/// walk from the checkpoint up to the root, appending at each level the
/// siblings ordered *after* the current path; levels nearest the leaf come
/// first. The checkpoint path itself is excluded: a resume never re-delivers
/// a committed item. Concatenated with everything yielded before the
/// checkpoint was written, the result equals a fresh full enumeration.
pub fn build_frontier(
    root: &Path,
    checkpoint: Option<&Path>,
    direction: SortDirection,
) -> Result<VecDeque<PathBuf>, TrawlError> {
    let last = match checkpoint {
        None => return Ok(VecDeque::from([root.to_path_buf()])),
        Some(p) => p,
    };
    if !last.starts_with(root) {
        return Err(TrawlError::CorruptCheckpoint {
            root: root.to_path_buf(),
            reason: format!("{} is outside the root", last.display()),
        });
    }
    if !last.exists() {
        return Err(TrawlError::StaleCheckpoint {
            root: root.to_path_buf(),
            path: last.to_path_buf(),
        });
    }

    let mut pending = VecDeque::new();
    let mut current = last.to_path_buf();
    while current != root {
        let parent = match current.parent() {
            Some(p) => p.to_path_buf(),
            None => {
                return Err(TrawlError::CorruptCheckpoint {
                    root: root.to_path_buf(),
                    reason: format!("{} has no parent under the root", current.display()),
                });
            }
        };
        let siblings = sorted_children(&parent, direction)?;
        let index = siblings.iter().position(|s| *s == current).ok_or_else(|| {
            TrawlError::StaleCheckpoint {
                root: root.to_path_buf(),
                path: current.clone(),
            }
        })?;
        pending.extend(siblings.into_iter().skip(index + 1));
        current = parent;
    }
    Ok(pending)
}

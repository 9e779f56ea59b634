//! Traversal engine: a depth-first walker over a LIFO frontier, or a
//! line-oriented walker over a path-list file. Yields entries in a fixed
//! deterministic order and knows how to resume from a checkpoint.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::error::TrawlError;
use crate::frontier::{build_frontier, sorted_children};
use crate::types::{Position, SortDirection};

/// One entry yielded by the traversal: the file to load plus the checkpoint
/// position to commit once the caller has fully handled it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pending {
    pub path: PathBuf,
    pub position: Position,
}

/// Deterministic walker over one root. Directory roots run a pure DFS in
/// sibling order; list-file roots read lines past the consumed prefix.
pub enum Traversal {
    Dir(DirTraversal),
    List(ListTraversal),
}

impl std::fmt::Debug for Traversal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Traversal::Dir(_) => f.write_str("Traversal::Dir"),
            Traversal::List(_) => f.write_str("Traversal::List"),
        }
    }
}

impl Traversal {
    /// Build a traversal for `root`, resuming from `checkpoint` when given.
    /// A checkpoint whose path no longer exists fails with
    /// [`TrawlError::StaleCheckpoint`]; construction errors are fatal.
    pub fn new(
        root: &Path,
        checkpoint: Option<&Position>,
        direction: SortDirection,
    ) -> Result<Self, TrawlError> {
        if root.is_dir() {
            let last = match checkpoint {
                None => None,
                Some(Position::Path(p)) => Some(p.as_path()),
                Some(Position::Line(_)) => {
                    return Err(TrawlError::CorruptCheckpoint {
                        root: root.to_path_buf(),
                        reason: "line checkpoint for a directory root".into(),
                    });
                }
            };
            let frontier = build_frontier(root, last, direction)?;
            Ok(Traversal::Dir(DirTraversal {
                frontier,
                direction,
            }))
        } else if root.is_file() {
            let skip = match checkpoint {
                None => 0,
                Some(Position::Line(n)) => *n,
                Some(Position::Path(_)) => {
                    return Err(TrawlError::CorruptCheckpoint {
                        root: root.to_path_buf(),
                        reason: "path checkpoint for a list-file root".into(),
                    });
                }
            };
            ListTraversal::open(root, skip).map(Traversal::List)
        } else {
            Err(TrawlError::BadRoot {
                root: root.to_path_buf(),
            })
        }
    }
}

impl Iterator for Traversal {
    type Item = Result<Pending, TrawlError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Traversal::Dir(t) => t.next(),
            Traversal::List(t) => t.next(),
        }
    }
}

/// DFS over a frontier of mixed files and directories. Popping a directory
/// replaces it with its sorted children at the front, so the net order is a
/// pure recursive DFS under the same comparator.
pub struct DirTraversal {
    frontier: VecDeque<PathBuf>,
    direction: SortDirection,
}

impl Iterator for DirTraversal {
    type Item = Result<Pending, TrawlError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(front) = self.frontier.pop_front() {
            if front.is_file() {
                return Some(Ok(Pending {
                    position: Position::Path(front.clone()),
                    path: front,
                }));
            }
            if front.is_dir() {
                match sorted_children(&front, self.direction) {
                    Ok(children) => {
                        for child in children.into_iter().rev() {
                            self.frontier.push_front(child);
                        }
                    }
                    Err(e) => return Some(Err(e)),
                }
                continue;
            }
            // Vanished or unreadable entry kind (e.g. dangling symlink): skip.
        }
        None
    }
}

/// Line walker over a list file: each non-blank line is a path. The position
/// committed for line `i` is `i + 1`, the count of consumed lines.
pub struct ListTraversal {
    root: PathBuf,
    lines: Lines<BufReader<File>>,
    consumed: u64,
}

impl ListTraversal {
    fn open(root: &Path, skip: u64) -> Result<Self, TrawlError> {
        let walk_err = |e: std::io::Error| TrawlError::Walk {
            path: root.to_path_buf(),
            source: e,
        };
        let file = File::open(root).map_err(walk_err)?;
        let mut lines = BufReader::new(file).lines();
        for _ in 0..skip {
            match lines.next() {
                Some(line) => {
                    line.map_err(walk_err)?;
                }
                None => break,
            }
        }
        Ok(Self {
            root: root.to_path_buf(),
            lines,
            consumed: skip,
        })
    }
}

impl Iterator for ListTraversal {
    type Item = Result<Pending, TrawlError>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    return Some(Err(TrawlError::Walk {
                        path: self.root.clone(),
                        source: e,
                    }));
                }
            };
            self.consumed += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Some(Ok(Pending {
                path: PathBuf::from(trimmed),
                position: Position::Line(self.consumed),
            }));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn collect_paths(t: Traversal) -> Vec<PathBuf> {
        t.map(|r| r.unwrap().path).collect()
    }

    /// root/
    ///   1/{a,b,c}
    ///   2/{1/{d,e}, 3/{f}}
    ///   g
    fn fixture() -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        for d in ["1", "2/1", "2/3"] {
            fs::create_dir_all(root.join(d)).unwrap();
        }
        for f in ["1/a", "1/b", "1/c", "2/1/d", "2/1/e", "2/3/f", "g"] {
            fs::write(root.join(f), b"x").unwrap();
        }
        (tmp, root)
    }

    fn expected(root: &Path) -> Vec<PathBuf> {
        ["1/a", "1/b", "1/c", "2/1/d", "2/1/e", "2/3/f", "g"]
            .iter()
            .map(|f| root.join(f))
            .collect()
    }

    #[test]
    fn dfs_order_is_deterministic() {
        let (_tmp, root) = fixture();
        let first = collect_paths(Traversal::new(&root, None, SortDirection::Ascending).unwrap());
        let second = collect_paths(Traversal::new(&root, None, SortDirection::Ascending).unwrap());
        assert_eq!(first, expected(&root));
        assert_eq!(first, second);
    }

    #[test]
    fn dfs_matches_recursive_walk() {
        let (_tmp, root) = fixture();
        let ours = collect_paths(Traversal::new(&root, None, SortDirection::Ascending).unwrap());
        let reference: Vec<PathBuf> = walkdir::WalkDir::new(&root)
            .sort_by(|a, b| a.path().as_os_str().cmp(b.path().as_os_str()))
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        assert_eq!(ours, reference);
    }

    #[test]
    fn descending_reverses_each_sibling_level() {
        let (_tmp, root) = fixture();
        let paths = collect_paths(Traversal::new(&root, None, SortDirection::Descending).unwrap());
        let want: Vec<PathBuf> = ["g", "2/3/f", "2/1/e", "2/1/d", "1/c", "1/b", "1/a"]
            .iter()
            .map(|f| root.join(f))
            .collect();
        assert_eq!(paths, want);
    }

    #[test]
    fn resume_from_checkpoint_yields_exact_suffix() {
        let (_tmp, root) = fixture();
        let full = expected(&root);
        for (i, committed) in full.iter().enumerate() {
            let ckpt = Position::Path(committed.clone());
            let rest = collect_paths(
                Traversal::new(&root, Some(&ckpt), SortDirection::Ascending).unwrap(),
            );
            assert_eq!(rest, &full[i + 1..], "resume after {}", committed.display());
        }
    }

    #[test]
    fn empty_directories_are_transparent() {
        let (_tmp, root) = fixture();
        fs::create_dir_all(root.join("0/empty")).unwrap();
        let paths = collect_paths(Traversal::new(&root, None, SortDirection::Ascending).unwrap());
        assert_eq!(paths, expected(&root));
    }

    #[test]
    fn list_mode_skips_consumed_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let list = tmp.path().join("paths.txt");
        fs::write(&list, "/data/p1\n/data/p2\n/data/p3\n").unwrap();

        let all: Vec<Pending> = Traversal::new(&list, None, SortDirection::Ascending)
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(
            all.iter().map(|p| p.path.clone()).collect::<Vec<_>>(),
            vec![
                PathBuf::from("/data/p1"),
                PathBuf::from("/data/p2"),
                PathBuf::from("/data/p3")
            ]
        );
        assert_eq!(all[0].position, Position::Line(1));

        let resumed: Vec<PathBuf> =
            Traversal::new(&list, Some(&Position::Line(1)), SortDirection::Ascending)
                .unwrap()
                .map(|r| r.unwrap().path)
                .collect();
        assert_eq!(
            resumed,
            vec![PathBuf::from("/data/p2"), PathBuf::from("/data/p3")]
        );
    }

    #[test]
    fn list_mode_counts_blank_lines_but_does_not_yield_them() {
        let tmp = tempfile::tempdir().unwrap();
        let list = tmp.path().join("paths.txt");
        fs::write(&list, "/data/p1\n\n/data/p2\n").unwrap();
        let all: Vec<Pending> = Traversal::new(&list, None, SortDirection::Ascending)
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(all.len(), 2);
        // The blank line still advances the cursor: p2 sits on line 3.
        assert_eq!(all[1].position, Position::Line(3));
    }

    #[test]
    fn bad_root_is_rejected() {
        let err = Traversal::new(
            Path::new("/no/such/root"),
            None,
            SortDirection::Ascending,
        )
        .unwrap_err();
        assert!(matches!(err, TrawlError::BadRoot { .. }));
    }
}

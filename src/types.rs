//! Public and internal types for the trawler API and pipeline.

use std::path::PathBuf;

/// Durable cursor value: the last fully processed position under a root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Position {
    /// Absolute path of the last committed file (directory roots).
    Path(PathBuf),
    /// Count of fully processed lines, i.e. the 0-based index of the next
    /// line to deliver (list-file roots).
    Line(u64),
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Path(p) => write!(f, "{}", p.display()),
            Position::Line(n) => write!(f, "{}", n),
        }
    }
}

/// Whether a root is a directory tree or a list-of-paths file. Selected by
/// checking the root itself; determines how checkpoint values are parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootKind {
    Dir,
    List,
}

/// Sibling ordering over the path string. Expansion and frontier rebuild use
/// the same direction; changing it between runs over a checkpointed root
/// breaks resume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Load lifecycle of a work item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
    Errored,
}

/// Options for [`trawl`](crate::trawl).
#[derive(Clone, Debug, Default)]
pub struct TrawlOpts {
    /// Bounded queue capacity: max items in flight ahead of the consumer.
    /// When None, [`DEFAULT_PREFETCH_DEPTH`](crate::utils::config::DEFAULT_PREFETCH_DEPTH).
    pub prefetch_depth: Option<usize>,
    /// Loader worker thread count. When None, derived from available threads
    /// and the FD limit.
    pub workers: Option<usize>,
    /// Sibling sort direction. Ascending is canonical.
    pub direction: SortDirection,
    /// Directory for per-root checkpoint files. When None, the user config
    /// dir (e.g. `~/.config/trawler`).
    pub state_dir: Option<PathBuf>,
}

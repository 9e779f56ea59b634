//! Application configuration constants and derived defaults.
//! Tuning and thresholds in one place.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::fd_limit::cap_workers_by_fd_limit;

/// Default bounded queue capacity (prefetch depth C).
pub const DEFAULT_PREFETCH_DEPTH: usize = 30;

/// Default loader worker count W, before capping by available threads and
/// the FD limit.
pub const DEFAULT_WORKERS: usize = 10;

/// Bounded-wait interval for queue operations. Producer, workers, and drain
/// poll at this granularity so the cancel token is observed promptly.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Per-root state files live under the user config dir by default
/// (e.g. `~/.config/trawler`).
pub fn default_state_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(env!("CARGO_PKG_NAME")))
}

/// Deterministic, filesystem-safe checkpoint file name for a normalized
/// absolute root: path separators and drive/volume markers become `_`.
pub fn checkpoint_file_name(root: &Path) -> String {
    let mut name = String::from("root");
    for ch in root.to_string_lossy().chars() {
        name.push(match ch {
            '/' | '\\' | ':' => '_',
            c => c,
        });
    }
    name
}

/// Effective worker count: the override, or `DEFAULT_WORKERS` capped by the
/// available threads; always at least 1 and never past the FD limit.
pub fn effective_workers(requested: Option<usize>) -> usize {
    let wanted = match requested {
        Some(n) => n,
        None => DEFAULT_WORKERS.min(rayon::current_num_threads()),
    };
    cap_workers_by_fd_limit(wanted.max(1))
}

/// Effective prefetch depth: the override or the default; at least 1 so the
/// bounded queues can always hold one item.
pub fn effective_prefetch_depth(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_PREFETCH_DEPTH).max(1)
}

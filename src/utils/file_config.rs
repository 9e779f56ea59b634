//! Load `.trawler.toml` from the root directory (CLI only). Lib callers
//! inject settings via `TrawlOpts` instead.

use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".trawler.toml";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TrawlerToml {
    #[serde(default)]
    pub crawl: CrawlSection,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CrawlSection {
    pub workers: Option<usize>,
    pub prefetch: Option<usize>,
    pub descending: Option<bool>,
    pub state_dir: Option<PathBuf>,
    pub extensions: Option<Vec<String>>,
}

/// Load `.trawler.toml` next to a directory root (or next to a list file).
/// Returns None when the file is missing or unreadable; a file that exists
/// but fails to parse is only logged, never fatal.
pub(crate) fn load_file_config(root: &Path) -> Option<TrawlerToml> {
    let dir = if root.is_dir() { root } else { root.parent()? };
    let path = dir.join(CONFIG_FILE_NAME);
    let raw = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TrawlerToml>(&raw) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            log::warn!("ignoring {}: {}", path.display(), e);
            None
        }
    }
}

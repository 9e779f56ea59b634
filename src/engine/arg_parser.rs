use clap::Parser;
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const ROOT: &'static str = ".";
}

/// Resumable, checkpointed file crawler with ordered prefetch.
#[derive(Clone, Parser)]
#[command(name = "trawler")]
#[command(
    about = "Crawl a directory tree (or a list of paths) one file at a time, resuming after interruption from the last committed file."
)]
pub struct Cli {
    /// Directory to crawl, or a text file listing one path per line.
    #[arg(value_name = "ROOT", default_value = DefaultArgs::ROOT)]
    pub root: PathBuf,

    /// Loader worker threads. Default: min(10, available cores), capped by
    /// the FD limit.
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Prefetch depth: max items in flight ahead of the consumer.
    #[arg(long, short = 'p')]
    pub prefetch: Option<usize>,

    /// Sort siblings in descending order. Must match the direction in use
    /// when the root's checkpoint was written.
    #[arg(long)]
    pub descending: bool,

    /// Only load files with these extensions; others are reported as
    /// wrong-kind and skipped. Can specify multiple: -e dcm ima
    #[arg(long, short = 'e', num_args = 1..)]
    pub extensions: Vec<String>,

    /// Directory for per-root checkpoint files. Default: user config dir.
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Clear any existing checkpoint for ROOT and start from the beginning.
    #[arg(long)]
    pub reset: bool,

    /// Verbose output (per-item debug logging instead of the progress bar).
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
